use log::{debug, info, warn};

use super::camera::OrbitCamera;
use super::config::{VisualizerConfig, clamp_speed};
use super::error::VisualizerError;
use super::model::GraphModel;
use super::scene::SceneRenderer;
use super::scheduler::AnimationScheduler;
use super::types::{Board, GRID_SIZE, MAX_VALUE};

type StatsCallback = Box<dyn FnMut(usize, usize)>;

/// Entry point for grid events; owns the model, the scheduler and the scene.
pub struct VisualizerController {
	model: GraphModel,
	scheduler: AnimationScheduler,
	scene: SceneRenderer,
	config: VisualizerConfig,
	on_stats: Option<StatsCallback>,
	stats_dirty: bool,
}

impl VisualizerController {
	pub fn new(width: f64, height: f64, config: VisualizerConfig) -> Self {
		let config = config.with_animation_speed(config.animation_speed_ms);
		let camera = OrbitCamera::new(width, height, config.camera_distance, config.auto_rotate);
		Self {
			model: GraphModel::new(),
			scheduler: AnimationScheduler::default(),
			scene: SceneRenderer::new(camera),
			config,
			on_stats: None,
			stats_dirty: false,
		}
	}

	/// Replaces the whole logical and visual state. Invalid grids leave everything untouched.
	pub fn initialize<R: AsRef<[i32]>>(&mut self, rows: &[R]) -> Result<(), VisualizerError> {
		let board = Board::from_rows(rows)?;
		self.initialize_board(board);
		Ok(())
	}

	pub fn initialize_board(&mut self, board: Board) {
		self.scheduler.cancel_all(&mut self.scene);
		self.scene.clear();
		let plan = self.model.load(board);
		info!(
			"full build scheduled: {} vertices, {} edges",
			plan.vertices.len(),
			plan.edges.len()
		);
		self.scheduler.schedule_full_build(
			&plan,
			self.config.animation_speed_ms,
			self.config.settle_delay_ms,
		);
	}

	/// Forwards one cell edit. Addresses or values outside the grid are ignored.
	pub fn cell_changed(&mut self, row: i32, col: i32, old_value: i32, new_value: i32) {
		let (Some(row), Some(col)) = (grid_coord(row), grid_coord(col)) else {
			warn!("ignoring cell change at ({row}, {col}): outside the grid");
			return;
		};
		let (Some(old), Some(new)) = (digit(old_value), digit(new_value)) else {
			warn!("ignoring cell change at ({row}, {col}): {old_value} -> {new_value}");
			return;
		};
		let Some(delta) = self.model.apply_cell_change(row, col, old, new) else {
			return;
		};
		debug!(
			"cell ({row}, {col}) {old} -> {new}: {:?}, -{} +{} edges",
			delta.vertex_op,
			delta.edges_to_remove.len(),
			delta.edges_to_add.len()
		);
		if !delta.is_empty() {
			self.scheduler
				.schedule_cell_update(&delta, self.config.animation_speed_ms);
		}
	}

	/// Drops every visual and empties the model, whatever was mid-animation.
	pub fn clear(&mut self) {
		self.scheduler.cancel_all(&mut self.scene);
		self.scene.clear();
		self.model.clear();
		info!("graph cleared");
		self.scheduler.take_structure_changed();
		self.stats_dirty = false;
		self.report_stats();
	}

	pub fn set_animation_speed(&mut self, ms: u32) {
		self.config.animation_speed_ms = clamp_speed(ms);
		debug!("animation speed set to {} ms", self.config.animation_speed_ms);
	}

	pub fn animation_speed(&self) -> u32 {
		self.config.animation_speed_ms
	}

	pub fn toggle_auto_rotate(&mut self) -> bool {
		let enabled = self.scene.camera_mut().toggle_auto_rotate();
		debug!("auto-rotate {}", if enabled { "on" } else { "off" });
		enabled
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.scene.resize(width, height);
	}

	pub fn pointer_down(&mut self, x: f64, y: f64) {
		self.scene.camera_mut().pointer_down(x, y);
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		self.scene.camera_mut().pointer_move(x, y);
	}

	pub fn pointer_up(&mut self) {
		self.scene.camera_mut().pointer_up();
	}

	pub fn wheel(&mut self, delta_y: f64) {
		self.scene.camera_mut().wheel(delta_y);
	}

	/// Registers the `(vertex_count, edge_count)` listener.
	pub fn on_stats_changed(&mut self, callback: impl FnMut(usize, usize) + 'static) {
		self.on_stats = Some(Box::new(callback));
	}

	/// Advances one display frame. Stats go out once the structure has changed
	/// and every queued animation has finished.
	pub fn frame(&mut self, dt_ms: f64) {
		self.scene.tick(dt_ms, &mut self.scheduler, &self.model);
		self.stats_dirty |= self.scheduler.take_structure_changed();
		if self.stats_dirty && self.scheduler.is_idle() {
			self.stats_dirty = false;
			self.report_stats();
		}
	}

	pub fn is_settled(&self) -> bool {
		self.scheduler.is_idle()
	}

	/// Visual `(vertex_count, edge_count)`.
	pub fn stats(&self) -> (usize, usize) {
		(self.scene.vertex_count(), self.scene.edge_count())
	}

	pub fn scene(&self) -> &SceneRenderer {
		&self.scene
	}

	pub fn model(&self) -> &GraphModel {
		&self.model
	}

	fn report_stats(&mut self) {
		let (vertices, edges) = self.stats();
		debug!("stats: {vertices} vertices, {edges} edges");
		if let Some(callback) = self.on_stats.as_mut() {
			callback(vertices, edges);
		}
	}
}

fn grid_coord(value: i32) -> Option<usize> {
	usize::try_from(value).ok().filter(|v| *v < GRID_SIZE)
}

fn digit(value: i32) -> Option<u8> {
	u8::try_from(value).ok().filter(|v| *v <= MAX_VALUE)
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;
	use crate::components::sudoku_graph::error::ValidationError;

	fn scenario_rows() -> Vec<Vec<i32>> {
		let mut rows = vec![vec![0; GRID_SIZE]; GRID_SIZE];
		rows[0] = vec![5, 3, 0, 0, 7, 0, 0, 0, 0];
		rows
	}

	fn settle(viz: &mut VisualizerController) {
		while !viz.is_settled() {
			viz.frame(16.0);
		}
	}

	fn controller() -> VisualizerController {
		VisualizerController::new(800.0, 600.0, VisualizerConfig::default())
	}

	#[test]
	fn initialize_rejects_bad_grids_without_touching_state() {
		let mut viz = controller();
		viz.initialize(&scenario_rows()).unwrap();
		settle(&mut viz);

		let mut rows = scenario_rows();
		rows.push(vec![0; GRID_SIZE]);
		assert!(matches!(
			viz.initialize(&rows),
			Err(VisualizerError::Validation(ValidationError::RowCount(10)))
		));
		assert_eq!(viz.stats(), (3, 3));
		assert!(viz.is_settled());
	}

	#[test]
	fn out_of_range_cell_changes_are_ignored() {
		let mut viz = controller();
		viz.initialize(&scenario_rows()).unwrap();
		settle(&mut viz);
		viz.cell_changed(9, 0, 0, 1);
		viz.cell_changed(-1, 3, 0, 1);
		viz.cell_changed(0, 2, 0, 11);
		assert!(viz.is_settled());
		assert_eq!(viz.model().active_count(), 3);
	}

	#[test]
	fn stats_are_reported_after_structural_changes() {
		let reports = Rc::new(RefCell::new(Vec::new()));
		let mut viz = controller();
		let sink = reports.clone();
		viz.on_stats_changed(move |v, e| sink.borrow_mut().push((v, e)));

		viz.initialize(&scenario_rows()).unwrap();
		viz.frame(16.0);
		assert!(reports.borrow().is_empty(), "nothing reported mid-build");
		settle(&mut viz);
		assert_eq!(*reports.borrow(), vec![(3, 3)]);

		viz.cell_changed(0, 2, 0, 4);
		viz.cell_changed(0, 8, 0, 1);
		settle(&mut viz);
		assert_eq!(*reports.borrow(), vec![(3, 3), (5, 10)]);

		viz.clear();
		assert_eq!(reports.borrow().last(), Some(&(0, 0)));
		settle(&mut viz);
		assert_eq!(reports.borrow().len(), 3);
	}

	#[test]
	fn clear_mid_animation_leaves_nothing_behind() {
		let mut viz = controller();
		viz.initialize(&scenario_rows()).unwrap();
		viz.frame(16.0);
		viz.cell_changed(0, 2, 0, 4);
		viz.cell_changed(0, 0, 5, 0);
		viz.frame(16.0);

		viz.clear();
		assert_eq!(viz.stats(), (0, 0));
		assert_eq!(viz.scene().object_count(), 0);
		assert_eq!(viz.model().active_count(), 0);
		assert!(viz.is_settled());

		viz.frame(1_000.0);
		assert_eq!(viz.scene().object_count(), 0);
	}

	#[test]
	fn passthroughs_reach_camera_and_config() {
		let mut viz = controller();
		viz.set_animation_speed(5);
		assert_eq!(viz.animation_speed(), 100);
		assert!(!viz.toggle_auto_rotate());
		viz.wheel(-1_000.0);
		assert_eq!(viz.scene().camera().distance(), 60.0);
		viz.resize(300.0, 300.0);
		assert_eq!(viz.scene().camera().aspect(), 1.0);

		viz.pointer_down(10.0, 10.0);
		viz.pointer_up();
		assert!(!viz.scene().camera().auto_rotate());
	}
}
