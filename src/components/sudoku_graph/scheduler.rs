//! Frame-driven sequencing of structural edits.
//!
//! A sequence is a queue of steps separated by waits; a transition is a timed
//! interpolation on one visual. Both advance only inside [`AnimationScheduler::tick`].
//! Every step re-reads the logical model when it runs, so plans made by
//! overlapping sequences cannot produce duplicate or orphaned visuals.

use std::collections::VecDeque;

use log::trace;

use super::config::clamp_speed;
use super::model::{BuildPlan, GraphModel, StructuralDelta, VertexOp};
use super::scene::{SceneRenderer, VisualHandle};
use super::types::EdgeKey;

const PULSE_PEAK: f64 = 1.3;

pub fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Durations derived from the animation speed, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pacing {
	speed_ms: f64,
}

impl Pacing {
	pub fn new(speed_ms: u32) -> Self {
		Self {
			speed_ms: f64::from(clamp_speed(speed_ms)),
		}
	}

	pub fn vertex_in(&self) -> f64 {
		self.speed_ms
	}

	pub fn vertex_out(&self) -> f64 {
		self.speed_ms * 0.8
	}

	pub fn pulse(&self) -> f64 {
		self.speed_ms
	}

	pub fn edge_in(&self) -> f64 {
		self.speed_ms * 0.6
	}

	pub fn edge_out(&self) -> f64 {
		self.speed_ms * 0.4
	}

	pub fn pause(&self) -> f64 {
		self.speed_ms / 4.0
	}

	pub fn stagger(&self) -> f64 {
		self.speed_ms / 10.0
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitionKind {
	ScaleIn,
	ScaleOut { from: f64 },
	Pulse,
	FadeIn,
	FadeOut { from: f64 },
}

impl TransitionKind {
	fn value_at(self, t: f64) -> f64 {
		match self {
			Self::ScaleIn | Self::FadeIn => ease_out_cubic(t),
			Self::ScaleOut { from } | Self::FadeOut { from } => from * (1.0 - t),
			Self::Pulse => 1.0 + (PULSE_PEAK - 1.0) * (1.0 - ease_out_cubic(t)),
		}
	}

	fn destroys(self) -> bool {
		matches!(self, Self::ScaleOut { .. } | Self::FadeOut { .. })
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
	Vertex(VisualHandle),
	Edge(VisualHandle),
}

impl Target {
	fn handle(self) -> VisualHandle {
		match self {
			Self::Vertex(h) | Self::Edge(h) => h,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
	pub kind: TransitionKind,
	pub target: Target,
	pub elapsed_ms: f64,
	pub duration_ms: f64,
}

impl Transition {
	fn new(kind: TransitionKind, target: Target, duration_ms: f64) -> Self {
		Self {
			kind,
			target,
			elapsed_ms: 0.0,
			duration_ms,
		}
	}

	pub fn progress(&self) -> f64 {
		if self.duration_ms <= 0.0 {
			1.0
		} else {
			(self.elapsed_ms / self.duration_ms).min(1.0)
		}
	}

	fn apply(&self, scene: &mut SceneRenderer) {
		let value = self.kind.value_at(self.progress());
		match self.target {
			Target::Vertex(h) => scene.set_vertex_scale(h, value),
			Target::Edge(h) => scene.set_edge_opacity(h, value),
		}
	}

	/// Jumps to the terminal state and runs the completion effect.
	fn finish(mut self, scene: &mut SceneRenderer) {
		self.elapsed_ms = self.duration_ms;
		self.apply(scene);
		if self.kind.destroys() {
			match self.target {
				Target::Vertex(h) => scene.destroy_vertex_visual(h),
				Target::Edge(h) => scene.destroy_edge_visual(h),
			}
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
enum Step {
	RemoveEdges(Vec<EdgeKey>),
	CreateVertex(usize),
	UpdateVertex(usize),
	RemoveVertex(usize),
	CreateVertices(Vec<usize>),
	AddEdge(EdgeKey),
	AddEdges(Vec<EdgeKey>),
	Pause(f64),
}

#[derive(Debug)]
struct Sequence {
	steps: VecDeque<Step>,
	pacing: Pacing,
	wait_ms: f64,
}

#[derive(Default)]
pub struct AnimationScheduler {
	transitions: Vec<Transition>,
	sequences: Vec<Sequence>,
	structure_changed: bool,
}

impl AnimationScheduler {
	/// Queues one cell edit: edge removals, then the vertex op, then edge additions.
	pub fn schedule_cell_update(&mut self, delta: &StructuralDelta, speed_ms: u32) {
		let pacing = Pacing::new(speed_ms);
		let mut steps = VecDeque::new();
		if !delta.edges_to_remove.is_empty() {
			steps.push_back(Step::RemoveEdges(delta.edges_to_remove.clone()));
		}
		match delta.vertex_op {
			VertexOp::Create => {
				steps.push_back(Step::CreateVertex(delta.vertex));
				steps.push_back(Step::Pause(pacing.pause()));
			}
			VertexOp::Update => steps.push_back(Step::UpdateVertex(delta.vertex)),
			VertexOp::Remove => steps.push_back(Step::RemoveVertex(delta.vertex)),
			VertexOp::None => {}
		}
		if matches!(delta.vertex_op, VertexOp::Create | VertexOp::Update) {
			steps.extend(delta.edges_to_add.iter().map(|(key, _)| Step::AddEdge(*key)));
		}
		self.push(steps, pacing);
	}

	/// Queues a rebuild: every vertex at once, then every edge at once `settle_ms` later.
	pub fn schedule_full_build(&mut self, plan: &BuildPlan, speed_ms: u32, settle_ms: f64) {
		let steps = VecDeque::from([
			Step::CreateVertices(plan.vertices.clone()),
			Step::Pause(settle_ms),
			Step::AddEdges(plan.edges.iter().map(|(key, _)| *key).collect()),
		]);
		self.push(steps, Pacing::new(speed_ms));
	}

	fn push(&mut self, steps: VecDeque<Step>, pacing: Pacing) {
		if steps.is_empty() {
			return;
		}
		self.sequences.push(Sequence {
			steps,
			pacing,
			wait_ms: 0.0,
		});
	}

	/// Completes every transition at its terminal state and drops all queued steps.
	pub fn cancel_all(&mut self, scene: &mut SceneRenderer) {
		for transition in self.transitions.drain(..) {
			transition.finish(scene);
		}
		self.sequences.clear();
		self.structure_changed = true;
	}

	pub fn tick(&mut self, dt_ms: f64, model: &GraphModel, scene: &mut SceneRenderer) {
		let mut finished = Vec::new();
		self.transitions.retain_mut(|transition| {
			transition.elapsed_ms += dt_ms;
			if transition.progress() >= 1.0 {
				finished.push(transition.clone());
				false
			} else {
				transition.apply(scene);
				true
			}
		});
		for transition in finished {
			transition.finish(scene);
		}

		let mut sequences = std::mem::take(&mut self.sequences);
		for sequence in &mut sequences {
			sequence.wait_ms -= dt_ms;
			while sequence.wait_ms <= 0.0 {
				let Some(step) = sequence.steps.pop_front() else {
					break;
				};
				sequence.wait_ms += self.run_step(step, sequence.pacing, model, scene);
			}
		}
		sequences.retain(|s| !s.steps.is_empty() || s.wait_ms > 0.0);
		self.sequences = sequences;
	}

	pub fn is_idle(&self) -> bool {
		self.transitions.is_empty() && self.sequences.is_empty()
	}

	pub fn transitions(&self) -> &[Transition] {
		&self.transitions
	}

	/// True once after any visual was created or unbound since the last call.
	pub fn take_structure_changed(&mut self) -> bool {
		std::mem::take(&mut self.structure_changed)
	}

	/// Runs one step and returns how long its sequence waits before the next.
	fn run_step(
		&mut self,
		step: Step,
		pacing: Pacing,
		model: &GraphModel,
		scene: &mut SceneRenderer,
	) -> f64 {
		match step {
			Step::RemoveEdges(keys) => {
				let mut removed = false;
				for key in keys {
					removed |= self.retire_edge(key, pacing, scene);
				}
				if removed { pacing.edge_out() } else { 0.0 }
			}
			Step::CreateVertex(index) => {
				if self.materialize_vertex(index, pacing, model, scene) {
					pacing.vertex_in()
				} else {
					0.0
				}
			}
			// the settle delay that follows runs alongside the scale-in
			Step::CreateVertices(indices) => {
				for index in indices {
					self.materialize_vertex(index, pacing, model, scene);
				}
				0.0
			}
			Step::UpdateVertex(index) => {
				if self.refresh_vertex(index, pacing, model, scene) {
					pacing.pulse()
				} else {
					0.0
				}
			}
			Step::RemoveVertex(index) => {
				if self.retire_vertex(index, pacing, model, scene) {
					pacing.vertex_out()
				} else {
					0.0
				}
			}
			Step::AddEdge(key) => {
				self.materialize_edge(key, pacing, model, scene);
				pacing.stagger()
			}
			Step::AddEdges(keys) => {
				let mut added = false;
				for key in keys {
					added |= self.materialize_edge(key, pacing, model, scene);
				}
				if added { pacing.edge_in() } else { 0.0 }
			}
			Step::Pause(ms) => ms,
		}
	}

	fn start(&mut self, transition: Transition, scene: &mut SceneRenderer) {
		let handle = transition.target.handle();
		self.transitions.retain(|t| t.target.handle() != handle);
		transition.apply(scene);
		self.transitions.push(transition);
	}

	fn materialize_vertex(
		&mut self,
		index: usize,
		pacing: Pacing,
		model: &GraphModel,
		scene: &mut SceneRenderer,
	) -> bool {
		let Some(vertex) = model.vertex(index).filter(|v| v.is_active()) else {
			trace!("skip create of vertex {index}: no longer active");
			return false;
		};
		if let Some(handle) = scene.vertex_handle(index) {
			trace!("skip create of vertex {index}: visual already bound");
			scene.update_vertex_visual(handle, vertex.value);
			return false;
		}
		let handle = scene.create_vertex_visual(index, vertex.position, vertex.value, vertex.label());
		self.start(
			Transition::new(TransitionKind::ScaleIn, Target::Vertex(handle), pacing.vertex_in()),
			scene,
		);
		self.structure_changed = true;
		true
	}

	fn refresh_vertex(
		&mut self,
		index: usize,
		pacing: Pacing,
		model: &GraphModel,
		scene: &mut SceneRenderer,
	) -> bool {
		let (Some(vertex), Some(handle)) = (
			model.vertex(index).filter(|v| v.is_active()),
			scene.vertex_handle(index),
		) else {
			trace!("skip update of vertex {index}");
			return false;
		};
		scene.update_vertex_visual(handle, vertex.value);
		self.start(
			Transition::new(TransitionKind::Pulse, Target::Vertex(handle), pacing.pulse()),
			scene,
		);
		true
	}

	fn retire_vertex(
		&mut self,
		index: usize,
		pacing: Pacing,
		model: &GraphModel,
		scene: &mut SceneRenderer,
	) -> bool {
		if model.is_active(index) {
			trace!("skip removal of vertex {index}: active again");
			return false;
		}
		// Edges bound after the plan was made still hang off this vertex.
		for key in scene.edge_keys_touching(index) {
			self.retire_edge(key, pacing, scene);
		}
		let Some(handle) = scene.detach_vertex(index) else {
			return false;
		};
		let from = scene.vertex(handle).map_or(1.0, |v| v.scale);
		self.start(
			Transition::new(
				TransitionKind::ScaleOut { from },
				Target::Vertex(handle),
				pacing.vertex_out(),
			),
			scene,
		);
		self.structure_changed = true;
		true
	}

	fn materialize_edge(
		&mut self,
		key: EdgeKey,
		pacing: Pacing,
		model: &GraphModel,
		scene: &mut SceneRenderer,
	) -> bool {
		let Some(category) = model.edge_category(key) else {
			trace!("skip edge {key:?}: no longer eligible");
			return false;
		};
		if let Some(handle) = scene.edge_handle(key) {
			trace!("skip edge {key:?}: already bound");
			scene.update_edge_visual(handle, category);
			return false;
		}
		let (Some(from), Some(to)) = (scene.vertex_handle(key.from()), scene.vertex_handle(key.to()))
		else {
			trace!("skip edge {key:?}: endpoint visual missing");
			return false;
		};
		let Some(handle) = scene.create_edge_visual(key, from, to, category) else {
			return false;
		};
		self.start(
			Transition::new(TransitionKind::FadeIn, Target::Edge(handle), pacing.edge_in()),
			scene,
		);
		self.structure_changed = true;
		true
	}

	fn retire_edge(&mut self, key: EdgeKey, pacing: Pacing, scene: &mut SceneRenderer) -> bool {
		let Some(handle) = scene.detach_edge(key) else {
			return false;
		};
		let from = scene.edge(handle).map_or(1.0, |e| e.opacity);
		self.start(
			Transition::new(
				TransitionKind::FadeOut { from },
				Target::Edge(handle),
				pacing.edge_out(),
			),
			scene,
		);
		self.structure_changed = true;
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::sudoku_graph::camera::{DEFAULT_DISTANCE, OrbitCamera};
	use crate::components::sudoku_graph::types::{GRID_SIZE, cell_index};

	const FRAME: f64 = 16.0;

	struct Rig {
		model: GraphModel,
		scene: SceneRenderer,
		scheduler: AnimationScheduler,
	}

	impl Rig {
		fn new(rows: &[Vec<i32>]) -> Self {
			let mut model = GraphModel::new();
			let plan = model.reset(rows).unwrap();
			let mut rig = Self {
				model,
				scene: SceneRenderer::new(OrbitCamera::new(800.0, 600.0, DEFAULT_DISTANCE, true)),
				scheduler: AnimationScheduler::default(),
			};
			rig.scheduler.schedule_full_build(&plan, 300, 800.0);
			rig.settle();
			rig
		}

		fn change(&mut self, row: usize, col: usize, value: u8) {
			let old = self.model.board().get(row, col);
			let delta = self.model.apply_cell_change(row, col, old, value).unwrap();
			self.scheduler.schedule_cell_update(&delta, 300);
		}

		fn frame(&mut self) {
			self.scheduler.tick(FRAME, &self.model, &mut self.scene);
		}

		fn settle(&mut self) {
			for _ in 0..10_000 {
				if self.scheduler.is_idle() {
					return;
				}
				self.frame();
			}
			panic!("scheduler never settled");
		}
	}

	fn scenario_rows() -> Vec<Vec<i32>> {
		let mut rows = vec![vec![0; GRID_SIZE]; GRID_SIZE];
		rows[0] = vec![5, 3, 0, 0, 7, 0, 0, 0, 0];
		rows
	}

	#[test]
	fn pacing_scales_with_speed() {
		let pacing = Pacing::new(300);
		assert_eq!(pacing.stagger(), 30.0);
		assert_eq!(pacing.pause(), 75.0);
		assert_eq!(Pacing::new(1).vertex_in(), 100.0);
	}

	#[test]
	fn transition_curves_hit_their_endpoints() {
		assert_eq!(TransitionKind::ScaleIn.value_at(0.0), 0.0);
		assert_eq!(TransitionKind::ScaleIn.value_at(1.0), 1.0);
		assert_eq!(TransitionKind::Pulse.value_at(0.0), PULSE_PEAK);
		assert!((TransitionKind::Pulse.value_at(1.0) - 1.0).abs() < 1e-12);
		assert_eq!(TransitionKind::FadeOut { from: 0.5 }.value_at(1.0), 0.0);
	}

	#[test]
	fn full_build_creates_vertices_before_edges() {
		let mut model = GraphModel::new();
		let plan = model.reset(&scenario_rows()).unwrap();
		let mut scene = SceneRenderer::new(OrbitCamera::new(800.0, 600.0, DEFAULT_DISTANCE, true));
		let mut scheduler = AnimationScheduler::default();
		scheduler.schedule_full_build(&plan, 300, 800.0);

		scheduler.tick(FRAME, &model, &mut scene);
		assert_eq!(scene.vertex_count(), 3);
		assert_eq!(scene.edge_count(), 0);
		assert!(scheduler.take_structure_changed());

		for _ in 0..40 {
			scheduler.tick(FRAME, &model, &mut scene);
		}
		assert_eq!(scene.edge_count(), 0, "edges wait for the settle delay");

		for _ in 0..30 {
			scheduler.tick(FRAME, &model, &mut scene);
		}
		assert_eq!(scene.edge_count(), 3);
	}

	#[test]
	fn settle_delay_counts_from_vertex_creation() {
		let mut model = GraphModel::new();
		let plan = model.reset(&scenario_rows()).unwrap();
		let mut scene = SceneRenderer::new(OrbitCamera::new(800.0, 600.0, DEFAULT_DISTANCE, true));
		let mut scheduler = AnimationScheduler::default();
		// a scale-in longer than the settle delay must not push the edges back
		scheduler.schedule_full_build(&plan, 1000, 800.0);

		scheduler.tick(FRAME, &model, &mut scene);
		assert_eq!(scene.vertex_count(), 3);
		for _ in 0..49 {
			scheduler.tick(FRAME, &model, &mut scene);
		}
		assert_eq!(scene.edge_count(), 0);

		// 50 frames of 16 ms after the vertices appeared
		scheduler.tick(FRAME, &model, &mut scene);
		assert_eq!(scene.edge_count(), 3);
		assert!(
			scheduler
				.transitions()
				.iter()
				.any(|t| matches!(t.kind, TransitionKind::ScaleIn)),
			"edges start while vertices are still scaling in"
		);
	}

	#[test]
	fn cell_update_orders_vertex_pause_then_staggered_edges() {
		let mut rig = Rig::new(&scenario_rows());
		rig.change(0, 2, 4);

		rig.frame();
		let v = cell_index(0, 2);
		let handle = rig.scene.vertex_handle(v).unwrap();
		assert!(rig.scene.edge_keys_touching(v).is_empty());

		// vertex scale-in (300) + pause (75)
		let mut frames = 1;
		while rig.scene.edge_keys_touching(v).is_empty() {
			rig.frame();
			frames += 1;
		}
		assert!(frames as f64 * FRAME >= 375.0);
		assert_eq!(rig.scene.vertex(handle).map(|v| v.scale), Some(1.0));
		assert_eq!(rig.scene.edge_keys_touching(v).len(), 1);

		rig.frame();
		rig.frame();
		assert_eq!(rig.scene.edge_keys_touching(v).len(), 2);
		rig.settle();
		assert_eq!(rig.scene.edge_keys_touching(v).len(), 3);
	}

	#[test]
	fn removal_fades_edges_before_shrinking_vertex() {
		let mut rig = Rig::new(&scenario_rows());
		let handle = rig.scene.vertex_handle(0).unwrap();
		rig.change(0, 0, 0);

		rig.frame();
		assert!(rig.scene.edge_keys_touching(0).is_empty());
		assert_eq!(rig.scene.vertex_handle(0), Some(handle), "vertex waits for edge fade");
		assert!(rig.scheduler.transitions().iter().all(|t| matches!(t.target, Target::Edge(_))));

		rig.settle();
		assert_eq!(rig.scene.vertex_handle(0), None);
		assert!(rig.scene.vertex(handle).is_none());
		assert_eq!(rig.scene.object_count(), 2 + 1);
	}

	#[test]
	fn update_pulses_and_recolors_edges() {
		let mut rig = Rig::new(&scenario_rows());
		let handle = rig.scene.vertex_handle(1).unwrap();
		rig.change(0, 1, 5);
		rig.frame();
		assert_eq!(rig.scene.vertex(handle).map(|v| v.value), Some(3), "edges fade first");
		while rig.scene.vertex(handle).map(|v| v.value) != Some(5) {
			rig.frame();
		}
		assert!(rig.scene.vertex(handle).is_some_and(|v| v.scale > 1.0));
		assert!(rig.scene.edge_keys_touching(1).is_empty());

		rig.settle();
		let edge = rig.scene.edge_handle(EdgeKey::new(0, 1)).unwrap();
		assert_eq!(
			rig.scene.edge(edge).map(|e| e.category),
			Some(crate::components::sudoku_graph::types::EdgeCategory::SameValue)
		);
		assert_eq!(rig.scene.vertex(handle).map(|v| v.scale), Some(1.0));
	}

	#[test]
	fn stale_edge_plans_are_revalidated() {
		let mut rig = Rig::new(&scenario_rows());
		rig.change(1, 1, 3);
		rig.change(1, 1, 0);
		rig.settle();

		let v = cell_index(1, 1);
		assert_eq!(rig.scene.vertex_handle(v), None);
		assert!(rig.scene.edge_keys_touching(v).is_empty());
		assert_eq!(rig.scene.bound_edge_keys().len(), 3);
		assert_eq!(rig.scene.object_count(), 3 + 3);
	}

	#[test]
	fn clear_then_recreate_never_duplicates() {
		let mut rig = Rig::new(&scenario_rows());
		for _ in 0..3 {
			rig.change(0, 2, 4);
			rig.frame();
			rig.change(0, 2, 0);
			rig.frame();
		}
		rig.change(0, 2, 6);
		for _ in 0..5 {
			rig.frame();
			rig.change(0, 3, 8);
			rig.frame();
			rig.change(0, 3, 0);
		}
		rig.change(0, 3, 8);
		rig.settle();

		let keys: Vec<EdgeKey> = rig.model.edges().iter().map(|(k, _)| *k).collect();
		assert_eq!(rig.scene.bound_edge_keys(), keys);
		assert_eq!(rig.scene.vertex_count(), rig.model.active_count());
		assert_eq!(
			rig.scene.object_count(),
			rig.model.active_count() + rig.model.edge_count()
		);
	}

	#[test]
	fn cancel_all_finishes_everything_immediately() {
		let mut rig = Rig::new(&scenario_rows());
		rig.change(0, 0, 0);
		rig.change(0, 2, 9);
		rig.frame();
		assert!(!rig.scheduler.is_idle());

		rig.scheduler.cancel_all(&mut rig.scene);
		assert!(rig.scheduler.is_idle());
		// detached visuals were destroyed by their completion effect
		assert_eq!(
			rig.scene.object_count(),
			rig.scene.vertex_count() + rig.scene.edge_count()
		);
		assert!(rig.scene.edge_handle(EdgeKey::new(0, 1)).is_none());
		assert!(rig.scene.vertex_handle(cell_index(0, 2)).is_some());
	}
}
