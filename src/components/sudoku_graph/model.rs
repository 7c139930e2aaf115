//! Logical vertex/edge bookkeeping for the grid. No rendering concerns live here.

use std::collections::HashMap;

use glam::DVec3;
use log::debug;

use super::error::ValidationError;
use super::types::{
	BOX_SIZE, Board, EdgeCategory, EdgeKey, GRID_SIZE, VERTEX_COUNT, box_of, cell_index,
};

const SPACING: f64 = 10.0;
const PLANE_OFFSET: f64 = 40.0;
const BOX_DEPTH: f64 = 5.0;
const DEPTH_OFFSET: f64 = -20.0;

/// Lattice position of a cell; same-box cells share a depth layer.
pub fn vertex_position(row: usize, col: usize) -> DVec3 {
	DVec3::new(
		col as f64 * SPACING - PLANE_OFFSET,
		PLANE_OFFSET - row as f64 * SPACING,
		box_of(row, col) as f64 * BOX_DEPTH + DEPTH_OFFSET,
	)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
	pub row: usize,
	pub col: usize,
	pub position: DVec3,
	pub value: u8,
}

impl Vertex {
	pub fn index(&self) -> usize {
		cell_index(self.row, self.col)
	}

	pub fn box_index(&self) -> usize {
		box_of(self.row, self.col)
	}

	pub fn is_active(&self) -> bool {
		self.value != 0
	}

	/// 1-based `(row,col)` caption.
	pub fn label(&self) -> String {
		format!("({},{})", self.row + 1, self.col + 1)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexOp {
	None,
	Create,
	Update,
	Remove,
}

/// Changes required to move the visuals from one grid state to the next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructuralDelta {
	pub vertex: usize,
	pub vertex_op: VertexOp,
	pub edges_to_remove: Vec<EdgeKey>,
	pub edges_to_add: Vec<(EdgeKey, EdgeCategory)>,
}

impl StructuralDelta {
	pub fn is_empty(&self) -> bool {
		self.vertex_op == VertexOp::None
			&& self.edges_to_remove.is_empty()
			&& self.edges_to_add.is_empty()
	}
}

/// Full target set for a rebuild.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildPlan {
	pub vertices: Vec<usize>,
	pub edges: Vec<(EdgeKey, EdgeCategory)>,
}

pub struct GraphModel {
	board: Board,
	vertices: Vec<Vertex>,
	edges: HashMap<EdgeKey, EdgeCategory>,
}

impl Default for GraphModel {
	fn default() -> Self {
		Self::new()
	}
}

impl GraphModel {
	pub fn new() -> Self {
		let vertices = (0..VERTEX_COUNT)
			.map(|i| {
				let (row, col) = (i / GRID_SIZE, i % GRID_SIZE);
				Vertex {
					row,
					col,
					position: vertex_position(row, col),
					value: 0,
				}
			})
			.collect();
		Self {
			board: Board::default(),
			vertices,
			edges: HashMap::new(),
		}
	}

	/// Validates `rows` and replaces the whole logical state with it.
	pub fn reset<R: AsRef<[i32]>>(&mut self, rows: &[R]) -> Result<BuildPlan, ValidationError> {
		let board = Board::from_rows(rows)?;
		Ok(self.load(board))
	}

	pub fn load(&mut self, board: Board) -> BuildPlan {
		self.board = board;
		for vertex in &mut self.vertices {
			vertex.position = vertex_position(vertex.row, vertex.col);
			vertex.value = board.get(vertex.row, vertex.col);
		}

		self.edges.clear();
		let mut plan = BuildPlan::default();
		for index in 0..VERTEX_COUNT {
			if !self.vertices[index].is_active() {
				continue;
			}
			plan.vertices.push(index);
			for other in self.connections_of_index(index) {
				if other < index {
					continue;
				}
				let key = EdgeKey::new(index, other);
				if let Some(category) = self.classify(index, other) {
					self.edges.insert(key, category);
					plan.edges.push((key, category));
				}
			}
		}
		plan.edges.sort_by_key(|(key, _)| *key);
		plan
	}

	pub fn clear(&mut self) {
		self.load(Board::default());
	}

	/// Active row-, column- and box-mates of a cell, each listed once.
	pub fn connections_of(&self, row: usize, col: usize) -> Vec<usize> {
		if row >= GRID_SIZE || col >= GRID_SIZE {
			return Vec::new();
		}
		let origin = cell_index(row, col);
		if !self.vertices[origin].is_active() {
			return Vec::new();
		}

		let (box_row, box_col) = (row / BOX_SIZE * BOX_SIZE, col / BOX_SIZE * BOX_SIZE);
		let row_mates = (0..GRID_SIZE).map(|c| cell_index(row, c));
		let col_mates = (0..GRID_SIZE).map(|r| cell_index(r, col));
		let box_mates = (0..BOX_SIZE * BOX_SIZE)
			.map(|k| cell_index(box_row + k / BOX_SIZE, box_col + k % BOX_SIZE));

		let mut seen = [false; VERTEX_COUNT];
		seen[origin] = true;
		let mut connections = Vec::with_capacity(20);
		for index in row_mates.chain(col_mates).chain(box_mates) {
			if !seen[index] && self.vertices[index].is_active() {
				seen[index] = true;
				connections.push(index);
			}
		}
		connections
	}

	pub fn connections_of_index(&self, index: usize) -> Vec<usize> {
		if index >= VERTEX_COUNT {
			return Vec::new();
		}
		self.connections_of(index / GRID_SIZE, index % GRID_SIZE)
	}

	/// Category of an eligible pair; `None` when the pair shares no row, column or box.
	pub fn classify(&self, a: usize, b: usize) -> Option<EdgeCategory> {
		let (va, vb) = (self.vertices.get(a)?, self.vertices.get(b)?);
		if a == b {
			return None;
		}
		let (same_row, same_col, same_box) = (
			va.row == vb.row,
			va.col == vb.col,
			va.box_index() == vb.box_index(),
		);
		if !(same_row || same_col || same_box) {
			return None;
		}
		Some(if va.value != 0 && va.value == vb.value {
			EdgeCategory::SameValue
		} else if same_row {
			EdgeCategory::SameRow
		} else if same_col {
			EdgeCategory::SameCol
		} else {
			EdgeCategory::SameBox
		})
	}

	/// Commits a cell edit to the logical model and returns the visual work it implies.
	///
	/// Returns `None` for addresses or values outside the grid. The model's own
	/// value for the cell is authoritative; `old_value` is only cross-checked.
	pub fn apply_cell_change(
		&mut self,
		row: usize,
		col: usize,
		old_value: u8,
		new_value: u8,
	) -> Option<StructuralDelta> {
		if row >= GRID_SIZE || col >= GRID_SIZE || new_value > 9 {
			return None;
		}
		let index = cell_index(row, col);
		let current = self.vertices[index].value;
		if current != old_value {
			debug!(
				"cell ({row}, {col}) reported old value {old_value}, model holds {current}"
			);
		}

		let vertex_op = match (current != 0, new_value != 0) {
			(false, false) => VertexOp::None,
			(false, true) => VertexOp::Create,
			(true, false) => VertexOp::Remove,
			(true, true) if current == new_value => VertexOp::None,
			(true, true) => VertexOp::Update,
		};
		let mut delta = StructuralDelta {
			vertex: index,
			vertex_op,
			edges_to_remove: Vec::new(),
			edges_to_add: Vec::new(),
		};
		if vertex_op == VertexOp::None {
			return Some(delta);
		}

		delta.edges_to_remove = self
			.connections_of(row, col)
			.into_iter()
			.map(|other| EdgeKey::new(index, other))
			.filter(|key| self.edges.remove(key).is_some())
			.collect();

		self.board.set(row, col, new_value);
		self.vertices[index].value = new_value;

		for other in self.connections_of(row, col) {
			let key = EdgeKey::new(index, other);
			if self.edges.contains_key(&key) {
				continue;
			}
			if let Some(category) = self.classify(index, other) {
				self.edges.insert(key, category);
				delta.edges_to_add.push((key, category));
			}
		}
		Some(delta)
	}

	pub fn vertex(&self, index: usize) -> Option<&Vertex> {
		self.vertices.get(index)
	}

	pub fn vertices(&self) -> &[Vertex] {
		&self.vertices
	}

	pub fn is_active(&self, index: usize) -> bool {
		self.vertex(index).is_some_and(Vertex::is_active)
	}

	pub fn edge_category(&self, key: EdgeKey) -> Option<EdgeCategory> {
		self.edges.get(&key).copied()
	}

	/// Logical edges, sorted by key.
	pub fn edges(&self) -> Vec<(EdgeKey, EdgeCategory)> {
		let mut edges: Vec<_> = self.edges.iter().map(|(k, c)| (*k, *c)).collect();
		edges.sort_by_key(|(key, _)| *key);
		edges
	}

	pub fn active_count(&self) -> usize {
		self.vertices.iter().filter(|v| v.is_active()).count()
	}

	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	pub fn board(&self) -> &Board {
		&self.board
	}
}
