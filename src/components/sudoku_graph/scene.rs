//! Visual objects behind opaque handles, plus the camera and the per-frame tick.
//!
//! The scene knows positions, digits and edge styles, never grid rules. Vertex
//! slots and edge keys map to the live handle for that slot/pair; a detached
//! object keeps animating (fading, shrinking) until it is destroyed.

use std::collections::HashMap;

use glam::DVec3;
use log::warn;

use super::camera::OrbitCamera;
use super::model::GraphModel;
use super::scheduler::AnimationScheduler;
use super::types::{EdgeCategory, EdgeKey};

// 0.01 / 0.005 rad per frame at 60 fps
const SPIN_Y_RATE: f64 = 0.01 / 16.0;
const SPIN_X_RATE: f64 = 0.005 / 16.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualHandle(u32);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
	pub direction: DVec3,
	pub ambient: f64,
	pub diffuse: f64,
}

impl Default for Light {
	fn default() -> Self {
		Self {
			direction: DVec3::new(50.0, 50.0, 50.0).normalize(),
			ambient: 0.8 * 0.25,
			diffuse: 0.6,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct VertexVisual {
	pub position: DVec3,
	pub value: u8,
	pub label: String,
	pub scale: f64,
	pub spin: DVec3,
	pub attached: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeVisual {
	pub from: DVec3,
	pub to: DVec3,
	pub category: EdgeCategory,
	pub opacity: f64,
	pub attached: bool,
}

pub struct SceneRenderer {
	camera: OrbitCamera,
	light: Light,
	next_handle: u32,
	vertices: HashMap<VisualHandle, VertexVisual>,
	edges: HashMap<VisualHandle, EdgeVisual>,
	vertex_slots: HashMap<usize, VisualHandle>,
	edge_slots: HashMap<EdgeKey, VisualHandle>,
	elapsed_ms: f64,
}

impl SceneRenderer {
	pub fn new(camera: OrbitCamera) -> Self {
		Self {
			camera,
			light: Light::default(),
			next_handle: 0,
			vertices: HashMap::new(),
			edges: HashMap::new(),
			vertex_slots: HashMap::new(),
			edge_slots: HashMap::new(),
			elapsed_ms: 0.0,
		}
	}

	fn allocate(&mut self) -> VisualHandle {
		self.next_handle = self.next_handle.wrapping_add(1);
		VisualHandle(self.next_handle)
	}

	/// Creates a vertex visual at scale 0 and binds it to `slot`.
	pub fn create_vertex_visual(
		&mut self,
		slot: usize,
		position: DVec3,
		value: u8,
		label: String,
	) -> VisualHandle {
		let handle = self.allocate();
		self.vertices.insert(
			handle,
			VertexVisual {
				position,
				value,
				label,
				scale: 0.0,
				spin: DVec3::ZERO,
				attached: true,
			},
		);
		if let Some(previous) = self.vertex_slots.insert(slot, handle) {
			warn!("vertex slot {slot} was still bound; dropping its visual");
			self.vertices.remove(&previous);
		}
		handle
	}

	pub fn update_vertex_visual(&mut self, handle: VisualHandle, value: u8) {
		if let Some(vertex) = self.vertices.get_mut(&handle) {
			vertex.value = value;
		}
	}

	pub fn destroy_vertex_visual(&mut self, handle: VisualHandle) {
		if self.vertices.remove(&handle).is_some() {
			self.vertex_slots.retain(|_, h| *h != handle);
		}
	}

	/// Creates an edge visual at opacity 0 between two vertex visuals.
	pub fn create_edge_visual(
		&mut self,
		key: EdgeKey,
		from: VisualHandle,
		to: VisualHandle,
		category: EdgeCategory,
	) -> Option<VisualHandle> {
		let from = self.vertices.get(&from)?.position;
		let to = self.vertices.get(&to)?.position;
		let handle = self.allocate();
		self.edges.insert(
			handle,
			EdgeVisual {
				from,
				to,
				category,
				opacity: 0.0,
				attached: true,
			},
		);
		if let Some(previous) = self.edge_slots.insert(key, handle) {
			warn!("edge {key:?} was still bound; dropping its visual");
			self.edges.remove(&previous);
		}
		Some(handle)
	}

	pub fn update_edge_visual(&mut self, handle: VisualHandle, category: EdgeCategory) {
		if let Some(edge) = self.edges.get_mut(&handle) {
			edge.category = category;
		}
	}

	pub fn destroy_edge_visual(&mut self, handle: VisualHandle) {
		if self.edges.remove(&handle).is_some() {
			self.edge_slots.retain(|_, h| *h != handle);
		}
	}

	/// Unbinds the slot's visual so it can animate out; the object lives until destroyed.
	pub fn detach_vertex(&mut self, slot: usize) -> Option<VisualHandle> {
		let handle = self.vertex_slots.remove(&slot)?;
		if let Some(vertex) = self.vertices.get_mut(&handle) {
			vertex.attached = false;
		}
		Some(handle)
	}

	pub fn detach_edge(&mut self, key: EdgeKey) -> Option<VisualHandle> {
		let handle = self.edge_slots.remove(&key)?;
		if let Some(edge) = self.edges.get_mut(&handle) {
			edge.attached = false;
		}
		Some(handle)
	}

	pub fn vertex_handle(&self, slot: usize) -> Option<VisualHandle> {
		self.vertex_slots.get(&slot).copied()
	}

	pub fn edge_handle(&self, key: EdgeKey) -> Option<VisualHandle> {
		self.edge_slots.get(&key).copied()
	}

	/// Bound edges with `slot` as an endpoint.
	pub fn edge_keys_touching(&self, slot: usize) -> Vec<EdgeKey> {
		let mut keys: Vec<EdgeKey> = self
			.edge_slots
			.keys()
			.filter(|key| key.touches(slot))
			.copied()
			.collect();
		keys.sort();
		keys
	}

	pub fn bound_edge_keys(&self) -> Vec<EdgeKey> {
		let mut keys: Vec<EdgeKey> = self.edge_slots.keys().copied().collect();
		keys.sort();
		keys
	}

	pub fn vertex(&self, handle: VisualHandle) -> Option<&VertexVisual> {
		self.vertices.get(&handle)
	}

	pub fn edge(&self, handle: VisualHandle) -> Option<&EdgeVisual> {
		self.edges.get(&handle)
	}

	pub fn set_vertex_scale(&mut self, handle: VisualHandle, scale: f64) {
		if let Some(vertex) = self.vertices.get_mut(&handle) {
			vertex.scale = scale;
		}
	}

	pub fn set_edge_opacity(&mut self, handle: VisualHandle, opacity: f64) {
		if let Some(edge) = self.edges.get_mut(&handle) {
			edge.opacity = opacity;
		}
	}

	pub fn vertex_visuals(&self) -> impl Iterator<Item = &VertexVisual> {
		self.vertices.values()
	}

	pub fn edge_visuals(&self) -> impl Iterator<Item = &EdgeVisual> {
		self.edges.values()
	}

	/// Bound vertex visuals.
	pub fn vertex_count(&self) -> usize {
		self.vertex_slots.len()
	}

	/// Bound edge visuals.
	pub fn edge_count(&self) -> usize {
		self.edge_slots.len()
	}

	/// Every live object, including detached ones still animating out.
	pub fn object_count(&self) -> usize {
		self.vertices.len() + self.edges.len()
	}

	pub fn clear(&mut self) {
		self.vertices.clear();
		self.edges.clear();
		self.vertex_slots.clear();
		self.edge_slots.clear();
	}

	pub fn camera(&self) -> &OrbitCamera {
		&self.camera
	}

	pub fn camera_mut(&mut self) -> &mut OrbitCamera {
		&mut self.camera
	}

	pub fn light(&self) -> &Light {
		&self.light
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.camera.resize(width, height);
	}

	pub fn elapsed_ms(&self) -> f64 {
		self.elapsed_ms
	}

	/// One display frame: orbit the camera, step animations, then idle motion.
	pub fn tick(&mut self, dt_ms: f64, scheduler: &mut AnimationScheduler, model: &GraphModel) {
		self.elapsed_ms += dt_ms;
		self.camera.advance(dt_ms);
		scheduler.tick(dt_ms, model, self);
		for vertex in self.vertices.values_mut() {
			vertex.spin.y += SPIN_Y_RATE * dt_ms;
			vertex.spin.x += SPIN_X_RATE * dt_ms;
		}
	}
}
