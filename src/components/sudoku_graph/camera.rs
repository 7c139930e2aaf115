use std::f64::consts::TAU;

use glam::{DMat4, DVec3};

pub const MIN_DISTANCE: f64 = 60.0;
pub const MAX_DISTANCE: f64 = 200.0;
pub const DEFAULT_DISTANCE: f64 = 120.0;

const FOV_Y_DEG: f64 = 50.0;
const NEAR: f64 = 0.1;
const FAR: f64 = 2000.0;
// 0.005 rad per frame at 60 fps
const AUTO_ORBIT_RATE: f64 = 0.005 / 16.0;
// rad per ms for a drag spanning the whole surface
const DRAG_RATE: f64 = 0.004;
const WHEEL_FACTOR: f64 = 0.1;
const MAX_PITCH: f64 = 1.2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrbitMode {
	Auto,
	Drag,
	Still,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct DragState {
	anchor_x: f64,
	anchor_y: f64,
	x: f64,
	y: f64,
}

/// A projected point in surface pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
	pub x: f64,
	pub y: f64,
	pub depth: f64,
	/// Surface pixels per world unit at this depth.
	pub scale: f64,
}

/// Camera orbiting the origin, looking at it.
#[derive(Clone, Debug)]
pub struct OrbitCamera {
	yaw: f64,
	pitch: f64,
	distance: f64,
	auto_rotate: bool,
	drag: Option<DragState>,
	width: f64,
	height: f64,
}

impl OrbitCamera {
	pub fn new(width: f64, height: f64, distance: f64, auto_rotate: bool) -> Self {
		let mut camera = Self {
			yaw: 0.0,
			pitch: 0.0,
			distance: distance.clamp(MIN_DISTANCE, MAX_DISTANCE),
			auto_rotate,
			drag: None,
			width: 1.0,
			height: 1.0,
		};
		camera.resize(width, height);
		camera
	}

	pub fn mode(&self) -> OrbitMode {
		match (self.drag.is_some(), self.auto_rotate) {
			(true, _) => OrbitMode::Drag,
			(false, true) => OrbitMode::Auto,
			(false, false) => OrbitMode::Still,
		}
	}

	pub fn auto_rotate(&self) -> bool {
		self.auto_rotate
	}

	pub fn toggle_auto_rotate(&mut self) -> bool {
		self.auto_rotate = !self.auto_rotate;
		self.auto_rotate
	}

	pub fn distance(&self) -> f64 {
		self.distance
	}

	pub fn yaw(&self) -> f64 {
		self.yaw
	}

	pub fn pitch(&self) -> f64 {
		self.pitch
	}

	/// Starts a drag at surface pixel `(x, y)`. Auto-orbit stays off until toggled back.
	pub fn pointer_down(&mut self, x: f64, y: f64) {
		let (nx, ny) = self.to_ndc(x, y);
		self.auto_rotate = false;
		self.drag = Some(DragState {
			anchor_x: nx,
			anchor_y: ny,
			x: nx,
			y: ny,
		});
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		let (nx, ny) = self.to_ndc(x, y);
		if let Some(drag) = self.drag.as_mut() {
			drag.x = nx;
			drag.y = ny;
		}
	}

	/// Ends a drag; also used for pointer-leave.
	pub fn pointer_up(&mut self) {
		self.drag = None;
	}

	pub fn wheel(&mut self, delta_y: f64) {
		self.distance = (self.distance + delta_y * WHEEL_FACTOR).clamp(MIN_DISTANCE, MAX_DISTANCE);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width.max(1.0);
		self.height = height.max(1.0);
	}

	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	pub fn aspect(&self) -> f64 {
		self.width / self.height
	}

	pub fn advance(&mut self, dt_ms: f64) {
		match self.mode() {
			OrbitMode::Drag => {
				if let Some(drag) = self.drag {
					self.yaw += (drag.x - drag.anchor_x) * DRAG_RATE * dt_ms;
					self.pitch = (self.pitch + (drag.y - drag.anchor_y) * DRAG_RATE * dt_ms)
						.clamp(-MAX_PITCH, MAX_PITCH);
				}
			}
			OrbitMode::Auto => self.yaw += AUTO_ORBIT_RATE * dt_ms,
			OrbitMode::Still => {}
		}
		self.yaw = self.yaw.rem_euclid(TAU);
	}

	pub fn position(&self) -> DVec3 {
		let (sy, cy) = self.yaw.sin_cos();
		let (sp, cp) = self.pitch.sin_cos();
		DVec3::new(sy * cp, sp, cy * cp) * self.distance
	}

	pub fn view_matrix(&self) -> DMat4 {
		DMat4::look_at_rh(self.position(), DVec3::ZERO, DVec3::Y)
	}

	pub fn projection_matrix(&self) -> DMat4 {
		DMat4::perspective_rh(FOV_Y_DEG.to_radians(), self.aspect(), NEAR, FAR)
	}

	/// Projects a world point to surface pixels; `None` when it is behind the camera.
	pub fn project(&self, point: DVec3) -> Option<ScreenPoint> {
		let view = self.view_matrix().transform_point3(point);
		let depth = -view.z;
		if depth <= NEAR {
			return None;
		}
		let ndc = self.projection_matrix().project_point3(view);
		Some(ScreenPoint {
			x: (ndc.x + 1.0) * 0.5 * self.width,
			y: (1.0 - ndc.y) * 0.5 * self.height,
			depth,
			scale: self.height * 0.5 / ((FOV_Y_DEG.to_radians() * 0.5).tan() * depth),
		})
	}

	fn to_ndc(&self, x: f64, y: f64) -> (f64, f64) {
		(x / self.width * 2.0 - 1.0, 1.0 - y / self.height * 2.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn wheel_distance_is_clamped() {
		let mut camera = OrbitCamera::new(800.0, 600.0, DEFAULT_DISTANCE, true);
		camera.wheel(10_000.0);
		assert_eq!(camera.distance(), MAX_DISTANCE);
		camera.wheel(-10_000.0);
		assert_eq!(camera.distance(), MIN_DISTANCE);
		camera.wheel(100.0);
		assert!((camera.distance() - 70.0).abs() < 1e-9);
	}

	#[test]
	fn auto_orbit_advances_yaw_only() {
		let mut camera = OrbitCamera::new(800.0, 600.0, DEFAULT_DISTANCE, true);
		camera.advance(16.0);
		assert!((camera.yaw() - 0.005).abs() < 1e-9);
		assert_eq!(camera.pitch(), 0.0);
		assert!((camera.position().length() - DEFAULT_DISTANCE).abs() < 1e-9);
	}

	#[test]
	fn pointer_down_disables_auto_orbit_until_toggled() {
		let mut camera = OrbitCamera::new(800.0, 600.0, DEFAULT_DISTANCE, true);
		camera.pointer_down(400.0, 300.0);
		assert_eq!(camera.mode(), OrbitMode::Drag);
		camera.pointer_up();
		assert_eq!(camera.mode(), OrbitMode::Still);

		let yaw = camera.yaw();
		camera.advance(100.0);
		assert_eq!(camera.yaw(), yaw);

		assert!(camera.toggle_auto_rotate());
		assert_eq!(camera.mode(), OrbitMode::Auto);
	}

	#[test]
	fn drag_velocity_follows_drag_delta() {
		let mut camera = OrbitCamera::new(800.0, 600.0, DEFAULT_DISTANCE, false);
		camera.pointer_down(400.0, 300.0);
		camera.advance(16.0);
		assert_eq!(camera.yaw(), 0.0);

		camera.pointer_move(600.0, 300.0);
		camera.advance(10.0);
		let first = camera.yaw();
		camera.advance(10.0);
		assert!(first > 0.0);
		assert!((camera.yaw() - 2.0 * first).abs() < 1e-9);

		camera.pointer_move(400.0, 0.0);
		for _ in 0..1_000 {
			camera.advance(16.0);
		}
		assert_eq!(camera.pitch(), MAX_PITCH);
	}

	#[test]
	fn origin_projects_to_surface_center() {
		let camera = OrbitCamera::new(800.0, 600.0, DEFAULT_DISTANCE, true);
		let point = camera.project(DVec3::ZERO).unwrap();
		assert!((point.x - 400.0).abs() < 1e-6);
		assert!((point.y - 300.0).abs() < 1e-6);
		assert!((point.depth - DEFAULT_DISTANCE).abs() < 1e-6);

		let above = camera.project(DVec3::new(0.0, 10.0, 0.0)).unwrap();
		assert!(above.y < point.y);
		assert!(camera.project(DVec3::new(0.0, 0.0, 150.0)).is_none());
	}

	#[test]
	fn resize_is_idempotent() {
		let mut camera = OrbitCamera::new(800.0, 600.0, DEFAULT_DISTANCE, true);
		camera.resize(1024.0, 512.0);
		let once = camera.projection_matrix();
		camera.resize(1024.0, 512.0);
		assert_eq!(camera.projection_matrix(), once);
		assert_eq!(camera.aspect(), 2.0);
		camera.resize(0.0, 0.0);
		assert_eq!(camera.size(), (1.0, 1.0));
	}
}
