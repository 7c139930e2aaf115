use super::camera::DEFAULT_DISTANCE;

pub const MIN_SPEED_MS: u32 = 100;
pub const MAX_SPEED_MS: u32 = 1000;
pub const DEFAULT_SPEED_MS: u32 = 300;
pub const DEFAULT_SETTLE_DELAY_MS: f64 = 800.0;

/// Tunables for a visualizer instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualizerConfig {
	/// Base duration of one transition, in milliseconds.
	pub animation_speed_ms: u32,
	/// Gap between vertex creation and edge creation in a full build.
	pub settle_delay_ms: f64,
	pub auto_rotate: bool,
	pub camera_distance: f64,
}

impl Default for VisualizerConfig {
	fn default() -> Self {
		Self {
			animation_speed_ms: DEFAULT_SPEED_MS,
			settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
			auto_rotate: true,
			camera_distance: DEFAULT_DISTANCE,
		}
	}
}

impl VisualizerConfig {
	pub fn with_animation_speed(mut self, ms: u32) -> Self {
		self.animation_speed_ms = clamp_speed(ms);
		self
	}
}

pub fn clamp_speed(ms: u32) -> u32 {
	ms.clamp(MIN_SPEED_MS, MAX_SPEED_MS)
}
