mod camera;
mod component;
mod config;
mod controller;
mod error;
mod model;
mod render;
mod scene;
mod scheduler;
mod types;

pub use camera::OrbitCamera;
pub use component::{SharedVisualizer, SudokuGraphCanvas};
pub use config::{DEFAULT_SPEED_MS, MAX_SPEED_MS, MIN_SPEED_MS, VisualizerConfig};
pub use controller::VisualizerController;
pub use error::{ValidationError, VisualizerError};
pub use model::{BuildPlan, GraphModel, StructuralDelta, Vertex, VertexOp};
pub use scene::SceneRenderer;
pub use scheduler::AnimationScheduler;
pub use types::{Board, EdgeCategory, EdgeKey, GRID_SIZE, VERTEX_COUNT};
