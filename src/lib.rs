//! Leptos client-side app that animates the constraint graph of a sudoku grid.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
mod components;
mod pages;

// Top-Level pages
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

pub use crate::components::sudoku_graph::{
	AnimationScheduler, Board, BuildPlan, EdgeCategory, EdgeKey, GRID_SIZE, GraphModel, OrbitCamera,
	SceneRenderer, SharedVisualizer, StructuralDelta, SudokuGraphCanvas, VERTEX_COUNT,
	ValidationError, Vertex, VertexOp, VisualizerConfig, VisualizerController, VisualizerError,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the visualizer page and handles 404's
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />

		<Title text="Sudoku Constraint Graph" />

		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
