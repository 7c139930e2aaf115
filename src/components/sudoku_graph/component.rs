use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, MouseEvent, PointerEvent, WheelEvent, Window};

use super::config::VisualizerConfig;
use super::controller::VisualizerController;
use super::render;

const FRAME_MS: f64 = 1000.0 / 60.0;
const MAX_FRAME_MS: f64 = 100.0;

/// The controller, once the canvas surface has been acquired.
pub type SharedVisualizer = Rc<RefCell<Option<VisualizerController>>>;

fn surface_size(
	window: &Window,
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> (f64, f64) {
	if fullscreen {
		return (
			window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0),
			window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0),
		);
	}
	let parent = canvas.parent_element();
	(
		width.unwrap_or_else(|| {
			parent
				.as_ref()
				.map(|p| p.client_width() as f64)
				.filter(|w| *w > 0.0)
				.unwrap_or(800.0)
		}),
		height.unwrap_or_else(|| {
			parent
				.as_ref()
				.map(|p| p.client_height() as f64)
				.filter(|h| *h > 0.0)
				.unwrap_or(600.0)
		}),
	)
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?;
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Canvas showing the live constraint graph of `board`.
///
/// The first board is built in full; later board values are diffed cell by
/// cell and forwarded as incremental changes.
#[component]
pub fn SudokuGraphCanvas(
	visualizer: SharedVisualizer,
	#[prop(into)] board: Signal<Vec<Vec<i32>>>,
	#[prop(optional)] on_stats: Option<Callback<(usize, usize)>>,
	#[prop(default = VisualizerConfig::default())] config: VisualizerConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (viz_init, animate_init, resize_cb_init) =
		(visualizer.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if viz_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas;
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = surface_size(&window, &canvas, fullscreen, width, height);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx = match render::acquire_context(&canvas) {
			Ok(ctx) => ctx,
			Err(err) => {
				error!("{err}");
				return;
			}
		};

		let mut controller = VisualizerController::new(w, h, config);
		if let Some(on_stats) = on_stats {
			controller.on_stats_changed(move |vertices, edges| on_stats.run((vertices, edges)));
		}
		if let Err(err) = controller.initialize(&board.get_untracked()) {
			warn!("initial grid rejected: {err}");
		}
		*viz_init.borrow_mut() = Some(controller);
		info!("visualizer attached ({w}x{h})");

		let (viz_resize, canvas_resize) = (viz_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			let (nw, nh) = surface_size(&win, &canvas_resize, fullscreen, width, height);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut viz) = *viz_resize.borrow_mut() {
				viz.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (viz_anim, animate_inner) = (viz_init.clone(), animate_init.clone());
		let last_frame = Cell::new(None::<f64>);
		*animate_init.borrow_mut() = Some(Closure::new(move |now: f64| {
			let dt = last_frame
				.replace(Some(now))
				.map_or(FRAME_MS, |prev| (now - prev).clamp(0.0, MAX_FRAME_MS));
			if let Some(ref mut viz) = *viz_anim.borrow_mut() {
				viz.frame(dt);
				render::render(viz.scene(), &ctx);
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let viz_board = visualizer.clone();
	Effect::new(move |previous: Option<Vec<Vec<i32>>>| {
		let next = board.get();
		if let (Some(previous), Some(viz)) = (previous, viz_board.borrow_mut().as_mut()) {
			for (row, (old_row, new_row)) in previous.iter().zip(&next).enumerate() {
				for (col, (&old, &new)) in old_row.iter().zip(new_row).enumerate() {
					if old != new {
						viz.cell_changed(row as i32, col as i32, old, new);
					}
				}
			}
		}
		next
	});

	let viz_pd = visualizer.clone();
	let on_pointerdown = move |ev: PointerEvent| {
		if let (Some((x, y)), Some(viz)) = (local_point(canvas_ref, &ev), viz_pd.borrow_mut().as_mut())
		{
			viz.pointer_down(x, y);
		}
	};

	let viz_pm = visualizer.clone();
	let on_pointermove = move |ev: PointerEvent| {
		if let (Some((x, y)), Some(viz)) = (local_point(canvas_ref, &ev), viz_pm.borrow_mut().as_mut())
		{
			viz.pointer_move(x, y);
		}
	};

	let viz_pu = visualizer.clone();
	let on_pointerup = move |_: PointerEvent| {
		if let Some(ref mut viz) = *viz_pu.borrow_mut() {
			viz.pointer_up();
		}
	};

	let viz_pl = visualizer.clone();
	let on_pointerleave = move |_: PointerEvent| {
		if let Some(ref mut viz) = *viz_pl.borrow_mut() {
			viz.pointer_up();
		}
	};

	let viz_wh = visualizer;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(ref mut viz) = *viz_wh.borrow_mut() {
			viz.wheel(ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="sudoku-graph-canvas"
			on:pointerdown=on_pointerdown
			on:pointermove=on_pointermove
			on:pointerup=on_pointerup
			on:pointerleave=on_pointerleave
			on:wheel=on_wheel
			style="display: block; cursor: grab; touch-action: none;"
		/>
	}
}
