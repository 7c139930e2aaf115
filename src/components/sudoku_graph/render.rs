use std::cmp::Ordering;
use std::f64::consts::TAU;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::camera::ScreenPoint;
use super::error::VisualizerError;
use super::scene::{SceneRenderer, VertexVisual};
use super::types::EdgeCategory;

const BACKGROUND: &str = "#0a0a0a";
const VERTEX_RADIUS: f64 = 2.0;
const VERTEX_COLORS: [&str; 9] = [
	"#ff3333", "#33ff33", "#3333ff", "#ffff33", "#ff33ff", "#33ffff", "#ff9933", "#9933ff",
	"#33ff99",
];

/// Acquires the 2D drawing context, the only fallible part of attaching to a canvas.
pub fn acquire_context(
	canvas: &HtmlCanvasElement,
) -> Result<CanvasRenderingContext2d, VisualizerError> {
	canvas
		.get_context("2d")
		.map_err(|err| VisualizerError::Initialization(format!("{err:?}")))?
		.ok_or_else(|| VisualizerError::Initialization("canvas has no 2d context".into()))?
		.dyn_into::<CanvasRenderingContext2d>()
		.map_err(|_| VisualizerError::Initialization("context is not a 2d context".into()))
}

fn vertex_color(value: u8) -> &'static str {
	usize::from(value)
		.checked_sub(1)
		.and_then(|i| VERTEX_COLORS.get(i))
		.copied()
		.unwrap_or("#ffffff")
}

fn edge_style(category: EdgeCategory) -> ((u8, u8, u8), f64) {
	match category {
		EdgeCategory::SameValue => ((0xff, 0x6b, 0x9d), 0.8),
		EdgeCategory::SameRow => ((0x00, 0xd4, 0xff), 0.5),
		EdgeCategory::SameCol => ((0x7b, 0x68, 0xee), 0.5),
		EdgeCategory::SameBox => ((0x00, 0xff, 0x88), 0.4),
	}
}

pub fn render(scene: &SceneRenderer, ctx: &CanvasRenderingContext2d) {
	let (width, height) = scene.camera().size();
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, width, height);
	draw_edges(scene, ctx);
	draw_vertices(scene, ctx);
}

fn draw_edges(scene: &SceneRenderer, ctx: &CanvasRenderingContext2d) {
	let camera = scene.camera();
	ctx.set_line_width(1.2);
	for edge in scene.edge_visuals() {
		if edge.opacity <= 0.01 {
			continue;
		}
		let (Some(a), Some(b)) = (camera.project(edge.from), camera.project(edge.to)) else {
			continue;
		};
		let ((red, green, blue), base) = edge_style(edge.category);
		ctx.set_stroke_style_str(&format!(
			"rgba({red}, {green}, {blue}, {:.3})",
			base * edge.opacity
		));
		let dash = if edge.category == EdgeCategory::SameBox {
			js_sys::Array::of2(&JsValue::from_f64(3.0), &JsValue::from_f64(3.0))
		} else {
			js_sys::Array::new()
		};
		let _ = ctx.set_line_dash(&dash);
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(b.x, b.y);
		ctx.stroke();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_vertices(scene: &SceneRenderer, ctx: &CanvasRenderingContext2d) {
	let camera = scene.camera();
	let eye = camera.position();
	let light = scene.light();

	// painter's order: far to near
	let mut visible: Vec<(ScreenPoint, &VertexVisual)> = scene
		.vertex_visuals()
		.filter(|v| v.scale > 0.01)
		.filter_map(|v| camera.project(v.position).map(|p| (p, v)))
		.collect();
	visible.sort_by(|(a, _), (b, _)| b.depth.partial_cmp(&a.depth).unwrap_or(Ordering::Equal));

	for (point, vertex) in visible {
		let radius = VERTEX_RADIUS * vertex.scale * point.scale;
		if radius < 0.5 {
			continue;
		}
		let (x, y) = (point.x, point.y);

		ctx.set_global_alpha(0.9);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, TAU);
		ctx.set_fill_style_str(vertex_color(vertex.value));
		ctx.fill();

		let facing = (eye - vertex.position).normalize_or_zero();
		let brightness = (light.ambient + light.diffuse * light.direction.dot(facing).max(0.0)).min(1.0);
		if let Ok(gradient) = ctx.create_radial_gradient(
			x - radius * 0.35,
			y - radius * 0.35,
			radius * 0.1,
			x,
			y,
			radius,
		) {
			let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {:.3})", 0.6 * brightness));
			let _ = gradient.add_color_stop(0.5, "rgba(255, 255, 255, 0)");
			let _ = gradient.add_color_stop(1.0, &format!("rgba(0, 0, 0, {:.3})", 0.5 * (1.0 - brightness)));
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius, 0.0, TAU);
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
			ctx.fill();
		}

		// spinning meridian
		ctx.begin_path();
		let _ = ctx.ellipse(
			x,
			y,
			radius,
			radius * vertex.spin.y.cos().abs().max(0.1),
			vertex.spin.x,
			0.0,
			TAU,
		);
		ctx.set_stroke_style_str("rgba(255, 255, 255, 0.25)");
		ctx.set_line_width(1.0);
		ctx.stroke();
		ctx.set_global_alpha(1.0);

		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		ctx.set_fill_style_str("white");
		ctx.set_font(&format!("bold {:.0}px sans-serif", radius * 1.1));
		let _ = ctx.fill_text(&vertex.value.to_string(), x, y);
		if radius > 6.0 {
			ctx.set_fill_style_str("#aaaaaa");
			ctx.set_font(&format!("{:.0}px sans-serif", radius * 0.45));
			let _ = ctx.fill_text(&vertex.label, x, y + radius * 1.6);
		}
	}
}
