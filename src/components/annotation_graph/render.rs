use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::{AnnotationGraphState, NODE_RADIUS};

const BACKGROUND: &str = "#1a1a2e";

pub fn render(state: &AnnotationGraphState, ctx: &CanvasRenderingContext2d) {
	// Opaque background so JPEG snapshots match what is on screen.
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
	ctx.set_global_alpha(1.0);
}

fn draw_edges(state: &AnnotationGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (line_width, arrow_size) = (1.5 / k, 7.0 / k);
	let store = state.store();

	for edge in state.rendered().attached_edges(store) {
		let (src, tgt) = store.endpoints(edge);
		let (Some(p1), Some(p2)) = (state.position(src), state.position(tgt)) else {
			continue;
		};
		let (dx, dy) = (p2.x - p1.x, p2.y - p1.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		let color = state.edge_color(edge);
		ctx.set_global_alpha(state.edge_opacity(edge));
		ctx.set_stroke_style_str(color);
		ctx.set_line_width(line_width);

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(p1.x + ux * NODE_RADIUS, p1.y + uy * NODE_RADIUS);
		ctx.line_to(
			p2.x - ux * (NODE_RADIUS + arrow_size),
			p2.y - uy * (NODE_RADIUS + arrow_size),
		);
		ctx.stroke();

		ctx.set_fill_style_str(color);
		let (tip_x, tip_y) = (p2.x - ux * NODE_RADIUS, p2.y - uy * NODE_RADIUS);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(state: &AnnotationGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let selected = state.interaction().selected();
	// Labels are dropped in minimal mode, the graph is too dense to read them.
	let labels = !state.minimal_mode();

	for &node in &state.rendered().nodes {
		let Some(p) = state.position(node) else {
			continue;
		};
		let alpha = state.node_opacity(node);
		let radius = if state.store().node(node).is_main() {
			NODE_RADIUS * 1.3
		} else {
			NODE_RADIUS
		};

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(state.node_color(node));
		ctx.fill();

		if selected == Some(node) {
			ctx.begin_path();
			let _ = ctx.arc(p.x, p.y, radius + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str("white");
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}

		if labels || selected == Some(node) {
			ctx.set_fill_style_str("white");
			ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
			let _ = ctx.fill_text(&state.store().node(node).name, p.x + radius + 3.0, p.y + 3.0);
		}
	}
	ctx.set_global_alpha(1.0);
}
