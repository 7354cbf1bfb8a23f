use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use log::{error, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::config::VisualizerConfig;
use super::error::Result;
use super::export;
use super::palette::swatch;
use super::render;
use super::state::AnnotationGraphState;
use super::types::{InputGraph, NodeDetails};
use super::visibility::{LayerState, layer_names};

/// Reactive mirrors of the scene state that the overlay panels read.
#[derive(Clone, Copy)]
struct UiSignals {
	visible: RwSignal<Vec<bool>>,
	details: RwSignal<Option<NodeDetails>>,
	can_undo: RwSignal<bool>,
	notice: RwSignal<Option<String>>,
}

impl UiSignals {
	fn new() -> Self {
		Self {
			visible: RwSignal::new(Vec::new()),
			details: RwSignal::new(None),
			can_undo: RwSignal::new(false),
			notice: RwSignal::new(None),
		}
	}

	fn sync(&self, state: &AnnotationGraphState) {
		self.visible.set(
			state
				.layers()
				.iter()
				.map(|l| l.state == LayerState::Visible)
				.collect(),
		);
		self.details.set(state.selected_details());
		self.can_undo.set(!state.history().is_empty());
	}

	fn report(&self, err: impl std::fmt::Display) {
		warn!("{}", err);
		self.notice.set(Some(err.to_string()));
	}
}

/// The mounted scene plus the signals it keeps up to date.
#[derive(Clone)]
struct SceneHandle {
	state: Rc<RefCell<Option<AnnotationGraphState>>>,
	ui: UiSignals,
}

impl SceneHandle {
	/// Run `f` against the scene, then refresh the overlays. Errors become a
	/// notice and leave the scene as it was.
	fn with<R>(&self, f: impl FnOnce(&mut AnnotationGraphState) -> Result<R>) -> Option<R> {
		let mut guard = self.state.borrow_mut();
		let state = guard.as_mut()?;
		let result = f(state);
		self.ui.sync(state);
		match result {
			Ok(value) => Some(value),
			Err(err) => {
				self.ui.report(err);
				None
			}
		}
	}
}

fn local_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

fn viewport_size(window: &Window, canvas: &HtmlCanvasElement) -> (f64, f64) {
	let fallback = |dim: Option<i32>, default: f64| dim.map(|d| d as f64).unwrap_or(default);
	let parent = canvas.parent_element();
	let w = window
		.inner_width()
		.ok()
		.and_then(|v| v.as_f64())
		.unwrap_or_else(|| fallback(parent.as_ref().map(|p| p.client_width()), 800.0));
	let h = window
		.inner_height()
		.ok()
		.and_then(|v| v.as_f64())
		.unwrap_or_else(|| fallback(parent.as_ref().map(|p| p.client_height()), 600.0));
	(w, h)
}

/// Interactive annotation graph.
///
/// The first entry of `categories` starts visible; gene nodes are always
/// shown. `on_export_scheme` is invoked when the user asks for the scheme
/// file.
#[component]
pub fn AnnotationGraphCanvas(
	graph: InputGraph,
	categories: Vec<String>,
	#[prop(default = false)] minimal_mode: bool,
	#[prop(optional)] config: Option<VisualizerConfig>,
	#[prop(into)] on_export_scheme: Callback<()>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let config = config.unwrap_or_default();
	let ui = UiSignals::new();
	let scene = SceneHandle {
		state: Rc::new(RefCell::new(None)),
		ui,
	};
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

	// Flipped on unmount; the next frame releases the scene.
	let alive = Arc::new(AtomicBool::new(true));
	{
		let alive = alive.clone();
		on_cleanup(move || alive.store(false, Ordering::Relaxed));
	}

	let names = layer_names(&categories);
	let (scene_init, animate_init, resize_cb_init) =
		(scene.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if scene_init.state.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = viewport_size(&window, &canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("Canvas 2d context unavailable");
			return;
		};

		match AnnotationGraphState::mount(graph.clone(), &categories, minimal_mode, &config, w, h) {
			Ok(state) => {
				scene_init.ui.sync(&state);
				*scene_init.state.borrow_mut() = Some(state);
			}
			Err(err) => {
				error!("Rejected annotation graph: {}", err);
				scene_init
					.ui
					.notice
					.set(Some(format!("Could not display the graph: {}", err)));
				return;
			}
		}

		let (state_resize, canvas_resize) = (scene_init.state.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			let (nw, nh) = viewport_size(&win, &canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner, resize_anim, alive_anim) = (
			scene_init.state.clone(),
			animate_init.clone(),
			resize_cb_init.clone(),
			alive.clone(),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			if !alive_anim.load(Ordering::Relaxed) {
				if let Some(cb) = resize_anim.borrow_mut().take() {
					let _ = win.remove_event_listener_with_callback(
						"resize",
						cb.as_ref().unchecked_ref(),
					);
				}
				state_anim.borrow_mut().take();
				// The frame closure owns a handle to itself; it can only be
				// dropped once it has returned.
				let slot = animate_inner.clone();
				let release = Closure::once_into_js(move || {
					slot.borrow_mut().take();
				});
				let _ = win.set_timeout_with_callback(release.unchecked_ref());
				return;
			}
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				if s.layout().is_running() {
					s.tick();
				}
				render::render(s, &ctx);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let scene_md = scene.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		scene_md.with(|s| {
			s.press(x, y);
			Ok(())
		});
	};

	let scene_mm = scene.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		if let Some(ref mut s) = *scene_mm.state.borrow_mut() {
			s.pointer_move(x, y);
		}
	};

	let scene_mu = scene.clone();
	let on_mouseup = move |_: MouseEvent| {
		scene_mu.with(|s| s.release());
	};

	let scene_ml = scene.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *scene_ml.state.borrow_mut() {
			s.cancel_pointer();
		}
	};

	let scene_wh = scene.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = local_point(&canvas, &ev);
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		if let Some(ref mut s) = *scene_wh.state.borrow_mut() {
			s.zoom_at(x, y, factor);
		}
	};

	let scene_layout = scene.clone();
	let on_relayout = move |_: MouseEvent| {
		scene_layout.with(|s| Ok(s.relayout()));
	};

	let on_snapshot = move |_: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if let Err(err) = export::snapshot(&canvas).and_then(|d| export::deliver(&d)) {
			ui.report(err);
		}
	};

	let scene_undo = scene.clone();
	let on_undo = move |_: MouseEvent| {
		scene_undo.with(|s| Ok(s.undo()));
	};

	let on_scheme = move |_: MouseEvent| on_export_scheme.run(());

	let scene_json = scene.clone();
	let on_json = move |_: MouseEvent| {
		scene_json.with(|s| s.export_graph_json().and_then(|d| export::deliver(&d)));
	};

	let scene_close = scene.clone();
	let on_close_details = move |_: MouseEvent| {
		scene_close.with(|s| s.unselect());
	};

	let category_toggles = names
		.into_iter()
		.enumerate()
		.map(|(i, name)| {
			let scene_toggle = scene.clone();
			let category = name.clone();
			let style = swatch(i, minimal_mode)
				.map(|c| format!("background-color: {};", c))
				.unwrap_or_default();
			view! {
				<label class="graph-category" style=style>
					<input
						type="checkbox"
						prop:checked=move || ui.visible.with(|v| v.get(i).copied().unwrap_or(false))
						on:change=move |ev| {
							let checked = event_target_checked(&ev);
							scene_toggle.with(|s| Ok(s.set_category_visible(&category, checked)));
						}
					/>
					{name}
				</label>
			}
		})
		.collect_view();

	view! {
		<div class="annotation-graph">
			<canvas
				node_ref=canvas_ref
				class="annotation-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div class="graph-toolbar">
				<button title="Change layout" on:click=on_relayout>"Layout"</button>
				<button title="Save screenshot" on:click=on_snapshot>"Screenshot"</button>
				<button
					title="Undo"
					style:display=move || if ui.can_undo.get() { "" } else { "none" }
					on:click=on_undo
				>
					"Undo"
				</button>
				<button title="Download scheme file" on:click=on_scheme>"Scheme"</button>
				<button title="Download graph as JSON" on:click=on_json>"JSON"</button>
			</div>
			<div class="graph-categories">
				<h4>"Annotations"</h4>
				{category_toggles}
			</div>
			<div
				class="graph-details"
				style:display=move || if ui.details.with(|d| d.is_some()) { "" } else { "none" }
			>
				<button class="graph-details-close" on:click=on_close_details>"×"</button>
				<strong>
					{move || {
						ui.details
							.with(|d| {
								d.as_ref().map(|d| format!("{} ( {} )", d.name, d.id)).unwrap_or_default()
							})
					}}
				</strong>
				<p>
					{move || {
						ui.details
							.with(|d| d.as_ref().map(|d| d.definition.clone()).unwrap_or_default())
					}}
				</p>
			</div>
			<div
				class="graph-notice"
				style:display=move || if ui.notice.with(|n| n.is_some()) { "" } else { "none" }
				on:click=move |_| ui.notice.set(None)
			>
				{move || ui.notice.get().unwrap_or_default()}
			</div>
		</div>
	}
}
