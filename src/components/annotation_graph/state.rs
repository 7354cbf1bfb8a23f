use log::{debug, info};

use super::config::VisualizerConfig;
use super::error::{GraphError, Result};
use super::export::{self, Download};
use super::history::{Command, History};
use super::interaction::{InteractionController, InteractionEvent, SceneView};
use super::layout::{LayoutEngine, LayoutKind, Point};
use super::palette::{DEFAULT_EDGE_COLOR, GENE_COLOR, TERM_COLOR, color_for, swatch};
use super::store::GraphStore;
use super::types::{InputGraph, NodeDetails};
use super::viewport::ViewTransform;
use super::visibility::{CategoryLayer, RenderedSet, SceneDelta, VisibilityController};

pub const NODE_RADIUS: f64 = 6.0;
pub const HIT_RADIUS: f64 = 12.0;
/// Screen distance a press may travel and still count as a click.
const CLICK_SLOP: f64 = 4.0;
const FOCUS_PADDING: f64 = 60.0;

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Point,
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
	pub moved: bool,
}

/// The mounted scene: graph universe, visible layers, layout, focus and
/// undo history. Owned by the canvas component for as long as it is mounted.
pub struct AnnotationGraphState {
	store: GraphStore,
	visibility: VisibilityController,
	layout: LayoutEngine,
	interaction: InteractionController,
	history: History,
	minimal_mode: bool,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
}

impl AnnotationGraphState {
	/// Mount `graph`. Fails when the graph references missing nodes or
	/// repeats a node id.
	pub fn mount(
		graph: InputGraph,
		categories: &[String],
		minimal_mode: bool,
		config: &VisualizerConfig,
		width: f64,
		height: f64,
	) -> Result<Self> {
		let store = GraphStore::new(graph)?;
		let visibility = VisibilityController::mount(&store, categories);
		let interaction = InteractionController::new(visibility.rendered(), config.dimmed_opacity);
		let mut state = Self {
			layout: LayoutEngine::new(config),
			history: History::new(config.history_limit),
			store,
			visibility,
			interaction,
			minimal_mode,
			transform: ViewTransform::centered(width, height),
			drag: DragState::default(),
			pan: PanState::default(),
			width,
			height,
		};
		state.relayout();
		info!(
			"Mounted annotation graph: {} nodes, {} edges, {} categories{}",
			state.store.node_count(),
			state.store.edge_count(),
			state.visibility.layers().len(),
			if minimal_mode { " (minimal mode)" } else { "" }
		);
		Ok(state)
	}

	pub fn store(&self) -> &GraphStore {
		&self.store
	}

	pub fn rendered(&self) -> &RenderedSet {
		self.visibility.rendered()
	}

	pub fn layers(&self) -> &[CategoryLayer] {
		self.visibility.layers()
	}

	pub fn is_visible(&self, category: &str) -> bool {
		self.visibility.is_visible(category)
	}

	pub fn minimal_mode(&self) -> bool {
		self.minimal_mode
	}

	pub fn layout(&self) -> &LayoutEngine {
		&self.layout
	}

	pub fn interaction(&self) -> &InteractionController {
		&self.interaction
	}

	pub fn history(&self) -> &History {
		&self.history
	}

	pub fn show(&mut self, category: &str) -> bool {
		self.set_category_visible(category, true)
	}

	pub fn hide(&mut self, category: &str) -> bool {
		self.set_category_visible(category, false)
	}

	/// Show or hide one category layer. Returns whether the layer changed.
	pub fn set_category_visible(&mut self, category: &str, visible: bool) -> bool {
		let toggle = self.visibility.set_visible(&self.store, category, visible);
		if !toggle.changed {
			return false;
		}
		let previous = self.interaction.selected();
		self.after_toggle(&toggle.delta);
		// A hide may drop the focused node, so its inverse carries the focus.
		let cleared = if self.interaction.selected() != previous {
			previous
		} else {
			None
		};
		self.history.push(if visible {
			Command::Hide(category.to_string())
		} else {
			Command::Show {
				category: category.to_string(),
				focus: cleared,
			}
		});
		true
	}

	fn after_toggle(&mut self, delta: &SceneDelta) {
		let scene = SceneView {
			store: &self.store,
			rendered: self.visibility.rendered(),
		};
		self.interaction.apply_delta(delta, &scene);
		if !delta.is_empty() {
			self.relayout();
		}
	}

	/// Lay out the rendered set from scratch, superseding any running layout.
	pub fn relayout(&mut self) -> u64 {
		self.layout.relayout(
			&self.store,
			self.visibility.rendered(),
			LayoutKind::for_mode(self.minimal_mode),
		)
	}

	/// Advance the layout animation by one frame.
	pub fn tick(&mut self) -> bool {
		self.layout.tick(&self.store, self.visibility.rendered())
	}

	pub fn settle_layout(&mut self) {
		self.layout.settle(&self.store, self.visibility.rendered());
	}

	pub fn position(&self, node: usize) -> Option<Point> {
		self.layout.position(node)
	}

	pub fn select(&mut self, id: &str) -> Result<bool> {
		let idx = self
			.store
			.index_of(id)
			.ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;
		self.handle(InteractionEvent::Select(idx))
	}

	pub fn unselect(&mut self) -> Result<bool> {
		match self.interaction.selected() {
			Some(node) => self.handle(InteractionEvent::Unselect(node)),
			None => Ok(false),
		}
	}

	/// Feed an interaction event through the handler table. Returns whether
	/// the selection changed.
	pub fn handle(&mut self, event: InteractionEvent) -> Result<bool> {
		let previous = self.interaction.selected();
		let scene = SceneView {
			store: &self.store,
			rendered: self.visibility.rendered(),
		};
		let changed = self.interaction.dispatch(event, &scene)?;
		if changed {
			self.history.push(Command::Select(previous));
			self.frame_focus();
		}
		Ok(changed)
	}

	/// Move the camera onto the focused neighborhood.
	fn frame_focus(&mut self) {
		let Some(focus) = self.interaction.selection() else {
			return;
		};
		let points = focus.nodes.iter().filter_map(|&n| self.layout.position(n));
		if let Some(t) = ViewTransform::fit(points, self.width, self.height, FOCUS_PADDING) {
			self.transform = t;
		}
	}

	/// Revert the most recent action. Returns false when there is nothing
	/// to undo.
	pub fn undo(&mut self) -> bool {
		let Some(command) = self.history.pop() else {
			return false;
		};
		debug!("Undo {:?}", command);
		match command {
			Command::Show { category, focus } => {
				let toggle = self.visibility.show(&self.store, &category);
				self.after_toggle(&toggle.delta);
				if focus.is_some() {
					let scene = SceneView {
						store: &self.store,
						rendered: self.visibility.rendered(),
					};
					self.interaction.restore(focus, &scene);
					self.frame_focus();
				}
			}
			Command::Hide(category) => {
				let toggle = self.visibility.hide(&self.store, &category);
				self.after_toggle(&toggle.delta);
			}
			Command::Select(node) => {
				let scene = SceneView {
					store: &self.store,
					rendered: self.visibility.rendered(),
				};
				self.interaction.restore(node, &scene);
				self.frame_focus();
			}
		}
		true
	}

	pub fn selected_details(&self) -> Option<NodeDetails> {
		self.interaction
			.selected()
			.map(|n| NodeDetails::from(self.store.node(n)))
	}

	pub fn node_opacity(&self, node: usize) -> f64 {
		self.interaction.node_opacity(node)
	}

	pub fn edge_opacity(&self, edge: usize) -> f64 {
		self.interaction.edge_opacity(edge)
	}

	/// Palette color of the edge's category; a single neutral color in
	/// minimal mode or for categories outside the selection.
	pub fn edge_color(&self, edge: usize) -> &'static str {
		if self.minimal_mode {
			return DEFAULT_EDGE_COLOR;
		}
		self.visibility
			.category_index(&self.store.edge(edge).category)
			.map(color_for)
			.unwrap_or(DEFAULT_EDGE_COLOR)
	}

	pub fn node_color(&self, node: usize) -> &'static str {
		if self.store.node(node).is_main() {
			GENE_COLOR
		} else {
			TERM_COLOR
		}
	}

	/// Swatch for the category toggle list; none in minimal mode.
	pub fn category_color(&self, index: usize) -> Option<&'static str> {
		swatch(index, self.minimal_mode)
	}

	/// The full input graph, regardless of what is currently shown.
	pub fn export_graph_json(&self) -> Result<Download> {
		export::graph_json_download(self.store.graph())
	}

	/// Closest interactive node under a screen position.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (gx, gy) = self.transform.screen_to_graph(sx, sy);
		let cursor = Point { x: gx, y: gy };
		let bindings = self.interaction.bindings();
		self.visibility
			.rendered()
			.nodes
			.iter()
			.filter(|&&n| bindings.is_bound(n))
			.filter_map(|&n| Some((n, self.layout.position(n)?.distance(&cursor))))
			.filter(|&(_, d)| d < HIT_RADIUS)
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(n, _)| n)
	}

	/// Select `node`, or unselect it when it is already the selection.
	/// `None` is a click on the background.
	pub fn click(&mut self, node: Option<usize>) -> Result<bool> {
		let event = match node {
			Some(n) if self.interaction.selected() == Some(n) => InteractionEvent::Unselect(n),
			Some(n) => InteractionEvent::Select(n),
			None => InteractionEvent::BackgroundClick,
		};
		self.handle(event)
	}

	pub fn press(&mut self, x: f64, y: f64) {
		if let Some(node) = self.node_at_position(x, y) {
			self.drag = DragState {
				active: true,
				node: Some(node),
				start_x: x,
				start_y: y,
				node_start: self.layout.position(node).unwrap_or_default(),
				moved: false,
			};
		} else {
			self.pan = PanState {
				active: true,
				start_x: x,
				start_y: y,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
				moved: false,
			};
		}
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		if self.drag.active {
			let (dx, dy) = (x - self.drag.start_x, y - self.drag.start_y);
			if dx.hypot(dy) > CLICK_SLOP {
				self.drag.moved = true;
			}
			if let (true, Some(node)) = (self.drag.moved, self.drag.node) {
				let to = Point {
					x: self.drag.node_start.x + dx / self.transform.k,
					y: self.drag.node_start.y + dy / self.transform.k,
				};
				self.layout.move_node(node, to);
			}
		} else if self.pan.active {
			let (dx, dy) = (x - self.pan.start_x, y - self.pan.start_y);
			if dx.hypot(dy) > CLICK_SLOP {
				self.pan.moved = true;
			}
			self.transform.x = self.pan.transform_start_x + dx;
			self.transform.y = self.pan.transform_start_y + dy;
		}
	}

	/// End a press. A press that did not travel is a click on whatever it
	/// started on.
	pub fn release(&mut self) -> Result<bool> {
		let click = if self.drag.active && !self.drag.moved {
			Some(self.drag.node)
		} else if self.pan.active && !self.pan.moved {
			Some(None)
		} else {
			None
		};
		self.cancel_pointer();
		match click {
			Some(target) => self.click(target),
			None => Ok(false),
		}
	}

	pub fn cancel_pointer(&mut self) {
		self.drag = DragState::default();
		self.pan = PanState::default();
	}

	pub fn zoom_at(&mut self, x: f64, y: f64, factor: f64) {
		self.transform.zoom_at(x, y, factor);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

impl Drop for AnnotationGraphState {
	fn drop(&mut self) {
		debug!("Released annotation graph scene");
	}
}
