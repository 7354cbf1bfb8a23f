//! Selection and focus.
//!
//! Events are routed through a fixed handler table: each [`EventKind`] maps to
//! a pure transition from the current [`Selection`] to the next one. Nodes
//! only receive events while they hold a binding, and bindings follow the
//! rendered set delta by delta.

use std::collections::BTreeSet;

use log::debug;

use super::error::{GraphError, Result};
use super::store::GraphStore;
use super::visibility::{RenderedSet, SceneDelta};

/// Closed neighborhood of the selected node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Focus {
	pub node: usize,
	pub nodes: BTreeSet<usize>,
	pub edges: BTreeSet<usize>,
}

impl Focus {
	/// `node` plus every rendered node sharing an attached edge with it.
	pub fn closed_neighborhood(store: &GraphStore, rendered: &RenderedSet, node: usize) -> Self {
		let mut nodes = BTreeSet::from([node]);
		let mut edges = BTreeSet::new();
		for &edge in store.incident_edges(node) {
			if !rendered.is_attached(store, edge) {
				continue;
			}
			let (src, tgt) = store.endpoints(edge);
			nodes.insert(if src == node { tgt } else { src });
			edges.insert(edge);
		}
		Self { node, nodes, edges }
	}
}

/// At most one focused node.
pub type Selection = Option<Focus>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
	Select,
	Unselect,
	Background,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionEvent {
	Select(usize),
	Unselect(usize),
	BackgroundClick,
}

impl InteractionEvent {
	pub fn kind(&self) -> EventKind {
		match self {
			InteractionEvent::Select(_) => EventKind::Select,
			InteractionEvent::Unselect(_) => EventKind::Unselect,
			InteractionEvent::BackgroundClick => EventKind::Background,
		}
	}
}

/// What a handler may look at.
pub struct SceneView<'a> {
	pub store: &'a GraphStore,
	pub rendered: &'a RenderedSet,
}

pub type Handler = fn(&Selection, &InteractionEvent, &SceneView<'_>) -> Selection;

/// The handler table.
pub fn handler(kind: EventKind) -> Handler {
	match kind {
		EventKind::Select => on_select,
		EventKind::Unselect => on_unselect,
		EventKind::Background => on_background,
	}
}

fn on_select(current: &Selection, event: &InteractionEvent, scene: &SceneView<'_>) -> Selection {
	match *event {
		InteractionEvent::Select(node) => Some(Focus::closed_neighborhood(
			scene.store,
			scene.rendered,
			node,
		)),
		_ => current.clone(),
	}
}

fn on_unselect(current: &Selection, event: &InteractionEvent, _: &SceneView<'_>) -> Selection {
	match (current, event) {
		(Some(focus), InteractionEvent::Unselect(node)) if focus.node == *node => None,
		_ => current.clone(),
	}
}

fn on_background(_: &Selection, _: &InteractionEvent, _: &SceneView<'_>) -> Selection {
	None
}

/// Nodes currently subscribed to select/unselect events.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventBindings {
	nodes: BTreeSet<usize>,
}

impl EventBindings {
	pub fn bind_all(rendered: &RenderedSet) -> Self {
		Self {
			nodes: rendered.nodes.clone(),
		}
	}

	pub fn apply(&mut self, delta: &SceneDelta) {
		for idx in &delta.removed_nodes {
			self.nodes.remove(idx);
		}
		self.nodes.extend(delta.added_nodes.iter().copied());
	}

	pub fn is_bound(&self, node: usize) -> bool {
		self.nodes.contains(&node)
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

pub struct InteractionController {
	bindings: EventBindings,
	selection: Selection,
	dimmed_opacity: f64,
}

impl InteractionController {
	pub fn new(rendered: &RenderedSet, dimmed_opacity: f64) -> Self {
		Self {
			bindings: EventBindings::bind_all(rendered),
			selection: None,
			dimmed_opacity,
		}
	}

	pub fn selection(&self) -> &Selection {
		&self.selection
	}

	pub fn selected(&self) -> Option<usize> {
		self.selection.as_ref().map(|f| f.node)
	}

	pub fn bindings(&self) -> &EventBindings {
		&self.bindings
	}

	/// Run `event` through the handler table. Events aimed at unbound nodes
	/// are rejected and leave the selection untouched.
	pub fn dispatch(&mut self, event: InteractionEvent, scene: &SceneView<'_>) -> Result<bool> {
		if let InteractionEvent::Select(node) | InteractionEvent::Unselect(node) = event {
			if node >= scene.store.node_count() {
				return Err(GraphError::UnknownNode(node.to_string()));
			}
			if !self.bindings.is_bound(node) {
				return Err(GraphError::NodeNotRendered(
					scene.store.node(node).id.clone(),
				));
			}
		}
		let next = handler(event.kind())(&self.selection, &event, scene);
		let changed = next != self.selection;
		if changed {
			debug!(
				"Selection {:?} -> {:?}",
				self.selected(),
				next.as_ref().map(|f| f.node)
			);
		}
		self.selection = next;
		Ok(changed)
	}

	/// Follow a visibility change: rebind the delta and keep the focus unless
	/// the focused node went away.
	pub fn apply_delta(&mut self, delta: &SceneDelta, scene: &SceneView<'_>) {
		self.bindings.apply(delta);
		let Some(node) = self.selected() else {
			return;
		};
		if self.bindings.is_bound(node) {
			self.selection = Some(Focus::closed_neighborhood(scene.store, scene.rendered, node));
		} else {
			debug!("Focused node {} was hidden, clearing focus", node);
			self.selection = None;
		}
	}

	/// Replace the selection outright; used when undoing.
	pub fn restore(&mut self, node: Option<usize>, scene: &SceneView<'_>) {
		self.selection = node
			.filter(|&n| self.bindings.is_bound(n))
			.map(|n| Focus::closed_neighborhood(scene.store, scene.rendered, n));
	}

	pub fn node_opacity(&self, node: usize) -> f64 {
		match &self.selection {
			Some(focus) if !focus.nodes.contains(&node) => self.dimmed_opacity,
			_ => 1.0,
		}
	}

	pub fn edge_opacity(&self, edge: usize) -> f64 {
		match &self.selection {
			Some(focus) if !focus.edges.contains(&edge) => self.dimmed_opacity,
			_ => 1.0,
		}
	}
}
