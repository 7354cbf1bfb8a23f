//! Which category layers are materialized in the scene.

use std::collections::BTreeSet;

use log::debug;

use super::store::GraphStore;
use super::types::MAIN_CATEGORY;

/// Elements currently materialized, as positions into the input graph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedSet {
	pub nodes: BTreeSet<usize>,
	pub edges: BTreeSet<usize>,
}

impl RenderedSet {
	pub fn contains_node(&self, idx: usize) -> bool {
		self.nodes.contains(&idx)
	}

	pub fn contains_edge(&self, idx: usize) -> bool {
		self.edges.contains(&idx)
	}

	/// An edge is attached when both of its endpoints are rendered.
	pub fn is_attached(&self, store: &GraphStore, edge: usize) -> bool {
		let (src, tgt) = store.endpoints(edge);
		self.edges.contains(&edge) && self.nodes.contains(&src) && self.nodes.contains(&tgt)
	}

	pub fn attached_edges<'a>(&'a self, store: &'a GraphStore) -> impl Iterator<Item = usize> + 'a {
		self.edges
			.iter()
			.copied()
			.filter(move |&e| self.is_attached(store, e))
	}

	pub fn element_count(&self) -> usize {
		self.nodes.len() + self.edges.len()
	}
}

/// What a single show/hide actually changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SceneDelta {
	pub added_nodes: Vec<usize>,
	pub added_edges: Vec<usize>,
	pub removed_nodes: Vec<usize>,
	pub removed_edges: Vec<usize>,
}

impl SceneDelta {
	pub fn is_empty(&self) -> bool {
		self.added_nodes.is_empty()
			&& self.added_edges.is_empty()
			&& self.removed_nodes.is_empty()
			&& self.removed_edges.is_empty()
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerState {
	Hidden,
	Visible,
}

#[derive(Clone, Debug)]
pub struct CategoryLayer {
	pub name: String,
	pub state: LayerState,
}

/// Result of a show/hide request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toggle {
	/// Whether the layer changed state. False for unknown categories and
	/// repeated requests.
	pub changed: bool,
	pub delta: SceneDelta,
}

impl Toggle {
	fn unchanged() -> Self {
		Self {
			changed: false,
			delta: SceneDelta::default(),
		}
	}
}

/// Selected categories as toggleable layers: the main tag is dropped and
/// repeats collapse onto their first position.
pub fn layer_names(categories: &[String]) -> Vec<String> {
	let mut names: Vec<String> = Vec::with_capacity(categories.len());
	for name in categories {
		if name != MAIN_CATEGORY && !names.contains(name) {
			names.push(name.clone());
		}
	}
	names
}

pub struct VisibilityController {
	layers: Vec<CategoryLayer>,
	rendered: RenderedSet,
}

impl VisibilityController {
	/// Materialize the main layer and the first selected category.
	pub fn mount(store: &GraphStore, categories: &[String]) -> Self {
		let layers = layer_names(categories)
			.into_iter()
			.map(|name| CategoryLayer {
				name,
				state: LayerState::Hidden,
			})
			.collect();

		let mut controller = Self {
			layers,
			rendered: RenderedSet::default(),
		};
		controller.insert_subset(store, MAIN_CATEGORY);
		if let Some(first) = controller.layers.first().map(|l| l.name.clone()) {
			controller.show(store, &first);
		}
		debug!(
			"Mounted {} of {} elements",
			controller.rendered.element_count(),
			store.node_count() + store.edge_count()
		);
		controller
	}

	pub fn rendered(&self) -> &RenderedSet {
		&self.rendered
	}

	pub fn layers(&self) -> &[CategoryLayer] {
		&self.layers
	}

	/// Palette position of a category, if it is one of the selected ones.
	pub fn category_index(&self, category: &str) -> Option<usize> {
		self.layers.iter().position(|l| l.name == category)
	}

	pub fn is_visible(&self, category: &str) -> bool {
		category == MAIN_CATEGORY
			|| self
				.layers
				.iter()
				.any(|l| l.name == category && l.state == LayerState::Visible)
	}

	pub fn show(&mut self, store: &GraphStore, category: &str) -> Toggle {
		let Some(layer) = self.layers.iter_mut().find(|l| l.name == category) else {
			debug!("Ignoring show of unknown category {}", category);
			return Toggle::unchanged();
		};
		if layer.state == LayerState::Visible {
			return Toggle::unchanged();
		}
		layer.state = LayerState::Visible;
		let delta = self.insert_subset(store, category);
		debug!(
			"Showing {}: +{} nodes, +{} edges",
			category,
			delta.added_nodes.len(),
			delta.added_edges.len()
		);
		Toggle {
			changed: true,
			delta,
		}
	}

	pub fn hide(&mut self, store: &GraphStore, category: &str) -> Toggle {
		let Some(layer) = self.layers.iter_mut().find(|l| l.name == category) else {
			debug!("Ignoring hide of unknown category {}", category);
			return Toggle::unchanged();
		};
		if layer.state == LayerState::Hidden {
			return Toggle::unchanged();
		}
		layer.state = LayerState::Hidden;

		let subset = store.subset(category);
		let mut delta = SceneDelta::default();
		for &idx in &subset.nodes {
			if self.rendered.nodes.remove(&idx) {
				delta.removed_nodes.push(idx);
			}
		}
		for &idx in &subset.edges {
			if self.rendered.edges.remove(&idx) {
				delta.removed_edges.push(idx);
			}
		}
		debug!(
			"Hiding {}: -{} nodes, -{} edges",
			category,
			delta.removed_nodes.len(),
			delta.removed_edges.len()
		);
		Toggle {
			changed: true,
			delta,
		}
	}

	pub fn set_visible(&mut self, store: &GraphStore, category: &str, visible: bool) -> Toggle {
		if visible {
			self.show(store, category)
		} else {
			self.hide(store, category)
		}
	}

	fn insert_subset(&mut self, store: &GraphStore, category: &str) -> SceneDelta {
		let subset = store.subset(category);
		let mut delta = SceneDelta::default();
		for &idx in &subset.nodes {
			if self.rendered.nodes.insert(idx) {
				delta.added_nodes.push(idx);
			}
		}
		for &idx in &subset.edges {
			if self.rendered.edges.insert(idx) {
				delta.added_edges.push(idx);
			}
		}
		delta
	}
}
