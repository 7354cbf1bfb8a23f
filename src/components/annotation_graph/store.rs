//! Immutable graph universe with a per-category index.

use std::collections::HashMap;

use log::debug;

use super::error::{GraphError, Result};
use super::types::{GraphEdge, GraphNode, InputGraph};

/// Node and edge positions (into the input graph) sharing one category tag,
/// in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategorySlice {
	pub nodes: Vec<usize>,
	pub edges: Vec<usize>,
}

impl CategorySlice {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}
}

static EMPTY_SLICE: CategorySlice = CategorySlice {
	nodes: Vec::new(),
	edges: Vec::new(),
};

pub struct GraphStore {
	graph: InputGraph,
	id_to_idx: HashMap<String, usize>,
	/// (source, target) node positions per edge.
	endpoints: Vec<(usize, usize)>,
	/// Incident edge positions per node.
	incident: Vec<Vec<usize>>,
	by_category: HashMap<String, CategorySlice>,
}

impl GraphStore {
	/// Index the graph. Duplicate node ids and edges pointing at unknown
	/// nodes reject the whole graph.
	pub fn new(graph: InputGraph) -> Result<Self> {
		let mut id_to_idx = HashMap::with_capacity(graph.nodes.len());
		let mut by_category: HashMap<String, CategorySlice> = HashMap::new();

		for (idx, node) in graph.nodes.iter().enumerate() {
			if id_to_idx.insert(node.id.clone(), idx).is_some() {
				return Err(GraphError::DuplicateNode(node.id.clone()));
			}
			by_category
				.entry(node.category.clone())
				.or_default()
				.nodes
				.push(idx);
		}

		let mut endpoints = Vec::with_capacity(graph.edges.len());
		let mut incident = vec![Vec::new(); graph.nodes.len()];
		for (idx, edge) in graph.edges.iter().enumerate() {
			let (Some(&src), Some(&tgt)) = (id_to_idx.get(&edge.source), id_to_idx.get(&edge.target))
			else {
				return Err(GraphError::DanglingEdge {
					index: idx,
					source_id: edge.source.clone(),
					target_id: edge.target.clone(),
				});
			};
			endpoints.push((src, tgt));
			incident[src].push(idx);
			if tgt != src {
				incident[tgt].push(idx);
			}
			by_category
				.entry(edge.category.clone())
				.or_default()
				.edges
				.push(idx);
		}

		debug!(
			"Indexed {} nodes, {} edges in {} categories",
			graph.nodes.len(),
			graph.edges.len(),
			by_category.len()
		);

		Ok(Self {
			graph,
			id_to_idx,
			endpoints,
			incident,
			by_category,
		})
	}

	/// Everything tagged `category`. Unknown categories yield an empty slice.
	pub fn subset(&self, category: &str) -> &CategorySlice {
		self.by_category.get(category).unwrap_or(&EMPTY_SLICE)
	}

	pub fn graph(&self) -> &InputGraph {
		&self.graph
	}

	pub fn node(&self, idx: usize) -> &GraphNode {
		&self.graph.nodes[idx]
	}

	pub fn edge(&self, idx: usize) -> &GraphEdge {
		&self.graph.edges[idx]
	}

	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.id_to_idx.get(id).copied()
	}

	pub fn endpoints(&self, edge: usize) -> (usize, usize) {
		self.endpoints[edge]
	}

	pub fn incident_edges(&self, node: usize) -> &[usize] {
		&self.incident[node]
	}

	pub fn node_count(&self) -> usize {
		self.graph.nodes.len()
	}

	pub fn edge_count(&self) -> usize {
		self.graph.edges.len()
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;

	pub(crate) fn node(id: &str, category: &str) -> GraphNode {
		GraphNode {
			id: id.into(),
			name: format!("{id} name"),
			definition: format!("{id} definition"),
			category: category.into(),
		}
	}

	pub(crate) fn edge(source: &str, target: &str, category: &str) -> GraphEdge {
		GraphEdge {
			source: source.into(),
			target: target.into(),
			category: category.into(),
		}
	}

	/// A(main) linked to B and C (GO), A linked to D (Reactome).
	pub(crate) fn sample_graph() -> InputGraph {
		InputGraph {
			nodes: vec![
				node("A", "main"),
				node("B", "GO"),
				node("C", "GO"),
				node("D", "Reactome"),
			],
			edges: vec![
				edge("A", "B", "GO"),
				edge("A", "C", "GO"),
				edge("A", "D", "Reactome"),
			],
		}
	}

	#[test]
	fn subset_keeps_input_order() {
		let store = GraphStore::new(sample_graph()).unwrap();
		let go = store.subset("GO");
		assert_eq!(go.nodes, vec![1, 2]);
		assert_eq!(go.edges, vec![0, 1]);
		assert_eq!(store.subset("main").nodes, vec![0]);
		assert!(store.subset("main").edges.is_empty());
	}

	#[test]
	fn unknown_category_is_empty() {
		let store = GraphStore::new(sample_graph()).unwrap();
		assert!(store.subset("Small Molecules").is_empty());
	}

	#[test]
	fn dangling_edge_rejects_mount() {
		let mut graph = sample_graph();
		graph.edges.push(edge("A", "missing", "GO"));
		match GraphStore::new(graph) {
			Err(GraphError::DanglingEdge { index, target_id, .. }) => {
				assert_eq!(index, 3);
				assert_eq!(target_id, "missing");
			}
			other => panic!("expected dangling edge error, got {:?}", other.err()),
		}
	}

	#[test]
	fn duplicate_node_rejects_mount() {
		let mut graph = sample_graph();
		graph.nodes.push(node("B", "Reactome"));
		assert!(matches!(
			GraphStore::new(graph),
			Err(GraphError::DuplicateNode(id)) if id == "B"
		));
	}

	#[test]
	fn incidence_covers_both_endpoints() {
		let store = GraphStore::new(sample_graph()).unwrap();
		assert_eq!(store.incident_edges(0), &[0, 1, 2]);
		assert_eq!(store.incident_edges(3), &[2]);
		assert_eq!(store.endpoints(2), (0, 3));
		assert_eq!(store.index_of("C"), Some(2));
	}
}
