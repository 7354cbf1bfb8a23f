use std::collections::BTreeSet;

use annotation_graph_canvas::annotation_graph::export::{GRAPH_JSON_FILE_NAME, Payload};
use annotation_graph_canvas::annotation_graph::layout::LayoutKind;
use annotation_graph_canvas::annotation_graph::{
	AnnotationGraphState, GraphEdge, GraphError, GraphNode, InputGraph, Presentation,
	VisualizerConfig,
};

fn node(id: &str, category: &str) -> GraphNode {
	GraphNode {
		id: id.to_string(),
		name: format!("{} name", id),
		definition: format!("{} definition", id),
		category: category.to_string(),
	}
}

fn edge(source: &str, target: &str, category: &str) -> GraphEdge {
	GraphEdge {
		source: source.to_string(),
		target: target.to_string(),
		category: category.to_string(),
	}
}

fn three_node_graph() -> InputGraph {
	InputGraph {
		nodes: vec![node("A", "main"), node("B", "GO"), node("C", "GO")],
		edges: vec![edge("A", "B", "GO"), edge("A", "C", "GO")],
	}
}

fn mount(graph: InputGraph, categories: &[&str]) -> AnnotationGraphState {
	let config = VisualizerConfig::default();
	let categories: Vec<String> = categories.iter().map(|s| s.to_string()).collect();
	let minimal_mode = config.is_minimal(&graph);
	AnnotationGraphState::mount(graph, &categories, minimal_mode, &config, 800.0, 600.0)
		.expect("graph mounts")
}

fn rendered_ids(state: &AnnotationGraphState) -> BTreeSet<String> {
	state
		.rendered()
		.nodes
		.iter()
		.map(|&n| state.store().node(n).id.clone())
		.collect()
}

#[test]
fn toggling_a_category_round_trips_the_scene() {
	let mut state = mount(three_node_graph(), &["GO"]);
	let mounted = state.rendered().clone();
	assert_eq!(mounted.element_count(), 5);

	assert!(!state.show("GO"));
	assert!(state.hide("GO"));
	assert_eq!(rendered_ids(&state), BTreeSet::from(["A".to_string()]));
	assert!(state.rendered().edges.is_empty());

	assert!(state.show("GO"));
	assert_eq!(state.rendered(), &mounted);
}

#[test]
fn every_rendered_node_gets_a_position() {
	let mut state = mount(three_node_graph(), &["GO"]);
	state.settle_layout();
	assert!(!state.layout().is_running());
	for &n in &state.rendered().nodes {
		let p = state.position(n).expect("positioned");
		assert!(p.x.is_finite() && p.y.is_finite());
	}
}

#[test]
fn selection_dims_everything_outside_the_neighborhood() {
	let graph = InputGraph {
		nodes: vec![
			node("A", "main"),
			node("B", "GO"),
			node("C", "GO"),
			node("D", "main"),
		],
		edges: vec![edge("A", "B", "GO"), edge("D", "C", "GO")],
	};
	let mut state = mount(graph, &["GO"]);
	state.settle_layout();
	let idx = |id: &str| state.store().index_of(id).expect("known id");
	let (a, b, c, d) = (idx("A"), idx("B"), idx("C"), idx("D"));

	assert!(state.select("A").expect("select"));
	assert_eq!(state.node_opacity(a), 1.0);
	assert_eq!(state.node_opacity(b), 1.0);
	assert_eq!(state.node_opacity(c), 0.1);
	assert_eq!(state.node_opacity(d), 0.1);
	assert_eq!(state.edge_opacity(0), 1.0);
	assert_eq!(state.edge_opacity(1), 0.1);

	let details = state.selected_details().expect("details");
	assert_eq!(details.id, "A");
	assert_eq!(details.definition, "A definition");

	assert!(state.unselect().expect("unselect"));
	for n in [a, b, c, d] {
		assert_eq!(state.node_opacity(n), 1.0);
	}
	assert!(state.selected_details().is_none());
}

#[test]
fn selecting_a_hidden_node_is_rejected() {
	let mut state = mount(three_node_graph(), &["GO"]);
	state.hide("GO");
	assert!(matches!(state.select("B"), Err(GraphError::NodeNotRendered(_))));
	assert!(matches!(state.select("Z"), Err(GraphError::UnknownNode(_))));
	assert!(state.interaction().selected().is_none());
}

#[test]
fn undo_reverts_toggles_and_selection() {
	let mut state = mount(three_node_graph(), &["GO"]);
	let mounted = state.rendered().clone();
	assert!(!state.undo());

	state.select("A").expect("select");
	state.hide("GO");
	assert_eq!(state.history().len(), 2);

	assert!(state.undo());
	assert_eq!(state.rendered(), &mounted);
	assert!(state.undo());
	assert!(state.interaction().selected().is_none());
	assert!(state.history().is_empty());
}

#[test]
fn json_export_ignores_visibility() {
	let graph = three_node_graph();
	let mut state = mount(graph.clone(), &["GO"]);
	state.hide("GO");

	let download = state.export_graph_json().expect("export");
	assert_eq!(download.file_name, GRAPH_JSON_FILE_NAME);
	let Payload::Text { body, .. } = download.payload else {
		panic!("expected a text payload");
	};
	let parsed: InputGraph = serde_json::from_str(&body).expect("valid json");
	assert_eq!(parsed, graph);
}

#[test]
fn dangling_edges_reject_the_mount() {
	let graph = InputGraph {
		nodes: vec![node("A", "main")],
		edges: vec![edge("A", "missing", "GO")],
	};
	let result = AnnotationGraphState::mount(
		graph,
		&["GO".to_string()],
		false,
		&VisualizerConfig::default(),
		800.0,
		600.0,
	);
	assert!(matches!(result, Err(GraphError::DanglingEdge { index: 0, .. })));
}

#[test]
fn size_thresholds_pick_the_presentation() {
	let config = VisualizerConfig::from_json(
		r#"{"maximum_graph_size": 4, "minimal_mode_threshold": 5}"#,
	)
	.expect("config");

	// 3 nodes + 2 edges sits exactly on the threshold.
	let graph = three_node_graph();
	assert_eq!(
		config.presentation(&graph),
		Presentation::Visualize { minimal_mode: false }
	);

	let mut denser = three_node_graph();
	denser.edges.push(edge("B", "C", "GO"));
	assert_eq!(
		config.presentation(&denser),
		Presentation::Visualize { minimal_mode: true }
	);

	let mut larger = three_node_graph();
	larger.nodes.push(node("D", "GO"));
	assert_eq!(config.presentation(&larger), Presentation::DownloadOnly);
}

#[test]
fn minimal_mode_uses_the_compact_layout_without_colors() {
	let categories = vec!["GO".to_string()];
	let state = AnnotationGraphState::mount(
		three_node_graph(),
		&categories,
		true,
		&VisualizerConfig::default(),
		800.0,
		600.0,
	)
	.expect("mount");
	let run = state.layout().current().expect("layout run");
	assert_eq!(run.kind(), LayoutKind::Compact);
	assert!(run.is_settled());
	assert_eq!(state.category_color(0), None);
	assert_eq!(state.edge_color(0), state.edge_color(1));
}

#[test]
fn below_the_threshold_uses_the_force_layout_with_colors() {
	let config = VisualizerConfig::from_json(r#"{"minimal_mode_threshold": 5}"#).expect("config");
	let graph = three_node_graph();
	assert!(!config.is_minimal(&graph));

	let state = AnnotationGraphState::mount(
		graph,
		&["GO".to_string()],
		config.is_minimal(&three_node_graph()),
		&config,
		800.0,
		600.0,
	)
	.expect("mount");
	let run = state.layout().current().expect("layout run");
	assert_eq!(run.kind(), LayoutKind::Force);
	assert!(state.layout().is_running());
	assert_eq!(state.category_color(0), Some("#D8E0F1"));
	assert_eq!(state.edge_color(0), "#D8E0F1");
}
