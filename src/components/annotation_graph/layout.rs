//! Node positioning for the rendered set.
//!
//! Each relayout starts from scratch and replaces whatever run was in flight;
//! only the newest run ever feeds positions to the renderer.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData};
use log::{debug, warn};

use super::config::{CompactLayoutOptions, ForceLayoutOptions, VisualizerConfig};
use super::store::GraphStore;
use super::visibility::RenderedSet;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub fn distance(&self, other: &Point) -> f64 {
		((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutKind {
	/// Physics simulation, animated over several frames.
	Force,
	/// Concentric rings ordered by degree, computed in one pass.
	Compact,
}

impl LayoutKind {
	pub fn for_mode(minimal_mode: bool) -> Self {
		if minimal_mode {
			LayoutKind::Compact
		} else {
			LayoutKind::Force
		}
	}
}

struct ForceRun {
	graph: ForceGraph<usize, ()>,
	handles: HashMap<usize, DefaultNodeIdx>,
	steps: usize,
}

pub struct LayoutRun {
	generation: u64,
	kind: LayoutKind,
	positions: HashMap<usize, Point>,
	force: Option<ForceRun>,
	settled: bool,
	fell_back: bool,
}

impl LayoutRun {
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// The algorithm that produced the current positions.
	pub fn kind(&self) -> LayoutKind {
		self.kind
	}

	pub fn is_settled(&self) -> bool {
		self.settled
	}

	/// True when the physics run failed and compact positions were used.
	pub fn fell_back(&self) -> bool {
		self.fell_back
	}

	pub fn positions(&self) -> &HashMap<usize, Point> {
		&self.positions
	}
}

pub struct LayoutEngine {
	force: ForceLayoutOptions,
	compact: CompactLayoutOptions,
	generation: u64,
	run: Option<LayoutRun>,
}

impl LayoutEngine {
	pub fn new(config: &VisualizerConfig) -> Self {
		Self {
			force: config.force.clone(),
			compact: config.compact.clone(),
			generation: 0,
			run: None,
		}
	}

	/// Discard the current run and lay out `rendered` from scratch.
	pub fn relayout(&mut self, store: &GraphStore, rendered: &RenderedSet, kind: LayoutKind) -> u64 {
		self.generation += 1;
		let generation = self.generation;
		if self.run.as_ref().is_some_and(|r| !r.settled) {
			debug!("Superseding unfinished layout run");
		}
		debug!(
			"Layout #{} ({:?}) over {} nodes",
			generation,
			kind,
			rendered.nodes.len()
		);

		let run = match kind {
			LayoutKind::Compact => LayoutRun {
				generation,
				kind,
				positions: compact_positions(store, rendered, &self.compact),
				force: None,
				settled: true,
				fell_back: false,
			},
			LayoutKind::Force => {
				let (force, positions) = seed_force_run(store, rendered, &self.force);
				LayoutRun {
					generation,
					kind,
					settled: positions.is_empty(),
					positions,
					force: Some(force),
					fell_back: false,
				}
			}
		};
		self.run = Some(run);
		generation
	}

	/// Advance the current run by one animation frame. Returns whether it is
	/// still moving.
	pub fn tick(&mut self, store: &GraphStore, rendered: &RenderedSet) -> bool {
		let steps = self.force.steps_per_frame.max(1);
		for _ in 0..steps {
			if !self.step(store, rendered) {
				return false;
			}
		}
		self.is_running()
	}

	/// Run the current layout to completion.
	pub fn settle(&mut self, store: &GraphStore, rendered: &RenderedSet) {
		while self.step(store, rendered) {}
	}

	fn step(&mut self, store: &GraphStore, rendered: &RenderedSet) -> bool {
		let Some(run) = self.run.as_mut() else {
			return false;
		};
		if run.settled {
			return false;
		}
		let Some(force) = run.force.as_mut() else {
			run.settled = true;
			return false;
		};

		match advance(force, &mut run.positions, &self.force) {
			Some(max_move) => {
				if max_move < self.force.convergence_tolerance as f64
					|| force.steps >= self.force.iterations
				{
					debug!(
						"Layout #{} settled after {} steps",
						run.generation, force.steps
					);
					run.settled = true;
				}
			}
			None => {
				warn!(
					"Layout #{} produced non-finite positions, falling back to compact layout",
					run.generation
				);
				run.positions = compact_positions(store, rendered, &self.compact);
				run.force = None;
				run.kind = LayoutKind::Compact;
				run.fell_back = true;
				run.settled = true;
			}
		}
		!run.settled
	}

	pub fn is_running(&self) -> bool {
		self.run.as_ref().is_some_and(|r| !r.settled)
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn current(&self) -> Option<&LayoutRun> {
		self.run.as_ref()
	}

	pub fn position(&self, node: usize) -> Option<Point> {
		self.run.as_ref()?.positions.get(&node).copied()
	}

	/// Pin a node at `to`, e.g. while it is dragged.
	pub fn move_node(&mut self, node: usize, to: Point) {
		let Some(run) = self.run.as_mut() else {
			return;
		};
		let Some(pos) = run.positions.get_mut(&node) else {
			return;
		};
		*pos = to;
		if let Some(force) = run.force.as_mut() {
			if let Some(&handle) = force.handles.get(&node) {
				force.graph.visit_nodes_mut(|n| {
					if n.index() == handle {
						n.data.x = to.x as f32;
						n.data.y = to.y as f32;
						n.data.is_anchor = true;
					}
				});
			}
		}
	}
}

fn seed_force_run(
	store: &GraphStore,
	rendered: &RenderedSet,
	options: &ForceLayoutOptions,
) -> (ForceRun, HashMap<usize, Point>) {
	let mut graph = ForceGraph::new(options.simulation_parameters());
	let mut handles = HashMap::with_capacity(rendered.nodes.len());
	let mut positions = HashMap::with_capacity(rendered.nodes.len());
	let count = rendered.nodes.len().max(1) as f64;
	let radius = (count * 2.0).max(100.0);

	for (i, &node) in rendered.nodes.iter().enumerate() {
		let angle = (i as f64) * 2.0 * PI / count;
		let (x, y) = (radius * angle.cos(), radius * angle.sin());
		let handle = graph.add_node(NodeData {
			x: x as f32,
			y: y as f32,
			mass: 10.0,
			is_anchor: false,
			user_data: node,
		});
		handles.insert(node, handle);
		positions.insert(node, Point { x, y });
	}

	for edge in rendered.attached_edges(store) {
		let (src, tgt) = store.endpoints(edge);
		if src == tgt {
			continue;
		}
		if let (Some(&a), Some(&b)) = (handles.get(&src), handles.get(&tgt)) {
			graph.add_edge(a, b, EdgeData::default());
		}
	}

	(
		ForceRun {
			graph,
			handles,
			steps: 0,
		},
		positions,
	)
}

/// One simulation step. Returns the largest node displacement, or `None`
/// when the simulation diverged.
fn advance(
	force: &mut ForceRun,
	positions: &mut HashMap<usize, Point>,
	options: &ForceLayoutOptions,
) -> Option<f64> {
	force.graph.update(options.time_step);
	force.steps += 1;

	let mut max_move: f64 = 0.0;
	let mut finite = true;
	force.graph.visit_nodes(|node| {
		let (x, y) = (node.x() as f64, node.y() as f64);
		if !x.is_finite() || !y.is_finite() {
			finite = false;
			return;
		}
		let next = Point { x, y };
		if let Some(prev) = positions.insert(node.data.user_data, next) {
			max_move = max_move.max(prev.distance(&next));
		}
	});
	finite.then_some(max_move)
}

/// Concentric rings: the best connected node sits at the center, ring `k`
/// holds `6k` nodes.
fn compact_positions(
	store: &GraphStore,
	rendered: &RenderedSet,
	options: &CompactLayoutOptions,
) -> HashMap<usize, Point> {
	let mut degree: HashMap<usize, usize> = rendered.nodes.iter().map(|&n| (n, 0)).collect();
	for edge in rendered.attached_edges(store) {
		let (src, tgt) = store.endpoints(edge);
		for end in [src, tgt] {
			if let Some(d) = degree.get_mut(&end) {
				*d += 1;
			}
		}
	}

	let mut order: Vec<usize> = rendered.nodes.iter().copied().collect();
	order.sort_by(|a, b| degree[b].cmp(&degree[a]).then(a.cmp(b)));

	let mut positions = HashMap::with_capacity(order.len());
	let (mut ring, mut slot, mut capacity) = (0usize, 0usize, 1usize);
	for node in order {
		let radius = ring as f64 * options.ring_spacing;
		let angle = slot as f64 * 2.0 * PI / capacity as f64;
		positions.insert(
			node,
			Point {
				x: radius * angle.cos(),
				y: radius * angle.sin(),
			},
		);
		slot += 1;
		if slot == capacity {
			ring += 1;
			slot = 0;
			capacity = 6 * ring;
		}
	}
	positions
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::annotation_graph::store::tests::sample_graph;
	use crate::components::annotation_graph::visibility::VisibilityController;

	fn fixture() -> (GraphStore, RenderedSet) {
		let store = GraphStore::new(sample_graph()).unwrap();
		let mut vis = VisibilityController::mount(&store, &["GO".to_string(), "Reactome".to_string()]);
		vis.show(&store, "Reactome");
		let rendered = vis.rendered().clone();
		(store, rendered)
	}

	#[test]
	fn compact_puts_hub_at_center() {
		let (store, rendered) = fixture();
		let mut engine = LayoutEngine::new(&VisualizerConfig::default());
		engine.relayout(&store, &rendered, LayoutKind::Compact);
		assert!(!engine.is_running());
		let hub = engine.position(0).unwrap();
		assert_eq!(hub, Point::default());
		for node in 1..4 {
			let p = engine.position(node).unwrap();
			assert!((p.distance(&hub) - 40.0).abs() < 1e-9);
		}
	}

	#[test]
	fn force_run_settles_with_finite_positions() {
		let (store, rendered) = fixture();
		let config = VisualizerConfig::default();
		let mut engine = LayoutEngine::new(&config);
		engine.relayout(&store, &rendered, LayoutKind::Force);
		assert!(engine.is_running());
		engine.settle(&store, &rendered);

		let run = engine.current().unwrap();
		assert!(run.is_settled());
		assert_eq!(run.positions().len(), 4);
		assert!(
			run.positions()
				.values()
				.all(|p| p.x.is_finite() && p.y.is_finite())
		);
		if !run.fell_back() {
			assert_eq!(run.kind(), LayoutKind::Force);
		}
	}

	#[test]
	fn non_finite_force_run_falls_back_to_compact() {
		let (store, rendered) = fixture();
		let mut config = VisualizerConfig::default();
		config.force.time_step = f32::NAN;
		let mut engine = LayoutEngine::new(&config);
		engine.relayout(&store, &rendered, LayoutKind::Force);
		engine.settle(&store, &rendered);

		let run = engine.current().unwrap();
		assert!(run.is_settled());
		assert!(run.fell_back());
		assert_eq!(run.kind(), LayoutKind::Compact);
		assert_eq!(run.positions().len(), 4);
		assert!(
			run.positions()
				.values()
				.all(|p| p.x.is_finite() && p.y.is_finite())
		);
		assert_eq!(engine.position(0), Some(Point::default()));
	}

	#[test]
	fn iteration_budget_bounds_a_run() {
		let (store, rendered) = fixture();
		let mut config = VisualizerConfig::default();
		config.force.iterations = 3;
		config.force.convergence_tolerance = 0.0;
		config.force.steps_per_frame = 1;
		let mut engine = LayoutEngine::new(&config);
		engine.relayout(&store, &rendered, LayoutKind::Force);
		assert!(engine.tick(&store, &rendered));
		assert!(engine.tick(&store, &rendered));
		assert!(!engine.tick(&store, &rendered));
		assert!(!engine.is_running());
	}

	#[test]
	fn relayout_supersedes_running_layout() {
		let (store, rendered) = fixture();
		let mut engine = LayoutEngine::new(&VisualizerConfig::default());
		let first = engine.relayout(&store, &rendered, LayoutKind::Force);
		engine.tick(&store, &rendered);
		let second = engine.relayout(&store, &rendered, LayoutKind::Compact);
		assert!(second > first);
		assert_eq!(engine.current().unwrap().generation(), second);
		assert_eq!(engine.current().unwrap().kind(), LayoutKind::Compact);
		assert!(!engine.is_running());
	}

	#[test]
	fn empty_scene_is_settled_immediately() {
		let store = GraphStore::new(Default::default()).unwrap();
		let rendered = RenderedSet::default();
		let mut engine = LayoutEngine::new(&VisualizerConfig::default());
		engine.relayout(&store, &rendered, LayoutKind::Force);
		assert!(!engine.is_running());
		assert!(engine.current().unwrap().positions().is_empty());
	}

	#[test]
	fn moved_node_keeps_its_position() {
		let (store, rendered) = fixture();
		let mut engine = LayoutEngine::new(&VisualizerConfig::default());
		engine.relayout(&store, &rendered, LayoutKind::Compact);
		engine.move_node(2, Point { x: 7.0, y: -3.0 });
		assert_eq!(engine.position(2), Some(Point { x: 7.0, y: -3.0 }));
	}
}
