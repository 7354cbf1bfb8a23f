//! Visualizer tuning knobs.
//!
//! Every field has a default, so an override document only needs the keys it
//! changes:
//!
//! ```json
//! { "minimal_mode_threshold": 400, "force": { "iterations": 300 } }
//! ```

use force_graph::SimulationParameters;
use serde::Deserialize;

use super::error::{GraphError, Result};
use super::types::InputGraph;

/// Physics knobs for the force-directed layout.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForceLayoutOptions {
	/// Upper bound on simulation steps for one layout run.
	pub iterations: usize,
	/// Node repulsion.
	pub force_charge: f32,
	/// Edge spring stiffness; lower values give longer edges.
	pub force_spring: f32,
	pub force_max: f32,
	pub node_speed: f32,
	pub damping_factor: f32,
	/// A run settles once no node moves further than this in one step.
	pub convergence_tolerance: f32,
	pub time_step: f32,
	/// Simulation steps advanced per animation frame.
	pub steps_per_frame: usize,
}

impl Default for ForceLayoutOptions {
	fn default() -> Self {
		Self {
			iterations: 600,
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			convergence_tolerance: 0.05,
			time_step: 0.016,
			steps_per_frame: 4,
		}
	}
}

impl ForceLayoutOptions {
	pub fn simulation_parameters(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: self.force_charge,
			force_spring: self.force_spring,
			force_max: self.force_max,
			node_speed: self.node_speed,
			damping_factor: self.damping_factor,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompactLayoutOptions {
	/// Distance between concentric rings.
	pub ring_spacing: f64,
}

impl Default for CompactLayoutOptions {
	fn default() -> Self {
		Self { ring_spacing: 40.0 }
	}
}

/// How a finished annotation result should be presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presentation {
	Visualize { minimal_mode: bool },
	/// Too large to draw; offer the download instead.
	DownloadOnly,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
	/// Graphs with this many nodes or more are never mounted.
	pub maximum_graph_size: usize,
	/// Element count above which minimal mode kicks in.
	pub minimal_mode_threshold: usize,
	/// Opacity of elements outside the focused neighborhood.
	pub dimmed_opacity: f64,
	pub history_limit: usize,
	pub force: ForceLayoutOptions,
	pub compact: CompactLayoutOptions,
}

impl Default for VisualizerConfig {
	fn default() -> Self {
		Self {
			maximum_graph_size: 1500,
			minimal_mode_threshold: 800,
			dimmed_opacity: 0.1,
			history_limit: 64,
			force: ForceLayoutOptions::default(),
			compact: CompactLayoutOptions::default(),
		}
	}
}

impl VisualizerConfig {
	/// Parse an override document; missing keys keep their defaults.
	pub fn from_json(json: &str) -> Result<Self> {
		serde_json::from_str(json).map_err(|e| GraphError::Config(e.to_string()))
	}

	pub fn is_minimal(&self, graph: &InputGraph) -> bool {
		graph.element_count() > self.minimal_mode_threshold
	}

	pub fn presentation(&self, graph: &InputGraph) -> Presentation {
		if graph.nodes.len() < self.maximum_graph_size {
			Presentation::Visualize {
				minimal_mode: self.is_minimal(graph),
			}
		} else {
			Presentation::DownloadOnly
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::annotation_graph::types::GraphNode;

	fn graph_with_nodes(n: usize) -> InputGraph {
		InputGraph {
			nodes: (0..n)
				.map(|i| GraphNode {
					id: i.to_string(),
					name: i.to_string(),
					definition: String::new(),
					category: "main".into(),
				})
				.collect(),
			edges: vec![],
		}
	}

	#[test]
	fn partial_override_keeps_defaults() {
		let config =
			VisualizerConfig::from_json(r#"{"minimal_mode_threshold": 5, "force": {"iterations": 10}}"#)
				.unwrap();
		assert_eq!(config.minimal_mode_threshold, 5);
		assert_eq!(config.force.iterations, 10);
		assert_eq!(config.force.force_charge, 150.0);
		assert_eq!(config.maximum_graph_size, 1500);
	}

	#[test]
	fn malformed_override_is_a_config_error() {
		let err = VisualizerConfig::from_json("{not json").unwrap_err();
		assert!(matches!(err, GraphError::Config(_)));
	}

	#[test]
	fn minimal_mode_is_strictly_above_threshold() {
		let config = VisualizerConfig {
			minimal_mode_threshold: 4,
			..Default::default()
		};
		assert!(!config.is_minimal(&graph_with_nodes(4)));
		assert!(config.is_minimal(&graph_with_nodes(5)));
	}

	#[test]
	fn ceiling_routes_to_download() {
		let config = VisualizerConfig {
			maximum_graph_size: 3,
			minimal_mode_threshold: 100,
			..Default::default()
		};
		assert_eq!(
			config.presentation(&graph_with_nodes(2)),
			Presentation::Visualize {
				minimal_mode: false
			}
		);
		assert_eq!(
			config.presentation(&graph_with_nodes(3)),
			Presentation::DownloadOnly
		);
	}
}
