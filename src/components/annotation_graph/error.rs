//! Error type shared by the visualizer core.

use thiserror::Error;

/// Errors raised while mounting, interacting with, or exporting a graph.
#[derive(Error, Debug)]
pub enum GraphError {
	// Structural errors, raised at mount
	#[error("Duplicate node id: {0}")]
	DuplicateNode(String),

	#[error("Edge #{index} references a missing node ({source_id} -> {target_id})")]
	DanglingEdge {
		index: usize,
		source_id: String,
		target_id: String,
	},

	// Interaction errors
	#[error("Node not found: {0}")]
	UnknownNode(String),

	#[error("Node is not rendered: {0}")]
	NodeNotRendered(String),

	// Export errors
	#[error("Failed to serialize graph: {0}")]
	Serialize(#[from] serde_json::Error),

	#[error("Export failed: {0}")]
	Export(String),

	#[error("Invalid configuration: {0}")]
	Config(String),
}

/// Result alias for visualizer operations.
pub type Result<T> = std::result::Result<T, GraphError>;
