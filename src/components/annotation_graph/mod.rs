mod component;
pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod interaction;
pub mod layout;
pub mod palette;
mod render;
pub mod state;
pub mod store;
pub mod types;
pub mod viewport;
pub mod visibility;

pub use component::AnnotationGraphCanvas;
pub use config::{Presentation, VisualizerConfig};
pub use error::{GraphError, Result};
pub use state::AnnotationGraphState;
pub use types::{GraphEdge, GraphNode, InputGraph, MAIN_CATEGORY, NodeDetails};
