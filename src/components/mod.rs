pub mod annotation_graph;
