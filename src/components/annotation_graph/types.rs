use serde::{Deserialize, Serialize};

/// Category tag carried by gene nodes. The main layer is always rendered.
pub const MAIN_CATEGORY: &str = "main";

/// A gene or annotation term.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub definition: String,
	#[serde(rename = "group")]
	pub category: String,
}

impl GraphNode {
	pub fn is_main(&self) -> bool {
		self.category == MAIN_CATEGORY
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
	pub source: String,
	pub target: String,
	#[serde(rename = "group")]
	pub category: String,
}

/// The full annotation graph handed to the visualizer.
///
/// Serialized in element form: every node and edge is wrapped in a `data`
/// object, which is the shape the annotation service produces.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputGraph {
	#[serde(with = "elements")]
	pub nodes: Vec<GraphNode>,
	#[serde(with = "elements")]
	pub edges: Vec<GraphEdge>,
}

impl InputGraph {
	/// Total element count used by the minimal mode threshold.
	pub fn element_count(&self) -> usize {
		self.nodes.len() + self.edges.len()
	}
}

/// Details shown for the selected node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeDetails {
	pub id: String,
	pub name: String,
	pub definition: String,
}

impl From<&GraphNode> for NodeDetails {
	fn from(node: &GraphNode) -> Self {
		Self {
			id: node.id.clone(),
			name: node.name.clone(),
			definition: node.definition.clone(),
		}
	}
}

mod elements {
	use serde::{Deserialize, Deserializer, Serialize, Serializer};

	#[derive(Serialize, Deserialize)]
	struct Element<T> {
		data: T,
	}

	#[allow(clippy::ptr_arg)]
	pub fn serialize<S, T>(items: &Vec<T>, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
		T: Serialize,
	{
		serializer.collect_seq(items.iter().map(|data| Element { data }))
	}

	pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
	where
		D: Deserializer<'de>,
		T: Deserialize<'de>,
	{
		let wrapped = Vec::<Element<T>>::deserialize(deserializer)?;
		Ok(wrapped.into_iter().map(|e| e.data).collect())
	}
}
