//! Downloadable artifacts: a JPEG of the current view and the full input
//! graph as JSON. The scheme file is produced by the caller.

use log::info;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlAnchorElement, HtmlCanvasElement};

use super::error::{GraphError, Result};
use super::types::InputGraph;

pub const SNAPSHOT_FILE_NAME: &str = "mozi-graph.jpg";
pub const GRAPH_JSON_FILE_NAME: &str = "annotation-graph.json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
	/// Already a `data:` URL, e.g. an encoded canvas.
	DataUrl(String),
	Text { mime: &'static str, body: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Download {
	pub file_name: &'static str,
	pub payload: Payload,
}

/// Serialize the whole input graph, independent of what is rendered.
pub fn graph_json(graph: &InputGraph) -> Result<String> {
	Ok(serde_json::to_string(graph)?)
}

pub fn graph_json_download(graph: &InputGraph) -> Result<Download> {
	Ok(Download {
		file_name: GRAPH_JSON_FILE_NAME,
		payload: Payload::Text {
			mime: "text/json",
			body: graph_json(graph)?,
		},
	})
}

/// Encode what the canvas currently shows as a JPEG.
pub fn snapshot(canvas: &HtmlCanvasElement) -> Result<Download> {
	let url = canvas
		.to_data_url_with_type("image/jpeg")
		.map_err(js_error)?;
	Ok(Download {
		file_name: SNAPSHOT_FILE_NAME,
		payload: Payload::DataUrl(url),
	})
}

/// Hand a download to the browser through a transient anchor.
pub fn deliver(download: &Download) -> Result<()> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| GraphError::Export("no document available".into()))?;
	let link: HtmlAnchorElement = document
		.create_element("a")
		.map_err(js_error)?
		.dyn_into()
		.map_err(|_| GraphError::Export("could not create download link".into()))?;

	let href = match &download.payload {
		Payload::DataUrl(url) => url.clone(),
		Payload::Text { mime, body } => format!(
			"data:{};charset=utf-8,{}",
			mime,
			String::from(js_sys::encode_uri_component(body))
		),
	};
	link.set_href(&href);
	link.set_download(download.file_name);
	link.click();
	info!("Delivered {}", download.file_name);
	Ok(())
}

fn js_error(err: JsValue) -> GraphError {
	GraphError::Export(format!("{:?}", err))
}
