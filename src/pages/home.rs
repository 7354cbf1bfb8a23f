use leptos::prelude::*;
use log::info;

use crate::components::annotation_graph::{
	AnnotationGraphCanvas, GraphEdge, GraphNode, InputGraph, MAIN_CATEGORY, Presentation,
	VisualizerConfig,
};

fn gene(symbol: &str, definition: &str) -> GraphNode {
	GraphNode {
		id: symbol.to_string(),
		name: symbol.to_string(),
		definition: definition.to_string(),
		category: MAIN_CATEGORY.to_string(),
	}
}

fn term(id: &str, name: &str, category: &str) -> GraphNode {
	GraphNode {
		id: id.to_string(),
		name: name.to_string(),
		definition: String::new(),
		category: category.to_string(),
	}
}

fn link(source: &str, target: &str, category: &str) -> GraphEdge {
	GraphEdge {
		source: source.to_string(),
		target: target.to_string(),
		category: category.to_string(),
	}
}

/// A small annotation result: two genes with GO and Reactome terms.
fn sample_graph() -> InputGraph {
	InputGraph {
		nodes: vec![
			gene("TP53", "Cellular tumor antigen p53"),
			gene("MDM2", "E3 ubiquitin-protein ligase Mdm2"),
			term("GO:0006915", "apoptotic process", "GO"),
			term("GO:0006977", "DNA damage response, signal transduction by p53", "GO"),
			term("GO:0016567", "protein ubiquitination", "GO"),
			term("R-HSA-69541", "Stabilization of p53", "Reactome"),
			term("R-HSA-3700989", "Transcriptional Regulation by TP53", "Reactome"),
		],
		edges: vec![
			link("TP53", "GO:0006915", "GO"),
			link("TP53", "GO:0006977", "GO"),
			link("MDM2", "GO:0016567", "GO"),
			link("MDM2", "GO:0006977", "GO"),
			link("TP53", "R-HSA-69541", "Reactome"),
			link("MDM2", "R-HSA-69541", "Reactome"),
			link("TP53", "R-HSA-3700989", "Reactome"),
		],
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let graph = sample_graph();
	let categories = vec!["GO".to_string(), "Reactome".to_string()];
	let config = VisualizerConfig::default();
	let on_export_scheme = Callback::new(|_: ()| info!("Scheme export requested"));

	let body = match config.presentation(&graph) {
		Presentation::Visualize { minimal_mode } => view! {
			<div class="fullscreen-graph">
				<AnnotationGraphCanvas
					graph=graph
					categories=categories
					minimal_mode=minimal_mode
					config=config
					on_export_scheme=on_export_scheme
				/>
			</div>
		}
		.into_any(),
		Presentation::DownloadOnly => view! {
			<div class="graph-too-large">
				<h2>"The result graph is too large to visualize"</h2>
				<p>"Download the scheme file to inspect it locally."</p>
				<button on:click=move |_| on_export_scheme.run(())>"Download scheme"</button>
			</div>
		}
		.into_any(),
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			{body}
		</ErrorBoundary>
	}
}
