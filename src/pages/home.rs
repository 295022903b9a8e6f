use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use serde_json::json;

use crate::components::joint_diagram::joint::{self, Graph, Link, Paper};
use crate::components::joint_diagram::{
	DiagramVersion, JointDiagram, MagnetMode, NodeDescriptor, PaperOptions, PortDescriptor,
};

const NODE_WIDTH: f64 = 160.0;
const NODE_HEIGHT: f64 = 60.0;
const PORT_SIZE: f64 = 14.0;

/// A chain of `n` stages, each with an input and an output port.
fn sample_nodes(n: usize) -> Vec<NodeDescriptor> {
	(0..n)
		.map(|i| {
			let title = format!("Stage {}", i + 1);
			NodeDescriptor::new(format!("stage{i}"), move || {
				view! {
					<div class="diagram-node">
						<strong>{title.clone()}</strong>
						<p class="subtitle">"rendered by Leptos"</p>
					</div>
				}
			})
			.with_size(NODE_WIDTH, NODE_HEIGHT)
			.with_position(40.0 + i as f64 * (NODE_WIDTH + 80.0), 80.0 + (i % 2) as f64 * 60.0)
			.with_port(
				PortDescriptor::new(format!("stage{i}-in"), || view! { <span class="port">"in"</span> })
					.with_size(PORT_SIZE, PORT_SIZE)
					.with_magnet(MagnetMode::Passive)
					.with_attr("group", "in"),
			)
			.with_port(
				PortDescriptor::new(format!("stage{i}-out"), || view! { <span class="port">"out"</span> })
					.with_size(PORT_SIZE, PORT_SIZE)
					.with_magnet(MagnetMode::Active)
					.with_attr("group", "out"),
			)
			.with_attr(
				"ports",
				json!({
					"groups": {
						"in": { "position": "left" },
						"out": { "position": "right" }
					}
				}),
			)
		})
		.collect()
}

fn sample_links(n: usize) -> Vec<Link> {
	(1..n)
		.filter_map(|i| {
			let attributes = json!({
				"source": { "id": format!("stage{}", i - 1), "port": format!("stage{}-out", i - 1) },
				"target": { "id": format!("stage{i}"), "port": format!("stage{i}-in") }
			});
			joint::link(&attributes)
				.map_err(|err| warn!("skipping link {i}: {err}"))
				.ok()
		})
		.collect()
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let (revision, set_revision) = signal(3usize);
	let nodes = Signal::derive(move || sample_nodes(revision.get()));
	let version = Signal::derive(move || Some(DiagramVersion(format!("v{}", revision.get()))));

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

			<div class="diagram-page">
				<div class="graph-overlay">
					<h1>"JointJS Diagram"</h1>
					<p class="subtitle">"Node and port bodies are Leptos views projected into the paper."</p>
					<button on:click=move |_| set_revision.update(|n| *n += 1)>"Add stage"</button>
				</div>
				<JointDiagram
					graph=Graph::new()
					nodes=nodes
					links=move || sample_links(revision.get_untracked())
					paper_options=PaperOptions::new()
						.width(1200.0)
						.height(400.0)
						.grid_size(10)
						.background("#1a1a2e")
					// built inside the boundary: its children must be Send
					on_paper_ready=Rc::new(|_: &Paper| info!("paper ready"))
					version=version
				/>
			</div>
		</ErrorBoundary>
	}
}
