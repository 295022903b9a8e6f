use std::rc::Rc;

use leptos::prelude::*;
use log::error;

use super::joint::{Graph, JointJs, Link, Paper};
use super::options::PaperOptions;
use super::portal::AnchorPortal;
use super::sync::{GraphSync, SyncState};
use super::types::{DiagramVersion, NodeDescriptor};

/// A JointJS paper whose nodes and ports host Leptos content.
///
/// `nodes` and `links` are read when the diagram (re)builds: on mount and
/// whenever `version` changes. Node and port content is projected into the
/// paper's `foreignObject` anchors once the paper has rendered.
#[component]
pub fn JointDiagram(
	/// Model the paper renders; the caller keeps its handle.
	graph: Graph,
	/// Node descriptors, in commit order.
	#[prop(into)]
	nodes: Signal<Vec<NodeDescriptor>>,
	/// Links appended after the nodes.
	links: impl Fn() -> Vec<Link> + 'static,
	/// Overrides for paper construction.
	#[prop(optional)]
	paper_options: PaperOptions,
	/// Receives the paper after its first render.
	#[prop(optional)]
	on_paper_ready: Option<Rc<dyn Fn(&Paper)>>,
	/// Changing it rebuilds every cell.
	#[prop(into, optional)]
	version: MaybeProp<DiagramVersion>,
) -> impl IntoView {
	let paper_ref = NodeRef::<leptos::html::Div>::new();
	let initialized = RwSignal::new(false);

	let mut sync = GraphSync::new(JointJs, graph, paper_options)
		.on_state_change(move |state| initialized.set(state == SyncState::Initialized));
	if let Some(on_paper_ready) = on_paper_ready {
		sync = sync.on_paper_ready(move |paper| on_paper_ready(paper));
	}
	let sync = StoredValue::new_local(sync);

	Effect::new(move |mounted: Option<bool>| {
		// the version is the only tracked input
		let version = version.get();
		let Some(container) = paper_ref.get() else {
			return mounted.unwrap_or(false);
		};
		let container: web_sys::Element = container.into();
		let (nodes, links) = (nodes.get_untracked(), untrack(&links));

		sync.update_value(|sync| {
			let result = if mounted == Some(true) {
				sync.on_version_change(version, &nodes, &links).map(|_| ())
			} else {
				sync.mount(&container, version, &nodes, &links)
			};
			if let Err(err) = result {
				error!("diagram sync failed: {err}");
			}
		});
		sync.with_value(|sync| sync.paper().is_some())
	});

	on_cleanup(move || {
		sync.try_update_value(|sync| sync.teardown());
	});

	// Not keyed by id: content for an existing id may change without a
	// version bump, so every portal is rebuilt from the latest descriptors.
	let anchors = move || {
		initialized.get().then(|| {
			nodes
				.get()
				.into_iter()
				.map(|node| {
					let ports = node
						.ports
						.iter()
						.map(|port| {
							view! { <AnchorPortal anchor=port.anchor_id() content=port.content.clone() /> }
						})
						.collect_view();
					view! {
						<AnchorPortal anchor=node.anchor_id() content=node.content.clone() />
						{ports}
					}
				})
				.collect_view()
		})
	};

	view! {
		<div node_ref=paper_ref class="leptos-joint-paper" />
		{anchors}
	}
}
