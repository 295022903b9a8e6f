use leptos::portal::Portal;
use leptos::prelude::*;
use log::debug;

/// Looks up an anchor the paper rendered.
pub fn find_anchor(anchor: &str) -> Option<web_sys::Element> {
	web_sys::window()?.document()?.get_element_by_id(anchor)
}

/// Renders `content` inside the element with id `anchor`, keeping it part of
/// this component tree (context and event bubbling follow the tree, not the
/// DOM). Renders nothing while the anchor does not exist.
#[component]
pub fn AnchorPortal(#[prop(into)] anchor: String, content: ViewFn) -> impl IntoView {
	let Some(mount) = find_anchor(&anchor) else {
		debug!("anchor #{anchor} not in the document yet");
		return None;
	};
	Some(view! { <Portal mount=mount>{content.run()}</Portal> })
}
