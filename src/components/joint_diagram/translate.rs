//! Descriptor to engine attribute translation.
//!
//! JointJS deep-clones every attribute a cell is constructed with, so only the
//! engine-relevant keys survive: rich content never crosses over, ports are
//! attached afterwards through `addPort`, and port size/magnet become markup.

use serde::Serialize;
use serde_json::{Map, Value};

use super::markup::{AnchorAttrs, markup_value, synthesize};
use super::types::{NodeDescriptor, PortDescriptor};

/// Attribute bag for a node cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NodeCell(#[allow(missing_docs)] pub Map<String, Value>);

/// Attribute bag for a port added to a node cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PortSpec(#[allow(missing_docs)] pub Map<String, Value>);

impl NodeCell {
	/// Looks up one attribute.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}
}

impl PortSpec {
	/// Looks up one attribute.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}
}

/// Node attributes without content or ports, plus anchor markup.
pub fn to_node_cell(node: &NodeDescriptor) -> NodeCell {
	let mut cell = node.attrs.clone();
	cell.insert("id".into(), node.id.clone().into());
	cell.insert("type".into(), node.kind.clone().into());
	cell.insert("size".into(), size_value(node.size.width, node.size.height));
	cell.insert(
		"position".into(),
		Value::Object(Map::from_iter([
			("x".to_owned(), node.position.x.into()),
			("y".to_owned(), node.position.y.into()),
		])),
	);
	cell.insert(
		"markup".into(),
		markup_value(synthesize(AnchorAttrs::new(
			node.anchor_id(),
			node.size.width,
			node.size.height,
		))),
	);
	NodeCell(cell)
}

/// Port attributes without content, size or magnet, plus anchor markup.
pub fn to_port_spec(port: &PortDescriptor) -> PortSpec {
	let mut spec = port.attrs.clone();
	// Caller bags may carry these; the typed fields are authoritative.
	spec.remove("size");
	spec.remove("magnet");
	spec.insert("id".into(), port.id.clone().into());

	let mut anchor = AnchorAttrs::new(port.anchor_id(), port.size.width, port.size.height);
	if let Some(magnet) = port.magnet.as_attr() {
		anchor = anchor.with("magnet", magnet);
	}
	spec.insert("markup".into(), markup_value(synthesize(anchor)));
	PortSpec(spec)
}

fn size_value(width: f64, height: f64) -> Value {
	Value::Object(Map::from_iter([
		("width".to_owned(), width.into()),
		("height".to_owned(), height.into()),
	]))
}
