use std::fmt;

use leptos::prelude::*;
use serde::Serialize;
use serde_json::{Map, Value};

/// Prefix of a node's anchor id.
pub const NODE_ANCHOR_PREFIX: &str = "node_";
/// Prefix of a port's anchor id.
pub const PORT_ANCHOR_PREFIX: &str = "port_";

/// Width and height in paper units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Size {
	#[allow(missing_docs)]
	pub width: f64,
	#[allow(missing_docs)]
	pub height: f64,
}

/// Top-left corner in paper units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Position {
	#[allow(missing_docs)]
	pub x: f64,
	#[allow(missing_docs)]
	pub y: f64,
}

/// How a port reacts to link dragging. `None` means the engine never sees a
/// `magnet` attribute at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MagnetMode {
	/// Links can start here.
	Active,
	/// Links can only end here.
	Passive,
	/// No magnet attribute.
	#[default]
	None,
}

impl MagnetMode {
	/// The `magnet` attribute value, if any.
	pub fn as_attr(self) -> Option<&'static str> {
		match self {
			MagnetMode::Active => Some("active"),
			MagnetMode::Passive => Some("passive"),
			MagnetMode::None => None,
		}
	}
}

/// Opaque token; a change means "discard every cell and rebuild".
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DiagramVersion(#[allow(missing_docs)] pub String);

impl From<&str> for DiagramVersion {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}

impl From<String> for DiagramVersion {
	fn from(value: String) -> Self {
		Self(value)
	}
}

impl fmt::Display for DiagramVersion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// A port hosted by a node. `content` is projected into the `port_<id>` anchor.
#[derive(Clone)]
pub struct PortDescriptor {
	/// Unique within the owning node.
	pub id: String,
	/// Rendered into the port's anchor.
	pub content: ViewFn,
	/// Size of the anchor container.
	pub size: Size,
	#[allow(missing_docs)]
	pub magnet: MagnetMode,
	/// Engine-native attributes (`group`, `args`, `attrs`, ...) forwarded as-is.
	pub attrs: Map<String, Value>,
}

impl PortDescriptor {
	/// A zero-sized port without magnet.
	pub fn new(id: impl Into<String>, content: impl Into<ViewFn>) -> Self {
		Self {
			id: id.into(),
			content: content.into(),
			size: Size::default(),
			magnet: MagnetMode::default(),
			attrs: Map::new(),
		}
	}

	/// Sets the anchor size.
	pub fn with_size(mut self, width: f64, height: f64) -> Self {
		self.size = Size { width, height };
		self
	}

	/// Sets the magnet mode.
	pub fn with_magnet(mut self, magnet: MagnetMode) -> Self {
		self.magnet = magnet;
		self
	}

	/// Adds an engine-native attribute.
	pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.attrs.insert(key.into(), value.into());
		self
	}

	/// The DOM id content is projected into.
	pub fn anchor_id(&self) -> String {
		format!("{PORT_ANCHOR_PREFIX}{}", self.id)
	}
}

impl fmt::Debug for PortDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PortDescriptor")
			.field("id", &self.id)
			.field("size", &self.size)
			.field("magnet", &self.magnet)
			.field("attrs", &self.attrs)
			.finish_non_exhaustive()
	}
}

/// A diagram node. `content` is projected into the `node_<id>` anchor once the
/// paper has rendered.
#[derive(Clone)]
pub struct NodeDescriptor {
	/// Unique within the diagram.
	pub id: String,
	/// Rendered into the node's anchor.
	pub content: ViewFn,
	/// Engine shape type, sent as `type`.
	pub kind: String,
	#[allow(missing_docs)]
	pub size: Size,
	#[allow(missing_docs)]
	pub position: Position,
	/// Attached through the engine's port API, never as an initial attribute.
	pub ports: Vec<PortDescriptor>,
	/// Engine-native attributes forwarded as-is.
	pub attrs: Map<String, Value>,
}

impl NodeDescriptor {
	/// A `basic.Generic` node at the origin.
	pub fn new(id: impl Into<String>, content: impl Into<ViewFn>) -> Self {
		Self {
			id: id.into(),
			content: content.into(),
			kind: "basic.Generic".into(),
			size: Size::default(),
			position: Position::default(),
			ports: Vec::new(),
			attrs: Map::new(),
		}
	}

	/// Sets the engine shape type.
	pub fn with_type(mut self, kind: impl Into<String>) -> Self {
		self.kind = kind.into();
		self
	}

	/// Sets the anchor size.
	pub fn with_size(mut self, width: f64, height: f64) -> Self {
		self.size = Size { width, height };
		self
	}

	/// Sets the position.
	pub fn with_position(mut self, x: f64, y: f64) -> Self {
		self.position = Position { x, y };
		self
	}

	/// Appends a port.
	pub fn with_port(mut self, port: PortDescriptor) -> Self {
		self.ports.push(port);
		self
	}

	/// Adds an engine-native attribute.
	pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.attrs.insert(key.into(), value.into());
		self
	}

	/// The DOM id content is projected into.
	pub fn anchor_id(&self) -> String {
		format!("{NODE_ANCHOR_PREFIX}{}", self.id)
	}
}

impl fmt::Debug for NodeDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NodeDescriptor")
			.field("id", &self.id)
			.field("kind", &self.kind)
			.field("size", &self.size)
			.field("position", &self.position)
			.field("ports", &self.ports)
			.field("attrs", &self.attrs)
			.finish_non_exhaustive()
	}
}
