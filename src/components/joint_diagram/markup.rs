//! Structured markup for the anchor containers the paper renders.
//!
//! JointJS accepts markup as a string or as a JSON descriptor list. The
//! descriptor form skips the XML parse the engine would do for every cell.

use serde::Serialize;
use serde_json::{Map, Value};

/// Tag of the embeddable container every anchor is.
pub const FOREIGN_OBJECT: &str = "foreignObject";

/// One element of JSON markup.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupElement {
	#[allow(missing_docs)]
	pub tag_name: &'static str,
	#[allow(missing_docs)]
	pub attributes: Map<String, Value>,
}

impl From<MarkupElement> for Value {
	fn from(element: MarkupElement) -> Self {
		let mut object = Map::new();
		object.insert("tagName".into(), element.tag_name.into());
		object.insert("attributes".into(), Value::Object(element.attributes));
		Value::Object(object)
	}
}

/// Markup in JointJS JSON form: a list of elements.
pub type Markup = Vec<MarkupElement>;

/// Markup as the JSON value cells carry under `markup`.
pub fn markup_value(markup: Markup) -> Value {
	Value::Array(markup.into_iter().map(Value::from).collect())
}

/// Anchor container attributes. `extra` is passed through untouched.
#[derive(Clone, Debug, Default)]
#[allow(missing_docs)]
pub struct AnchorAttrs {
	pub width: f64,
	pub height: f64,
	pub id: String,
	pub extra: Map<String, Value>,
}

impl AnchorAttrs {
	/// Container `id` sized `width` x `height`.
	pub fn new(id: impl Into<String>, width: f64, height: f64) -> Self {
		Self {
			width,
			height,
			id: id.into(),
			extra: Map::new(),
		}
	}

	/// Adds an extra attribute.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.extra.insert(key.into(), value.into());
		self
	}
}

/// A single `foreignObject` carrying exactly the supplied attributes.
pub fn synthesize(attrs: AnchorAttrs) -> Markup {
	let mut attributes = Map::new();
	attributes.insert("width".into(), attrs.width.into());
	attributes.insert("height".into(), attrs.height.into());
	attributes.insert("id".into(), attrs.id.into());
	attributes.extend(attrs.extra);

	vec![MarkupElement {
		tag_name: FOREIGN_OBJECT,
		attributes,
	}]
}
