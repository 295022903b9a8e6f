use serde::Serialize;
use serde_json::{Map, Value};

/// Caller overrides for `joint.dia.Paper` construction. Keys set here always
/// win over the `el`/`model` pair the component computes.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PaperOptions(Map<String, Value>);

impl PaperOptions {
	/// No overrides.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets any paper option by its JointJS name.
	pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.0.insert(key.into(), value.into());
		self
	}

	/// Paper width.
	pub fn width(self, width: f64) -> Self {
		self.set("width", width)
	}

	/// Paper height.
	pub fn height(self, height: f64) -> Self {
		self.set("height", height)
	}

	/// Snap grid, in paper units.
	pub fn grid_size(self, grid_size: u32) -> Self {
		self.set("gridSize", grid_size)
	}

	/// Whether cells can be dragged and links edited.
	pub fn interactive(self, interactive: bool) -> Self {
		self.set("interactive", interactive)
	}

	/// Solid background color.
	pub fn background(self, color: impl Into<String>) -> Self {
		let mut background = Map::new();
		background.insert("color".into(), Value::String(color.into()));
		self.set("background", Value::Object(background))
	}

	/// Render cells in asynchronous batches (`render:done` fires per batch run).
	pub fn async_render(self, enabled: bool) -> Self {
		self.set("async", enabled)
	}
}
