use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failures surfaced while driving JointJS.
#[derive(Debug, Error)]
pub enum DiagramError {
	/// Whatever the engine threw, untouched.
	#[error("jointjs error: {0:?}")]
	Engine(JsValue),
	/// Attributes could not be converted to JS values.
	#[error("cannot hand attributes to jointjs: {0}")]
	Attributes(#[from] serde_wasm_bindgen::Error),
}

impl From<JsValue> for DiagramError {
	fn from(value: JsValue) -> Self {
		DiagramError::Engine(value)
	}
}
