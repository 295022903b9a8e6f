//! `wasm-bindgen` bindings for the parts of JointJS the diagram drives.
//!
//! Expects the global `joint` namespace (JointJS loaded with a script tag).

use js_sys::{Array, Object, Reflect};
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use super::engine::DiagramEngine;
use super::error::DiagramError;
use super::options::PaperOptions;
use super::translate::{NodeCell, PortSpec};

#[wasm_bindgen(js_namespace = ["joint", "dia"])]
extern "C" {
	/// `joint.dia.Cell`
	#[derive(Clone, Debug)]
	pub type Cell;

	/// `joint.dia.Element`
	#[wasm_bindgen(extends = Cell)]
	#[derive(Clone, Debug)]
	pub type Element;

	#[wasm_bindgen(method, catch, js_name = addPort)]
	fn add_port(this: &Element, port: &JsValue) -> Result<JsValue, JsValue>;
}

#[wasm_bindgen(js_namespace = ["joint", "dia"])]
extern "C" {
	/// `joint.dia.Link`
	#[wasm_bindgen(extends = Cell)]
	#[derive(Clone, Debug)]
	pub type Link;

	#[wasm_bindgen(constructor, catch)]
	fn new(attributes: &JsValue) -> Result<Link, JsValue>;
}

#[wasm_bindgen(js_namespace = ["joint", "dia"])]
extern "C" {
	/// `joint.dia.Graph`
	#[derive(Clone, Debug)]
	pub type Graph;

	/// An empty graph.
	#[wasm_bindgen(constructor)]
	pub fn new() -> Graph;

	#[wasm_bindgen(method, catch, js_name = resetCells)]
	fn reset_cells(this: &Graph, cells: &Array) -> Result<JsValue, JsValue>;

	#[wasm_bindgen(method, catch, js_name = addCell)]
	fn add_cell(this: &Graph, cell: &Cell) -> Result<JsValue, JsValue>;

	#[wasm_bindgen(method)]
	fn clear(this: &Graph);
}

#[wasm_bindgen(js_namespace = ["joint", "dia"])]
extern "C" {
	/// `joint.dia.Paper`
	#[derive(Clone, Debug)]
	pub type Paper;

	#[wasm_bindgen(constructor, catch)]
	fn new(options: &Object) -> Result<Paper, JsValue>;

	#[wasm_bindgen(method)]
	fn freeze(this: &Paper);

	#[wasm_bindgen(method)]
	fn unfreeze(this: &Paper);

	#[wasm_bindgen(method)]
	fn once(this: &Paper, event: &str, callback: &JsValue);

	#[wasm_bindgen(method)]
	fn remove(this: &Paper);
}

#[wasm_bindgen(js_namespace = ["joint", "shapes", "basic"])]
extern "C" {
	/// `joint.shapes.basic.Generic`, the shell every node is built on.
	#[wasm_bindgen(extends = Element, extends = Cell)]
	#[derive(Clone, Debug)]
	type Generic;

	#[wasm_bindgen(constructor, catch)]
	fn new(attributes: &JsValue) -> Result<Generic, JsValue>;
}

const RENDER_DONE: &str = "render:done";

/// Plain JS objects for maps, so JointJS can read the attributes.
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, DiagramError> {
	Ok(value.serialize(&Serializer::json_compatible())?)
}

/// Builds a `joint.dia.Link` from a JSON attribute bag.
pub fn link(attributes: &serde_json::Value) -> Result<Link, DiagramError> {
	Ok(Link::new(&to_js(attributes)?)?)
}

/// JointJS as seen by the synchronizer.
#[derive(Clone, Copy, Debug, Default)]
pub struct JointJs;

impl DiagramEngine for JointJs {
	type Graph = Graph;
	type Paper = Paper;
	type Cell = Cell;
	type Link = Link;
	type Container = web_sys::Element;
	type Error = DiagramError;

	fn create_paper(
		&self,
		container: &web_sys::Element,
		graph: &Graph,
		options: &PaperOptions,
	) -> Result<Paper, DiagramError> {
		let defaults = Object::new();
		Reflect::set(&defaults, &"el".into(), container.as_ref())?;
		Reflect::set(&defaults, &"model".into(), graph.as_ref())?;
		let overrides: Object = to_js(options)?.unchecked_into();
		Ok(Paper::new(&Object::assign(&defaults, &overrides))?)
	}

	fn freeze(&self, paper: &Paper) {
		paper.freeze();
	}

	fn unfreeze(&self, paper: &Paper) {
		paper.unfreeze();
	}

	fn node_cell(&self, cell: &NodeCell) -> Result<Cell, DiagramError> {
		Ok(Generic::new(&to_js(cell)?)?.into())
	}

	fn add_port(&self, node: &Cell, port: &PortSpec) -> Result<(), DiagramError> {
		node.unchecked_ref::<Element>().add_port(&to_js(port)?)?;
		Ok(())
	}

	fn link_cell(&self, link: &Link) -> Cell {
		link.clone().into()
	}

	fn reset_cells(&self, graph: &Graph, cells: Vec<Cell>) -> Result<(), DiagramError> {
		graph.reset_cells(&cells.into_iter().collect::<Array>())?;
		Ok(())
	}

	fn add_cell(&self, graph: &Graph, cell: Cell) -> Result<(), DiagramError> {
		graph.add_cell(&cell)?;
		Ok(())
	}

	fn clear(&self, graph: &Graph) {
		graph.clear();
	}

	fn once_render_done(&self, paper: &Paper, callback: Box<dyn FnOnce()>) {
		// Freed by wasm-bindgen after the single invocation.
		paper.once(RENDER_DONE, &Closure::once_into_js(move || callback()));
	}

	fn remove_paper(&self, paper: &Paper) {
		paper.remove();
	}
}
