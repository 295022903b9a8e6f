//! Engine seam between the synchronizer and a concrete diagram library.

use super::options::PaperOptions;
use super::translate::{NodeCell, PortSpec};

/// The slice of a diagramming engine the synchronizer drives.
///
/// Handles are cheap clones of engine-owned objects. Every fallible call
/// returns the engine's own error unchanged.
pub trait DiagramEngine {
	/// Graph model handle, owned by the caller.
	type Graph;
	/// View handle bound to a container and a graph.
	type Paper: Clone + 'static;
	/// Any cell: node or link.
	type Cell;
	/// Link handle supplied by the caller.
	type Link;
	/// DOM element the paper renders into.
	type Container;
	/// Whatever the engine throws.
	type Error;

	/// Builds a paper over `container` and `graph`; `options` keys override
	/// the computed `el`/`model`.
	fn create_paper(
		&self,
		container: &Self::Container,
		graph: &Self::Graph,
		options: &PaperOptions,
	) -> Result<Self::Paper, Self::Error>;

	/// Suspends render-on-mutation.
	fn freeze(&self, paper: &Self::Paper);

	/// Resumes rendering; everything mutated while frozen renders in one pass.
	fn unfreeze(&self, paper: &Self::Paper);

	/// Constructs a node cell from translated attributes.
	fn node_cell(&self, cell: &NodeCell) -> Result<Self::Cell, Self::Error>;

	/// Adds a port to a node cell built by `node_cell`.
	fn add_port(&self, node: &Self::Cell, port: &PortSpec) -> Result<(), Self::Error>;

	/// Views a caller link as a cell.
	fn link_cell(&self, link: &Self::Link) -> Self::Cell;

	/// Replaces the whole cell set in one call.
	fn reset_cells(&self, graph: &Self::Graph, cells: Vec<Self::Cell>) -> Result<(), Self::Error>;

	/// Single-cell insertion. Slower than `reset_cells` for bulk loads.
	fn add_cell(&self, graph: &Self::Graph, cell: Self::Cell) -> Result<(), Self::Error>;

	/// Removes every cell from the graph.
	fn clear(&self, graph: &Self::Graph);

	/// Runs `callback` on the next render completion only.
	fn once_render_done(&self, paper: &Self::Paper, callback: Box<dyn FnOnce()>);

	/// Detaches the paper view.
	fn remove_paper(&self, paper: &Self::Paper);
}
