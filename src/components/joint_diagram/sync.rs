//! Engine lifecycle controller.
//!
//! `GraphSync` owns the paper for the lifetime of a mounted diagram and is the
//! only place that freezes, resets or clears it. A sync is strictly:
//!
//! freeze -> translate nodes/ports -> reset all cells -> listen once -> unfreeze
//!
//! The engine renders after `unfreeze` returns, on a later turn of the event
//! loop. Each sync registers a one-shot completion listener tagged with the
//! sync's epoch; a listener from a superseded sync finds a newer epoch and
//! does nothing.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, warn};

use super::engine::DiagramEngine;
use super::options::PaperOptions;
use super::translate::{to_node_cell, to_port_spec};
use super::types::{DiagramVersion, NodeDescriptor};

/// Where the synchronizer is in its mount/render cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncState {
	/// No paper yet, or torn down.
	#[default]
	Uninitialized,
	/// Cells handed over; waiting for the paper to render them.
	Syncing,
	/// The paper has rendered the latest batch; anchors exist in the DOM.
	Initialized,
}

type StateObserver = Rc<dyn Fn(SyncState)>;
type PaperReady<P> = Rc<dyn Fn(&P)>;

struct Shared<P> {
	state: SyncState,
	epoch: u64,
	ready_fired: bool,
	on_state: Option<StateObserver>,
	on_ready: Option<PaperReady<P>>,
}

/// Owns the paper and funnels every graph mutation through one batched sync.
pub struct GraphSync<E: DiagramEngine> {
	engine: E,
	graph: E::Graph,
	options: PaperOptions,
	paper: Option<E::Paper>,
	version: Option<DiagramVersion>,
	shared: Rc<RefCell<Shared<E::Paper>>>,
}

impl<E: DiagramEngine> GraphSync<E> {
	/// The paper is not created until [`GraphSync::mount`].
	pub fn new(engine: E, graph: E::Graph, options: PaperOptions) -> Self {
		Self {
			engine,
			graph,
			options,
			paper: None,
			version: None,
			shared: Rc::new(RefCell::new(Shared {
				state: SyncState::Uninitialized,
				epoch: 0,
				ready_fired: false,
				on_state: None,
				on_ready: None,
			})),
		}
	}

	/// Called with the paper the first time it finishes rendering. Never again
	/// for this synchronizer, whatever the number of resyncs.
	pub fn on_paper_ready(self, callback: impl Fn(&E::Paper) + 'static) -> Self {
		self.shared.borrow_mut().on_ready = Some(Rc::new(callback));
		self
	}

	/// Called on every state transition.
	pub fn on_state_change(self, callback: impl Fn(SyncState) + 'static) -> Self {
		self.shared.borrow_mut().on_state = Some(Rc::new(callback));
		self
	}

	/// Current state.
	pub fn state(&self) -> SyncState {
		self.shared.borrow().state
	}

	/// Whether the latest batch has rendered and anchors can be queried.
	pub fn is_initialized(&self) -> bool {
		self.state() == SyncState::Initialized
	}

	/// The live paper, read-only.
	pub fn paper(&self) -> Option<&E::Paper> {
		self.paper.as_ref()
	}

	/// Creates the paper on first use, then syncs.
	///
	/// `container` must already be attached to the document.
	pub fn mount(
		&mut self,
		container: &E::Container,
		version: Option<DiagramVersion>,
		nodes: &[NodeDescriptor],
		links: &[E::Link],
	) -> Result<(), E::Error> {
		if self.paper.is_none() {
			let paper = self.engine.create_paper(container, &self.graph, &self.options)?;
			debug!("paper created");
			self.paper = Some(paper);
		}
		self.version = version;
		self.sync(nodes, links)
	}

	/// Full rebuild when `version` differs from the recorded one. Returns
	/// whether a rebuild happened.
	pub fn on_version_change(
		&mut self,
		version: Option<DiagramVersion>,
		nodes: &[NodeDescriptor],
		links: &[E::Link],
	) -> Result<bool, E::Error> {
		if self.version == version {
			return Ok(false);
		}
		if self.paper.is_none() {
			warn!("version changed before the paper was mounted");
			self.version = version;
			return Ok(false);
		}
		debug!(
			"version {:?} -> {:?}, rebuilding",
			self.version.as_ref().map(ToString::to_string),
			version.as_ref().map(ToString::to_string)
		);
		self.version = version;
		self.engine.clear(&self.graph);
		self.sync(nodes, links)?;
		Ok(true)
	}

	/// Removes the paper. A later `mount` builds a fresh one.
	pub fn teardown(&mut self) {
		if let Some(paper) = self.paper.take() {
			self.engine.remove_paper(&paper);
		}
		self.shared.borrow_mut().epoch += 1;
		set_state(&self.shared, SyncState::Uninitialized);
	}

	fn sync(&mut self, nodes: &[NodeDescriptor], links: &[E::Link]) -> Result<(), E::Error> {
		let Some(paper) = self.paper.clone() else {
			return Ok(());
		};
		let epoch = {
			let mut shared = self.shared.borrow_mut();
			shared.epoch += 1;
			shared.epoch
		};
		set_state(&self.shared, SyncState::Syncing);

		self.engine.freeze(&paper);

		let mut cells = Vec::with_capacity(nodes.len() + links.len());
		for node in nodes {
			let cell = self.engine.node_cell(&to_node_cell(node))?;
			for port in &node.ports {
				self.engine.add_port(&cell, &to_port_spec(port))?;
			}
			cells.push(cell);
		}
		cells.extend(links.iter().map(|link| self.engine.link_cell(link)));
		debug!(
			"sync #{epoch}: {} nodes, {} links in one reset",
			nodes.len(),
			links.len()
		);
		self.engine.reset_cells(&self.graph, cells)?;

		let shared = Rc::downgrade(&self.shared);
		let rendered = paper.clone();
		self.engine.once_render_done(
			&paper,
			Box::new(move || complete(&shared, epoch, &rendered)),
		);

		self.engine.unfreeze(&paper);
		Ok(())
	}
}

fn set_state<P>(shared: &Rc<RefCell<Shared<P>>>, state: SyncState) {
	let observer = {
		let mut shared = shared.borrow_mut();
		if shared.state == state {
			return;
		}
		shared.state = state;
		shared.on_state.clone()
	};
	if let Some(observer) = observer {
		observer(state);
	}
}

fn complete<P>(shared: &Weak<RefCell<Shared<P>>>, epoch: u64, paper: &P) {
	let Some(shared) = shared.upgrade() else {
		return;
	};
	let ready = {
		let mut inner = shared.borrow_mut();
		if inner.epoch != epoch || inner.state != SyncState::Syncing {
			warn!("ignoring render completion of superseded sync #{epoch}");
			return;
		}
		if inner.ready_fired {
			None
		} else {
			inner.ready_fired = true;
			inner.on_ready.clone()
		}
	};
	set_state(&shared, SyncState::Initialized);
	if let Some(ready) = ready {
		ready(paper);
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;

	use serde_json::Value;

	use super::*;
	use crate::components::joint_diagram::translate::{NodeCell, PortSpec};
	use crate::components::joint_diagram::types::PortDescriptor;

	#[derive(Clone, Debug, PartialEq)]
	enum Call {
		CreatePaper(u32),
		Freeze,
		Unfreeze,
		NodeCell(String),
		AddPort(String, String),
		ResetCells(Vec<String>),
		AddCell,
		Clear,
		OnceRenderDone,
		RemovePaper(u32),
	}

	#[derive(Clone, Default)]
	struct FakeEngine {
		calls: Rc<RefCell<Vec<Call>>>,
		listeners: Rc<RefCell<Vec<Box<dyn FnOnce()>>>>,
		cells: Rc<RefCell<Vec<String>>>,
		papers: Rc<Cell<u32>>,
		fail_reset: Rc<Cell<bool>>,
	}

	impl FakeEngine {
		fn record(&self, call: Call) {
			self.calls.borrow_mut().push(call);
		}

		fn calls(&self) -> Vec<Call> {
			self.calls.borrow().clone()
		}

		/// Fires every pending one-shot completion listener.
		fn finish_render(&self) {
			let pending: Vec<_> = self.listeners.borrow_mut().drain(..).collect();
			for listener in pending {
				listener();
			}
		}
	}

	fn id_of(value: Option<&Value>) -> Result<String, String> {
		value
			.and_then(Value::as_str)
			.map(str::to_owned)
			.ok_or_else(|| "missing id".to_owned())
	}

	impl DiagramEngine for FakeEngine {
		type Graph = ();
		type Paper = u32;
		type Cell = String;
		type Link = String;
		type Container = ();
		type Error = String;

		fn create_paper(&self, _: &(), _: &(), _: &PaperOptions) -> Result<u32, String> {
			let id = self.papers.get() + 1;
			self.papers.set(id);
			self.record(Call::CreatePaper(id));
			Ok(id)
		}

		fn freeze(&self, _: &u32) {
			self.record(Call::Freeze);
		}

		fn unfreeze(&self, _: &u32) {
			self.record(Call::Unfreeze);
		}

		fn node_cell(&self, cell: &NodeCell) -> Result<String, String> {
			let id = id_of(cell.get("id"))?;
			self.record(Call::NodeCell(id.clone()));
			Ok(id)
		}

		fn add_port(&self, node: &String, port: &PortSpec) -> Result<(), String> {
			self.record(Call::AddPort(node.clone(), id_of(port.get("id"))?));
			Ok(())
		}

		fn link_cell(&self, link: &String) -> String {
			link.clone()
		}

		fn reset_cells(&self, _: &(), cells: Vec<String>) -> Result<(), String> {
			if self.fail_reset.get() {
				return Err("reset refused".into());
			}
			self.record(Call::ResetCells(cells.clone()));
			*self.cells.borrow_mut() = cells;
			Ok(())
		}

		fn add_cell(&self, _: &(), cell: String) -> Result<(), String> {
			self.record(Call::AddCell);
			self.cells.borrow_mut().push(cell);
			Ok(())
		}

		fn clear(&self, _: &()) {
			self.record(Call::Clear);
			self.cells.borrow_mut().clear();
		}

		fn once_render_done(&self, _: &u32, callback: Box<dyn FnOnce()>) {
			self.record(Call::OnceRenderDone);
			self.listeners.borrow_mut().push(callback);
		}

		fn remove_paper(&self, paper: &u32) {
			self.record(Call::RemovePaper(*paper));
		}
	}

	fn nodes(prefix: &str, count: usize, ports: usize) -> Vec<NodeDescriptor> {
		(0..count)
			.map(|i| {
				let mut node = NodeDescriptor::new(format!("{prefix}{i}"), || "node");
				for p in 0..ports {
					node = node.with_port(PortDescriptor::new(format!("{prefix}{i}p{p}"), || "port"));
				}
				node
			})
			.collect()
	}

	fn synchronizer(engine: &FakeEngine) -> GraphSync<FakeEngine> {
		GraphSync::new(engine.clone(), (), PaperOptions::new())
	}

	#[test]
	fn one_reset_per_sync() {
		let engine = FakeEngine::default();
		let mut sync = synchronizer(&engine);
		sync.mount(&(), None, &nodes("n", 3, 2), &["l0".to_owned()]).unwrap();

		let calls = engine.calls();
		let resets: Vec<_> = calls.iter().filter(|c| matches!(c, Call::ResetCells(_))).collect();
		assert_eq!(
			resets,
			[&Call::ResetCells(vec!["n0".into(), "n1".into(), "n2".into(), "l0".into()])]
		);
		assert!(!calls.contains(&Call::AddCell));
		assert_eq!(calls.iter().filter(|c| matches!(c, Call::AddPort(..))).count(), 6);
	}

	#[test]
	fn mutations_happen_while_frozen() {
		let engine = FakeEngine::default();
		let mut sync = synchronizer(&engine);
		sync.mount(&(), None, &nodes("n", 1, 1), &[]).unwrap();

		assert_eq!(
			engine.calls(),
			[
				Call::CreatePaper(1),
				Call::Freeze,
				Call::NodeCell("n0".into()),
				Call::AddPort("n0".into(), "n0p0".into()),
				Call::ResetCells(vec!["n0".into()]),
				Call::OnceRenderDone,
				Call::Unfreeze,
			]
		);
	}

	#[test]
	fn initialized_only_after_render_completes() {
		let engine = FakeEngine::default();
		let mut sync = synchronizer(&engine);
		assert_eq!(sync.state(), SyncState::Uninitialized);

		sync.mount(&(), None, &nodes("n", 2, 0), &[]).unwrap();
		assert_eq!(sync.state(), SyncState::Syncing);
		assert!(!sync.is_initialized());

		engine.finish_render();
		assert!(sync.is_initialized());
	}

	#[test]
	fn version_change_clears_before_rebuilding() {
		let engine = FakeEngine::default();
		let mut sync = synchronizer(&engine);
		sync.mount(&(), Some("v1".into()), &nodes("old", 2, 0), &[]).unwrap();
		engine.finish_render();
		engine.calls.borrow_mut().clear();

		let rebuilt = sync.on_version_change(Some("v2".into()), &nodes("new", 2, 0), &[]).unwrap();

		assert!(rebuilt);
		assert_eq!(sync.state(), SyncState::Syncing);
		let calls = engine.calls();
		let clear = calls.iter().position(|c| *c == Call::Clear).unwrap();
		let first_node = calls.iter().position(|c| matches!(c, Call::NodeCell(_))).unwrap();
		assert!(clear < first_node);
		assert_eq!(*engine.cells.borrow(), ["new0", "new1"]);
		assert!(!calls.iter().any(|c| matches!(c, Call::CreatePaper(_))));

		engine.finish_render();
		assert!(sync.is_initialized());
	}

	#[test]
	fn same_or_missing_version_is_a_no_op() {
		let engine = FakeEngine::default();
		let mut sync = synchronizer(&engine);
		sync.mount(&(), Some("v1".into()), &nodes("n", 1, 0), &[]).unwrap();
		engine.finish_render();
		engine.calls.borrow_mut().clear();

		assert!(!sync.on_version_change(Some("v1".into()), &nodes("x", 1, 0), &[]).unwrap());
		assert!(engine.calls().is_empty());
		assert!(sync.is_initialized());

		let engine = FakeEngine::default();
		let mut sync = synchronizer(&engine);
		sync.mount(&(), None, &nodes("n", 1, 0), &[]).unwrap();
		engine.calls.borrow_mut().clear();
		assert!(!sync.on_version_change(None, &nodes("x", 1, 0), &[]).unwrap());
		assert!(engine.calls().is_empty());
	}

	#[test]
	fn paper_ready_fires_once() {
		let engine = FakeEngine::default();
		let fired = Rc::new(Cell::new(0));
		let counter = fired.clone();
		let mut sync = synchronizer(&engine).on_paper_ready(move |paper| {
			assert_eq!(*paper, 1);
			counter.set(counter.get() + 1);
		});

		sync.mount(&(), Some("v1".into()), &nodes("n", 1, 0), &[]).unwrap();
		assert_eq!(fired.get(), 0);
		engine.finish_render();
		assert_eq!(fired.get(), 1);

		for version in ["v2", "v3"] {
			sync.on_version_change(Some(version.into()), &nodes("n", 1, 0), &[]).unwrap();
			engine.finish_render();
		}
		assert_eq!(fired.get(), 1);
		assert!(sync.is_initialized());
	}

	#[test]
	fn superseded_listener_is_ignored() {
		let engine = FakeEngine::default();
		let transitions = Rc::new(RefCell::new(Vec::new()));
		let seen = transitions.clone();
		let fired = Rc::new(Cell::new(0));
		let counter = fired.clone();
		let mut sync = synchronizer(&engine)
			.on_state_change(move |state| seen.borrow_mut().push(state))
			.on_paper_ready(move |_| counter.set(counter.get() + 1));

		sync.mount(&(), Some("v1".into()), &nodes("a", 1, 0), &[]).unwrap();
		// resync before the first render completed
		sync.on_version_change(Some("v2".into()), &nodes("b", 1, 0), &[]).unwrap();
		assert_eq!(engine.listeners.borrow().len(), 2);

		engine.finish_render();
		assert!(sync.is_initialized());
		assert_eq!(fired.get(), 1);
		assert_eq!(
			*transitions.borrow(),
			[SyncState::Syncing, SyncState::Initialized]
		);
		assert!(engine.listeners.borrow().is_empty());
	}

	#[test]
	fn failed_sync_stays_syncing() {
		let engine = FakeEngine::default();
		engine.fail_reset.set(true);
		let fired = Rc::new(Cell::new(false));
		let flag = fired.clone();
		let mut sync = synchronizer(&engine).on_paper_ready(move |_| flag.set(true));

		let err = sync.mount(&(), None, &nodes("n", 1, 0), &[]).unwrap_err();
		assert_eq!(err, "reset refused");
		assert_eq!(sync.state(), SyncState::Syncing);
		engine.finish_render();
		assert!(!fired.get());
		assert!(sync.paper().is_some());
	}

	#[test]
	fn teardown_drops_the_paper() {
		let engine = FakeEngine::default();
		let fired = Rc::new(Cell::new(0));
		let counter = fired.clone();
		let mut sync = synchronizer(&engine).on_paper_ready(move |_| counter.set(counter.get() + 1));
		sync.mount(&(), None, &nodes("n", 1, 0), &[]).unwrap();
		engine.finish_render();

		sync.teardown();
		assert_eq!(sync.state(), SyncState::Uninitialized);
		assert!(sync.paper().is_none());
		assert!(engine.calls().contains(&Call::RemovePaper(1)));

		sync.mount(&(), None, &nodes("n", 1, 0), &[]).unwrap();
		engine.finish_render();
		assert_eq!(sync.paper(), Some(&2));
		assert_eq!(fired.get(), 1);
	}

	#[test]
	fn late_listener_after_teardown_is_ignored() {
		let engine = FakeEngine::default();
		let mut sync = synchronizer(&engine);
		sync.mount(&(), None, &nodes("n", 1, 0), &[]).unwrap();
		sync.teardown();
		engine.finish_render();
		assert_eq!(sync.state(), SyncState::Uninitialized);
	}
}
