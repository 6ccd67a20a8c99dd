//! Reactive Runtime
//!
//! This module provides the core reactive runtime for managing Signal dependencies,
//! Effect execution, and update scheduling.
//!
//! ## Architecture
//!
//! The reactive system is based on a pull-based reactivity model similar to Solid.js:
//!
//! 1. **Observer Stack**: Tracks currently executing Effects
//! 2. **Dependency Tracking**: Automatically records dependencies when `Signal::get()` is called
//! 3. **Update Scheduling**: Batches multiple Signal changes into a single update cycle
//! 4. **Flushing**: Pending effects run when the installed scheduler fires, or on
//!    an explicit [`flush_updates`] call
//!
//! ## Example
//!
//! ```ignore
//! use kura_reactive::{Effect, Signal, flush_updates};
//!
//! let count = Signal::new(0);
//!
//! let _effect = Effect::new({
//!     let count = count.clone();
//!     move || println!("Count is: {}", count.get())
//! });
//!
//! count.set(42);
//! flush_updates(); // Prints "Count is: 42"
//! ```

use core::cell::{Cell, RefCell};
use core::sync::atomic::{AtomicUsize, Ordering};

use std::collections::BTreeMap;

/// Unique identifier for reactive nodes (Signals, Effects)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
	/// Create a new unique NodeId
	pub fn new() -> Self {
		static COUNTER: AtomicUsize = AtomicUsize::new(0);
		Self(COUNTER.fetch_add(1, Ordering::Relaxed))
	}
}

impl Default for NodeId {
	fn default() -> Self {
		Self::new()
	}
}

/// Dependency graph node
#[derive(Debug, Default)]
pub(crate) struct DependencyNode {
	/// IDs of nodes that depend on this node
	pub(crate) subscribers: Vec<NodeId>,
	/// IDs of nodes this node depends on
	pub(crate) dependencies: Vec<NodeId>,
}

/// Type for the task scheduler function
type SchedulerFn = Box<dyn Fn(Box<dyn FnOnce()>)>;

thread_local! {
	static SCHEDULER: RefCell<Option<SchedulerFn>> = const { RefCell::new(None) };
}

/// Set the scheduler used to flush pending effects for the current thread.
///
/// Without a scheduler, pending effects only run when [`flush_updates`] is
/// called. In the browser this would typically defer to a microtask:
///
/// ```ignore
/// kura_reactive::set_scheduler(|task| {
///     wasm_bindgen_futures::spawn_local(async move { task() });
/// });
/// ```
pub fn set_scheduler<F>(scheduler: F)
where
	F: Fn(Box<dyn FnOnce()>) + 'static,
{
	SCHEDULER.with(|slot| *slot.borrow_mut() = Some(Box::new(scheduler)));
}

/// Remove the scheduler installed with [`set_scheduler`].
pub fn clear_scheduler() {
	SCHEDULER.with(|slot| slot.borrow_mut().take());
}

/// Per-thread reactive runtime
///
/// This struct manages the reactive dependency graph and update scheduling.
/// It lives in thread-local storage; in WASM there is a single thread, so this
/// effectively provides a global runtime.
pub struct Runtime {
	/// Observer stack for tracking currently executing effects
	observer_stack: RefCell<Vec<NodeId>>,
	/// Dependency graph: NodeId -> DependencyNode
	pub(crate) dependency_graph: RefCell<BTreeMap<NodeId, DependencyNode>>,
	/// Pending updates (effects that need to be re-executed)
	pub(crate) pending_updates: RefCell<Vec<NodeId>>,
	/// Whether a flush is currently scheduled
	update_scheduled: Cell<bool>,
}

impl Runtime {
	/// Create a new Runtime instance
	pub fn new() -> Self {
		Self {
			observer_stack: RefCell::new(Vec::new()),
			dependency_graph: RefCell::new(BTreeMap::new()),
			pending_updates: RefCell::new(Vec::new()),
			update_scheduled: Cell::new(false),
		}
	}

	/// Get the current observer (the currently executing Effect)
	pub fn current_observer(&self) -> Option<NodeId> {
		self.observer_stack.borrow().last().copied()
	}

	/// Push an observer onto the stack
	pub fn push_observer(&self, observer: NodeId) {
		self.observer_stack.borrow_mut().push(observer);
	}

	/// Pop an observer from the stack
	pub fn pop_observer(&self) -> Option<NodeId> {
		self.observer_stack.borrow_mut().pop()
	}

	/// Track a dependency between the current observer and a signal
	///
	/// This is called automatically when `Signal::get()` is invoked.
	pub fn track_dependency(&self, signal_id: NodeId) {
		let Some(observer_id) = self.current_observer() else {
			return;
		};
		let mut graph = self.dependency_graph.borrow_mut();

		let signal_node = graph.entry(signal_id).or_default();
		if !signal_node.subscribers.contains(&observer_id) {
			signal_node.subscribers.push(observer_id);
		}

		let observer_node = graph.entry(observer_id).or_default();
		if !observer_node.dependencies.contains(&signal_id) {
			observer_node.dependencies.push(signal_id);
		}
	}

	/// Notify that a Signal has changed
	///
	/// Every subscriber of the signal is queued for re-execution.
	pub fn notify_signal_change(&self, signal_id: NodeId) {
		let subscribers = match self.dependency_graph.borrow().get(&signal_id) {
			Some(node) => node.subscribers.clone(),
			None => return,
		};

		for subscriber_id in subscribers {
			self.schedule_update(subscriber_id);
		}
	}

	/// Queue a node for update
	///
	/// If a scheduler is installed, a flush is requested from it once per batch.
	pub fn schedule_update(&self, node_id: NodeId) {
		{
			let mut pending = self.pending_updates.borrow_mut();
			if !pending.contains(&node_id) {
				pending.push(node_id);
			}
		}

		if self.update_scheduled.replace(true) {
			return;
		}

		SCHEDULER.with(|slot| {
			if let Some(scheduler) = slot.borrow().as_ref() {
				scheduler(Box::new(flush_updates));
			}
		});
	}

	/// Take the queued updates, resetting the scheduled flag.
	pub(crate) fn take_pending(&self) -> Vec<NodeId> {
		self.update_scheduled.set(false);
		core::mem::take(&mut *self.pending_updates.borrow_mut())
	}

	/// Whether any update is waiting to be flushed
	pub fn has_pending_updates(&self) -> bool {
		!self.pending_updates.borrow().is_empty()
	}

	/// Clear dependencies for a node
	///
	/// Called before re-executing an Effect so that stale dependencies are dropped.
	pub fn clear_dependencies(&self, node_id: NodeId) {
		let mut graph = self.dependency_graph.borrow_mut();

		let dependencies = match graph.get_mut(&node_id) {
			Some(node) => core::mem::take(&mut node.dependencies),
			None => return,
		};

		for dep_id in dependencies {
			if let Some(dep_node) = graph.get_mut(&dep_id) {
				dep_node.subscribers.retain(|&id| id != node_id);
			}
		}
	}

	/// Remove a node from the dependency graph
	///
	/// Called when a Signal or Effect is dropped.
	pub fn remove_node(&self, node_id: NodeId) {
		self.clear_dependencies(node_id);
		let removed = self.dependency_graph.borrow_mut().remove(&node_id);

		// A dropped signal leaves dangling ids in its subscribers' dependency lists
		if let Some(node) = removed {
			let mut graph = self.dependency_graph.borrow_mut();
			for subscriber in node.subscribers {
				if let Some(sub_node) = graph.get_mut(&subscriber) {
					sub_node.dependencies.retain(|&id| id != node_id);
				}
			}
		}
		self.pending_updates.borrow_mut().retain(|&id| id != node_id);
	}

	/// Check if a node exists in the dependency graph (for testing)
	pub fn has_node(&self, node_id: NodeId) -> bool {
		self.dependency_graph.borrow().contains_key(&node_id)
	}

	/// Get the number of subscribers for a node (for testing)
	pub fn subscriber_count(&self, node_id: NodeId) -> usize {
		self.dependency_graph
			.borrow()
			.get(&node_id)
			.map(|node| node.subscribers.len())
			.unwrap_or(0)
	}
}

impl Default for Runtime {
	fn default() -> Self {
		Self::new()
	}
}

thread_local! {
	static RUNTIME: Runtime = Runtime::new();
}

/// Run `f` with the thread's runtime
pub fn with_runtime<F, R>(f: F) -> R
where
	F: FnOnce(&Runtime) -> R,
{
	RUNTIME.with(f)
}

/// Try to access the runtime (safe version for Drop implementations)
///
/// Returns None if the thread-local storage has been destroyed.
pub(crate) fn try_with_runtime<F, R>(f: F) -> Option<R>
where
	F: FnOnce(&Runtime) -> R,
{
	RUNTIME.try_with(f).ok()
}

/// Run every pending effect.
///
/// Effects queued while flushing (an effect writing to a signal another effect
/// reads) are run in the same call, until the queue is empty.
pub fn flush_updates() {
	loop {
		let pending = with_runtime(Runtime::take_pending);
		if pending.is_empty() {
			break;
		}
		for node_id in pending {
			crate::effect::Effect::execute_effect(node_id);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serial_test::serial;

	#[test]
	#[serial]
	fn test_node_id_uniqueness() {
		let id1 = NodeId::new();
		let id2 = NodeId::new();
		let id3 = NodeId::new();

		assert_ne!(id1, id2);
		assert_ne!(id2, id3);
		assert_ne!(id1, id3);
	}

	#[test]
	#[serial]
	fn test_runtime_observer_stack() {
		let runtime = Runtime::new();
		assert!(runtime.current_observer().is_none());

		let id1 = NodeId::new();
		runtime.push_observer(id1);
		assert_eq!(runtime.current_observer(), Some(id1));

		let id2 = NodeId::new();
		runtime.push_observer(id2);
		assert_eq!(runtime.current_observer(), Some(id2));

		runtime.pop_observer();
		assert_eq!(runtime.current_observer(), Some(id1));

		runtime.pop_observer();
		assert!(runtime.current_observer().is_none());
	}

	#[test]
	#[serial]
	fn test_dependency_tracking() {
		let runtime = Runtime::new();
		let signal_id = NodeId::new();
		let effect_id = NodeId::new();

		runtime.push_observer(effect_id);
		runtime.track_dependency(signal_id);
		runtime.pop_observer();

		let graph = runtime.dependency_graph.borrow();
		assert!(graph[&signal_id].subscribers.contains(&effect_id));
		assert!(graph[&effect_id].dependencies.contains(&signal_id));
	}

	#[test]
	#[serial]
	fn test_track_without_observer_is_noop() {
		let runtime = Runtime::new();
		let signal_id = NodeId::new();

		runtime.track_dependency(signal_id);

		assert!(!runtime.has_node(signal_id));
	}

	#[test]
	#[serial]
	fn test_notify_signal_change_queues_subscribers() {
		let runtime = Runtime::new();
		let signal_id = NodeId::new();
		let effect_id = NodeId::new();

		runtime.push_observer(effect_id);
		runtime.track_dependency(signal_id);
		runtime.pop_observer();

		runtime.notify_signal_change(signal_id);
		runtime.notify_signal_change(signal_id);

		assert_eq!(*runtime.pending_updates.borrow(), vec![effect_id]);
	}

	#[test]
	#[serial]
	fn test_clear_dependencies() {
		let runtime = Runtime::new();
		let signal_id = NodeId::new();
		let effect_id = NodeId::new();

		runtime.push_observer(effect_id);
		runtime.track_dependency(signal_id);
		runtime.pop_observer();

		runtime.clear_dependencies(effect_id);

		let graph = runtime.dependency_graph.borrow();
		assert!(!graph[&signal_id].subscribers.contains(&effect_id));
		assert!(graph[&effect_id].dependencies.is_empty());
	}

	#[test]
	#[serial]
	fn test_remove_node_drops_pending_update() {
		let runtime = Runtime::new();
		let effect_id = NodeId::new();

		runtime.schedule_update(effect_id);
		assert!(runtime.has_pending_updates());

		runtime.remove_node(effect_id);
		assert!(!runtime.has_pending_updates());
	}
}
