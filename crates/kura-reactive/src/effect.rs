//! Effect - Reactive Side Effects
//!
//! `Effect` represents a side effect that re-runs when its dependencies change.
//! Any Signal read with `get()` inside the effect closure becomes a dependency.
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
//! flush_updates(); // Prints: "Count is: 42"
//! ```

use core::cell::{Cell, RefCell};

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::runtime::{NodeId, try_with_runtime, with_runtime};

type EffectFn = Rc<RefCell<dyn FnMut() + 'static>>;

// Closures of every live Effect, keyed by id, so the runtime can re-run them
thread_local! {
	static EFFECT_FUNCTIONS: RefCell<BTreeMap<NodeId, EffectFn>> =
		const { RefCell::new(BTreeMap::new()) };
}

/// A reactive effect that re-runs when its dependencies change
///
/// Effects are the bridge between the reactive system and the outside world.
/// They run once when created and are queued again whenever a Signal they read
/// changes. The effect stops running when disposed or dropped.
pub struct Effect {
	id: NodeId,
	disposed: Rc<Cell<bool>>,
}

impl Effect {
	/// Create a new Effect and run it immediately
	pub fn new<F>(mut f: F) -> Self
	where
		F: FnMut() + 'static,
	{
		let id = NodeId::new();
		let disposed = Rc::new(Cell::new(false));

		let guard = Rc::clone(&disposed);
		let wrapped: EffectFn = Rc::new(RefCell::new(move || {
			if !guard.get() {
				f();
			}
		}));
		EFFECT_FUNCTIONS.with(|storage| {
			storage.borrow_mut().insert(id, wrapped);
		});

		Self::execute_effect(id);

		Self { id, disposed }
	}

	/// Execute an effect by its ID
	///
	/// Called by the runtime when flushing queued updates.
	pub(crate) fn execute_effect(effect_id: NodeId) {
		// Clone the closure handle out so the map is not borrowed while it runs;
		// the effect body may create or drop other effects.
		let Some(effect_fn) =
			EFFECT_FUNCTIONS.with(|storage| storage.borrow().get(&effect_id).cloned())
		else {
			return;
		};

		with_runtime(|rt| {
			rt.clear_dependencies(effect_id);
			rt.push_observer(effect_id);
		});

		// A re-entrant run of the same effect is skipped
		if let Ok(mut f) = effect_fn.try_borrow_mut() {
			f();
		}

		with_runtime(|rt| {
			rt.pop_observer();
		});
	}

	/// Get the NodeId of this effect
	pub fn id(&self) -> NodeId {
		self.id
	}

	/// Whether [`dispose`](Self::dispose) has been called
	pub fn is_disposed(&self) -> bool {
		self.disposed.get()
	}

	/// Dispose this effect
	///
	/// After calling this, the effect will no longer run and its resources are released.
	pub fn dispose(&self) {
		if self.disposed.replace(true) {
			return;
		}

		let _ = try_with_runtime(|rt| rt.remove_node(self.id));

		let removed = EFFECT_FUNCTIONS
			.try_with(|storage| storage.borrow_mut().remove(&self.id))
			.ok()
			.flatten();
		// Dropped outside the map borrow: the closure may own signals or effects
		drop(removed);
	}
}

impl Drop for Effect {
	fn drop(&mut self) {
		self.dispose();
	}
}

impl core::fmt::Debug for Effect {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("Effect")
			.field("id", &self.id)
			.field("disposed", &self.disposed.get())
			.finish()
	}
}
