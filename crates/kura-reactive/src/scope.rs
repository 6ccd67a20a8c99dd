//! Scope - ownership and teardown for hooks
//!
//! A [`Scope`] is the lifetime a hook lives in (typically one component).
//! Code running inside [`Scope::run`] can register teardown work with
//! [`on_cleanup`]; the work runs when the scope is disposed or dropped.
//!
//! ```ignore
//! use kura_reactive::{Scope, on_cleanup};
//!
//! let scope = Scope::new();
//! scope.run(|| {
//!     let subscription = subscribe_somewhere();
//!     on_cleanup(move || drop(subscription));
//! });
//!
//! scope.dispose(); // subscription released
//! ```

use core::cell::{Cell, RefCell};

use std::rc::Rc;

type CleanupFn = Box<dyn FnOnce() + 'static>;

#[derive(Default)]
struct ScopeInner {
	cleanups: RefCell<Vec<CleanupFn>>,
	disposed: Cell<bool>,
}

impl ScopeInner {
	fn dispose(&self) {
		if self.disposed.replace(true) {
			return;
		}
		// Cleanups may register further cleanups on this scope; those run at once
		// because the scope is already marked disposed.
		let cleanups = core::mem::take(&mut *self.cleanups.borrow_mut());
		for cleanup in cleanups.into_iter().rev() {
			cleanup();
		}
	}
}

thread_local! {
	static SCOPE_STACK: RefCell<Vec<Rc<ScopeInner>>> = const { RefCell::new(Vec::new()) };
}

/// Owner of teardown callbacks registered by hooks
///
/// Dropping the scope disposes it.
pub struct Scope {
	inner: Rc<ScopeInner>,
}

impl Scope {
	/// Create a new, empty scope
	pub fn new() -> Self {
		Self {
			inner: Rc::new(ScopeInner::default()),
		}
	}

	/// Run `f` with this scope as the current owner
	///
	/// Scopes nest: the innermost running scope receives [`on_cleanup`] calls.
	pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
		SCOPE_STACK.with(|stack| stack.borrow_mut().push(Rc::clone(&self.inner)));
		let result = f();
		SCOPE_STACK.with(|stack| {
			stack.borrow_mut().pop();
		});
		result
	}

	/// Run every registered cleanup in reverse registration order
	///
	/// Disposing twice is a no-op.
	pub fn dispose(&self) {
		self.inner.dispose();
	}

	/// Whether the scope has been disposed
	pub fn is_disposed(&self) -> bool {
		self.inner.disposed.get()
	}

	/// Number of cleanups waiting to run
	pub fn pending_cleanups(&self) -> usize {
		self.inner.cleanups.borrow().len()
	}
}

impl Default for Scope {
	fn default() -> Self {
		Self::new()
	}
}

impl Drop for Scope {
	fn drop(&mut self) {
		self.inner.dispose();
	}
}

impl core::fmt::Debug for Scope {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("Scope")
			.field("disposed", &self.inner.disposed.get())
			.field("pending_cleanups", &self.pending_cleanups())
			.finish()
	}
}

/// Whether code is currently running inside [`Scope::run`]
pub fn has_scope() -> bool {
	SCOPE_STACK.with(|stack| !stack.borrow().is_empty())
}

/// Register `f` to run when the current scope is disposed
///
/// Returns `false` (and drops `f` without running it) when called outside any
/// scope. If the current scope is already disposed, `f` runs immediately.
pub fn on_cleanup(f: impl FnOnce() + 'static) -> bool {
	let Some(scope) = SCOPE_STACK.with(|stack| stack.borrow().last().cloned()) else {
		return false;
	};

	if scope.disposed.get() {
		f();
	} else {
		scope.cleanups.borrow_mut().push(Box::new(f));
	}
	true
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_cleanup_runs_on_dispose() {
		let ran = Rc::new(Cell::new(false));
		let scope = Scope::new();

		let registered = scope.run(|| {
			let ran = Rc::clone(&ran);
			on_cleanup(move || ran.set(true))
		});
		assert!(registered);
		assert!(!ran.get());

		scope.dispose();
		assert!(ran.get());
		assert!(scope.is_disposed());
	}

	#[rstest]
	fn test_cleanups_run_in_reverse_order() {
		let order = Rc::new(RefCell::new(Vec::new()));
		let scope = Scope::new();

		scope.run(|| {
			for i in 0..3 {
				let order = Rc::clone(&order);
				on_cleanup(move || order.borrow_mut().push(i));
			}
		});
		drop(scope);

		assert_eq!(*order.borrow(), vec![2, 1, 0]);
	}

	#[rstest]
	fn test_on_cleanup_outside_scope() {
		assert!(!has_scope());
		assert!(!on_cleanup(|| {}));
	}

	#[rstest]
	fn test_nested_scope_receives_cleanup() {
		let outer = Scope::new();
		let inner = Scope::new();

		outer.run(|| {
			inner.run(|| {
				on_cleanup(|| {});
			});
		});

		assert_eq!(outer.pending_cleanups(), 0);
		assert_eq!(inner.pending_cleanups(), 1);
	}

	#[rstest]
	fn test_dispose_is_idempotent() {
		let count = Rc::new(Cell::new(0));
		let scope = Scope::new();
		scope.run(|| {
			let count = Rc::clone(&count);
			on_cleanup(move || count.set(count.get() + 1));
		});

		scope.dispose();
		scope.dispose();

		assert_eq!(count.get(), 1);
	}
}
