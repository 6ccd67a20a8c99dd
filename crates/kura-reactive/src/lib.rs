//! # kura-reactive
//!
//! Fine-grained reactive runtime used by the Kura hooks.
//!
//! - [`Signal`]: shared, dependency-tracked state
//! - [`Effect`]: side effects that re-run when the signals they read change
//! - [`Scope`] and [`on_cleanup`]: teardown for hooks that subscribe to
//!   outside resources
//!
//! The runtime is thread-local and single-threaded. Effects queued by a signal
//! change run when the installed scheduler fires (see [`set_scheduler`]) or on
//! an explicit [`flush_updates`] call, which is what tests and native hosts use.
//!
//! ## Example
//!
//! ```
//! use kura_reactive::{Effect, Signal, flush_updates};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let count = Signal::new(1);
//! let seen = Rc::new(Cell::new(0));
//!
//! let _effect = Effect::new({
//!     let count = count.clone();
//!     let seen = Rc::clone(&seen);
//!     move || seen.set(count.get())
//! });
//!
//! count.set(5);
//! flush_updates();
//! assert_eq!(seen.get(), 5);
//! ```

pub mod effect;
pub mod runtime;
pub mod scope;
pub mod signal;

pub use effect::Effect;
pub use runtime::{
	NodeId, Runtime, clear_scheduler, flush_updates, set_scheduler, with_runtime,
};
pub use scope::{Scope, has_scope, on_cleanup};
pub use signal::Signal;
