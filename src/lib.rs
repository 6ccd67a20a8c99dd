//! # Kura
//!
//! Persisted reactive state for Rust and WebAssembly.
//!
//! Kura binds a reactive value to one key of a synchronous key-value store
//! (`localStorage`, `sessionStorage`, or memory). Every cell bound to the key
//! sees writes made by the others, in the same document and across tabs.
//!
//! ## Crates
//!
//! - [`reactive`] (`kura-reactive`): signals, effects and scopes
//! - [`storage`] (`kura-storage`): storage backends, codecs, storage cells and
//!   the `use_storage` hooks
//!
//! ## Quick Example
//!
//! ```rust
//! use std::rc::Rc;
//! use kura::prelude::*;
//!
//! let scope = Scope::new();
//! let (count, set_count, remove_count) = scope.run(|| {
//!     use_storage(Rc::new(MemoryStorage::new()), "count", UseStorageOptions::new(0))
//! });
//!
//! set_count.update(|n| n + 1);
//! assert_eq!(count.get(), 1);
//!
//! remove_count.remove();
//! assert_eq!(count.get(), 0);
//! ```
//!
//! In the browser, [`use_local_storage`](storage::use_local_storage) and
//! [`use_session_storage`](storage::use_session_storage) bind to the real
//! storage areas and follow `storage` events from other tabs. Elsewhere they
//! keep values in memory.
//!
//! ## Feature Flags
//!
//! - `debug-hooks`: log storage cell lifecycle events

pub use kura_reactive as reactive;
pub use kura_storage as storage;

pub use kura_reactive::{Effect, Scope, Signal, flush_updates, on_cleanup};
pub use kura_storage::{
	InitialValue, MemoryStorage, StorageBackend, StorageCell, StorageCodec, StorageError,
	UseStorageOptions, use_local_storage, use_session_storage, use_storage,
};

pub mod prelude {
	// Reactive runtime
	pub use crate::reactive::{Effect, Scope, Signal, flush_updates, on_cleanup};

	// Storage cells and hooks
	pub use crate::storage::{
		ChangeNotification, InitialValue, MemoryStorage, Origin, RemoveStorage, SetStorage,
		StorageBackend, StorageCell, StorageCodec, StorageValue, UseStorageOptions,
		use_local_storage, use_session_storage, use_storage,
	};
}
