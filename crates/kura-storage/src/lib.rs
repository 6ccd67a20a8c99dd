//! # kura-storage
//!
//! Persisted reactive state: a reactive value bound to one key of a
//! synchronous key-value store, kept consistent across every cell of the
//! same document and across documents sharing the store.
//!
//! ## Layers
//!
//! - [`StorageCodec`]: converts values to and from stored strings (JSON by
//!   default).
//! - [`StorageAccessor`]: reads, writes and removes one key, logging and
//!   falling back instead of failing.
//! - [`StorageCell`]: a [`Signal`](kura_reactive::Signal) holding the decoded
//!   value, written through on every set.
//! - [`SyncListener`]: re-reads a cell whenever its key changes, on the
//!   same-document channel or the backend's cross-context channel.
//!
//! ## Backends
//!
//! | Backend | Available |
//! |---------|-----------|
//! | [`WebStorage`](backends::web::WebStorage) | `wasm32` with a `window` |
//! | [`MemoryStorage`] | everywhere |
//! | [`UnavailableStorage`] | everywhere; every call fails |
//!
//! ## Example
//!
//! ```
//! use std::rc::Rc;
//! use kura_storage::{MemoryStorage, UseStorageOptions, use_storage};
//!
//! let storage = Rc::new(MemoryStorage::new());
//! let (count, set_count, _) = use_storage(storage.clone(), "count", UseStorageOptions::new(0));
//! let (mirror, _, _) = use_storage(storage, "count", UseStorageOptions::new(0));
//!
//! set_count.update(|n| n + 1);
//! assert_eq!(count.get(), 1);
//! assert_eq!(mirror.get(), 1);
//! ```
//!
//! ## Feature Flags
//!
//! - `debug-hooks`: log cell lifecycle events through `debug_log!`

#[macro_use]
pub mod logging;

pub mod accessor;
pub mod backend;
pub mod backends;
pub mod cell;
pub mod codec;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod factory;
pub mod hooks;
pub mod initial;
pub mod options;
pub mod sync;

pub use accessor::StorageAccessor;
pub use backend::StorageBackend;
pub use backends::{MemoryStorage, UnavailableStorage, local_storage, session_storage};
#[cfg(target_arch = "wasm32")]
pub use backends::{WebStorage, WebStorageKind};
pub use cell::{RemoveStorage, SetStorage, StorageCell, StorageValue};
pub use codec::{StorageCodec, UNDEFINED_LITERAL, json_decode, json_encode};
pub use config::{BackendType, MemoryConfig, StorageConfig};
pub use context::is_client;
pub use error::{CodecError, Result, StorageError, StorageOp};
pub use event::{
	ChangeNotification, EventBus, EventSource, Listener, Origin, Subscription, same_document_bus,
};
pub use factory::create_storage;
pub use hooks::{UseStorageReturn, use_local_storage, use_session_storage, use_storage};
pub use initial::InitialValue;
pub use options::UseStorageOptions;
pub use sync::SyncListener;
