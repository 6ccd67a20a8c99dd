//! Storage backend trait.

use std::rc::Rc;

use crate::error::Result;
use crate::event::EventSource;

/// Synchronous string key-value store
///
/// Mirrors the Web Storage API (`getItem`, `setItem`, `removeItem`). All
/// operations may fail: a browser can refuse access, run out of quota, or
/// lack the storage area entirely.
pub trait StorageBackend {
	/// Human-readable backend name used in log messages
	fn name(&self) -> &str;

	/// Read the raw string stored under `key`
	fn get_item(&self, key: &str) -> Result<Option<String>>;

	/// Store `value` under `key`, replacing any previous value
	fn set_item(&self, key: &str, value: &str) -> Result<()>;

	/// Delete `key`. Removing an absent key succeeds.
	fn remove_item(&self, key: &str) -> Result<()>;

	/// Whether the backend exists in the current execution context
	fn is_available(&self) -> bool {
		true
	}

	/// Channel reporting writes made by other contexts sharing this storage
	/// area, if the backend has one
	fn change_events(&self) -> Option<Rc<dyn EventSource>> {
		None
	}
}
