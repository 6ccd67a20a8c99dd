//! Storage accessor
//!
//! Binds one key of a backend to a codec and an initial value. The plain
//! operations ([`read`](StorageAccessor::read),
//! [`write`](StorageAccessor::write), [`remove`](StorageAccessor::remove))
//! never fail: errors are logged and the accessor falls back. The `try_*`
//! variants return the error instead.
//!
//! | Situation | `read` result | Log |
//! |-----------|---------------|-----|
//! | backend unavailable | initial value | warn |
//! | backend error | initial value | warn |
//! | no entry, or empty string | initial value | none |
//! | undecodable entry | initial value | error |

use core::fmt;

use std::rc::Rc;

use crate::backend::StorageBackend;
use crate::codec::StorageCodec;
use crate::error::{Result, StorageError};
use crate::initial::InitialValue;

/// One key of a backend, typed through a codec
pub struct StorageAccessor<V: 'static> {
	backend: Rc<dyn StorageBackend>,
	key: String,
	codec: StorageCodec<V>,
	initial: InitialValue<V>,
}

impl<V: 'static> StorageAccessor<V> {
	/// The bound key
	pub fn key(&self) -> &str {
		&self.key
	}

	/// The bound backend
	pub fn backend(&self) -> &Rc<dyn StorageBackend> {
		&self.backend
	}
}

impl<V: Clone + 'static> StorageAccessor<V> {
	/// Bind `key` of `backend`
	pub fn new(
		backend: Rc<dyn StorageBackend>,
		key: impl Into<String>,
		codec: StorageCodec<V>,
		initial: InitialValue<V>,
	) -> Self {
		Self {
			backend,
			key: key.into(),
			codec,
			initial,
		}
	}

	/// A freshly evaluated initial value
	pub fn initial_value(&self) -> V {
		self.initial.evaluate()
	}

	/// Read and decode the stored value
	///
	/// `Ok(None)` when nothing (or an empty string) is stored.
	pub fn try_read(&self) -> Result<Option<V>> {
		if !self.backend.is_available() {
			return Err(StorageError::Unavailable);
		}

		match self.backend.get_item(&self.key)? {
			None => Ok(None),
			Some(raw) if raw.is_empty() => Ok(None),
			Some(raw) => self
				.codec
				.decode(&raw)
				.map(Some)
				.map_err(|source| StorageError::Decode {
					key: self.key.clone(),
					source,
				}),
		}
	}

	/// Read the stored value, falling back to the initial value
	pub fn read(&self) -> V {
		match self.try_read() {
			Ok(Some(value)) => value,
			Ok(None) => self.initial_value(),
			Err(err @ StorageError::Decode { .. }) => {
				crate::error_log!(
					"Error reading {} key \"{}\": {}",
					self.backend.name(),
					self.key,
					err
				);
				self.initial_value()
			}
			Err(err) => {
				crate::warn_log!(
					"Error reading {} key \"{}\": {}",
					self.backend.name(),
					self.key,
					err
				);
				self.initial_value()
			}
		}
	}

	/// Encode and store `value`
	pub fn try_write(&self, value: &V) -> Result<()> {
		if !self.backend.is_available() {
			return Err(StorageError::Unavailable);
		}

		let raw = self
			.codec
			.encode(value)
			.map_err(|source| StorageError::Encode {
				key: self.key.clone(),
				source,
			})?;
		self.backend.set_item(&self.key, &raw)
	}

	/// Encode and store `value`; returns whether it was persisted
	pub fn write(&self, value: &V) -> bool {
		match self.try_write(value) {
			Ok(()) => true,
			Err(err) => {
				crate::warn_log!(
					"Error setting {} key \"{}\": {}",
					self.backend.name(),
					self.key,
					err
				);
				false
			}
		}
	}

	/// Delete the stored entry
	pub fn try_remove(&self) -> Result<()> {
		if !self.backend.is_available() {
			return Err(StorageError::Unavailable);
		}
		self.backend.remove_item(&self.key)
	}

	/// Delete the stored entry; returns whether the backend accepted it
	pub fn remove(&self) -> bool {
		match self.try_remove() {
			Ok(()) => true,
			Err(err) => {
				crate::warn_log!(
					"Error removing {} key \"{}\": {}",
					self.backend.name(),
					self.key,
					err
				);
				false
			}
		}
	}
}

impl<V: 'static> fmt::Debug for StorageAccessor<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StorageAccessor")
			.field("backend", &self.backend.name())
			.field("key", &self.key)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::backends::{MemoryStorage, UnavailableStorage};
	use crate::error::CodecError;
	use core::cell::Cell;
	use rstest::{fixture, rstest};

	#[fixture]
	fn storage() -> MemoryStorage {
		MemoryStorage::new()
	}

	fn accessor(storage: &MemoryStorage, initial: i32) -> StorageAccessor<i32> {
		StorageAccessor::new(
			Rc::new(storage.clone()),
			"count",
			StorageCodec::json(),
			InitialValue::Value(initial),
		)
	}

	#[rstest]
	fn test_read_missing_returns_initial(storage: MemoryStorage) {
		let accessor = accessor(&storage, 7);
		assert_eq!(accessor.try_read().unwrap(), None);
		assert_eq!(accessor.read(), 7);
	}

	#[rstest]
	fn test_read_empty_string_returns_initial(storage: MemoryStorage) {
		storage.set_item("count", "").unwrap();
		let accessor = accessor(&storage, 7);
		assert_eq!(accessor.try_read().unwrap(), None);
		assert_eq!(accessor.read(), 7);
	}

	#[rstest]
	fn test_write_then_read(storage: MemoryStorage) {
		let accessor = accessor(&storage, 0);
		assert!(accessor.write(&42));
		assert_eq!(storage.get_item("count").unwrap().as_deref(), Some("42"));
		assert_eq!(accessor.read(), 42);
	}

	#[rstest]
	fn test_malformed_entry_falls_back(storage: MemoryStorage) {
		storage.set_item("count", "{oops").unwrap();
		let accessor = accessor(&storage, 3);

		assert!(matches!(
			accessor.try_read(),
			Err(StorageError::Decode { ref key, .. }) if key == "count"
		));
		assert_eq!(accessor.read(), 3);
		// The bad entry is left alone
		assert_eq!(storage.get_item("count").unwrap().as_deref(), Some("{oops"));
	}

	#[rstest]
	fn test_remove(storage: MemoryStorage) {
		let accessor = accessor(&storage, 0);
		accessor.write(&1);
		assert!(accessor.remove());
		assert!(!storage.contains_key("count"));
	}

	#[rstest]
	fn test_unavailable_backend_is_tolerated() {
		let accessor = StorageAccessor::new(
			Rc::new(UnavailableStorage::new("localStorage")),
			"count",
			StorageCodec::<i32>::json(),
			InitialValue::Value(5),
		);

		assert_eq!(accessor.read(), 5);
		assert!(!accessor.write(&6));
		assert!(!accessor.remove());
		assert!(matches!(accessor.try_write(&6), Err(StorageError::Unavailable)));
	}

	#[rstest]
	fn test_quota_failure_keeps_old_value() {
		let storage = MemoryStorage::with_quota(8);
		let accessor = StorageAccessor::new(
			Rc::new(storage.clone()),
			"k",
			StorageCodec::<String>::json(),
			InitialValue::Value(String::new()),
		);

		assert!(accessor.write(&"ok".to_string()));
		assert!(!accessor.write(&"far too long".to_string()));
		assert_eq!(accessor.read(), "ok");
	}

	#[rstest]
	fn test_encode_failure_is_a_failed_write(storage: MemoryStorage) {
		let accessor = StorageAccessor::new(
			Rc::new(storage.clone()),
			"k",
			StorageCodec::<i32>::json().with_encoder(|_| Err(CodecError::custom("nope"))),
			InitialValue::Value(0),
		);

		assert!(matches!(
			accessor.try_write(&1),
			Err(StorageError::Encode { .. })
		));
		assert!(!accessor.write(&1));
		assert!(storage.is_empty());
	}

	#[rstest]
	fn test_fallback_reevaluates_lazy_initial(storage: MemoryStorage) {
		let calls = Rc::new(Cell::new(0));
		let accessor = StorageAccessor::new(
			Rc::new(storage),
			"k",
			StorageCodec::<i32>::json(),
			InitialValue::lazy({
				let calls = Rc::clone(&calls);
				move || {
					calls.set(calls.get() + 1);
					-1
				}
			}),
		);

		accessor.read();
		accessor.read();
		assert_eq!(calls.get(), 2);
	}
}
