//! Test fixtures for storage cell tests.
//!
//! Reusable rstest fixtures and a scriptable failing backend.

#![allow(dead_code)]
#![allow(unreachable_pub)]

use std::cell::Cell;
use std::rc::Rc;

use kura_storage::{
	EventBus, EventSource, MemoryStorage, StorageBackend, StorageError, StorageOp,
	UseStorageOptions,
};
use rstest::fixture;
use serde::Serialize;
use serde::de::DeserializeOwned;

// ============================================================================
// Backends
// ============================================================================

/// Memory backend whose reads and writes can be made to fail.
#[derive(Clone, Default)]
pub struct FlakyStorage {
	inner: MemoryStorage,
	fail_reads: Rc<Cell<bool>>,
	fail_writes: Rc<Cell<bool>>,
	deny_access: Rc<Cell<bool>>,
}

impl FlakyStorage {
	pub fn new(inner: MemoryStorage) -> Self {
		Self {
			inner,
			..Self::default()
		}
	}

	pub fn fail_reads(&self, fail: bool) {
		self.fail_reads.set(fail);
	}

	pub fn fail_writes(&self, fail: bool) {
		self.fail_writes.set(fail);
	}

	pub fn deny_access(&self, deny: bool) {
		self.deny_access.set(deny);
	}

	pub fn inner(&self) -> &MemoryStorage {
		&self.inner
	}
}

impl StorageBackend for FlakyStorage {
	fn name(&self) -> &str {
		"flaky"
	}

	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
		if self.deny_access.get() {
			return Err(StorageError::AccessDenied("blocked".to_string()));
		}
		if self.fail_reads.get() {
			return Err(StorageError::Operation {
				op: StorageOp::Read,
				key: key.to_string(),
				reason: "read failure".to_string(),
			});
		}
		self.inner.get_item(key)
	}

	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
		if self.deny_access.get() {
			return Err(StorageError::AccessDenied("blocked".to_string()));
		}
		if self.fail_writes.get() {
			return Err(StorageError::QuotaExceeded {
				key: key.to_string(),
			});
		}
		self.inner.set_item(key, value)
	}

	fn remove_item(&self, key: &str) -> Result<(), StorageError> {
		if self.deny_access.get() {
			return Err(StorageError::AccessDenied("blocked".to_string()));
		}
		if self.fail_writes.get() {
			return Err(StorageError::Operation {
				op: StorageOp::Remove,
				key: key.to_string(),
				reason: "remove failure".to_string(),
			});
		}
		self.inner.remove_item(key)
	}

	fn change_events(&self) -> Option<Rc<dyn EventSource>> {
		self.inner.change_events()
	}
}

// ============================================================================
// Fixtures
// ============================================================================

/// Fresh, unlimited memory storage area.
#[fixture]
pub fn memory_storage() -> MemoryStorage {
	MemoryStorage::new()
}

/// Isolated same-document channel.
#[fixture]
pub fn event_bus() -> EventBus {
	EventBus::new()
}

/// Memory storage wrapped in a backend with switchable failures.
#[fixture]
pub fn flaky_storage() -> FlakyStorage {
	FlakyStorage::new(MemoryStorage::new())
}

// ============================================================================
// Helpers
// ============================================================================

/// Options with `initial` as initial value, announcing on `bus`.
pub fn options_on<V>(initial: V, bus: &EventBus) -> UseStorageOptions<V>
where
	V: Clone + Serialize + DeserializeOwned + 'static,
{
	UseStorageOptions::new(initial).same_document_events(Rc::new(bus.clone()))
}

/// Type-erase a backend handle.
pub fn backend<B: StorageBackend + 'static>(storage: &B) -> Rc<dyn StorageBackend>
where
	B: Clone,
{
	Rc::new(storage.clone())
}
