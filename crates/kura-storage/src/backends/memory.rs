//! In-memory storage backend
//!
//! A [`MemoryStorage`] is a handle onto a shared storage *area*. Handles
//! obtained with [`MemoryStorage::open_context`] act as separate execution
//! contexts (tabs) over the same area: a write through one handle is
//! reported on the [`change_events`](StorageBackend::change_events) channel
//! of every other context, never on its own, just like the browser
//! `storage` event. Clones of a handle belong to the same context.

use core::cell::{Cell, RefCell};
use core::fmt;

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::backend::StorageBackend;
use crate::error::{Result, StorageError};
use crate::event::{ChangeNotification, EventBus, EventSource, Origin, WeakEventBus};

struct MemoryArea {
	data: RefCell<BTreeMap<String, String>>,
	quota_bytes: Option<usize>,
	contexts: RefCell<Vec<(u64, WeakEventBus)>>,
	next_context: Cell<u64>,
}

impl MemoryArea {
	fn used_bytes(&self) -> usize {
		self.data
			.borrow()
			.iter()
			.map(|(key, value)| key.len() + value.len())
			.sum()
	}

	fn register_context(&self, events: &EventBus) -> u64 {
		let id = self.next_context.get();
		self.next_context.set(id + 1);
		self.contexts.borrow_mut().push((id, events.downgrade()));
		id
	}

	/// Report a change to every context except `writer`
	fn broadcast(&self, writer: u64, notification: &ChangeNotification) {
		let targets: Vec<EventBus> = {
			let mut contexts = self.contexts.borrow_mut();
			contexts.retain(|(_, bus)| bus.upgrade().is_some());
			contexts
				.iter()
				.filter(|(id, _)| *id != writer)
				.filter_map(|(_, bus)| bus.upgrade())
				.collect()
		};

		for bus in targets {
			bus.dispatch(notification);
		}
	}
}

/// Storage held in process memory
///
/// # Example
///
/// ```
/// use kura_storage::{MemoryStorage, StorageBackend};
///
/// let tab_a = MemoryStorage::new();
/// let tab_b = tab_a.open_context();
///
/// tab_a.set_item("theme", "\"dark\"").unwrap();
/// assert_eq!(tab_b.get_item("theme").unwrap().as_deref(), Some("\"dark\""));
/// ```
#[derive(Clone)]
pub struct MemoryStorage {
	area: Rc<MemoryArea>,
	context: u64,
	events: EventBus,
}

impl MemoryStorage {
	/// Create an empty, unlimited storage area
	pub fn new() -> Self {
		Self::with_area(None)
	}

	/// Create an empty storage area that rejects writes once keys and values
	/// together would exceed `quota_bytes`
	pub fn with_quota(quota_bytes: usize) -> Self {
		Self::with_area(Some(quota_bytes))
	}

	/// Create a storage area pre-populated with raw entries
	pub fn with_entries<I, K, V>(entries: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		let storage = Self::new();
		storage.area.data.borrow_mut().extend(
			entries
				.into_iter()
				.map(|(key, value)| (key.into(), value.into())),
		);
		storage
	}

	fn with_area(quota_bytes: Option<usize>) -> Self {
		let area = Rc::new(MemoryArea {
			data: RefCell::new(BTreeMap::new()),
			quota_bytes,
			contexts: RefCell::new(Vec::new()),
			next_context: Cell::new(0),
		});
		let events = EventBus::new();
		let context = area.register_context(&events);
		Self {
			area,
			context,
			events,
		}
	}

	/// Open another execution context over the same storage area
	pub fn open_context(&self) -> Self {
		let events = EventBus::new();
		let context = self.area.register_context(&events);
		Self {
			area: Rc::clone(&self.area),
			context,
			events,
		}
	}

	/// Whether two handles share a storage area
	pub fn same_area(&self, other: &MemoryStorage) -> bool {
		Rc::ptr_eq(&self.area, &other.area)
	}

	/// Number of stored keys
	pub fn len(&self) -> usize {
		self.area.data.borrow().len()
	}

	/// Whether the area is empty
	pub fn is_empty(&self) -> bool {
		self.area.data.borrow().is_empty()
	}

	/// Stored keys in lexicographic order
	pub fn keys(&self) -> Vec<String> {
		self.area.data.borrow().keys().cloned().collect()
	}

	/// Whether `key` is stored
	pub fn contains_key(&self, key: &str) -> bool {
		self.area.data.borrow().contains_key(key)
	}

	/// Bytes currently used by keys and values
	pub fn used_bytes(&self) -> usize {
		self.area.used_bytes()
	}

	/// Delete every entry, reporting a keyless change to the other contexts
	pub fn clear(&self) {
		let had_entries = {
			let mut data = self.area.data.borrow_mut();
			let had_entries = !data.is_empty();
			data.clear();
			had_entries
		};
		if had_entries {
			self.area
				.broadcast(self.context, &ChangeNotification::cleared(Origin::External));
		}
	}
}

impl Default for MemoryStorage {
	fn default() -> Self {
		Self::new()
	}
}

impl StorageBackend for MemoryStorage {
	fn name(&self) -> &str {
		"memory"
	}

	fn get_item(&self, key: &str) -> Result<Option<String>> {
		Ok(self.area.data.borrow().get(key).cloned())
	}

	fn set_item(&self, key: &str, value: &str) -> Result<()> {
		let changed = {
			let mut data = self.area.data.borrow_mut();
			if let Some(quota) = self.area.quota_bytes {
				let current: usize = data.iter().map(|(k, v)| k.len() + v.len()).sum();
				let replaced = data.get(key).map_or(0, |old| key.len() + old.len());
				if current - replaced + key.len() + value.len() > quota {
					return Err(StorageError::QuotaExceeded {
						key: key.to_string(),
					});
				}
			}
			data.insert(key.to_string(), value.to_string()).as_deref() != Some(value)
		};

		// Browsers fire no storage event when the value is unchanged
		if changed {
			self.area
				.broadcast(self.context, &ChangeNotification::external(key));
		}
		Ok(())
	}

	fn remove_item(&self, key: &str) -> Result<()> {
		let removed = self.area.data.borrow_mut().remove(key).is_some();
		if removed {
			self.area
				.broadcast(self.context, &ChangeNotification::external(key));
		}
		Ok(())
	}

	fn change_events(&self) -> Option<Rc<dyn EventSource>> {
		let events: Rc<dyn EventSource> = Rc::new(self.events.clone());
		Some(events)
	}
}

impl fmt::Debug for MemoryStorage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MemoryStorage")
			.field("context", &self.context)
			.field("keys", &self.len())
			.field("quota_bytes", &self.area.quota_bytes)
			.finish()
	}
}
