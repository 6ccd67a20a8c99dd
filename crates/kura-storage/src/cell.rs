//! Reactive storage cell
//!
//! A [`StorageCell`] is a [`Signal`] mirroring one key of a storage backend.
//! It reads the key once when created, writes through on every
//! [`set`](StorageCell::set), and re-reads whenever a change notification
//! for its key arrives, whether another cell, another context, or the cell
//! itself sent it.
//!
//! ## Failed writes
//!
//! When the backend rejects a write (quota, permissions, no backend at all)
//! the cell still takes the new value, but nothing is announced. The cell then
//! holds a value that is not persisted until the next successful write or a
//! notification makes it re-read.
//!
//! ## Lifetime
//!
//! Created inside [`Scope::run`](kura_reactive::Scope::run), a cell stops
//! listening when the scope is disposed. Otherwise it listens until its last
//! clone is dropped. Stored data is never touched by teardown.

use core::cell::RefCell;
use core::fmt;

use std::rc::{Rc, Weak};

use kura_reactive::{Signal, on_cleanup};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::accessor::StorageAccessor;
use crate::backend::StorageBackend;
use crate::event::{ChangeNotification, EventSource};
use crate::options::{SyncSettings, UseStorageOptions};
use crate::sync::SyncListener;

struct CellInner<V: 'static> {
	accessor: StorageAccessor<V>,
	value: Signal<V>,
	same_document: Option<Rc<dyn EventSource>>,
	listener: RefCell<SyncListener>,
}

impl<V: Clone + 'static> CellInner<V> {
	fn refresh(&self) {
		self.value.set(self.accessor.read());
	}

	fn announce(&self) {
		if let Some(events) = &self.same_document {
			events.dispatch(&ChangeNotification::local(self.accessor.key()));
		}
	}
}

/// Persisted reactive value bound to one storage key
///
/// Clones share state.
///
/// ```
/// use std::rc::Rc;
/// use kura_storage::{MemoryStorage, StorageBackend, StorageCell, UseStorageOptions};
///
/// let storage = MemoryStorage::new();
/// let count = StorageCell::new(Rc::new(storage.clone()), "count", UseStorageOptions::new(0));
///
/// count.update(|n| n + 1);
/// assert_eq!(count.get(), 1);
/// assert_eq!(storage.get_item("count").unwrap().as_deref(), Some("1"));
/// ```
pub struct StorageCell<V: 'static> {
	inner: Rc<CellInner<V>>,
}

impl<V> StorageCell<V>
where
	V: Clone + Serialize + DeserializeOwned + 'static,
{
	/// Bind `key` of `backend`
	pub fn new(
		backend: Rc<dyn StorageBackend>,
		key: impl Into<String>,
		options: UseStorageOptions<V>,
	) -> Self {
		let (initial, codec, sync) = options.into_parts();
		Self::from_accessor(StorageAccessor::new(backend, key, codec, initial), sync)
	}
}

impl<V: Clone + 'static> StorageCell<V> {
	pub(crate) fn from_accessor(accessor: StorageAccessor<V>, sync: SyncSettings) -> Self {
		let value = Signal::new(accessor.read());

		let mut channels: Vec<Rc<dyn EventSource>> = Vec::new();
		if let Some(events) = &sync.same_document {
			channels.push(Rc::clone(events));
		}
		if sync.across_contexts {
			channels.extend(accessor.backend().change_events());
		}

		let key = accessor.key().to_owned();
		let inner = Rc::new_cyclic(|weak: &Weak<CellInner<V>>| {
			let weak = weak.clone();
			let listener = SyncListener::attach(key, channels, move |_| {
				if let Some(inner) = weak.upgrade() {
					inner.refresh();
				}
			});
			CellInner {
				accessor,
				value,
				same_document: sync.same_document,
				listener: RefCell::new(listener),
			}
		});

		let weak = Rc::downgrade(&inner);
		on_cleanup(move || {
			if let Some(inner) = weak.upgrade() {
				inner.listener.borrow_mut().detach();
			}
		});

		crate::debug_log!(
			"storage cell bound to {} key \"{}\"",
			inner.accessor.backend().name(),
			inner.accessor.key()
		);

		Self { inner }
	}

	/// Current value, tracked by the enclosing effect
	pub fn get(&self) -> V {
		self.inner.value.get()
	}

	/// Current value without dependency tracking
	pub fn get_untracked(&self) -> V {
		self.inner.value.get_untracked()
	}

	/// Borrow the current value, tracked by the enclosing effect
	///
	/// The value stays borrowed while `f` runs, so `f` must not write to a
	/// cell bound to the same key: the resulting re-read would panic. Use
	/// [`get`](Self::get) when the closure needs to write.
	pub fn with<R>(&self, f: impl FnOnce(&V) -> R) -> R {
		self.inner.value.with(f)
	}

	/// Persist `value`, take it, and announce the change
	pub fn set(&self, value: V) {
		let persisted = self.inner.accessor.write(&value);
		self.inner.value.set(value);
		if persisted {
			self.inner.announce();
		}
	}

	/// Set to `f` applied to the current in-memory value
	///
	/// `f` runs on a copy, so it may write to other cells on the same key.
	pub fn update(&self, f: impl FnOnce(&V) -> V) {
		let current = self.get_untracked();
		self.set(f(&current));
	}

	/// Delete the stored entry and reset to a fresh initial value
	pub fn remove(&self) {
		let initial = self.inner.accessor.initial_value();
		let removed = self.inner.accessor.remove();
		self.inner.value.set(initial);
		if removed {
			self.inner.announce();
		}
	}

	/// Re-read the stored value
	pub fn refresh(&self) {
		self.inner.refresh();
	}

	/// The bound key
	pub fn key(&self) -> &str {
		self.inner.accessor.key()
	}

	/// The underlying signal
	pub fn signal(&self) -> Signal<V> {
		self.inner.value.clone()
	}

	/// Whether the cell still reacts to change notifications
	pub fn is_listening(&self) -> bool {
		self.inner.listener.borrow().is_attached()
	}

	/// Split into read, set and remove handles
	pub fn split(self) -> (StorageValue<V>, SetStorage<V>, RemoveStorage) {
		let remove = RemoveStorage::new({
			let cell = self.clone();
			move || cell.remove()
		});
		(StorageValue(self.clone()), SetStorage(self), remove)
	}
}

impl<V: 'static> Clone for StorageCell<V> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<V: fmt::Debug + 'static> fmt::Debug for StorageCell<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StorageCell")
			.field("backend", &self.inner.accessor.backend().name())
			.field("key", &self.inner.accessor.key())
			.field("value", &self.inner.value)
			.finish()
	}
}

/// Read half of a split [`StorageCell`]
pub struct StorageValue<V: 'static>(StorageCell<V>);

impl<V: Clone + 'static> StorageValue<V> {
	/// Current value, tracked by the enclosing effect
	pub fn get(&self) -> V {
		self.0.get()
	}

	/// Current value without dependency tracking
	pub fn get_untracked(&self) -> V {
		self.0.get_untracked()
	}

	/// Borrow the current value; see [`StorageCell::with`] for what `f` must
	/// not do
	pub fn with<R>(&self, f: impl FnOnce(&V) -> R) -> R {
		self.0.with(f)
	}

	/// The bound key
	pub fn key(&self) -> &str {
		self.0.key()
	}

	/// The underlying signal
	pub fn signal(&self) -> Signal<V> {
		self.0.signal()
	}
}

impl<V: 'static> Clone for StorageValue<V> {
	fn clone(&self) -> Self {
		Self(self.0.clone())
	}
}

impl<V: fmt::Debug + 'static> fmt::Debug for StorageValue<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("StorageValue").field(&self.0).finish()
	}
}

/// Write half of a split [`StorageCell`]
pub struct SetStorage<V: 'static>(StorageCell<V>);

impl<V: Clone + 'static> SetStorage<V> {
	/// See [`StorageCell::set`]
	pub fn set(&self, value: V) {
		self.0.set(value);
	}

	/// See [`StorageCell::update`]
	pub fn update(&self, f: impl FnOnce(&V) -> V) {
		self.0.update(f);
	}
}

impl<V: 'static> Clone for SetStorage<V> {
	fn clone(&self) -> Self {
		Self(self.0.clone())
	}
}

impl<V: fmt::Debug + 'static> fmt::Debug for SetStorage<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("SetStorage").field(&self.0).finish()
	}
}

/// Remove handle of a split [`StorageCell`]
#[derive(Clone)]
pub struct RemoveStorage(Rc<dyn Fn()>);

impl RemoveStorage {
	fn new(f: impl Fn() + 'static) -> Self {
		Self(Rc::new(f))
	}

	/// See [`StorageCell::remove`]
	pub fn remove(&self) {
		(self.0)();
	}
}

impl fmt::Debug for RemoveStorage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("RemoveStorage")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::backends::{MemoryStorage, UnavailableStorage};
	use crate::event::EventBus;
	use core::cell::Cell;
	use kura_reactive::{Effect, Scope, flush_updates};
	use rstest::{fixture, rstest};
	use serial_test::serial;

	struct Harness {
		storage: MemoryStorage,
		bus: EventBus,
	}

	impl Harness {
		fn cell<V>(&self, key: &str, options: UseStorageOptions<V>) -> StorageCell<V>
		where
			V: Clone + Serialize + DeserializeOwned + 'static,
		{
			StorageCell::new(
				Rc::new(self.storage.clone()),
				key,
				options.same_document_events(Rc::new(self.bus.clone())),
			)
		}
	}

	#[fixture]
	fn harness() -> Harness {
		Harness {
			storage: MemoryStorage::new(),
			bus: EventBus::new(),
		}
	}

	#[rstest]
	#[serial]
	fn test_reads_once_on_creation(harness: Harness) {
		harness.storage.set_item("count", "5").unwrap();
		let cell = harness.cell("count", UseStorageOptions::new(0));
		assert_eq!(cell.get_untracked(), 5);
	}

	#[rstest]
	#[serial]
	fn test_set_persists_and_updates(harness: Harness) {
		let cell = harness.cell("count", UseStorageOptions::new(0));
		cell.set(3);
		assert_eq!(cell.get_untracked(), 3);
		assert_eq!(harness.storage.get_item("count").unwrap().as_deref(), Some("3"));
	}

	#[rstest]
	#[serial]
	fn test_update_uses_in_memory_value(harness: Harness) {
		let cell = harness.cell("count", UseStorageOptions::new(10));
		cell.update(|n| n * 2);
		cell.update(|n| n + 1);
		assert_eq!(cell.get_untracked(), 21);
	}

	#[rstest]
	#[serial]
	fn test_update_closure_may_write_same_key(harness: Harness) {
		let a = harness.cell("count", UseStorageOptions::new(0));
		let b = harness.cell("count", UseStorageOptions::new(0));

		a.update(|n| {
			b.set(10);
			n + 1
		});

		assert_eq!(a.get_untracked(), 1);
		assert_eq!(b.get_untracked(), 1);
		assert_eq!(harness.storage.get_item("count").unwrap().as_deref(), Some("1"));
	}

	#[rstest]
	#[serial]
	fn test_debug_formats_cell_and_handles(harness: Harness) {
		let cell = harness.cell("count", UseStorageOptions::new(7));

		let formatted = format!("{cell:?}");
		assert!(formatted.contains("StorageCell"));
		assert!(formatted.contains("\"memory\""));
		assert!(formatted.contains("\"count\""));

		let (value, set, remove) = cell.split();
		assert!(format!("{value:?}").starts_with("StorageValue"));
		assert!(format!("{set:?}").starts_with("SetStorage"));
		assert_eq!(format!("{remove:?}"), "RemoveStorage");
	}

	#[rstest]
	#[serial]
	fn test_set_announces_once(harness: Harness) {
		let announced = Rc::new(Cell::new(0));
		let _sub = harness.bus.subscribe({
			let announced = Rc::clone(&announced);
			Rc::new(move |n: &ChangeNotification| {
				assert_eq!(n, &ChangeNotification::local("count"));
				announced.set(announced.get() + 1);
			})
		});

		let cell = harness.cell("count", UseStorageOptions::new(0));
		cell.set(1);

		assert_eq!(announced.get(), 1);
	}

	#[rstest]
	#[serial]
	fn test_remove_resets_to_fresh_initial(harness: Harness) {
		let calls = Rc::new(Cell::new(0));
		let cell = harness.cell(
			"count",
			UseStorageOptions::lazy({
				let calls = Rc::clone(&calls);
				move || {
					calls.set(calls.get() + 1);
					100
				}
			}),
		);
		cell.set(1);
		let before = calls.get();

		cell.remove();

		assert_eq!(cell.get_untracked(), 100);
		assert!(!harness.storage.contains_key("count"));
		assert!(calls.get() > before);
	}

	#[rstest]
	#[serial]
	fn test_failed_write_keeps_optimistic_value() {
		let bus = EventBus::new();
		let cell = StorageCell::new(
			Rc::new(UnavailableStorage::new("localStorage")),
			"count",
			UseStorageOptions::new(0).same_document_events(Rc::new(bus.clone())),
		);

		cell.set(9);

		assert_eq!(cell.get_untracked(), 9);
		cell.refresh();
		assert_eq!(cell.get_untracked(), 0);
	}

	#[rstest]
	#[serial]
	fn test_quota_failure_keeps_optimistic_value() {
		let storage = MemoryStorage::with_quota(8);
		let cell = StorageCell::new(
			Rc::new(storage.clone()),
			"k",
			UseStorageOptions::new(String::new()).same_document_events(Rc::new(EventBus::new())),
		);

		cell.set("this is far too long".to_string());

		assert_eq!(cell.get_untracked(), "this is far too long");
		assert!(!storage.contains_key("k"));
	}

	#[rstest]
	#[serial]
	fn test_cells_on_same_key_converge(harness: Harness) {
		let a = harness.cell("count", UseStorageOptions::new(0));
		let b = harness.cell("count", UseStorageOptions::new(0));

		a.set(7);

		assert_eq!(b.get_untracked(), 7);
	}

	#[rstest]
	#[serial]
	fn test_effect_reruns_on_external_change(harness: Harness) {
		let cell = harness.cell("count", UseStorageOptions::new(0));
		let seen = Rc::new(RefCell::new(Vec::new()));
		let _effect = Effect::new({
			let (cell, seen) = (cell.clone(), Rc::clone(&seen));
			move || seen.borrow_mut().push(cell.get())
		});

		let other_tab = harness.storage.open_context();
		other_tab.set_item("count", "4").unwrap();
		flush_updates();

		assert_eq!(*seen.borrow(), vec![0, 4]);
	}

	#[rstest]
	#[serial]
	fn test_scope_dispose_stops_listening(harness: Harness) {
		let scope = Scope::new();
		let cell = scope.run(|| harness.cell("count", UseStorageOptions::new(0)));
		let other = harness.cell("count", UseStorageOptions::new(0));
		assert!(cell.is_listening());

		scope.dispose();
		other.set(3);

		assert!(!cell.is_listening());
		assert_eq!(cell.get_untracked(), 0);
		assert_eq!(harness.storage.get_item("count").unwrap().as_deref(), Some("3"));
	}

	#[rstest]
	#[serial]
	fn test_dropping_last_clone_unsubscribes(harness: Harness) {
		let cell = harness.cell("count", UseStorageOptions::new(0));
		assert_eq!(harness.bus.listener_count(), 1);

		drop(cell);

		assert_eq!(harness.bus.listener_count(), 0);
	}

	#[rstest]
	#[serial]
	fn test_split_handles(harness: Harness) {
		let (value, set_value, remove_value) = harness
			.cell("name", UseStorageOptions::new(String::from("anon")))
			.split();

		set_value.set("kura".to_string());
		assert_eq!(value.get_untracked(), "kura");
		assert_eq!(value.key(), "name");

		set_value.update(|name| name.to_uppercase());
		assert_eq!(value.with(|name| name.len()), 4);

		remove_value.remove();
		assert_eq!(value.get_untracked(), "anon");
	}
}
