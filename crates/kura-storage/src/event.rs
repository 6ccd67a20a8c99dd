//! Change notifications and the channels that carry them
//!
//! Two kinds of channel exist:
//!
//! - the **same-document** channel, an [`EventBus`] shared by every cell of
//!   the thread (see [`same_document_bus`]), on which a cell announces its
//!   own writes;
//! - a backend's **cross-context** channel (see
//!   [`StorageBackend::change_events`](crate::StorageBackend::change_events)),
//!   which reports writes made by other contexts sharing the storage area.
//!
//! Both implement [`EventSource`]. Dispatch is synchronous: listeners run
//! before `dispatch` returns, in subscription order. The listener list is
//! snapshotted first, so a listener may subscribe or unsubscribe while a
//! dispatch is in progress.

use core::cell::RefCell;
use core::fmt;

use std::rc::{Rc, Weak};

/// Where a change came from, relative to the receiving context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
	/// Written in this execution context
	Local,
	/// Written by another context sharing the storage area
	External,
}

/// A key may have changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotification {
	/// Changed key, or `None` when the whole storage area may have changed
	pub key: Option<String>,
	/// Where the change came from
	pub origin: Origin,
}

impl ChangeNotification {
	/// Notification for a write made in this context
	pub fn local(key: impl Into<String>) -> Self {
		Self {
			key: Some(key.into()),
			origin: Origin::Local,
		}
	}

	/// Notification for a write made by another context
	pub fn external(key: impl Into<String>) -> Self {
		Self {
			key: Some(key.into()),
			origin: Origin::External,
		}
	}

	/// Notification that every key may have changed
	pub fn cleared(origin: Origin) -> Self {
		Self { key: None, origin }
	}

	/// Whether a cell bound to `key` must re-read
	pub fn matches(&self, key: &str) -> bool {
		self.key.as_deref().is_none_or(|changed| changed == key)
	}
}

/// Callback receiving notifications
pub type Listener = Rc<dyn Fn(&ChangeNotification)>;

/// A channel of [`ChangeNotification`]s
///
/// Delivery is at-least-once; listeners must tolerate duplicates.
pub trait EventSource {
	/// Register a listener. It stays registered until the returned
	/// [`Subscription`] is dropped or unsubscribed.
	fn subscribe(&self, listener: Listener) -> Subscription;

	/// Deliver a notification to every current listener
	fn dispatch(&self, notification: &ChangeNotification);
}

/// RAII handle for a registered listener
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
	detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
	/// Wrap the function that removes the listener
	pub fn new(detach: impl FnOnce() + 'static) -> Self {
		Self {
			detach: Some(Box::new(detach)),
		}
	}

	/// A subscription with nothing to detach
	pub fn noop() -> Self {
		Self { detach: None }
	}

	/// Remove the listener now
	pub fn unsubscribe(mut self) {
		self.detach_now();
	}

	/// Whether the listener is still registered through this handle
	pub fn is_active(&self) -> bool {
		self.detach.is_some()
	}

	fn detach_now(&mut self) {
		if let Some(detach) = self.detach.take() {
			detach();
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.detach_now();
	}
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("active", &self.is_active())
			.finish()
	}
}

#[derive(Default)]
struct BusInner {
	next_id: u64,
	listeners: Vec<(u64, Listener)>,
}

/// In-process [`EventSource`]
///
/// Clones share one listener list.
#[derive(Clone, Default)]
pub struct EventBus {
	inner: Rc<RefCell<BusInner>>,
}

impl EventBus {
	/// Create an empty bus
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of registered listeners
	pub fn listener_count(&self) -> usize {
		self.inner.borrow().listeners.len()
	}

	pub(crate) fn downgrade(&self) -> WeakEventBus {
		WeakEventBus {
			inner: Rc::downgrade(&self.inner),
		}
	}
}

impl EventSource for EventBus {
	fn subscribe(&self, listener: Listener) -> Subscription {
		let id = {
			let mut inner = self.inner.borrow_mut();
			let id = inner.next_id;
			inner.next_id += 1;
			inner.listeners.push((id, listener));
			id
		};

		let weak = Rc::downgrade(&self.inner);
		Subscription::new(move || {
			if let Some(inner) = weak.upgrade() {
				// Taken out before the borrow ends: the listener may own a
				// subscription whose drop touches this bus.
				let removed = {
					let mut inner = inner.borrow_mut();
					inner
						.listeners
						.iter()
						.position(|(listener_id, _)| *listener_id == id)
						.map(|index| inner.listeners.remove(index))
				};
				drop(removed);
			}
		})
	}

	fn dispatch(&self, notification: &ChangeNotification) {
		let snapshot: Vec<Listener> = self
			.inner
			.borrow()
			.listeners
			.iter()
			.map(|(_, listener)| Rc::clone(listener))
			.collect();

		for listener in snapshot {
			listener(notification);
		}
	}
}

impl fmt::Debug for EventBus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EventBus")
			.field("listeners", &self.listener_count())
			.finish()
	}
}

/// Non-owning reference to an [`EventBus`]
#[derive(Clone)]
pub(crate) struct WeakEventBus {
	inner: Weak<RefCell<BusInner>>,
}

impl WeakEventBus {
	pub(crate) fn upgrade(&self) -> Option<EventBus> {
		self.inner.upgrade().map(|inner| EventBus { inner })
	}
}

thread_local! {
	static SAME_DOCUMENT_BUS: EventBus = EventBus::new();
}

/// The thread's default same-document channel
///
/// Every cell created without an explicit
/// [`same_document_events`](crate::UseStorageOptions::same_document_events)
/// announces its writes here.
pub fn same_document_bus() -> EventBus {
	SAME_DOCUMENT_BUS.with(EventBus::clone)
}
