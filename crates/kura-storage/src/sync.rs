//! Synchronization listener
//!
//! Subscribes one handler to several [`EventSource`]s and calls it for every
//! notification concerning a key. A notification without a key concerns
//! every key.

use core::fmt;

use std::rc::Rc;

use crate::event::{ChangeNotification, EventSource, Listener, Subscription};

/// Key-filtered subscription to one or more change channels
///
/// Dropping the listener (or calling [`detach`](Self::detach)) unsubscribes
/// from every channel.
pub struct SyncListener {
	key: String,
	subscriptions: Vec<Subscription>,
}

impl SyncListener {
	/// Call `on_change` for every notification about `key` on any of
	/// `channels`
	pub fn attach<I, F>(key: impl Into<String>, channels: I, on_change: F) -> Self
	where
		I: IntoIterator<Item = Rc<dyn EventSource>>,
		F: Fn(&ChangeNotification) + 'static,
	{
		let key = key.into();
		let handler: Listener = {
			let key = key.clone();
			Rc::new(move |notification: &ChangeNotification| {
				if notification.matches(&key) {
					on_change(notification);
				}
			})
		};

		let subscriptions = channels
			.into_iter()
			.map(|channel| channel.subscribe(Rc::clone(&handler)))
			.collect();

		Self { key, subscriptions }
	}

	/// The watched key
	pub fn key(&self) -> &str {
		&self.key
	}

	/// Number of channels still subscribed
	pub fn channel_count(&self) -> usize {
		self.subscriptions.len()
	}

	/// Whether any channel is still subscribed
	pub fn is_attached(&self) -> bool {
		!self.subscriptions.is_empty()
	}

	/// Unsubscribe from every channel
	pub fn detach(&mut self) {
		self.subscriptions.clear();
	}
}

impl fmt::Debug for SyncListener {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SyncListener")
			.field("key", &self.key)
			.field("channels", &self.subscriptions.len())
			.finish()
	}
}
