//! Browser Web Storage backend (`localStorage` / `sessionStorage`)
//!
//! Cross-context changes arrive as `storage` events on `window`. One native
//! listener is installed per [`WebStorage`] and forwards events for its
//! storage area to an [`EventBus`].

use core::fmt;

use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;

use crate::backend::StorageBackend;
use crate::error::{Result, StorageError, StorageOp};
use crate::event::{
	ChangeNotification, EventBus, EventSource, Listener, Origin, Subscription,
};

/// Which Web Storage area to open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebStorageKind {
	/// `window.localStorage`
	Local,
	/// `window.sessionStorage`
	Session,
}

impl WebStorageKind {
	/// Name of the `window` property
	pub fn name(self) -> &'static str {
		match self {
			WebStorageKind::Local => "localStorage",
			WebStorageKind::Session => "sessionStorage",
		}
	}
}

/// `window.localStorage` or `window.sessionStorage`
pub struct WebStorage {
	storage: web_sys::Storage,
	kind: WebStorageKind,
	events: Rc<WindowStorageEvents>,
}

impl WebStorage {
	/// Open `window.localStorage`
	pub fn local() -> Result<Self> {
		Self::open(WebStorageKind::Local)
	}

	/// Open `window.sessionStorage`
	pub fn session() -> Result<Self> {
		Self::open(WebStorageKind::Session)
	}

	/// Open the given storage area
	///
	/// Fails with [`StorageError::Unavailable`] without a `window` or when the
	/// area is missing, and with [`StorageError::AccessDenied`] when the user
	/// agent blocks it (for example third-party iframes with storage disabled).
	pub fn open(kind: WebStorageKind) -> Result<Self> {
		let window = web_sys::window().ok_or(StorageError::Unavailable)?;
		let storage = match kind {
			WebStorageKind::Local => window.local_storage(),
			WebStorageKind::Session => window.session_storage(),
		}
		.map_err(|err| StorageError::AccessDenied(describe_js_error(&err)))?
		.ok_or(StorageError::Unavailable)?;

		let events = WindowStorageEvents::install(window, &storage)?;

		Ok(Self {
			storage,
			kind,
			events: Rc::new(events),
		})
	}

	/// Which storage area this is
	pub fn kind(&self) -> WebStorageKind {
		self.kind
	}
}

impl StorageBackend for WebStorage {
	fn name(&self) -> &str {
		self.kind.name()
	}

	fn get_item(&self, key: &str) -> Result<Option<String>> {
		self.storage
			.get_item(key)
			.map_err(|err| map_js_error(StorageOp::Read, key, err))
	}

	fn set_item(&self, key: &str, value: &str) -> Result<()> {
		self.storage
			.set_item(key, value)
			.map_err(|err| map_js_error(StorageOp::Write, key, err))
	}

	fn remove_item(&self, key: &str) -> Result<()> {
		self.storage
			.remove_item(key)
			.map_err(|err| map_js_error(StorageOp::Remove, key, err))
	}

	fn change_events(&self) -> Option<Rc<dyn EventSource>> {
		let events: Rc<dyn EventSource> = self.events.clone();
		Some(events)
	}
}

impl fmt::Debug for WebStorage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WebStorage")
			.field("kind", &self.kind)
			.finish_non_exhaustive()
	}
}

/// `storage` events of one storage area
struct WindowStorageEvents {
	window: web_sys::Window,
	bus: EventBus,
	callback: Closure<dyn FnMut(web_sys::StorageEvent)>,
}

impl WindowStorageEvents {
	fn install(window: web_sys::Window, storage: &web_sys::Storage) -> Result<Self> {
		let bus = EventBus::new();
		let area: JsValue = storage.clone().into();

		let callback = {
			let bus = bus.clone();
			Closure::<dyn FnMut(web_sys::StorageEvent)>::new(
				move |event: web_sys::StorageEvent| {
					// Events for the other storage area are not ours
					let same_area = event
						.storage_area()
						.is_none_or(|other| JsValue::from(other) == area);
					if same_area {
						bus.dispatch(&ChangeNotification {
							key: event.key(),
							origin: Origin::External,
						});
					}
				},
			)
		};

		window
			.add_event_listener_with_callback(
				"storage",
				callback.as_ref().unchecked_ref::<js_sys::Function>(),
			)
			.map_err(|err| StorageError::Operation {
				op: StorageOp::Read,
				key: String::new(),
				reason: format!(
					"could not listen for storage events: {}",
					describe_js_error(&err)
				),
			})?;

		Ok(Self {
			window,
			bus,
			callback,
		})
	}
}

impl EventSource for WindowStorageEvents {
	fn subscribe(&self, listener: Listener) -> Subscription {
		self.bus.subscribe(listener)
	}

	fn dispatch(&self, notification: &ChangeNotification) {
		self.bus.dispatch(notification);
	}
}

impl Drop for WindowStorageEvents {
	fn drop(&mut self) {
		let _ = self.window.remove_event_listener_with_callback(
			"storage",
			self.callback.as_ref().unchecked_ref::<js_sys::Function>(),
		);
	}
}

fn map_js_error(op: StorageOp, key: &str, err: JsValue) -> StorageError {
	if let Some(exception) = err.dyn_ref::<web_sys::DomException>() {
		match exception.name().as_str() {
			// Firefox reports NS_ERROR_DOM_QUOTA_REACHED
			"QuotaExceededError" | "NS_ERROR_DOM_QUOTA_REACHED" => {
				return StorageError::QuotaExceeded {
					key: key.to_string(),
				};
			}
			"SecurityError" => return StorageError::AccessDenied(exception.message()),
			_ => {}
		}
	}

	StorageError::Operation {
		op,
		key: key.to_string(),
		reason: describe_js_error(&err),
	}
}

fn describe_js_error(err: &JsValue) -> String {
	if let Some(exception) = err.dyn_ref::<web_sys::DomException>() {
		return format!("{}: {}", exception.name(), exception.message());
	}
	err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
