//! Storage backend implementations.
//!
//! | Backend | Target | Cross-context channel |
//! |---------|--------|-----------------------|
//! | [`WebStorage`] | `wasm32` | `window` `storage` events |
//! | [`MemoryStorage`] | any | other handles opened on the same area |
//! | [`UnavailableStorage`] | any | none |

pub mod memory;
pub mod unavailable;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use memory::MemoryStorage;
pub use unavailable::UnavailableStorage;
#[cfg(target_arch = "wasm32")]
pub use web::{WebStorage, WebStorageKind};

use core::cell::RefCell;

use std::rc::Rc;

use crate::backend::StorageBackend;
use crate::config::StorageConfig;
use crate::error::StorageError;
use crate::factory::create_storage;

thread_local! {
	static LOCAL_STORAGE: RefCell<Option<Rc<dyn StorageBackend>>> = const { RefCell::new(None) };
	static SESSION_STORAGE: RefCell<Option<Rc<dyn StorageBackend>>> = const { RefCell::new(None) };
}

/// The platform's `localStorage`
///
/// Opened once per thread. Where it cannot be opened (server-side rendering,
/// native targets, storage blocked by the user agent) the fallback is a
/// [`MemoryStorage`] when [`StorageConfig::from_env`] selects the memory
/// backend, and an [`UnavailableStorage`] otherwise. Cells bound to an
/// unavailable backend keep their value in memory only.
pub fn local_storage() -> Rc<dyn StorageBackend> {
	platform_storage(&LOCAL_STORAGE, StorageConfig::Local, "localStorage")
}

/// The platform's `sessionStorage`
///
/// Same fallback rules as [`local_storage`].
pub fn session_storage() -> Rc<dyn StorageBackend> {
	platform_storage(&SESSION_STORAGE, StorageConfig::Session, "sessionStorage")
}

fn platform_storage(
	slot: &'static std::thread::LocalKey<RefCell<Option<Rc<dyn StorageBackend>>>>,
	config: StorageConfig,
	name: &str,
) -> Rc<dyn StorageBackend> {
	slot.with(|slot| {
		if let Some(backend) = slot.borrow().as_ref() {
			return Rc::clone(backend);
		}

		let backend = match create_storage(config) {
			Ok(backend) => backend,
			Err(err) => {
				crate::debug_log!("{} unavailable: {}", name, err);
				fallback_storage(name)
			}
		};
		*slot.borrow_mut() = Some(Rc::clone(&backend));
		backend
	})
}

/// Memory backend when the environment asks for one, else no backend
fn fallback_storage(name: &str) -> Rc<dyn StorageBackend> {
	match StorageConfig::from_env().and_then(|config| match config {
		StorageConfig::Memory(_) => create_storage(config),
		_ => Err(StorageError::Unavailable),
	}) {
		Ok(backend) => {
			crate::debug_log!("{} replaced by an in-memory area", name);
			backend
		}
		Err(_) => Rc::new(UnavailableStorage::new(name)),
	}
}
