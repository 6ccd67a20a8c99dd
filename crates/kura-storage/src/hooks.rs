//! `use_storage` hooks
//!
//! Each hook returns the value, setter and remover handles of a
//! [`StorageCell`]. Call them inside [`Scope::run`](kura_reactive::Scope::run)
//! so the cell stops listening when the scope is disposed.
//!
//! ```
//! use std::rc::Rc;
//! use kura_storage::{MemoryStorage, UseStorageOptions, use_storage};
//!
//! let (theme, set_theme, remove_theme) = use_storage(
//!     Rc::new(MemoryStorage::new()),
//!     "theme",
//!     UseStorageOptions::new("light".to_string()),
//! );
//!
//! set_theme.set("dark".to_string());
//! assert_eq!(theme.get(), "dark");
//!
//! remove_theme.remove();
//! assert_eq!(theme.get(), "light");
//! ```

use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::backend::StorageBackend;
use crate::backends::{local_storage, session_storage};
use crate::cell::{RemoveStorage, SetStorage, StorageCell, StorageValue};
use crate::options::UseStorageOptions;

/// Handles returned by the `use_*_storage` hooks
pub type UseStorageReturn<V> = (StorageValue<V>, SetStorage<V>, RemoveStorage);

/// Bind `key` of `backend` to a reactive value
pub fn use_storage<V>(
	backend: Rc<dyn StorageBackend>,
	key: &str,
	options: UseStorageOptions<V>,
) -> UseStorageReturn<V>
where
	V: Clone + Serialize + DeserializeOwned + 'static,
{
	StorageCell::new(backend, key, options).split()
}

/// Bind `key` of `window.localStorage`
///
/// Outside the browser the value lives in memory only (see
/// [`local_storage`]).
pub fn use_local_storage<V>(key: &str, options: UseStorageOptions<V>) -> UseStorageReturn<V>
where
	V: Clone + Serialize + DeserializeOwned + 'static,
{
	use_storage(local_storage(), key, options)
}

/// Bind `key` of `window.sessionStorage`
///
/// Outside the browser the value lives in memory only (see
/// [`session_storage`]).
pub fn use_session_storage<V>(key: &str, options: UseStorageOptions<V>) -> UseStorageReturn<V>
where
	V: Clone + Serialize + DeserializeOwned + 'static,
{
	use_storage(session_storage(), key, options)
}
