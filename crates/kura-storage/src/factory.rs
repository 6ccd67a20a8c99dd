//! Factory function for creating storage backends.

use std::rc::Rc;

use crate::backends::MemoryStorage;
use crate::{Result, StorageBackend, StorageConfig};

/// Create a storage backend from configuration.
///
/// `Local` and `Session` open the browser's storage areas and fail with
/// [`StorageError::Unavailable`](crate::StorageError::Unavailable) outside a
/// browser. `Memory` always succeeds with a fresh, unshared area.
///
/// # Examples
///
/// ```
/// use kura_storage::{MemoryConfig, StorageBackend, StorageConfig, create_storage};
///
/// let storage = create_storage(StorageConfig::Memory(MemoryConfig::default())).unwrap();
/// assert_eq!(storage.name(), "memory");
/// ```
pub fn create_storage(config: StorageConfig) -> Result<Rc<dyn StorageBackend>> {
	match config {
		StorageConfig::Memory(memory_config) => {
			let storage = match memory_config.quota_bytes {
				Some(quota) => MemoryStorage::with_quota(quota),
				None => MemoryStorage::new(),
			};
			Ok(Rc::new(storage))
		}
		#[cfg(target_arch = "wasm32")]
		StorageConfig::Local => Ok(Rc::new(crate::backends::WebStorage::local()?)),
		#[cfg(target_arch = "wasm32")]
		StorageConfig::Session => Ok(Rc::new(crate::backends::WebStorage::session()?)),
		#[cfg(not(target_arch = "wasm32"))]
		StorageConfig::Local | StorageConfig::Session => Err(crate::StorageError::Unavailable),
	}
}
