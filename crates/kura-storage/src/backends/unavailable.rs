//! Backend standing in for storage that does not exist in this context.

use crate::backend::StorageBackend;
use crate::error::{Result, StorageError};

/// A backend whose every operation fails with [`StorageError::Unavailable`]
///
/// Used for `localStorage`/`sessionStorage` during server-side rendering or
/// on native targets. Cells bound to it keep their value in memory only.
#[derive(Debug, Clone)]
pub struct UnavailableStorage {
	name: String,
}

impl UnavailableStorage {
	/// Stand-in for the backend called `name`
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into() }
	}
}

impl StorageBackend for UnavailableStorage {
	fn name(&self) -> &str {
		&self.name
	}

	fn get_item(&self, _key: &str) -> Result<Option<String>> {
		Err(StorageError::Unavailable)
	}

	fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
		Err(StorageError::Unavailable)
	}

	fn remove_item(&self, _key: &str) -> Result<()> {
		Err(StorageError::Unavailable)
	}

	fn is_available(&self) -> bool {
		false
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_every_operation_is_unavailable() {
		let storage = UnavailableStorage::new("localStorage");

		assert_eq!(storage.name(), "localStorage");
		assert!(!storage.is_available());
		assert!(storage.change_events().is_none());
		assert!(matches!(storage.get_item("k"), Err(StorageError::Unavailable)));
		assert!(matches!(
			storage.set_item("k", "v"),
			Err(StorageError::Unavailable)
		));
		assert!(matches!(
			storage.remove_item("k"),
			Err(StorageError::Unavailable)
		));
	}
}
