//! Browser tests for the Web Storage backend.
//!
//! Run with `wasm-pack test --headless --chrome crates/kura-storage`.

#[cfg(target_arch = "wasm32")]
mod wasm_web_storage_tests {
	use std::rc::Rc;

	use kura_storage::{
		StorageBackend, StorageCell, UseStorageOptions, WebStorage, WebStorageKind, is_client,
		use_local_storage,
	};
	use wasm_bindgen_test::*;

	wasm_bindgen_test_configure!(run_in_browser);

	#[wasm_bindgen_test]
	fn test_browser_is_client() {
		assert!(is_client());
	}

	#[wasm_bindgen_test]
	fn test_local_storage_round_trip() {
		let storage = WebStorage::local().unwrap();
		assert_eq!(storage.kind(), WebStorageKind::Local);

		storage.set_item("kura-test-round-trip", "42").unwrap();
		assert_eq!(
			storage.get_item("kura-test-round-trip").unwrap().as_deref(),
			Some("42")
		);

		storage.remove_item("kura-test-round-trip").unwrap();
		assert_eq!(storage.get_item("kura-test-round-trip").unwrap(), None);
	}

	#[wasm_bindgen_test]
	fn test_session_storage_cell() {
		let storage: Rc<dyn StorageBackend> = Rc::new(WebStorage::session().unwrap());
		let cell = StorageCell::new(
			Rc::clone(&storage),
			"kura-test-cell",
			UseStorageOptions::new(0),
		);

		cell.update(|n| n + 5);

		assert_eq!(cell.get_untracked(), 5);
		assert_eq!(
			storage.get_item("kura-test-cell").unwrap().as_deref(),
			Some("5")
		);
		cell.remove();
		assert_eq!(storage.get_item("kura-test-cell").unwrap(), None);
	}

	#[wasm_bindgen_test]
	fn test_use_local_storage_hooks_share_value() {
		let (a, set_a, remove_a) =
			use_local_storage("kura-test-hooks", UseStorageOptions::new(String::new()));
		let (b, _, _) =
			use_local_storage("kura-test-hooks", UseStorageOptions::new(String::new()));

		set_a.set("shared".to_string());
		assert_eq!(a.get_untracked(), "shared");
		assert_eq!(b.get_untracked(), "shared");

		remove_a.remove();
		assert_eq!(b.get_untracked(), "");
	}
}
