//! Integration tests for the `kura` facade.

use std::rc::Rc;

use kura::prelude::*;
use rstest::rstest;
use serial_test::serial;

#[rstest]
#[serial]
fn test_prelude_hooks_inside_scope() {
	let storage = MemoryStorage::new();
	let scope = Scope::new();

	let (theme, set_theme, _) = scope.run(|| {
		use_storage(
			Rc::new(storage.clone()),
			"theme",
			UseStorageOptions::new("light".to_string()),
		)
	});
	let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
	let _effect = Effect::new({
		let (theme, seen) = (theme.clone(), Rc::clone(&seen));
		move || seen.borrow_mut().push(theme.get())
	});

	set_theme.set("dark".to_string());
	flush_updates();

	assert_eq!(*seen.borrow(), vec!["light".to_string(), "dark".to_string()]);
	assert_eq!(
		storage.get_item("theme").unwrap().as_deref(),
		Some("\"dark\"")
	);
}

#[rstest]
#[serial]
fn test_reexported_crates() {
	let cell = kura::storage::StorageCell::new(
		Rc::new(kura::storage::MemoryStorage::new()),
		"n",
		kura::storage::UseStorageOptions::new(1_u8),
	);
	let signal: kura::reactive::Signal<u8> = cell.signal();
	assert_eq!(signal.get_untracked(), 1);
}
