//! Initial (default) values for storage cells.

use core::fmt;

use std::rc::Rc;

/// Value a cell falls back to when nothing usable is persisted
///
/// The lazy form is invoked on every evaluation; its result is never cached,
/// so a cell that falls back twice calls it twice.
pub enum InitialValue<V> {
	/// Cloned on every evaluation
	Value(V),
	/// Invoked on every evaluation
	Lazy(Rc<dyn Fn() -> V>),
}

impl<V> InitialValue<V> {
	/// Wrap a factory function
	pub fn lazy(f: impl Fn() -> V + 'static) -> Self {
		Self::Lazy(Rc::new(f))
	}

	/// Produce a fresh initial value
	pub fn evaluate(&self) -> V
	where
		V: Clone,
	{
		match self {
			Self::Value(value) => value.clone(),
			Self::Lazy(f) => f(),
		}
	}
}

impl<V> From<V> for InitialValue<V> {
	fn from(value: V) -> Self {
		Self::Value(value)
	}
}

impl<V: Default> Default for InitialValue<V> {
	fn default() -> Self {
		Self::Value(V::default())
	}
}

impl<V: Clone> Clone for InitialValue<V> {
	fn clone(&self) -> Self {
		match self {
			Self::Value(value) => Self::Value(value.clone()),
			Self::Lazy(f) => Self::Lazy(Rc::clone(f)),
		}
	}
}

impl<V: fmt::Debug> fmt::Debug for InitialValue<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
			Self::Lazy(_) => f.write_str("Lazy(..)"),
		}
	}
}
