//! Serialization strategy for stored values
//!
//! A [`StorageCodec`] turns a value into the string the backend persists and
//! back. The default is JSON through `serde_json`; either half can be
//! replaced independently.
//!
//! ```ignore
//! use kura_storage::StorageCodec;
//!
//! let codec = StorageCodec::<Vec<u32>>::json();
//! let raw = codec.encode(&vec![1, 2, 3])?;
//! assert_eq!(raw, "[1,2,3]");
//! assert_eq!(codec.decode(&raw)?, vec![1, 2, 3]);
//! ```

use core::fmt;

use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::CodecError;

/// Stored literal written for an absent value by JavaScript callers sharing
/// the same storage area. Decodes like JSON `null`.
pub const UNDEFINED_LITERAL: &str = "undefined";

type EncodeFn<V> = Rc<dyn Fn(&V) -> Result<String, CodecError>>;
type DecodeFn<V> = Rc<dyn Fn(&str) -> Result<V, CodecError>>;

/// Encoder/decoder pair used by a storage cell
pub struct StorageCodec<V> {
	encode: EncodeFn<V>,
	decode: DecodeFn<V>,
}

impl<V: 'static> StorageCodec<V> {
	/// Build a codec from two fallible functions
	pub fn new<E, D>(encode: E, decode: D) -> Self
	where
		E: Fn(&V) -> Result<String, CodecError> + 'static,
		D: Fn(&str) -> Result<V, CodecError> + 'static,
	{
		Self {
			encode: Rc::new(encode),
			decode: Rc::new(decode),
		}
	}

	/// Replace the encoding half
	pub fn with_encoder<E>(mut self, encode: E) -> Self
	where
		E: Fn(&V) -> Result<String, CodecError> + 'static,
	{
		self.encode = Rc::new(encode);
		self
	}

	/// Replace the decoding half
	pub fn with_decoder<D>(mut self, decode: D) -> Self
	where
		D: Fn(&str) -> Result<V, CodecError> + 'static,
	{
		self.decode = Rc::new(decode);
		self
	}

	/// Encode a value for storage
	pub fn encode(&self, value: &V) -> Result<String, CodecError> {
		(self.encode)(value)
	}

	/// Decode a stored string
	pub fn decode(&self, raw: &str) -> Result<V, CodecError> {
		(self.decode)(raw)
	}
}

impl<V> StorageCodec<V>
where
	V: Serialize + DeserializeOwned + 'static,
{
	/// JSON codec
	pub fn json() -> Self {
		Self::new(json_encode::<V>, json_decode::<V>)
	}
}

impl<V> Clone for StorageCodec<V> {
	fn clone(&self) -> Self {
		Self {
			encode: Rc::clone(&self.encode),
			decode: Rc::clone(&self.decode),
		}
	}
}

impl<V> fmt::Debug for StorageCodec<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StorageCodec").finish_non_exhaustive()
	}
}

/// Encode a value as JSON
pub fn json_encode<V: Serialize>(value: &V) -> Result<String, CodecError> {
	Ok(serde_json::to_string(value)?)
}

/// Decode JSON, treating [`UNDEFINED_LITERAL`] as `null`
pub fn json_decode<V: DeserializeOwned>(raw: &str) -> Result<V, CodecError> {
	let raw = if raw == UNDEFINED_LITERAL { "null" } else { raw };
	Ok(serde_json::from_str(raw)?)
}
