//! Options for [`use_storage`](crate::use_storage) and
//! [`StorageCell::new`](crate::StorageCell::new).

use core::fmt;

use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::codec::{StorageCodec, json_decode, json_encode};
use crate::error::CodecError;
use crate::event::{EventSource, same_document_bus};
use crate::initial::InitialValue;

type EncodeFn<V> = Rc<dyn Fn(&V) -> Result<String, CodecError>>;
type DecodeFn<V> = Rc<dyn Fn(&str) -> Result<V, CodecError>>;

/// Builder for storage cell options
///
/// ```
/// use kura_storage::UseStorageOptions;
///
/// let options = UseStorageOptions::new(0_u32)
///     .serializer(|n| format!("{n:x}"))
///     .deserializer(|raw| u32::from_str_radix(raw, 16).unwrap_or_default());
/// # let _ = options;
/// ```
///
/// Without an explicit initial value ([`Default`]) the cell starts from
/// `V::default()`, which is `None` for `Option<T>` cells.
pub struct UseStorageOptions<V: 'static> {
	pub(crate) initial: InitialValue<V>,
	encode: Option<EncodeFn<V>>,
	decode: Option<DecodeFn<V>>,
	pub(crate) sync_across_contexts: bool,
	pub(crate) sync_same_document: bool,
	pub(crate) same_document_events: Option<Rc<dyn EventSource>>,
}

impl<V: 'static> UseStorageOptions<V> {
	/// Options with a fixed initial value
	pub fn new(initial_value: V) -> Self {
		Self::from_initial(InitialValue::Value(initial_value))
	}

	/// Options whose initial value is produced by `f` each time it is needed
	pub fn lazy(f: impl Fn() -> V + 'static) -> Self {
		Self::from_initial(InitialValue::lazy(f))
	}

	fn from_initial(initial: InitialValue<V>) -> Self {
		Self {
			initial,
			encode: None,
			decode: None,
			sync_across_contexts: true,
			sync_same_document: true,
			same_document_events: None,
		}
	}

	/// Replace the initial value
	pub fn initial_value(mut self, initial_value: impl Into<InitialValue<V>>) -> Self {
		self.initial = initial_value.into();
		self
	}

	/// Encode values with `f` instead of JSON
	pub fn serializer(self, f: impl Fn(&V) -> String + 'static) -> Self {
		self.try_serializer(move |value| Ok(f(value)))
	}

	/// Fallible form of [`serializer`](Self::serializer)
	pub fn try_serializer(
		mut self,
		f: impl Fn(&V) -> Result<String, CodecError> + 'static,
	) -> Self {
		self.encode = Some(Rc::new(f));
		self
	}

	/// Decode stored strings with `f` instead of JSON
	pub fn deserializer(self, f: impl Fn(&str) -> V + 'static) -> Self {
		self.try_deserializer(move |raw| Ok(f(raw)))
	}

	/// Fallible form of [`deserializer`](Self::deserializer); an error makes
	/// the cell fall back to its initial value
	pub fn try_deserializer(
		mut self,
		f: impl Fn(&str) -> Result<V, CodecError> + 'static,
	) -> Self {
		self.decode = Some(Rc::new(f));
		self
	}

	/// Use a complete codec
	pub fn codec(mut self, codec: StorageCodec<V>) -> Self {
		let (encode, decode) = (codec.clone(), codec);
		self.encode = Some(Rc::new(move |value: &V| encode.encode(value)));
		self.decode = Some(Rc::new(move |raw: &str| decode.decode(raw)));
		self
	}

	/// Re-read when another context writes the key (default `true`)
	pub fn sync_across_contexts(mut self, enabled: bool) -> Self {
		self.sync_across_contexts = enabled;
		self
	}

	/// Announce writes to, and re-read on writes by, other cells of this
	/// context (default `true`)
	pub fn sync_same_document(mut self, enabled: bool) -> Self {
		self.sync_same_document = enabled;
		self
	}

	/// Use `events` as the same-document channel instead of the thread's
	/// [`same_document_bus`](crate::same_document_bus)
	pub fn same_document_events(mut self, events: Rc<dyn EventSource>) -> Self {
		self.same_document_events = Some(events);
		self
	}

	/// Split into the pieces a cell is built from
	pub(crate) fn into_parts(mut self) -> (InitialValue<V>, StorageCodec<V>, SyncSettings)
	where
		V: Serialize + DeserializeOwned,
	{
		let codec = self.take_codec();
		let same_document = if self.sync_same_document {
			Some(
				self.same_document_events
					.unwrap_or_else(|| Rc::new(same_document_bus())),
			)
		} else {
			None
		};
		let sync = SyncSettings {
			across_contexts: self.sync_across_contexts,
			same_document,
		};
		(self.initial, codec, sync)
	}

	/// Build the codec, filling missing halves with JSON
	fn take_codec(&mut self) -> StorageCodec<V>
	where
		V: Serialize + DeserializeOwned,
	{
		let mut codec = StorageCodec::new(json_encode::<V>, json_decode::<V>);
		if let Some(encode) = self.encode.take() {
			codec = codec.with_encoder(move |value| encode(value));
		}
		if let Some(decode) = self.decode.take() {
			codec = codec.with_decoder(move |raw| decode(raw));
		}
		codec
	}
}

/// Which channels a cell listens on
pub(crate) struct SyncSettings {
	pub(crate) across_contexts: bool,
	/// Announce and listen here; `None` disables same-document sync
	pub(crate) same_document: Option<Rc<dyn EventSource>>,
}

impl<V: Default + 'static> Default for UseStorageOptions<V> {
	fn default() -> Self {
		Self::from_initial(InitialValue::default())
	}
}

impl<V: fmt::Debug + 'static> fmt::Debug for UseStorageOptions<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("UseStorageOptions")
			.field("initial", &self.initial)
			.field("custom_serializer", &self.encode.is_some())
			.field("custom_deserializer", &self.decode.is_some())
			.field("sync_across_contexts", &self.sync_across_contexts)
			.field("sync_same_document", &self.sync_same_document)
			.field(
				"custom_same_document_events",
				&self.same_document_events.is_some(),
			)
			.finish()
	}
}
