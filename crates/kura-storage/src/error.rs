//! Error types for storage backends and codecs.

use core::fmt;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// The backend operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOp {
	/// `getItem`
	Read,
	/// `setItem`
	Write,
	/// `removeItem`
	Remove,
}

impl fmt::Display for StorageOp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			StorageOp::Read => write!(f, "read"),
			StorageOp::Write => write!(f, "write"),
			StorageOp::Remove => write!(f, "remove"),
		}
	}
}

/// Errors produced while encoding or decoding a stored value.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
	/// The default JSON codec failed.
	#[error("invalid JSON: {0}")]
	Json(#[from] serde_json::Error),
	/// A caller-supplied serializer or deserializer failed.
	#[error("{0}")]
	Custom(String),
}

impl CodecError {
	/// Create a codec error with a custom message.
	pub fn custom(message: impl Into<String>) -> Self {
		Self::Custom(message.into())
	}
}

/// Errors produced by a [`StorageBackend`](crate::StorageBackend) or by the
/// accessor wrapping it.
///
/// None of these reach the consumer of a cell: the accessor logs them and
/// falls back (see [`StorageAccessor`](crate::StorageAccessor)).
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
	/// The backend does not exist in this execution context (server-side
	/// rendering, native host, storage disabled by the user agent).
	#[error("storage is not available in this execution context")]
	Unavailable,

	/// A write would exceed the backend's quota.
	#[error("storage quota exceeded while writing key \"{key}\"")]
	QuotaExceeded {
		/// Key being written
		key: String,
	},

	/// The user agent refused access to the storage area.
	#[error("storage access denied: {0}")]
	AccessDenied(String),

	/// Any other backend failure.
	#[error("storage {op} failed for key \"{key}\": {reason}")]
	Operation {
		/// Operation that failed
		op: StorageOp,
		/// Key involved
		key: String,
		/// Backend-provided description
		reason: String,
	},

	/// The value could not be encoded for storage.
	#[error("failed to encode value for key \"{key}\": {source}")]
	Encode {
		/// Key being written
		key: String,
		/// Underlying codec failure
		#[source]
		source: CodecError,
	},

	/// The stored string could not be decoded.
	#[error("failed to decode value for key \"{key}\": {source}")]
	Decode {
		/// Key being read
		key: String,
		/// Underlying codec failure
		#[source]
		source: CodecError,
	},

	/// Invalid backend configuration.
	#[error("configuration error: {0}")]
	ConfigError(String),
}

impl StorageError {
	/// Whether this error is a backend failure (as opposed to a codec failure
	/// or an absent backend).
	pub fn is_backend_failure(&self) -> bool {
		matches!(
			self,
			StorageError::QuotaExceeded { .. }
				| StorageError::AccessDenied(_)
				| StorageError::Operation { .. }
		)
	}
}
