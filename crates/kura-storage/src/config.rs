//! Configuration types for storage backends.

use core::fmt;

use std::env;
use std::str::FromStr;

use crate::{Result, StorageError};

/// Storage backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
	/// Browser `localStorage`
	Local,
	/// Browser `sessionStorage`
	Session,
	/// Process memory
	Memory,
}

impl fmt::Display for BackendType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			BackendType::Local => write!(f, "Local"),
			BackendType::Session => write!(f, "Session"),
			BackendType::Memory => write!(f, "Memory"),
		}
	}
}

impl FromStr for BackendType {
	type Err = StorageError;

	fn from_str(s: &str) -> Result<Self> {
		match s.to_lowercase().as_str() {
			"local" | "localstorage" => Ok(BackendType::Local),
			"session" | "sessionstorage" => Ok(BackendType::Session),
			"memory" => Ok(BackendType::Memory),
			_ => Err(StorageError::ConfigError(format!(
				"Invalid backend type: {}",
				s
			))),
		}
	}
}

/// Configuration for the in-memory backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryConfig {
	/// Maximum bytes of keys and values, unlimited when `None`
	pub quota_bytes: Option<usize>,
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
	/// `window.localStorage`
	Local,
	/// `window.sessionStorage`
	Session,
	/// A fresh in-memory area
	Memory(MemoryConfig),
}

impl StorageConfig {
	/// The backend type this configuration selects
	pub fn backend_type(&self) -> BackendType {
		match self {
			StorageConfig::Local => BackendType::Local,
			StorageConfig::Session => BackendType::Session,
			StorageConfig::Memory(_) => BackendType::Memory,
		}
	}

	/// Load configuration from environment variables.
	///
	/// [`local_storage`](crate::local_storage) and
	/// [`session_storage`](crate::session_storage) consult it when the
	/// browser's storage cannot be opened, so native hosts (tests,
	/// server-side rendering) get a working in-memory backend with
	/// `KURA_STORAGE_BACKEND=memory`.
	///
	/// # Environment Variables
	///
	/// - `KURA_STORAGE_BACKEND`: Backend type ("local", "session", "memory")
	///
	/// ## Memory Backend
	/// - `KURA_STORAGE_QUOTA`: Quota in bytes (optional)
	pub fn from_env() -> Result<Self> {
		let backend_type = env::var("KURA_STORAGE_BACKEND").map_err(|_| {
			StorageError::ConfigError(
				"KURA_STORAGE_BACKEND environment variable not set".to_string(),
			)
		})?;

		match backend_type.parse::<BackendType>()? {
			BackendType::Local => Ok(StorageConfig::Local),
			BackendType::Session => Ok(StorageConfig::Session),
			BackendType::Memory => {
				let quota_bytes = match env::var("KURA_STORAGE_QUOTA") {
					Ok(raw) => Some(raw.parse::<usize>().map_err(|err| {
						StorageError::ConfigError(format!(
							"Invalid KURA_STORAGE_QUOTA {:?}: {}",
							raw, err
						))
					})?),
					Err(_) => None,
				};
				Ok(StorageConfig::Memory(MemoryConfig { quota_bytes }))
			}
		}
	}
}
