/* src/error.rs */

use crate::value::DecodeError;

/// Core error type for the engine, its sources and formats.
#[derive(Debug, thiserror::Error)]
pub enum ConfError {
	/// The source location cannot be used (missing, a directory, not absolute-resolvable).
	#[error("invalid source location: {0}")]
	InvalidLocation(String),

	/// No format is registered for the source's content type.
	#[error("unsupported content type: {0}")]
	UnsupportedFormat(String),

	/// Raw content could not be unmarshalled into a tree.
	#[error("unmarshal error: {0}")]
	Unmarshal(String),

	/// The lookup key resolved to nothing.
	#[error("key is invalid: {key}")]
	InvalidKey { key: String },

	/// A resolved value could not be decoded into the requested type.
	#[error("decode error: {0}")]
	Decode(#[from] DecodeError),

	/// IO error from a source.
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),

	/// File watcher error.
	#[cfg(feature = "fs")]
	#[error("watch error: {0}")]
	Watch(#[from] notify::Error),

	/// Validation error from the validator crate.
	#[cfg(feature = "validate")]
	#[error("validation failed: {0}")]
	Validation(#[from] validator::ValidationErrors),

	/// Engine options were rejected.
	#[error("invalid options: {0}")]
	Options(String),
}

impl ConfError {
	/// Returns true for errors raised while turning raw content into a tree.
	pub fn is_unmarshal(&self) -> bool {
		matches!(self, Self::Unmarshal(_))
	}
}
