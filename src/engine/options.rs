/* src/engine/options.rs */

use std::sync::Arc;

use log::{LevelFilter, Log};

use crate::ConfError;
use crate::cache::DEFAULT_CAPACITY;

/// Default key path separator.
pub const DEFAULT_SEPARATOR: &str = ".";

/// Settings applied when an engine is loaded.
#[derive(Clone)]
pub struct Options {
	pub(crate) separator: String,
	pub(crate) weakly_typed_input: bool,
	pub(crate) capacity: usize,
	pub(crate) log_level: LevelFilter,
	pub(crate) logger: Option<Arc<dyn Log>>,
}

impl Options {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the key path separator. Must not be empty.
	pub fn separator(mut self, separator: impl Into<String>) -> Self {
		self.separator = separator.into();
		self
	}

	/// Enables lenient type coercion when decoding typed records.
	pub fn weakly_typed_input(mut self, enabled: bool) -> Self {
		self.weakly_typed_input = enabled;
		self
	}

	/// Sets the lookup cache capacity. Zero disables caching.
	pub fn capacity(mut self, capacity: usize) -> Self {
		self.capacity = capacity;
		self
	}

	/// Drops engine log records more verbose than `level`.
	pub fn log_level(mut self, level: LevelFilter) -> Self {
		self.log_level = level;
		self
	}

	/// Sends engine log records to `logger` instead of the global logger.
	pub fn logger(mut self, logger: Arc<dyn Log>) -> Self {
		self.logger = Some(logger);
		self
	}

	pub(crate) fn validate(&self) -> Result<(), ConfError> {
		if self.separator.is_empty() {
			return Err(ConfError::Options("separator must not be empty".to_string()));
		}
		Ok(())
	}
}

impl Default for Options {
	fn default() -> Self {
		Self {
			separator: DEFAULT_SEPARATOR.to_string(),
			weakly_typed_input: false,
			capacity: DEFAULT_CAPACITY,
			log_level: LevelFilter::Debug,
			logger: None,
		}
	}
}

impl std::fmt::Debug for Options {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Options")
			.field("separator", &self.separator)
			.field("weakly_typed_input", &self.weakly_typed_input)
			.field("capacity", &self.capacity)
			.field("log_level", &self.log_level)
			.field("custom_logger", &self.logger.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let options = Options::default();
		assert_eq!(options.separator, ".");
		assert!(!options.weakly_typed_input);
		assert_eq!(options.capacity, 1024);
		assert_eq!(options.log_level, LevelFilter::Debug);
		assert!(options.validate().is_ok());
	}

	#[test]
	fn empty_separator_is_rejected() {
		let options = Options::new().separator("");
		assert!(matches!(options.validate(), Err(ConfError::Options(_))));
	}
}
