/* src/source/memory.rs */

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use super::{Notifications, Notifier, Source};
use crate::ConfError;
use crate::format::{AnyFormat, Format};
use crate::value::Map;

/// A simple in-memory source useful for testing and embedded environments.
///
/// Content is replaced with [`set`](MemorySource::set), which also signals a
/// change to the engine the source is loaded into.
#[derive(Debug)]
pub struct MemorySource {
	content: RwLock<Vec<u8>>,
	format: AnyFormat,
	notifier: Notifier,
	failing: AtomicBool,
}

impl MemorySource {
	/// Creates a source holding `content` in the given format.
	pub fn new(format: AnyFormat, content: impl Into<Vec<u8>>) -> Self {
		Self {
			content: RwLock::new(content.into()),
			format,
			notifier: Notifier::new(),
			failing: AtomicBool::new(false),
		}
	}

	/// Replaces the content and signals a change.
	pub fn set(&self, content: impl Into<Vec<u8>>) -> bool {
		*self.content.write().unwrap_or_else(|e| e.into_inner()) = content.into();
		self.notifier.signal()
	}

	/// Signals a change without touching the content.
	pub fn touch(&self) -> bool {
		self.notifier.signal()
	}

	/// Makes subsequent reads fail (or succeed again), simulating an
	/// unreachable backing store.
	pub fn fail_reads(&self, failing: bool) {
		self.failing.store(failing, Ordering::SeqCst);
	}

	pub fn format(&self) -> AnyFormat {
		self.format
	}
}

#[async_trait]
impl Source for MemorySource {
	async fn load_content(&self) -> Result<Vec<u8>, ConfError> {
		if self.failing.load(Ordering::SeqCst) {
			return Err(ConfError::Io(std::io::Error::other("memory source is failing reads")));
		}
		Ok(self.content.read().unwrap_or_else(|e| e.into_inner()).clone())
	}

	fn parse(&self, content: &[u8]) -> Result<Map, ConfError> {
		self.format.parse(content)
	}

	fn notify(&self) -> Result<Option<Notifications>, ConfError> {
		Ok(self.notifier.subscribe())
	}

	fn close(&self) -> Result<(), ConfError> {
		self.notifier.close();
		Ok(())
	}
}

#[cfg(all(test, feature = "json"))]
mod tests {
	use super::*;

	#[tokio::test]
	async fn set_replaces_content_and_signals() {
		let source = MemorySource::new(AnyFormat::Json, r#"{"port": 8080}"#);
		let mut changes = source.notify().unwrap().unwrap();

		assert!(source.set(r#"{"port": 9090}"#));
		assert_eq!(changes.recv().await, Some(()));

		let content = source.load_content().await.unwrap();
		let tree = source.parse(&content).unwrap();
		assert_eq!(tree["port"].as_i64(), Some(9090));
	}

	#[tokio::test]
	async fn failing_reads_surface_io_errors() {
		let source = MemorySource::new(AnyFormat::Json, "{}");
		source.fail_reads(true);
		assert!(matches!(source.load_content().await, Err(ConfError::Io(_))));
		source.fail_reads(false);
		assert!(source.load_content().await.is_ok());
	}

	#[tokio::test]
	async fn close_ends_notifications() {
		let source = MemorySource::new(AnyFormat::Json, "{}");
		let mut changes = source.notify().unwrap().unwrap();
		source.close().unwrap();
		source.close().unwrap();
		assert_eq!(changes.recv().await, None);
		assert!(!source.touch());
	}
}
