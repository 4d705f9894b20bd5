/* src/source/mod.rs */

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::ConfError;
use crate::value::{self, Map, Value};

mod memory;
pub use memory::MemorySource;

#[cfg(feature = "fs")]
mod file;
#[cfg(feature = "fs")]
pub use file::{DEFAULT_DEBOUNCE, FileSource};

/// Backing medium of an engine: supplies raw content, turns it into a tree,
/// decodes sub-trees into typed records, and reports external changes.
#[async_trait]
pub trait Source: Send + Sync + 'static {
	/// Reads the current raw content.
	async fn load_content(&self) -> Result<Vec<u8>, ConfError>;

	/// Deserializes raw content into a configuration tree.
	fn parse(&self, content: &[u8]) -> Result<Map, ConfError>;

	/// Populates a typed record from a tree value, optionally with lenient
	/// type coercion.
	fn decode<T: DeserializeOwned>(&self, input: &Value, weakly_typed_input: bool) -> Result<T, ConfError> {
		Ok(value::from_value(input, weakly_typed_input)?)
	}

	/// Hands out the change notification channel. Only the first call
	/// receives it; later calls get `None`.
	fn notify(&self) -> Result<Option<Notifications>, ConfError>;

	/// Releases the source and closes its notification channel. Idempotent.
	fn close(&self) -> Result<(), ConfError>;
}

/// Receiving half of a source's change notifications.
///
/// Yields one signal per detected change and ends once the source is closed.
#[derive(Debug)]
pub struct Notifications {
	rx: mpsc::Receiver<()>,
}

impl Notifications {
	/// Waits for the next change. Returns `None` once the source has closed.
	pub async fn recv(&mut self) -> Option<()> {
		self.rx.recv().await
	}
}

/// Sending side shared by the built-in sources.
///
/// The channel holds a single pending signal: changes reported while a
/// signal is still unconsumed merge into it, since one reload picks up all
/// of them.
#[derive(Debug)]
pub struct Notifier {
	tx: Mutex<Option<mpsc::Sender<()>>>,
	rx: Mutex<Option<mpsc::Receiver<()>>>,
}

impl Notifier {
	pub fn new() -> Self {
		let (tx, rx) = mpsc::channel(1);
		Self {
			tx: Mutex::new(Some(tx)),
			rx: Mutex::new(Some(rx)),
		}
	}

	/// Reports a change. Returns false once the notifier is closed or the
	/// receiver is gone.
	pub fn signal(&self) -> bool {
		match lock(&self.tx).as_ref() {
			Some(tx) => match tx.try_send(()) {
				Ok(()) | Err(TrySendError::Full(())) => true,
				Err(TrySendError::Closed(())) => false,
			},
			None => false,
		}
	}

	/// Takes the receiving half. Only the first call succeeds.
	pub fn subscribe(&self) -> Option<Notifications> {
		lock(&self.rx).take().map(|rx| Notifications { rx })
	}

	/// Drops the sending half so the receiver drains and then ends.
	pub fn close(&self) {
		lock(&self.tx).take();
	}

	pub fn is_closed(&self) -> bool {
		lock(&self.tx).as_ref().is_none_or(|tx| tx.is_closed())
	}
}

impl Default for Notifier {
	fn default() -> Self {
		Self::new()
	}
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn pending_signals_merge() {
		let notifier = Notifier::new();
		let mut rx = notifier.subscribe().unwrap();
		assert!(notifier.signal());
		assert!(notifier.signal());
		assert!(notifier.signal());
		notifier.close();

		assert_eq!(rx.recv().await, Some(()));
		assert_eq!(rx.recv().await, None);
	}

	#[tokio::test]
	async fn receiver_is_handed_out_once() {
		let notifier = Notifier::new();
		assert!(notifier.subscribe().is_some());
		assert!(notifier.subscribe().is_none());
	}

	#[test]
	fn close_is_idempotent() {
		let notifier = Notifier::new();
		notifier.close();
		notifier.close();
		assert!(notifier.is_closed());
		assert!(!notifier.signal());
	}
}
