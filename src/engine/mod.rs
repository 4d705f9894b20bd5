/* src/engine/mod.rs */

//!
//! The reload engine: one current tree, a lookup cache, and a background task
//! that swaps in new trees when the source reports a change.

#[cfg(feature = "events")]
mod event;
mod logger;
mod options;
mod read;
mod reload;
pub mod resolve;

#[cfg(feature = "events")]
pub use event::{DEFAULT_EVENT_CAPACITY, ReloadEvent};
#[cfg(feature = "stream")]
pub use event::EventStream;
pub use options::{DEFAULT_SEPARATOR, Options};

use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::task::AbortHandle;

use self::logger::Logger;
use crate::cache::LruCache;
use crate::source::Source;
use crate::value::{Map, Value};

/// Handle to a loaded configuration.
///
/// Handles are cheap to clone and share one state. When the last handle is
/// dropped the background reload task stops and the source is closed.
pub struct Engine<S: Source> {
	pub(crate) shared: Arc<Shared<S>>,
}

impl<S: Source> Clone for Engine<S> {
	fn clone(&self) -> Self {
		Self {
			shared: Arc::clone(&self.shared),
		}
	}
}

impl<S: Source> std::fmt::Debug for Engine<S> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Engine")
			.field("generation", &self.generation())
			.field("separator", &self.shared.separator)
			.field("cached", &self.shared.cache.len())
			.finish_non_exhaustive()
	}
}

/// Current tree and the number of trees installed so far.
pub(crate) struct State {
	pub(crate) tree: Arc<Map>,
	pub(crate) generation: u64,
}

/// State shared by every handle and the reload task.
///
/// Lock order is always `state` before `cache`. Cache entries hold `None`
/// for keys that resolved to nothing, so misses are cached too.
pub(crate) struct Shared<S: Source> {
	pub(crate) source: S,
	pub(crate) state: RwLock<State>,
	pub(crate) cache: LruCache<Option<Value>>,
	pub(crate) separator: String,
	pub(crate) weakly_typed_input: bool,
	pub(crate) log: Logger,
	#[cfg(feature = "events")]
	pub(crate) events: tokio::sync::broadcast::Sender<ReloadEvent>,
	pub(crate) reload_task: Mutex<Option<AbortHandle>>,
	/// Held from fetch to install so reloads land in the order they read.
	pub(crate) reloading: tokio::sync::Mutex<()>,
}

impl<S: Source> Shared<S> {
	pub(crate) fn read_state(&self) -> RwLockReadGuard<'_, State> {
		self.state.read().unwrap_or_else(PoisonError::into_inner)
	}

	pub(crate) fn write_state(&self) -> RwLockWriteGuard<'_, State> {
		self.state.write().unwrap_or_else(PoisonError::into_inner)
	}
}

impl<S: Source> Drop for Shared<S> {
	fn drop(&mut self) {
		let task = self
			.reload_task
			.get_mut()
			.unwrap_or_else(PoisonError::into_inner)
			.take();
		if let Some(handle) = task {
			handle.abort();
		}
		if let Err(e) = self.source.close() {
			self.log.error(format_args!("failed to close source: {e}"));
		}
	}
}
