/* src/engine/event.rs */

use tokio::sync::broadcast;

use super::Engine;
use crate::source::Source;

/// Default reload event channel capacity.
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Outcome of a reload, broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadEvent {
	/// A new tree was installed.
	Reloaded { generation: u64 },
	/// Fetching or parsing failed; the previous tree stays current.
	Failed { error: String },
}

impl<S: Source> Engine<S> {
	/// Subscribes to reload events.
	///
	/// Events may be dropped if the subscriber falls more than
	/// [`DEFAULT_EVENT_CAPACITY`] events behind.
	pub fn subscribe(&self) -> broadcast::Receiver<ReloadEvent> {
		self.shared.events.subscribe()
	}
}

#[cfg(feature = "stream")]
pub struct EventStream {
	inner: tokio_stream::wrappers::BroadcastStream<ReloadEvent>,
}

#[cfg(feature = "stream")]
impl futures_util::Stream for EventStream {
	type Item = Result<ReloadEvent, tokio_stream::wrappers::errors::BroadcastStreamRecvError>;

	fn poll_next(
		mut self: std::pin::Pin<&mut Self>,
		cx: &mut std::task::Context<'_>,
	) -> std::task::Poll<Option<Self::Item>> {
		std::pin::Pin::new(&mut self.inner).poll_next(cx)
	}
}

#[cfg(feature = "stream")]
impl<S: Source> Engine<S> {
	pub fn event_stream(&self) -> EventStream {
		EventStream {
			inner: tokio_stream::wrappers::BroadcastStream::new(self.subscribe()),
		}
	}
}
