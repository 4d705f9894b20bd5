/* src/engine/reload.rs */

use std::sync::{Arc, Mutex, RwLock, Weak};

use super::logger::Logger;
use super::{Engine, Options, Shared, State};
#[cfg(feature = "events")]
use super::{DEFAULT_EVENT_CAPACITY, ReloadEvent};
use crate::ConfError;
use crate::cache::LruCache;
use crate::source::{Notifications, Source, lock};
use crate::value::Map;

impl<S: Source> Engine<S> {
	/// Loads the initial tree from `source` and starts following its change
	/// notifications.
	///
	/// Fails without constructing an engine when the options are invalid or
	/// the initial content cannot be fetched, parsed or watched. Must be
	/// called within a Tokio runtime.
	pub async fn load(source: S, options: Options) -> Result<Self, ConfError> {
		options.validate()?;
		let log = Logger::new(options.logger.clone(), options.log_level);

		// Subscribe first: a change landing during the initial fetch then
		// still produces a signal.
		let notifications = match source.notify() {
			Ok(notifications) => notifications,
			Err(e) => {
				log.error(format_args!("cannot watch source: {e}"));
				return Err(e);
			}
		};
		let tree = match fetch(&source).await {
			Ok(tree) => tree,
			Err(e) => {
				log.error(format_args!("initial load failed: {e}"));
				if let Err(e) = source.close() {
					log.error(format_args!("failed to close source: {e}"));
				}
				return Err(e);
			}
		};

		let shared = Arc::new(Shared {
			source,
			state: RwLock::new(State {
				tree: Arc::new(tree),
				generation: 1,
			}),
			cache: LruCache::new(options.capacity),
			separator: options.separator,
			weakly_typed_input: options.weakly_typed_input,
			log,
			#[cfg(feature = "events")]
			events: tokio::sync::broadcast::channel(DEFAULT_EVENT_CAPACITY).0,
			reload_task: Mutex::new(None),
			reloading: tokio::sync::Mutex::new(()),
		});

		match notifications {
			Some(notifications) => {
				let task = tokio::spawn(follow(Arc::downgrade(&shared), notifications));
				*lock(&shared.reload_task) = Some(task.abort_handle());
			}
			None => shared
				.log
				.warn(format_args!("source offers no change notifications, live reload disabled")),
		}

		shared.log.info(format_args!("configuration loaded (generation 1)"));
		Ok(Self { shared })
	}

	/// Fetches and applies the source's current content right away.
	///
	/// On failure the current tree stays in place and the error is returned.
	pub async fn reload(&self) -> Result<u64, ConfError> {
		self.shared.reload().await
	}
}

impl<S: Source> Shared<S> {
	pub(crate) async fn reload(&self) -> Result<u64, ConfError> {
		// A second reload waits here, so it always fetches after the first
		// has installed and can never overwrite newer content with older.
		let _reloading = self.reloading.lock().await;
		let result = match self.source.load_content().await {
			Ok(content) => self.apply(&content),
			Err(e) => Err(e),
		};
		#[cfg(feature = "events")]
		if let Err(e) = &result {
			let _ = self.events.send(ReloadEvent::Failed { error: e.to_string() });
		}
		result
	}

	/// Parses `content` and installs it as the next generation.
	///
	/// Parsing happens before the write lock is taken, so readers only wait
	/// for the swap and the flush. A parse failure changes nothing.
	pub(crate) fn apply(&self, content: &[u8]) -> Result<u64, ConfError> {
		let tree = self.source.parse(content)?;
		Ok(self.install(tree))
	}

	fn install(&self, tree: Map) -> u64 {
		let generation = {
			let mut state = self.write_state();
			state.tree = Arc::new(tree);
			state.generation += 1;
			// Readers fill the cache under the read lock, so nothing computed
			// from the old tree can land after this flush.
			self.cache.flush();
			state.generation
		};
		self.log.debug(format_args!("applied configuration generation {generation}"));
		#[cfg(feature = "events")]
		let _ = self.events.send(ReloadEvent::Reloaded { generation });
		generation
	}
}

async fn fetch<S: Source>(source: &S) -> Result<Map, ConfError> {
	let content = source.load_content().await?;
	source.parse(&content)
}

/// Reloads once per notification until the source closes or every engine
/// handle is gone.
async fn follow<S: Source>(shared: Weak<Shared<S>>, mut notifications: Notifications) {
	while notifications.recv().await.is_some() {
		let Some(shared) = shared.upgrade() else {
			return;
		};
		if let Err(e) = shared.reload().await {
			shared.log.error(format_args!("reload failed, keeping previous configuration: {e}"));
		}
	}
	if let Some(shared) = shared.upgrade() {
		shared.log.info(format_args!("source closed, reload loop stopped"));
	}
}

#[cfg(all(test, feature = "json"))]
mod tests {
	use super::*;
	use crate::format::AnyFormat;
	use crate::source::MemorySource;

	async fn engine(content: &str) -> Engine<MemorySource> {
		Engine::load(MemorySource::new(AnyFormat::Json, content), Options::default())
			.await
			.unwrap()
	}

	#[tokio::test]
	async fn apply_flushes_the_cache_and_swaps_the_tree() {
		let engine = engine(r#"{"a": 1, "b": 2}"#).await;
		assert_eq!(engine.get_int("a"), 1);
		assert_eq!(engine.get_int("b"), 2);
		assert_eq!(engine.cached_len(), 2);

		let generation = engine.shared.apply(br#"{"a": 10}"#).unwrap();
		assert_eq!(generation, 2);
		assert_eq!(engine.cached_len(), 0);
		assert_eq!(engine.get_int("a"), 10);
		assert_eq!(engine.get("b"), None);
	}

	#[tokio::test]
	async fn failed_apply_keeps_the_previous_tree() {
		let engine = engine(r#"{"a": 1}"#).await;
		assert_eq!(engine.get_int("a"), 1);

		let err = engine.shared.apply(b"{not json").unwrap_err();
		assert!(err.is_unmarshal());
		assert_eq!(engine.generation(), 1);
		assert_eq!(engine.cached_len(), 1);
		assert_eq!(engine.get_int("a"), 1);
	}

	#[tokio::test]
	async fn manual_reload_reads_the_source() {
		let engine = engine(r#"{"port": 8080}"#).await;
		engine.source().set(r#"{"port": 9090}"#);
		// The background task may already have applied it; either way the
		// manual reload installs a newer generation with the same content.
		let generation = engine.reload().await.unwrap();
		assert!(generation >= 2);
		assert_eq!(engine.get_int("port"), 9090);
	}

	#[tokio::test]
	async fn manual_reload_surfaces_fetch_errors() {
		let engine = engine(r#"{"port": 8080}"#).await;
		engine.source().fail_reads(true);
		assert!(matches!(engine.reload().await, Err(ConfError::Io(_))));
		assert_eq!(engine.get_int("port"), 8080);
	}

	#[tokio::test]
	async fn invalid_options_fail_the_load() {
		let source = MemorySource::new(AnyFormat::Json, "{}");
		let result = Engine::load(source, Options::new().separator("")).await;
		assert!(matches!(result, Err(ConfError::Options(_))));
	}

	#[tokio::test]
	async fn dropping_the_last_handle_closes_the_source() {
		let engine = engine("{}").await;
		let shared = Arc::downgrade(&engine.shared);
		let other = engine.clone();
		drop(engine);
		assert!(shared.upgrade().is_some());
		drop(other);
		assert!(shared.upgrade().is_none());
	}
}
