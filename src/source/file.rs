/* src/source/file.rs */

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::{Notifications, Notifier, Source, lock};
use crate::ConfError;
use crate::format::{AnyFormat, Format};
use crate::value::Map;

/// Quiet period a burst of file events must settle for before a change is
/// reported.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// A single configuration file, read with `tokio::fs` and watched through
/// its parent directory.
///
/// Watching the directory rather than the file survives editors that save by
/// replacing the file, and symlink swaps such as mounted config volumes. The
/// watcher starts when the engine first asks for notifications.
pub struct FileSource {
	path: PathBuf,
	format: AnyFormat,
	debounce: Duration,
	notifier: Arc<Notifier>,
	watcher: Mutex<Option<RecommendedWatcher>>,
}

impl FileSource {
	/// Opens a file source. Fails when the path does not exist, is a
	/// directory, or has no supported extension.
	pub fn new(path: impl AsRef<Path>) -> Result<Self, ConfError> {
		let path = std::path::absolute(path.as_ref())
			.map_err(|e| ConfError::InvalidLocation(format!("{:?}: {}", path.as_ref(), e)))?;
		let meta = std::fs::metadata(&path)
			.map_err(|e| ConfError::InvalidLocation(format!("{:?}: {}", path, e)))?;
		if meta.is_dir() {
			return Err(ConfError::InvalidLocation(format!("{:?} is a directory", path)));
		}
		let format = AnyFormat::from_path(&path)?;

		Ok(Self {
			path,
			format,
			debounce: DEFAULT_DEBOUNCE,
			notifier: Arc::new(Notifier::new()),
			watcher: Mutex::new(None),
		})
	}

	/// Overrides the format derived from the file extension.
	pub fn with_format(mut self, format: AnyFormat) -> Self {
		self.format = format;
		self
	}

	pub fn with_debounce(mut self, debounce: Duration) -> Self {
		self.debounce = debounce;
		self
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn format(&self) -> AnyFormat {
		self.format
	}

	fn start_watching(&self) -> Result<(), ConfError> {
		let dir = self
			.path
			.parent()
			.ok_or_else(|| ConfError::InvalidLocation(format!("{:?} has no parent directory", self.path)))?;

		let (raw_tx, raw_rx) = mpsc::channel(100);
		let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
			let _ = raw_tx.blocking_send(res);
		})?;
		watcher.watch(dir, RecursiveMode::NonRecursive)?;

		tokio::spawn(process_events(
			raw_rx,
			Arc::clone(&self.notifier),
			self.path.clone(),
			self.debounce,
		));
		*lock(&self.watcher) = Some(watcher);
		log::debug!("watching {:?} for changes to {:?}", dir, self.path);
		Ok(())
	}
}

impl std::fmt::Debug for FileSource {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FileSource")
			.field("path", &self.path)
			.field("format", &self.format)
			.field("debounce", &self.debounce)
			.finish_non_exhaustive()
	}
}

#[async_trait]
impl Source for FileSource {
	async fn load_content(&self) -> Result<Vec<u8>, ConfError> {
		tokio::fs::read(&self.path).await.map_err(ConfError::Io)
	}

	fn parse(&self, content: &[u8]) -> Result<Map, ConfError> {
		self.format.parse(content)
	}

	fn notify(&self) -> Result<Option<Notifications>, ConfError> {
		let Some(notifications) = self.notifier.subscribe() else {
			return Ok(None);
		};
		self.start_watching()?;
		Ok(Some(notifications))
	}

	fn close(&self) -> Result<(), ConfError> {
		// Dropping the watcher closes the raw channel, which ends the worker.
		lock(&self.watcher).take();
		self.notifier.close();
		Ok(())
	}
}

/// Filters raw directory events down to changes of the watched file and
/// reports them once they have been quiet for `debounce`.
async fn process_events(
	mut raw_rx: mpsc::Receiver<notify::Result<notify::Event>>,
	notifier: Arc<Notifier>,
	target: PathBuf,
	debounce: Duration,
) {
	let file_name = target.file_name().map(OsString::from);
	let mut resolved = tokio::fs::canonicalize(&target).await.ok();
	let mut last_seen: Option<Instant> = None;

	let tick_rate = if debounce < Duration::from_millis(50) {
		debounce.max(Duration::from_millis(1))
	} else {
		debounce / 5
	};
	let mut interval = tokio::time::interval(tick_rate);

	loop {
		tokio::select! {
			maybe_event = raw_rx.recv() => {
				match maybe_event {
					Some(Ok(event)) => {
						let touched = touches_file(&event, file_name.as_deref());
						if touched || target_moved(&target, &mut resolved).await {
							last_seen = Some(Instant::now());
						}
					}
					Some(Err(e)) => log::error!("watch error on {:?}: {}", target, e),
					None => break,
				}
			}
			_ = interval.tick() => {
				if last_seen.is_some_and(|seen| seen.elapsed() >= debounce) {
					last_seen = None;
					if !notifier.signal() {
						break;
					}
				}
			}
		}
	}
	log::debug!("stopped watching {:?}", target);
}

fn touches_file(event: &notify::Event, file_name: Option<&std::ffi::OsStr>) -> bool {
	use notify::EventKind as NK;
	if !matches!(event.kind, NK::Create(_) | NK::Modify(_)) {
		return false;
	}
	event
		.paths
		.iter()
		.any(|path| path.file_name().is_some_and(|name| Some(name) == file_name))
}

/// Detects the watched path now resolving somewhere else, as when a
/// symlinked file is re-pointed.
async fn target_moved(target: &Path, resolved: &mut Option<PathBuf>) -> bool {
	let current = tokio::fs::canonicalize(target).await.ok();
	if current.is_some() && current != *resolved {
		*resolved = current;
		true
	} else {
		false
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_missing_and_unsupported_paths() {
		let dir = tempfile::tempdir().unwrap();

		let missing = FileSource::new(dir.path().join("absent.toml"));
		assert!(matches!(missing, Err(ConfError::InvalidLocation(_))));

		let as_dir = FileSource::new(dir.path());
		assert!(matches!(as_dir, Err(ConfError::InvalidLocation(_))));

		let odd = dir.path().join("config.ini");
		std::fs::write(&odd, "a = 1").unwrap();
		assert!(matches!(FileSource::new(&odd), Err(ConfError::UnsupportedFormat(_))));
	}

	#[cfg(feature = "toml")]
	#[tokio::test]
	async fn reads_and_parses_the_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("app.toml");
		std::fs::write(&path, "[server]\nport = 8080\n").unwrap();

		let source = FileSource::new(&path).unwrap();
		assert_eq!(source.format(), AnyFormat::Toml);
		let tree = source.parse(&source.load_content().await.unwrap()).unwrap();
		let port = tree["server"].as_table().and_then(|t| t.get("port")).and_then(|v| v.as_i64());
		assert_eq!(port, Some(8080));
	}

	#[cfg(feature = "toml")]
	#[tokio::test]
	async fn reports_writes_to_the_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("app.toml");
		std::fs::write(&path, "port = 1\n").unwrap();

		let source = FileSource::new(&path).unwrap().with_debounce(Duration::from_millis(50));
		let mut changes = source.notify().unwrap().unwrap();
		assert!(source.notify().unwrap().is_none());

		tokio::time::sleep(Duration::from_millis(100)).await;
		std::fs::write(&path, "port = 2\n").unwrap();

		let signal = tokio::time::timeout(Duration::from_secs(5), changes.recv()).await;
		assert_eq!(signal.unwrap(), Some(()));

		source.close().unwrap();
		let end = tokio::time::timeout(Duration::from_secs(5), async {
			while changes.recv().await.is_some() {}
		})
		.await;
		assert!(end.is_ok());
	}

	#[test]
	fn ignores_sibling_files() {
		let event = notify::Event::new(notify::EventKind::Modify(notify::event::ModifyKind::Any))
			.add_path(PathBuf::from("/etc/app/other.toml"));
		assert!(!touches_file(&event, Some(std::ffi::OsStr::new("app.toml"))));

		let event = notify::Event::new(notify::EventKind::Create(notify::event::CreateKind::File))
			.add_path(PathBuf::from("/etc/app/app.toml"));
		assert!(touches_file(&event, Some(std::ffi::OsStr::new("app.toml"))));
	}
}
