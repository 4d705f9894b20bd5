/* src/engine/logger.rs */

use std::fmt;
use std::sync::Arc;

use log::{Level, LevelFilter, Log, Record};

const TARGET: &str = "confreload";

/// Leveled sink for engine records: either an injected logger or the global
/// `log` facade, behind a verbosity threshold.
#[derive(Clone)]
pub(crate) struct Logger {
	sink: Option<Arc<dyn Log>>,
	level: LevelFilter,
}

impl Logger {
	pub(crate) fn new(sink: Option<Arc<dyn Log>>, level: LevelFilter) -> Self {
		Self { sink, level }
	}

	pub(crate) fn log(&self, level: Level, args: fmt::Arguments<'_>) {
		if level > self.level {
			return;
		}
		match &self.sink {
			Some(sink) => {
				let record = Record::builder().level(level).target(TARGET).args(args).build();
				if sink.enabled(record.metadata()) {
					sink.log(&record);
				}
			}
			None => log::log!(target: TARGET, level, "{}", args),
		}
	}

	pub(crate) fn debug(&self, args: fmt::Arguments<'_>) {
		self.log(Level::Debug, args);
	}

	pub(crate) fn info(&self, args: fmt::Arguments<'_>) {
		self.log(Level::Info, args);
	}

	pub(crate) fn warn(&self, args: fmt::Arguments<'_>) {
		self.log(Level::Warn, args);
	}

	pub(crate) fn error(&self, args: fmt::Arguments<'_>) {
		self.log(Level::Error, args);
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Mutex;

	use super::*;

	/// Collects formatted records for assertions.
	#[derive(Default)]
	struct Capture {
		records: Mutex<Vec<(Level, String)>>,
	}

	impl Log for Capture {
		fn enabled(&self, _: &log::Metadata<'_>) -> bool {
			true
		}

		fn log(&self, record: &Record<'_>) {
			self.records.lock().unwrap().push((record.level(), record.args().to_string()));
		}

		fn flush(&self) {}
	}

	#[test]
	fn threshold_drops_verbose_records() {
		let capture = Arc::new(Capture::default());
		let logger = Logger::new(Some(capture.clone()), LevelFilter::Info);

		logger.debug(format_args!("hidden"));
		logger.info(format_args!("shown {}", 1));
		logger.error(format_args!("failed"));

		let records = capture.records.lock().unwrap();
		assert_eq!(
			*records,
			vec![(Level::Info, "shown 1".to_string()), (Level::Error, "failed".to_string())]
		);
	}

	#[test]
	fn off_silences_everything() {
		let capture = Arc::new(Capture::default());
		let logger = Logger::new(Some(capture.clone()), LevelFilter::Off);
		logger.error(format_args!("nope"));
		assert!(capture.records.lock().unwrap().is_empty());
	}
}
