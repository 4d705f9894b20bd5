/* src/engine/read.rs */

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use super::Engine;
use super::resolve::resolve;
use crate::ConfError;
use crate::source::Source;
use crate::value::{Map, Value, cast};

impl<S: Source> Engine<S> {
	/// Looks up the value at `key`, a path of table names joined by the
	/// separator.
	///
	/// Missing keys and explicit nulls both read as `None`. Results, absent
	/// ones included, are cached until the next reload.
	pub fn get(&self, key: &str) -> Option<Value> {
		let shared = &*self.shared;
		if let Some(hit) = shared.cache.get(key) {
			return hit;
		}

		let state = shared.read_state();
		let found = resolve(&state.tree, key, &shared.separator)
			.filter(|value| !value.is_null())
			.cloned();
		shared
			.log
			.debug(format_args!("cache miss for {key:?} at generation {}", state.generation));
		// Still under the read lock: a concurrent reload flushes only after
		// this entry is in.
		shared.cache.put(key, found.clone());
		drop(state);
		found
	}

	/// Decodes the value at `key` into `T` through the source's decoder.
	///
	/// An empty key decodes the whole tree. A missing key is
	/// [`ConfError::InvalidKey`].
	pub fn decode<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfError> {
		let shared = &*self.shared;
		if key.is_empty() {
			let state = shared.read_state();
			let root = Value::Table(Arc::clone(&state.tree));
			return shared.source.decode(&root, shared.weakly_typed_input);
		}
		let value = self.get(key).ok_or_else(|| ConfError::InvalidKey { key: key.to_string() })?;
		shared.source.decode(&value, shared.weakly_typed_input)
	}

	/// Decodes like [`decode`](Self::decode), then runs the record's
	/// validation rules.
	#[cfg(feature = "validate")]
	pub fn decode_validated<T>(&self, key: &str) -> Result<T, ConfError>
	where
		T: DeserializeOwned + validator::Validate,
	{
		let value: T = self.decode(key)?;
		value.validate()?;
		Ok(value)
	}

	pub fn get_string(&self, key: &str) -> String {
		self.cast(key, cast::to_string)
	}

	pub fn get_bool(&self, key: &str) -> bool {
		self.cast(key, cast::to_bool)
	}

	/// Reads an integer, yielding 0 when it does not fit in an `i32`.
	pub fn get_int(&self, key: &str) -> i32 {
		self.cast(key, |value| cast::to_i64(value).and_then(|n| i32::try_from(n).ok()))
	}

	pub fn get_i64(&self, key: &str) -> i64 {
		self.cast(key, cast::to_i64)
	}

	pub fn get_f64(&self, key: &str) -> f64 {
		self.cast(key, cast::to_f64)
	}

	/// Reads a timestamp. Strings in RFC 3339 and common layouts are parsed,
	/// integers are Unix seconds. Defaults to the Unix epoch.
	pub fn get_time(&self, key: &str) -> DateTime<Utc> {
		self.cast(key, cast::to_time)
	}

	/// Reads a duration such as `"1m30s"`. Bare integers are nanoseconds.
	pub fn get_duration(&self, key: &str) -> Duration {
		self.cast(key, cast::to_duration)
	}

	pub fn get_string_vec(&self, key: &str) -> Vec<String> {
		self.cast(key, cast::to_string_vec)
	}

	pub fn get_vec(&self, key: &str) -> Vec<Value> {
		self.cast(key, cast::to_vec)
	}

	pub fn get_map(&self, key: &str) -> Map {
		self.cast(key, cast::to_map)
	}

	pub fn get_string_map(&self, key: &str) -> HashMap<String, String> {
		self.cast(key, cast::to_string_map)
	}

	pub fn get_string_vec_map(&self, key: &str) -> HashMap<String, Vec<String>> {
		self.cast(key, cast::to_string_vec_map)
	}

	/// Number of trees installed so far; the initial load is generation 1.
	pub fn generation(&self) -> u64 {
		self.shared.read_state().generation
	}

	/// Returns the current tree. Later reloads do not affect it.
	pub fn snapshot(&self) -> Arc<Map> {
		Arc::clone(&self.shared.read_state().tree)
	}

	/// Number of lookups currently cached.
	pub fn cached_len(&self) -> usize {
		self.shared.cache.len()
	}

	pub fn source(&self) -> &S {
		&self.shared.source
	}

	fn cast<T: Default>(&self, key: &str, convert: impl FnOnce(&Value) -> Option<T>) -> T {
		self.get(key).as_ref().and_then(convert).unwrap_or_default()
	}
}
