/* src/cache/mod.rs */

//!
//! Bounded least-recently-used lookup cache.

mod list;

use std::sync::{Mutex, MutexGuard, PoisonError};

use list::LruList;

/// Default number of resolved lookups kept by an engine.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Thread-safe LRU cache keyed by lookup path.
///
/// Every operation takes the cache's own lock and nothing else, so the cache
/// can be consulted with or without any outer lock held. `get` and `put` are
/// O(1) on average. A capacity of zero keeps nothing: every insert is evicted
/// immediately.
pub struct LruCache<V> {
	inner: Mutex<LruList<V>>,
}

impl<V: Clone> LruCache<V> {
	/// Creates an empty cache holding at most `capacity` entries.
	pub fn new(capacity: usize) -> Self {
		Self {
			inner: Mutex::new(LruList::new(capacity)),
		}
	}

	/// Returns a clone of the cached value and marks it most recently used.
	pub fn get(&self, key: &str) -> Option<V> {
		self.lock().get(key)
	}

	/// Inserts or updates an entry, evicting the least recently used entry
	/// on overflow. Returns the evicted key.
	pub fn put(&self, key: &str, value: V) -> Option<String> {
		self.lock().put(key, value)
	}

	/// Removes every entry.
	pub fn flush(&self) {
		self.lock().reset();
	}

	pub fn len(&self) -> usize {
		self.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn capacity(&self) -> usize {
		self.lock().capacity()
	}

	/// Returns the cached keys ordered from most to least recently used.
	pub fn keys(&self) -> Vec<String> {
		self.lock().keys()
	}

	// The list is left consistent between operations, so a panic elsewhere
	// while the lock was held does not invalidate it.
	fn lock(&self) -> MutexGuard<'_, LruList<V>> {
		self.inner.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

impl<V: Clone> Default for LruCache<V> {
	fn default() -> Self {
		Self::new(DEFAULT_CAPACITY)
	}
}

impl<V> std::fmt::Debug for LruCache<V> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LruCache").finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;

	#[test]
	fn get_after_put() {
		let cache = LruCache::new(2);
		let cases = [
			("hello", "world"),
			("hello1", "world1"),
			("hello1", "world1"),
			("hello3", "world3"),
			("hello4", "world4"),
			("hello4", "world4"),
		];
		for (key, value) in cases {
			cache.put(key, value);
			assert_eq!(cache.get(key), Some(value));
		}
		assert_eq!(cache.len(), 2);
	}

	#[test]
	fn keeps_the_most_recent_capacity_keys() {
		let cache = LruCache::new(3);
		for i in 0..10 {
			cache.put(&format!("k{i}"), i);
		}
		for i in 7..10 {
			assert_eq!(cache.get(&format!("k{i}")), Some(i));
		}
		for i in 0..7 {
			assert_eq!(cache.get(&format!("k{i}")), None);
		}
	}

	#[test]
	fn overflow_evicts_exactly_the_least_recently_used() {
		let cache = LruCache::new(3);
		cache.put("a", 1);
		cache.put("b", 2);
		cache.put("c", 3);
		// "a" becomes most recent, leaving "b" as the eviction candidate.
		assert_eq!(cache.get("a"), Some(1));
		assert_eq!(cache.put("d", 4), Some("b".to_string()));
		assert_eq!(cache.get("b"), None);
		assert_eq!(cache.get("a"), Some(1));
		assert_eq!(cache.get("c"), Some(3));
		assert_eq!(cache.get("d"), Some(4));
	}

	#[test]
	fn repeated_reads_only_promote_the_read_key() {
		let cache = LruCache::new(4);
		for key in ["a", "b", "c", "d"] {
			cache.put(key, ());
		}
		assert_eq!(cache.keys(), vec!["d", "c", "b", "a"]);
		for _ in 0..3 {
			cache.get("b");
		}
		assert_eq!(cache.keys(), vec!["b", "d", "c", "a"]);
	}

	#[test]
	fn flush_forgets_everything() {
		let cache = LruCache::new(2);
		cache.put("hello", "world");
		cache.flush();
		assert_eq!(cache.get("hello"), None);
		assert!(cache.is_empty());
		cache.put("hello", "again");
		assert_eq!(cache.get("hello"), Some("again"));
	}

	#[test]
	fn zero_capacity_holds_nothing() {
		let cache = LruCache::new(0);
		assert_eq!(cache.put("a", 1), Some("a".to_string()));
		assert_eq!(cache.get("a"), None);
		assert!(cache.is_empty());
		assert_eq!(cache.capacity(), 0);
	}

	#[test]
	fn concurrent_access_keeps_the_bound() {
		let cache = Arc::new(LruCache::new(16));
		let handles: Vec<_> = (0..8)
			.map(|t| {
				let cache = Arc::clone(&cache);
				std::thread::spawn(move || {
					for i in 0..500 {
						let key = format!("k{}", (t * 31 + i) % 64);
						cache.put(&key, i);
						cache.get(&key);
						if i % 97 == 0 {
							cache.flush();
						}
					}
				})
			})
			.collect();
		for handle in handles {
			handle.join().unwrap();
		}
		assert!(cache.len() <= 16);
		assert_eq!(cache.keys().len(), cache.len());
	}
}
