/* src/cache/list.rs */

use std::collections::HashMap;

const HEAD: usize = 0;
const TAIL: usize = 1;

struct Node<V> {
	entry: Option<(String, V)>,
	prev: usize,
	next: usize,
}

impl<V> Node<V> {
	fn sentinel(prev: usize, next: usize) -> Self {
		Self {
			entry: None,
			prev,
			next,
		}
	}
}

/// Unsynchronized LRU ordering: an index-linked list over an arena of nodes
/// plus a key index.
///
/// Slots 0 and 1 are the head and tail sentinels and are never unlinked.
/// The node right after the head is the most recently used; the node right
/// before the tail is the least recently used. Slots of evicted nodes are
/// recycled through `free`.
pub(crate) struct LruList<V> {
	nodes: Vec<Node<V>>,
	index: HashMap<String, usize>,
	free: Vec<usize>,
	capacity: usize,
}

impl<V: Clone> LruList<V> {
	pub(crate) fn new(capacity: usize) -> Self {
		let mut list = Self {
			nodes: Vec::new(),
			index: HashMap::new(),
			free: Vec::new(),
			capacity,
		};
		list.reset();
		list
	}

	pub(crate) fn capacity(&self) -> usize {
		self.capacity
	}

	pub(crate) fn len(&self) -> usize {
		self.index.len()
	}

	pub(crate) fn get(&mut self, key: &str) -> Option<V> {
		let slot = *self.index.get(key)?;
		self.promote(slot);
		self.nodes[slot].entry.as_ref().map(|(_, value)| value.clone())
	}

	/// Inserts or updates `key`, evicting the least recently used entry when
	/// the list grows past capacity. Returns the evicted key, if any.
	pub(crate) fn put(&mut self, key: &str, value: V) -> Option<String> {
		if let Some(&slot) = self.index.get(key) {
			if let Some((_, current)) = self.nodes[slot].entry.as_mut() {
				*current = value;
			}
			self.promote(slot);
			return None;
		}

		let slot = self.allocate(key.to_string(), value);
		self.link_front(slot);
		self.index.insert(key.to_string(), slot);

		if self.index.len() > self.capacity {
			return self.evict_back();
		}
		None
	}

	/// Drops every entry and reinitialises the sentinels.
	pub(crate) fn reset(&mut self) {
		self.nodes = vec![Node::sentinel(HEAD, TAIL), Node::sentinel(HEAD, TAIL)];
		self.index = HashMap::with_capacity(self.capacity.min(1024));
		self.free.clear();
	}

	/// Keys from most to least recently used.
	pub(crate) fn keys(&self) -> Vec<String> {
		let mut keys = Vec::with_capacity(self.len());
		let mut cursor = self.nodes[HEAD].next;
		while cursor != TAIL {
			if let Some((key, _)) = &self.nodes[cursor].entry {
				keys.push(key.clone());
			}
			cursor = self.nodes[cursor].next;
		}
		keys
	}

	fn allocate(&mut self, key: String, value: V) -> usize {
		let node = Node {
			entry: Some((key, value)),
			prev: HEAD,
			next: TAIL,
		};
		match self.free.pop() {
			Some(slot) => {
				self.nodes[slot] = node;
				slot
			}
			None => {
				self.nodes.push(node);
				self.nodes.len() - 1
			}
		}
	}

	fn unlink(&mut self, slot: usize) {
		let (prev, next) = (self.nodes[slot].prev, self.nodes[slot].next);
		self.nodes[prev].next = next;
		self.nodes[next].prev = prev;
	}

	fn link_front(&mut self, slot: usize) {
		let first = self.nodes[HEAD].next;
		self.nodes[slot].prev = HEAD;
		self.nodes[slot].next = first;
		self.nodes[first].prev = slot;
		self.nodes[HEAD].next = slot;
	}

	fn promote(&mut self, slot: usize) {
		if self.nodes[HEAD].next != slot {
			self.unlink(slot);
			self.link_front(slot);
		}
	}

	fn evict_back(&mut self) -> Option<String> {
		let slot = self.nodes[TAIL].prev;
		if slot == HEAD {
			return None;
		}
		self.unlink(slot);
		let (key, _) = self.nodes[slot].entry.take()?;
		self.index.remove(&key);
		self.free.push(slot);
		Some(key)
	}

	#[cfg(test)]
	fn assert_consistent(&self) {
		assert!(self.index.len() <= self.capacity);
		let mut walked = 0;
		let mut prev = HEAD;
		let mut cursor = self.nodes[HEAD].next;
		while cursor != TAIL {
			let node = &self.nodes[cursor];
			assert_eq!(node.prev, prev, "broken back link at slot {cursor}");
			let (key, _) = node.entry.as_ref().expect("linked node without entry");
			assert_eq!(self.index.get(key), Some(&cursor));
			walked += 1;
			prev = cursor;
			cursor = node.next;
		}
		assert_eq!(self.nodes[TAIL].prev, prev);
		assert_eq!(walked, self.index.len());
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn evicts_least_recently_used() {
		let mut list = LruList::new(2);
		assert_eq!(list.put("a", 1), None);
		assert_eq!(list.put("b", 2), None);
		assert_eq!(list.put("c", 3), Some("a".to_string()));
		assert_eq!(list.keys(), vec!["c", "b"]);
		list.assert_consistent();
	}

	#[test]
	fn update_promotes_without_growing() {
		let mut list = LruList::new(2);
		list.put("a", 1);
		list.put("b", 2);
		assert_eq!(list.put("a", 10), None);
		assert_eq!(list.len(), 2);
		assert_eq!(list.put("c", 3), Some("b".to_string()));
		assert_eq!(list.get("a"), Some(10));
		list.assert_consistent();
	}

	#[test]
	fn evicted_slots_are_recycled() {
		let mut list = LruList::new(3);
		for i in 0..100 {
			list.put(&format!("k{i}"), i);
			list.assert_consistent();
		}
		// two sentinels, three live nodes, one slot freed by the latest eviction
		assert!(list.nodes.len() <= 6);
		assert_eq!(list.keys(), vec!["k99", "k98", "k97"]);
	}

	#[test]
	fn reset_restores_sentinels() {
		let mut list = LruList::new(4);
		list.put("a", 1);
		list.put("b", 2);
		list.reset();
		assert_eq!(list.len(), 0);
		assert!(list.keys().is_empty());
		assert_eq!(list.get("a"), None);
		list.put("c", 3);
		assert_eq!(list.keys(), vec!["c"]);
		list.assert_consistent();
	}
}
