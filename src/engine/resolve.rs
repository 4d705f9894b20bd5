/* src/engine/resolve.rs */

use crate::value::{Map, Value};

/// Walks `tree` along `key` split by `separator`.
///
/// Every segment but the last must name a table; anything else yields
/// `None`. The tree is only borrowed.
pub fn resolve<'a>(tree: &'a Map, key: &str, separator: &str) -> Option<&'a Value> {
	let segments: Vec<&str> = key.split(separator).collect();
	let (last, parents) = segments.split_last()?;

	let mut level = tree;
	for segment in parents {
		match level.get(*segment) {
			Some(Value::Table(next)) => level = next,
			_ => return None,
		}
	}
	level.get(*last)
}
