/* src/value/mod.rs */

//!
//! The configuration tree and the conversions readers apply to it.
//!
//! - [`Value`] / [`Map`] - one generation of parsed configuration
//! - [`cast`] - best-effort coercions behind the typed accessors
//! - [`from_value`] - serde decoding into caller-supplied types
//! - [`duration`] - duration strings such as `"1h30m"` or `"250ms"`

pub mod cast;
mod de;
pub mod duration;

pub use de::{DecodeError, ValueDeserializer, from_value};

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// A nested mapping from segment name to value.
pub type Map = BTreeMap<String, Value>;

/// A single node of the configuration tree.
///
/// Tables are reference-counted: cloning a `Value` that holds a sub-tree
/// shares it instead of copying it. Trees are never mutated after they are
/// built, so a shared sub-tree is a stable read-only view of its generation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	String(String),
	Datetime(DateTime<Utc>),
	Array(Vec<Value>),
	Table(Arc<Map>),
}

impl Value {
	/// Returns true for an explicit null.
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// Returns the nested mapping if this value is a table.
	pub fn as_table(&self) -> Option<&Map> {
		match self {
			Self::Table(map) => Some(map),
			_ => None,
		}
	}

	pub fn as_array(&self) -> Option<&[Value]> {
		match self {
			Self::Array(items) => Some(items),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::Int(i) => Some(*i),
			_ => None,
		}
	}

	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Float(f) => Some(*f),
			Self::Int(i) => Some(*i as f64),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			_ => None,
		}
	}

	/// Short name of the variant, used in diagnostics.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Bool(_) => "bool",
			Self::Int(_) => "integer",
			Self::Float(_) => "float",
			Self::String(_) => "string",
			Self::Datetime(_) => "datetime",
			Self::Array(_) => "array",
			Self::Table(_) => "table",
		}
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Self::Int(i64::from(value))
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::String(value.to_string())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<DateTime<Utc>> for Value {
	fn from(value: DateTime<Utc>) -> Self {
		Self::Datetime(value)
	}
}

impl From<Vec<Value>> for Value {
	fn from(value: Vec<Value>) -> Self {
		Self::Array(value)
	}
}

impl From<Map> for Value {
	fn from(value: Map) -> Self {
		Self::Table(Arc::new(value))
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let map: Map = iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
		Self::from(map)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn table_clones_share_the_subtree() {
		let table: Value = [("port", Value::Int(8080))].into_iter().collect();
		let copy = table.clone();
		match (&table, &copy) {
			(Value::Table(a), Value::Table(b)) => assert!(Arc::ptr_eq(a, b)),
			_ => panic!("expected tables"),
		}
	}

	#[test]
	fn as_f64_widens_integers() {
		assert_eq!(Value::Int(3).as_f64(), Some(3.0));
		assert_eq!(Value::from("3").as_f64(), None);
	}
}
