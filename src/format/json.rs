/* src/format/json.rs */

use crate::ConfError;
use crate::value::{Map, Value};

/// JSON format parser using `serde_json`.
pub struct Json;

impl super::Format for Json {
	fn extensions(&self) -> &'static [&'static str] {
		&["json"]
	}

	fn parse(&self, input: &[u8]) -> Result<Map, ConfError> {
		let doc: serde_json::Value =
			serde_json::from_slice(input).map_err(|e| ConfError::Unmarshal(e.to_string()))?;
		match Value::from(doc) {
			Value::Table(map) => Ok(std::sync::Arc::unwrap_or_clone(map)),
			other => Err(ConfError::Unmarshal(format!(
				"document root must be an object, found {}",
				other.kind()
			))),
		}
	}
}

impl From<serde_json::Value> for Value {
	fn from(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null => Self::Null,
			serde_json::Value::Bool(b) => Self::Bool(b),
			serde_json::Value::Number(n) => match n.as_i64() {
				Some(i) => Self::Int(i),
				None => Self::Float(n.as_f64().unwrap_or_default()),
			},
			serde_json::Value::String(s) => Self::String(s),
			serde_json::Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
			serde_json::Value::Object(map) => map.into_iter().collect(),
		}
	}
}
