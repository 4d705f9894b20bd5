/* src/format/yaml.rs */

use crate::ConfError;
use crate::value::{Map, Value};

/// YAML format parser using `serde_yaml`.
pub struct Yaml;

impl super::Format for Yaml {
	fn extensions(&self) -> &'static [&'static str] {
		&["yaml", "yml"]
	}

	fn parse(&self, input: &[u8]) -> Result<Map, ConfError> {
		let doc: serde_yaml::Value =
			serde_yaml::from_slice(input).map_err(|e| ConfError::Unmarshal(e.to_string()))?;
		match doc {
			// An empty document is an empty configuration.
			serde_yaml::Value::Null => Ok(Map::new()),
			serde_yaml::Value::Mapping(mapping) => convert_mapping(mapping),
			other => Err(ConfError::Unmarshal(format!(
				"document root must be a mapping, found {:?}",
				other
			))),
		}
	}
}

fn convert_mapping(mapping: serde_yaml::Mapping) -> Result<Map, ConfError> {
	let mut map = Map::new();
	for (key, value) in mapping {
		let key = match key {
			serde_yaml::Value::String(s) => s,
			serde_yaml::Value::Number(n) => n.to_string(),
			serde_yaml::Value::Bool(b) => b.to_string(),
			other => {
				return Err(ConfError::Unmarshal(format!(
					"mapping keys must be scalars, found {:?}",
					other
				)));
			}
		};
		map.insert(key, convert(value)?);
	}
	Ok(map)
}

fn convert(value: serde_yaml::Value) -> Result<Value, ConfError> {
	Ok(match value {
		serde_yaml::Value::Null => Value::Null,
		serde_yaml::Value::Bool(b) => Value::Bool(b),
		serde_yaml::Value::Number(n) => match n.as_i64() {
			Some(i) => Value::Int(i),
			None => Value::Float(n.as_f64().unwrap_or_default()),
		},
		serde_yaml::Value::String(s) => Value::String(s),
		serde_yaml::Value::Sequence(items) => {
			Value::Array(items.into_iter().map(convert).collect::<Result<_, _>>()?)
		}
		serde_yaml::Value::Mapping(mapping) => Value::from(convert_mapping(mapping)?),
		serde_yaml::Value::Tagged(tagged) => convert(tagged.value)?,
	})
}

#[cfg(test)]
mod tests {
	use super::super::Format;
	use super::*;

	#[test]
	fn parses_mappings() {
		let map = Yaml
			.parse(b"server:\n  http:\n    host: 0.0.0.0\n    port: 8080\n  tags: [a, b]\n  8: eight\n")
			.unwrap();
		let server = map["server"].as_table().unwrap();
		assert_eq!(server["http"].as_table().unwrap()["port"], Value::Int(8080));
		assert_eq!(server["8"], Value::from("eight"));
		assert_eq!(server["tags"].as_array().unwrap().len(), 2);
	}

	#[test]
	fn empty_document_is_empty_tree() {
		assert!(Yaml.parse(b"").unwrap().is_empty());
	}

	#[test]
	fn rejects_sequence_roots() {
		assert!(Yaml.parse(b"- a\n- b\n").unwrap_err().is_unmarshal());
	}
}
