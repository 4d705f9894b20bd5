/* src/format/toml.rs */

use crate::ConfError;
use crate::value::{Map, Value, cast};

/// TOML format parser using `toml`.
pub struct Toml;

impl super::Format for Toml {
	fn extensions(&self) -> &'static [&'static str] {
		&["toml"]
	}

	fn parse(&self, input: &[u8]) -> Result<Map, ConfError> {
		let s = std::str::from_utf8(input).map_err(|e| ConfError::Unmarshal(e.to_string()))?;
		let table: toml::Table = toml::from_str(s).map_err(|e| ConfError::Unmarshal(e.to_string()))?;
		Ok(table.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
	}
}

impl From<toml::Value> for Value {
	fn from(value: toml::Value) -> Self {
		match value {
			toml::Value::String(s) => Self::String(s),
			toml::Value::Integer(i) => Self::Int(i),
			toml::Value::Float(f) => Self::Float(f),
			toml::Value::Boolean(b) => Self::Bool(b),
			// Local times without a date have no instant; keep their text.
			toml::Value::Datetime(dt) => {
				let text = dt.to_string();
				match cast::parse_datetime(&text) {
					Some(instant) => Self::Datetime(instant),
					None => Self::String(text),
				}
			}
			toml::Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
			toml::Value::Table(table) => table.into_iter().collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::super::Format;
	use super::*;

	const DOC: &str = r#"
[server.http]
host = "0.0.0.0"
port = 8080

[server.config]
connection = false
timeout = "10s"
publish = 2023-02-19
at = 07:32:00
depends = ["tcp", "ip"]
"#;

	#[test]
	fn parses_tables_and_datetimes() {
		let map = Toml.parse(DOC.as_bytes()).unwrap();
		let server = map["server"].as_table().unwrap();
		let http = server["http"].as_table().unwrap();
		assert_eq!(http["port"], Value::Int(8080));

		let config = server["config"].as_table().unwrap();
		assert_eq!(config["connection"], Value::Bool(false));
		assert_eq!(
			config["publish"],
			Value::Datetime(cast::parse_datetime("2023-02-19").unwrap())
		);
		assert_eq!(config["at"], Value::from("07:32:00"));
		assert_eq!(config["depends"].as_array().unwrap().len(), 2);
	}

	#[test]
	fn reports_unmarshal_errors() {
		assert!(Toml.parse(b"port = ").unwrap_err().is_unmarshal());
	}
}
