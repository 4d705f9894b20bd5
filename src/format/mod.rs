/* src/format/mod.rs */

use std::path::Path;

use crate::ConfError;
use crate::value::Map;

#[cfg(feature = "json")]
mod json;
#[cfg(feature = "json")]
pub use json::Json;

#[cfg(feature = "toml")]
mod toml;
#[cfg(feature = "toml")]
pub use self::toml::Toml;

#[cfg(feature = "yaml")]
mod yaml;
#[cfg(feature = "yaml")]
pub use yaml::Yaml;

/// Abstract format parser that converts raw bytes into a configuration tree.
pub trait Format: Send + Sync {
	/// List of supported extensions or identifiers.
	fn extensions(&self) -> &'static [&'static str];

	/// Parse the raw bytes into a tree. The document root must be a mapping.
	fn parse(&self, input: &[u8]) -> Result<Map, ConfError>;
}

/// An enum wrapper for all supported formats, enabling dynamic dispatch-like behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnyFormat {
	#[cfg(feature = "json")]
	Json,
	#[cfg(feature = "toml")]
	Toml,
	#[cfg(feature = "yaml")]
	Yaml,
}

impl AnyFormat {
	/// Every format compiled into this build.
	pub const ALL: &'static [AnyFormat] = &[
		#[cfg(feature = "json")]
		Self::Json,
		#[cfg(feature = "toml")]
		Self::Toml,
		#[cfg(feature = "yaml")]
		Self::Yaml,
	];

	/// Selects the format registered for `ext` (without the leading dot).
	pub fn from_extension(ext: &str) -> Option<Self> {
		Self::ALL
			.iter()
			.copied()
			.find(|format| format.extensions().contains(&ext))
	}

	/// Selects the format from a file path's extension.
	pub fn from_path(path: &Path) -> Result<Self, ConfError> {
		let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
		Self::from_extension(ext)
			.ok_or_else(|| ConfError::UnsupportedFormat(format!("{:?} has no supported extension", path)))
	}
}

impl Format for AnyFormat {
	fn extensions(&self) -> &'static [&'static str] {
		match self {
			#[cfg(feature = "json")]
			Self::Json => Json.extensions(),
			#[cfg(feature = "toml")]
			Self::Toml => Toml.extensions(),
			#[cfg(feature = "yaml")]
			Self::Yaml => Yaml.extensions(),
			#[cfg(not(any(feature = "json", feature = "toml", feature = "yaml")))]
			_ => unreachable!(),
		}
	}

	fn parse(&self, _input: &[u8]) -> Result<Map, ConfError> {
		match self {
			#[cfg(feature = "json")]
			Self::Json => Json.parse(_input),
			#[cfg(feature = "toml")]
			Self::Toml => Toml.parse(_input),
			#[cfg(feature = "yaml")]
			Self::Yaml => Yaml.parse(_input),
			#[cfg(not(any(feature = "json", feature = "toml", feature = "yaml")))]
			_ => unreachable!(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	#[cfg(all(feature = "json", feature = "toml", feature = "yaml"))]
	fn selects_by_extension() {
		assert_eq!(AnyFormat::from_extension("json"), Some(AnyFormat::Json));
		assert_eq!(AnyFormat::from_extension("toml"), Some(AnyFormat::Toml));
		assert_eq!(AnyFormat::from_extension("yml"), Some(AnyFormat::Yaml));
		assert_eq!(AnyFormat::from_extension("ini"), None);
		assert!(matches!(
			AnyFormat::from_path(Path::new("/etc/app/config")),
			Err(ConfError::UnsupportedFormat(_))
		));
	}
}
