/* src/value/de.rs */

use std::fmt;
use std::time::Duration;

use chrono::SecondsFormat;
use serde::de::value::MapDeserializer;
use serde::de::{
	self, DeserializeOwned, DeserializeSeed, Deserializer, EnumAccess, Expected, IntoDeserializer,
	MapAccess, SeqAccess, Unexpected, VariantAccess, Visitor,
};

use super::{Map, Value, cast, duration};

/// Error raised while decoding a [`Value`] into a typed record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct DecodeError(String);

impl de::Error for DecodeError {
	fn custom<T: fmt::Display>(msg: T) -> Self {
		Self(msg.to_string())
	}
}

/// Decodes `value` into `T`.
///
/// With `weak` set, scalars are coerced across types the way the typed
/// accessors do it (`"8080"` into an integer, `1` into a bool, a single
/// scalar into a one-element sequence). Durations accept unit strings such
/// as `"10s"` and integer nanoseconds in either mode.
pub fn from_value<T: DeserializeOwned>(value: &Value, weak: bool) -> Result<T, DecodeError> {
	T::deserialize(ValueDeserializer::new(value, weak))
}

/// A serde [`Deserializer`] over a borrowed [`Value`].
#[derive(Clone, Copy)]
pub struct ValueDeserializer<'a> {
	value: &'a Value,
	weak: bool,
}

impl<'a> ValueDeserializer<'a> {
	pub fn new(value: &'a Value, weak: bool) -> Self {
		Self { value, weak }
	}

	fn unexpected(&self) -> Unexpected<'a> {
		match self.value {
			Value::Null => Unexpected::Unit,
			Value::Bool(b) => Unexpected::Bool(*b),
			Value::Int(i) => Unexpected::Signed(*i),
			Value::Float(f) => Unexpected::Float(*f),
			Value::String(s) => Unexpected::Str(s),
			Value::Datetime(_) => Unexpected::Other("datetime"),
			Value::Array(_) => Unexpected::Seq,
			Value::Table(_) => Unexpected::Map,
		}
	}

	fn invalid(&self, expected: &dyn Expected) -> DecodeError {
		de::Error::invalid_type(self.unexpected(), expected)
	}

	fn deserialize_integer<'de, V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
		match self.value {
			Value::Int(i) => visitor.visit_i64(*i),
			_ if self.weak => match cast::to_i64(self.value) {
				Some(i) => visitor.visit_i64(i),
				None => Err(self.invalid(&visitor)),
			},
			_ => self.deserialize_any(visitor),
		}
	}

	fn deserialize_float<'de, V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
		match self.value {
			Value::Float(f) => visitor.visit_f64(*f),
			Value::Int(i) => visitor.visit_i64(*i),
			_ if self.weak => match cast::to_f64(self.value) {
				Some(f) => visitor.visit_f64(f),
				None => Err(self.invalid(&visitor)),
			},
			_ => self.deserialize_any(visitor),
		}
	}

	fn duration(&self) -> Result<Option<Duration>, DecodeError> {
		match self.value {
			Value::String(s) => duration::parse(s)
				.map(Some)
				.map_err(|e| DecodeError(e.to_string())),
			Value::Int(_) => Ok(cast::to_duration(self.value)),
			Value::Float(_) if self.weak => Ok(cast::to_duration(self.value)),
			_ => Ok(None),
		}
	}
}

macro_rules! forward_integers {
	($($method:ident)*) => {
		$(
			fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
				self.deserialize_integer(visitor)
			}
		)*
	};
}

impl<'de, 'a> Deserializer<'de> for ValueDeserializer<'a> {
	type Error = DecodeError;

	fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
		match self.value {
			Value::Null => visitor.visit_unit(),
			Value::Bool(b) => visitor.visit_bool(*b),
			Value::Int(i) => visitor.visit_i64(*i),
			Value::Float(f) => visitor.visit_f64(*f),
			Value::String(s) => visitor.visit_str(s),
			Value::Datetime(dt) => visitor.visit_string(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
			Value::Array(items) => visitor.visit_seq(ArrayAccess::new(items, self.weak)),
			Value::Table(map) => visitor.visit_map(TableAccess::new(map, self.weak)),
		}
	}

	fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
		match self.value {
			Value::Bool(b) => visitor.visit_bool(*b),
			_ if self.weak => match cast::to_bool(self.value) {
				Some(b) => visitor.visit_bool(b),
				None => Err(self.invalid(&visitor)),
			},
			_ => self.deserialize_any(visitor),
		}
	}

	forward_integers! {
		deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64
		deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64
	}

	fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
		self.deserialize_float(visitor)
	}

	fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
		self.deserialize_float(visitor)
	}

	fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
		self.deserialize_string(visitor)
	}

	fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
		self.deserialize_string(visitor)
	}

	fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
		match self.value {
			Value::String(s) => visitor.visit_str(s),
			Value::Array(_) | Value::Table(_) => self.deserialize_any(visitor),
			_ if self.weak => match cast::to_string(self.value) {
				Some(s) => visitor.visit_string(s),
				None => Err(self.invalid(&visitor)),
			},
			_ => self.deserialize_any(visitor),
		}
	}

	fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
		match self.value {
			Value::Null => visitor.visit_none(),
			_ => visitor.visit_some(self),
		}
	}

	fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
		match self.value {
			Value::Null => visitor.visit_unit(),
			_ => Err(self.invalid(&visitor)),
		}
	}

	fn deserialize_unit_struct<V: Visitor<'de>>(
		self,
		_name: &'static str,
		visitor: V,
	) -> Result<V::Value, DecodeError> {
		self.deserialize_unit(visitor)
	}

	fn deserialize_newtype_struct<V: Visitor<'de>>(
		self,
		_name: &'static str,
		visitor: V,
	) -> Result<V::Value, DecodeError> {
		visitor.visit_newtype_struct(self)
	}

	fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
		match self.value {
			Value::Array(items) => visitor.visit_seq(ArrayAccess::new(items, self.weak)),
			Value::Null if self.weak => visitor.visit_seq(ArrayAccess::new(&[], self.weak)),
			Value::Table(_) => Err(self.invalid(&visitor)),
			_ if self.weak => visitor.visit_seq(ArrayAccess::new(
				std::slice::from_ref(self.value),
				self.weak,
			)),
			_ => Err(self.invalid(&visitor)),
		}
	}

	fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, DecodeError> {
		self.deserialize_seq(visitor)
	}

	fn deserialize_tuple_struct<V: Visitor<'de>>(
		self,
		_name: &'static str,
		_len: usize,
		visitor: V,
	) -> Result<V::Value, DecodeError> {
		self.deserialize_seq(visitor)
	}

	fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
		match self.value {
			Value::Table(map) => visitor.visit_map(TableAccess::new(map, self.weak)),
			_ => Err(self.invalid(&visitor)),
		}
	}

	fn deserialize_struct<V: Visitor<'de>>(
		self,
		name: &'static str,
		fields: &'static [&'static str],
		visitor: V,
	) -> Result<V::Value, DecodeError> {
		// std::time::Duration presents itself as a { secs, nanos } struct.
		if name == "Duration" && *fields == ["secs", "nanos"] {
			if let Some(d) = self.duration()? {
				let parts = [("secs", d.as_secs()), ("nanos", u64::from(d.subsec_nanos()))];
				return visitor.visit_map(MapDeserializer::<_, DecodeError>::new(parts.into_iter()));
			}
		}
		self.deserialize_map(visitor)
	}

	fn deserialize_enum<V: Visitor<'de>>(
		self,
		_name: &'static str,
		_variants: &'static [&'static str],
		visitor: V,
	) -> Result<V::Value, DecodeError> {
		match self.value {
			Value::String(s) => visitor.visit_enum(s.as_str().into_deserializer()),
			Value::Table(map) if map.len() == 1 => {
				let Some((variant, value)) = map.iter().next() else {
					return Err(self.invalid(&visitor));
				};
				visitor.visit_enum(VariantAccessor {
					variant,
					value,
					weak: self.weak,
				})
			}
			_ => Err(self.invalid(&visitor)),
		}
	}

	fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
		self.deserialize_string(visitor)
	}

	fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
		visitor.visit_unit()
	}

	serde::forward_to_deserialize_any! {
		bytes byte_buf
	}
}

struct ArrayAccess<'a> {
	iter: std::slice::Iter<'a, Value>,
	weak: bool,
}

impl<'a> ArrayAccess<'a> {
	fn new(items: &'a [Value], weak: bool) -> Self {
		Self {
			iter: items.iter(),
			weak,
		}
	}
}

impl<'de, 'a> SeqAccess<'de> for ArrayAccess<'a> {
	type Error = DecodeError;

	fn next_element_seed<T: DeserializeSeed<'de>>(
		&mut self,
		seed: T,
	) -> Result<Option<T::Value>, DecodeError> {
		match self.iter.next() {
			Some(item) => seed.deserialize(ValueDeserializer::new(item, self.weak)).map(Some),
			None => Ok(None),
		}
	}

	fn size_hint(&self) -> Option<usize> {
		Some(self.iter.len())
	}
}

struct TableAccess<'a> {
	iter: std::collections::btree_map::Iter<'a, String, Value>,
	pending: Option<&'a Value>,
	weak: bool,
}

impl<'a> TableAccess<'a> {
	fn new(map: &'a Map, weak: bool) -> Self {
		Self {
			iter: map.iter(),
			pending: None,
			weak,
		}
	}
}

impl<'de, 'a> MapAccess<'de> for TableAccess<'a> {
	type Error = DecodeError;

	fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>, DecodeError> {
		match self.iter.next() {
			Some((key, value)) => {
				self.pending = Some(value);
				seed.deserialize(key.as_str().into_deserializer()).map(Some)
			}
			None => Ok(None),
		}
	}

	fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, DecodeError> {
		let value = self
			.pending
			.take()
			.ok_or_else(|| <DecodeError as de::Error>::custom("value requested before its key"))?;
		seed.deserialize(ValueDeserializer::new(value, self.weak))
	}

	fn size_hint(&self) -> Option<usize> {
		Some(self.iter.len())
	}
}

/// Externally tagged enum: a single-entry table `{ variant: content }`.
struct VariantAccessor<'a> {
	variant: &'a str,
	value: &'a Value,
	weak: bool,
}

impl<'de, 'a> EnumAccess<'de> for VariantAccessor<'a> {
	type Error = DecodeError;
	type Variant = Self;

	fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self), DecodeError> {
		let tag = seed.deserialize(self.variant.into_deserializer())?;
		Ok((tag, self))
	}
}

impl<'de, 'a> VariantAccess<'de> for VariantAccessor<'a> {
	type Error = DecodeError;

	fn unit_variant(self) -> Result<(), DecodeError> {
		de::Deserialize::deserialize(ValueDeserializer::new(self.value, self.weak))
	}

	fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, DecodeError> {
		seed.deserialize(ValueDeserializer::new(self.value, self.weak))
	}

	fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, DecodeError> {
		Deserializer::deserialize_seq(ValueDeserializer::new(self.value, self.weak), visitor)
	}

	fn struct_variant<V: Visitor<'de>>(
		self,
		_fields: &'static [&'static str],
		visitor: V,
	) -> Result<V::Value, DecodeError> {
		Deserializer::deserialize_map(ValueDeserializer::new(self.value, self.weak), visitor)
	}
}
