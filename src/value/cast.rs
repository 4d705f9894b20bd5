/* src/value/cast.rs */

//! Best-effort coercions from a [`Value`] into plain Rust types.
//!
//! Every function returns `None` when the value cannot be interpreted as the
//! requested type. The engine's typed accessors turn `None` into the type's
//! zero value, so a read never fails.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use super::{Map, Value, duration};

pub fn to_string(value: &Value) -> Option<String> {
	match value {
		Value::Null => Some(String::new()),
		Value::Bool(b) => Some(b.to_string()),
		Value::Int(i) => Some(i.to_string()),
		Value::Float(f) => Some(f.to_string()),
		Value::String(s) => Some(s.clone()),
		Value::Datetime(dt) => Some(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
		Value::Array(_) | Value::Table(_) => None,
	}
}

pub fn to_bool(value: &Value) -> Option<bool> {
	match value {
		Value::Null => Some(false),
		Value::Bool(b) => Some(*b),
		Value::Int(i) => Some(*i != 0),
		Value::Float(f) => Some(*f != 0.0),
		Value::String(s) => match s.trim() {
			"1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
			"0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
			_ => None,
		},
		Value::Datetime(_) | Value::Array(_) | Value::Table(_) => None,
	}
}

pub fn to_i64(value: &Value) -> Option<i64> {
	match value {
		Value::Null => Some(0),
		Value::Bool(b) => Some(i64::from(*b)),
		Value::Int(i) => Some(*i),
		Value::Float(f) if f.is_finite() => Some(f.trunc() as i64),
		Value::String(s) => parse_integer(s.trim()),
		_ => None,
	}
}

pub fn to_f64(value: &Value) -> Option<f64> {
	match value {
		Value::Null => Some(0.0),
		Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
		Value::Int(i) => Some(*i as f64),
		Value::Float(f) => Some(*f),
		Value::String(s) => s.trim().parse().ok(),
		_ => None,
	}
}

/// Integers are read as Unix seconds; strings in the formats accepted by
/// [`parse_datetime`].
pub fn to_time(value: &Value) -> Option<DateTime<Utc>> {
	match value {
		Value::Datetime(dt) => Some(*dt),
		Value::Int(secs) => DateTime::from_timestamp(*secs, 0),
		Value::String(s) => parse_datetime(s),
		_ => None,
	}
}

/// Integers and floats are read as nanoseconds. Strings carrying a unit are
/// parsed with [`duration::parse`]; bare numeric strings are nanoseconds.
pub fn to_duration(value: &Value) -> Option<Duration> {
	match value {
		Value::Null => Some(Duration::ZERO),
		Value::Int(nanos) => u64::try_from(*nanos).ok().map(Duration::from_nanos),
		Value::Float(nanos) if nanos.is_finite() && *nanos >= 0.0 => {
			Some(Duration::from_nanos(*nanos as u64))
		}
		Value::String(s) => {
			let s = s.trim();
			if s.contains(['n', 's', 'u', 'µ', 'μ', 'm', 'h']) {
				duration::parse(s).ok()
			} else {
				parse_integer(s)
					.and_then(|nanos| u64::try_from(nanos).ok())
					.map(Duration::from_nanos)
			}
		}
		_ => None,
	}
}

pub fn to_vec(value: &Value) -> Option<Vec<Value>> {
	match value {
		Value::Array(items) => Some(items.clone()),
		_ => None,
	}
}

/// Arrays convert element-wise; a string is split on whitespace.
pub fn to_string_vec(value: &Value) -> Option<Vec<String>> {
	match value {
		Value::Array(items) => Some(
			items
				.iter()
				.map(|item| to_string(item).unwrap_or_default())
				.collect(),
		),
		Value::String(s) => Some(s.split_whitespace().map(str::to_string).collect()),
		_ => None,
	}
}

pub fn to_map(value: &Value) -> Option<Map> {
	value.as_table().cloned()
}

pub fn to_string_map(value: &Value) -> Option<HashMap<String, String>> {
	let table = value.as_table()?;
	Some(
		table
			.iter()
			.map(|(k, v)| (k.clone(), to_string(v).unwrap_or_default()))
			.collect(),
	)
}

pub fn to_string_vec_map(value: &Value) -> Option<HashMap<String, Vec<String>>> {
	let table = value.as_table()?;
	let mut out = HashMap::with_capacity(table.len());
	for (k, v) in table {
		let items = match v {
			Value::Array(_) => to_string_vec(v)?,
			Value::String(s) => vec![s.clone()],
			scalar => vec![to_string(scalar).unwrap_or_default()],
		};
		out.insert(k.clone(), items);
	}
	Some(out)
}

/// Parses RFC 3339, RFC 2822, and the common naive layouts
/// (`2024-05-01T08:30:00`, `2024-05-01 08:30:00`, `2024-05-01`).
/// Naive values are taken as UTC.
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
	let s = s.trim();
	if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
		return Some(dt.with_timezone(&Utc));
	}
	if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
		return Some(dt.with_timezone(&Utc));
	}
	for layout in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
		if let Ok(naive) = NaiveDateTime::parse_from_str(s, layout) {
			return Some(naive.and_utc());
		}
	}
	NaiveDate::parse_from_str(s, "%Y-%m-%d")
		.ok()
		.and_then(|date| date.and_hms_opt(0, 0, 0))
		.map(|naive| naive.and_utc())
}

/// Reads integers the way prefixed literals are written: decimal,
/// `0x`/`0o`/`0b`, a leading `0` for octal (`"010"` is 8), and `_` between
/// digits. Whole-valued decimals such as `"8080.0"` are accepted too.
fn parse_integer(s: &str) -> Option<i64> {
	let (sign, body) = match s.strip_prefix('-') {
		Some(rest) => ("-", rest),
		None => ("", s.strip_prefix('+').unwrap_or(s)),
	};

	let prefixed = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)]
		.into_iter()
		.find_map(|(prefix, radix)| body.strip_prefix(prefix).map(|rest| (rest, radix)));
	let (digits, radix) = match prefixed {
		Some((rest, radix)) => (rest.strip_prefix('_').unwrap_or(rest), radix),
		None if body.len() > 1 && body.starts_with('0') && !body.contains('.') => {
			let rest = &body[1..];
			(rest.strip_prefix('_').unwrap_or(rest), 8)
		}
		None => (body, 10),
	};
	if let Some(i) = parse_digits(sign, digits, radix) {
		return Some(i);
	}

	let (whole, fraction) = s.split_once('.')?;
	if !fraction.is_empty() && fraction.chars().all(|c| c == '0') {
		return whole.parse().ok();
	}
	None
}

/// Parses `digits` in `radix`, allowing single underscores between digits.
fn parse_digits(sign: &str, digits: &str, radix: u32) -> Option<i64> {
	let well_formed = !digits.is_empty()
		&& digits.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
		&& !digits.starts_with('_')
		&& !digits.ends_with('_')
		&& !digits.contains("__");
	if !well_formed {
		return None;
	}
	let cleaned: String = sign.chars().chain(digits.chars().filter(|&c| c != '_')).collect();
	i64::from_str_radix(&cleaned, radix).ok()
}
