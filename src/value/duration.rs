/* src/value/duration.rs */

//! Parsing of unit-suffixed duration strings (`"300ms"`, `"1.5h"`, `"2h45m"`).

use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Error returned for malformed or negative duration strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid duration {input:?}: {reason}")]
pub struct ParseDurationError {
	input: String,
	reason: &'static str,
}

/// Parses a sequence of decimal numbers, each with an optional fraction and
/// a unit suffix. Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`.
/// A bare `"0"` is accepted. Negative durations are rejected.
pub fn parse(input: &str) -> Result<Duration, ParseDurationError> {
	let fail = |reason| ParseDurationError {
		input: input.to_string(),
		reason,
	};

	let s = input.trim();
	let s = s.strip_prefix('+').unwrap_or(s);
	if s.starts_with('-') {
		return Err(fail("negative durations are not representable"));
	}
	if s == "0" {
		return Ok(Duration::ZERO);
	}
	if s.is_empty() {
		return Err(fail("empty"));
	}

	let mut rest = s;
	let mut total: u128 = 0;
	while !rest.is_empty() {
		let number_end = rest
			.find(|c: char| !(c.is_ascii_digit() || c == '.'))
			.unwrap_or(rest.len());
		let number = &rest[..number_end];
		rest = &rest[number_end..];

		let unit_end = rest
			.find(|c: char| c.is_ascii_digit() || c == '.')
			.unwrap_or(rest.len());
		let unit = &rest[..unit_end];
		rest = &rest[unit_end..];

		let scale: u128 = match unit {
			"ns" => 1,
			"us" | "µs" | "μs" => 1_000,
			"ms" => 1_000_000,
			"s" => NANOS_PER_SEC,
			"m" => 60 * NANOS_PER_SEC,
			"h" => 3_600 * NANOS_PER_SEC,
			"" => return Err(fail("missing unit")),
			_ => return Err(fail("unknown unit")),
		};

		let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
		if whole.is_empty() && fraction.is_empty() {
			return Err(fail("missing number"));
		}

		let whole: u128 = if whole.is_empty() {
			0
		} else {
			whole.parse().map_err(|_| fail("bad number"))?
		};
		let mut nanos = whole.checked_mul(scale).ok_or_else(|| fail("overflow"))?;

		if !fraction.is_empty() {
			// Digits past nanosecond precision of the largest unit cannot matter.
			let fraction = &fraction[..fraction.len().min(24)];
			let digits: u128 = fraction.parse().map_err(|_| fail("bad fraction"))?;
			let denominator = 10u128.pow(fraction.len() as u32);
			nanos += digits * scale / denominator;
		}

		total = total.checked_add(nanos).ok_or_else(|| fail("overflow"))?;
	}

	let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| fail("overflow"))?;
	Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_single_units() {
		assert_eq!(parse("10s").unwrap(), Duration::from_secs(10));
		assert_eq!(parse("250ms").unwrap(), Duration::from_millis(250));
		assert_eq!(parse("3us").unwrap(), Duration::from_micros(3));
		assert_eq!(parse("3µs").unwrap(), Duration::from_micros(3));
		assert_eq!(parse("5ns").unwrap(), Duration::from_nanos(5));
		assert_eq!(parse("2h").unwrap(), Duration::from_secs(7_200));
	}

	#[test]
	fn parses_compound_and_fractional() {
		assert_eq!(parse("1h30m").unwrap(), Duration::from_secs(5_400));
		assert_eq!(parse("1.5s").unwrap(), Duration::from_millis(1_500));
		assert_eq!(parse(".5m").unwrap(), Duration::from_secs(30));
		assert_eq!(parse("+1m0.25s").unwrap(), Duration::from_millis(60_250));
	}

	#[test]
	fn zero_needs_no_unit() {
		assert_eq!(parse("0").unwrap(), Duration::ZERO);
	}

	#[test]
	fn rejects_malformed() {
		assert!(parse("").is_err());
		assert!(parse("10").is_err());
		assert!(parse("10x").is_err());
		assert!(parse("-5s").is_err());
		assert!(parse("s").is_err());
		assert!(parse("1..2s").is_err());
	}
}
