// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use chrono::{NaiveDate, NaiveDateTime};

/// Canonical textual timestamp layout. Fractional seconds are only printed
/// when present.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Rendered width of a timestamp without fractional seconds.
pub const TIMESTAMP_WIDTH: usize = 19;

const DATETIME_LAYOUTS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
	ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses the canonical layouts (and a bare ISO date, at midnight).
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
	let text = text.trim();
	for layout in DATETIME_LAYOUTS {
		if let Ok(ts) = NaiveDateTime::parse_from_str(text, layout) {
			return Some(ts);
		}
	}
	NaiveDate::parse_from_str(text, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parses `text` with a strptime style `format`. Formats without a time
/// component yield midnight.
pub fn parse_with_format(text: &str, format: &str) -> Option<NaiveDateTime> {
	let format = chrono_format(format);
	if let Ok(ts) = NaiveDateTime::parse_from_str(text, &format) {
		return Some(ts);
	}
	NaiveDate::parse_from_str(text, &format).ok().and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// strptime's `%-d` style no-padding flags are accepted by chrono's parser
/// without the flag.
fn chrono_format(format: &str) -> String {
	format.replace("%-", "%")
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
		NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, s).unwrap()
	}

	#[test]
	fn test_format_without_fraction() {
		assert_eq!(format_timestamp(&ts(2024, 1, 2, 3, 4, 5)), "2024-01-02 03:04:05");
	}

	#[test]
	fn test_parse_canonical() {
		assert_eq!(parse_timestamp("2024-01-02 03:04:05"), Some(ts(2024, 1, 2, 3, 4, 5)));
		assert_eq!(parse_timestamp("2024-01-02T03:04:05"), Some(ts(2024, 1, 2, 3, 4, 5)));
		assert_eq!(parse_timestamp("2024-01-02"), Some(ts(2024, 1, 2, 0, 0, 0)));
		assert_eq!(parse_timestamp("yesterday"), None);
	}

	#[test]
	fn test_parse_with_month_name() {
		assert_eq!(parse_with_format("5-Jan-2024", "%-d-%b-%Y"), Some(ts(2024, 1, 5, 0, 0, 0)));
		assert_eq!(parse_with_format("17-March-2023", "%-d-%B-%Y"), Some(ts(2023, 3, 17, 0, 0, 0)));
	}

	#[test]
	fn test_parse_with_minutes() {
		assert_eq!(parse_with_format("2024-06-30 23:59", "%Y-%m-%d %H:%M"), Some(ts(2024, 6, 30, 23, 59, 0)));
	}

	#[test]
	fn test_parse_with_format_rejects_mismatch() {
		assert_eq!(parse_with_format("3.14", "%d.%m.%Y"), None);
		assert_eq!(parse_with_format("hello", "%Y-%m-%d"), None);
	}
}
