// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub mod column;
pub mod copy;
pub mod display_type;
pub mod native_type;
pub mod result;
pub mod sort;
pub mod timestamp;

use display_type::DisplayType;

/// A single cell value as handed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
	/// SQL NULL
	Undefined,
	Boolean(bool),
	Int8(i64),
	Float8(f64),
	Utf8(String),
	Timestamp(NaiveDateTime),
	List(Vec<Value>),
}

impl Value {
	pub fn is_undefined(&self) -> bool {
		matches!(self, Value::Undefined)
	}

	/// Textual form used for delimited exports and clipboard copies. NULL
	/// renders as the empty string.
	pub fn as_string(&self) -> String {
		match self {
			Value::Undefined => String::new(),
			other => other.to_string(),
		}
	}

	/// Converts a value read from the engine into the representation implied
	/// by the column's display type. Values that cannot be represented are
	/// returned unchanged.
	pub fn coerce(self, display_type: DisplayType) -> Value {
		match (display_type, self) {
			(_, Value::Undefined) => Value::Undefined,

			(DisplayType::Bigint, Value::Float8(f)) if f.fract() == 0.0 && f.is_finite() => Value::Int8(f as i64),
			(DisplayType::Bigint, Value::Boolean(b)) => Value::Int8(b as i64),
			(DisplayType::Bigint, Value::Utf8(s)) => match s.trim().parse::<i64>() {
				Ok(v) => Value::Int8(v),
				Err(_) => Value::Utf8(s),
			},

			(DisplayType::Double, Value::Int8(i)) => Value::Float8(i as f64),
			(DisplayType::Double, Value::Utf8(s)) => match s.trim().parse::<f64>() {
				Ok(v) => Value::Float8(v),
				Err(_) => Value::Utf8(s),
			},

			(DisplayType::Boolean, Value::Int8(i)) => Value::Boolean(i != 0),
			(DisplayType::Boolean, Value::Utf8(s)) => match s.trim().to_ascii_lowercase().as_str() {
				"true" | "t" | "1" => Value::Boolean(true),
				"false" | "f" | "0" => Value::Boolean(false),
				_ => Value::Utf8(s),
			},

			(DisplayType::Timestamp, Value::Utf8(s)) => match timestamp::parse_timestamp(&s) {
				Some(ts) => Value::Timestamp(ts),
				None => Value::Utf8(s),
			},

			(DisplayType::Varchar, Value::Utf8(s)) => Value::Utf8(s),
			(DisplayType::Varchar, other) => Value::Utf8(other.to_string()),

			(DisplayType::List, Value::Utf8(s)) => Value::Utf8(s),

			(_, value) => value,
		}
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Value::Undefined => f.write_str("NULL"),
			Value::Boolean(b) => write!(f, "{b}"),
			Value::Int8(i) => write!(f, "{i}"),
			Value::Float8(v) => write!(f, "{v}"),
			Value::Utf8(s) => f.write_str(s),
			Value::Timestamp(ts) => f.write_str(&timestamp::format_timestamp(ts)),
			Value::List(items) => {
				f.write_str("[")?;
				for (idx, item) in items.iter().enumerate() {
					if idx > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{item}")?;
				}
				f.write_str("]")
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use chrono::NaiveDate;

	use super::*;

	mod coerce {
		use super::*;

		#[test]
		fn test_integer_storage_to_boolean() {
			assert_eq!(Value::Int8(1).coerce(DisplayType::Boolean), Value::Boolean(true));
			assert_eq!(Value::Int8(0).coerce(DisplayType::Boolean), Value::Boolean(false));
		}

		#[test]
		fn test_text_to_timestamp() {
			let expected = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(10, 30, 0).unwrap();
			assert_eq!(
				Value::Utf8("2024-03-01 10:30:00".into()).coerce(DisplayType::Timestamp),
				Value::Timestamp(expected)
			);
		}

		#[test]
		fn test_anything_to_varchar() {
			assert_eq!(Value::Int8(42).coerce(DisplayType::Varchar), Value::Utf8("42".into()));
			assert_eq!(Value::Boolean(true).coerce(DisplayType::Varchar), Value::Utf8("true".into()));
		}

		#[test]
		fn test_null_stays_null() {
			assert_eq!(Value::Undefined.coerce(DisplayType::Bigint), Value::Undefined);
			assert_eq!(Value::Undefined.coerce(DisplayType::Varchar), Value::Undefined);
		}

		#[test]
		fn test_unparseable_text_is_kept() {
			assert_eq!(Value::Utf8("abc".into()).coerce(DisplayType::Bigint), Value::Utf8("abc".into()));
		}

		#[test]
		fn test_integral_double_to_bigint() {
			assert_eq!(Value::Float8(3.0).coerce(DisplayType::Bigint), Value::Int8(3));
			assert_eq!(Value::Float8(3.5).coerce(DisplayType::Bigint), Value::Float8(3.5));
		}
	}

	mod display {
		use super::*;

		#[test]
		fn test_list() {
			let value = Value::List(vec![Value::Int8(1), Value::Undefined, Value::Utf8("x".into())]);
			assert_eq!(value.to_string(), "[1, NULL, x]");
		}

		#[test]
		fn test_as_string_null_is_empty() {
			assert_eq!(Value::Undefined.as_string(), "");
			assert_eq!(Value::Float8(3.14).as_string(), "3.14");
		}
	}
}
