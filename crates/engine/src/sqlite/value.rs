// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use rusqlite::types::{Value as SqliteValue, ValueRef};
use sheetdb_type::{Value, value::timestamp::format_timestamp};

pub(super) fn from_sqlite(value: ValueRef<'_>) -> Value {
	match value {
		ValueRef::Null => Value::Undefined,
		ValueRef::Integer(i) => Value::Int8(i),
		ValueRef::Real(f) => Value::Float8(f),
		ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Value::Utf8(String::from_utf8_lossy(bytes).into_owned()),
	}
}

pub(super) fn to_sqlite(value: &Value) -> SqliteValue {
	match value {
		Value::Undefined => SqliteValue::Null,
		Value::Boolean(b) => SqliteValue::Integer(*b as i64),
		Value::Int8(i) => SqliteValue::Integer(*i),
		Value::Float8(f) => SqliteValue::Real(*f),
		Value::Utf8(s) => SqliteValue::Text(s.clone()),
		Value::Timestamp(ts) => SqliteValue::Text(format_timestamp(ts)),
		Value::List(_) => SqliteValue::Text(value.to_string()),
	}
}

/// SQLite keeps the declared type text verbatim; boolean columns hold 0/1.
pub(super) fn is_boolean_decl(decl: &str) -> bool {
	matches!(decl.trim().to_ascii_uppercase().as_str(), "BOOLEAN" | "BOOL")
}

#[cfg(test)]
mod tests {
	use chrono::NaiveDate;

	use super::*;

	#[test]
	fn test_from_sqlite() {
		assert_eq!(from_sqlite(ValueRef::Null), Value::Undefined);
		assert_eq!(from_sqlite(ValueRef::Integer(7)), Value::Int8(7));
		assert_eq!(from_sqlite(ValueRef::Text(b"abc")), Value::Utf8("abc".to_string()));
	}

	#[test]
	fn test_to_sqlite() {
		assert_eq!(to_sqlite(&Value::Boolean(true)), SqliteValue::Integer(1));
		let ts = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
		assert_eq!(to_sqlite(&Value::Timestamp(ts)), SqliteValue::Text("2024-03-01 08:00:00".to_string()));
	}
}
