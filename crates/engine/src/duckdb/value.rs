// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use chrono::{DateTime, NaiveDate, TimeDelta};
use duckdb::types::{TimeUnit, Value as DuckValue};
use sheetdb_type::Value;

fn timestamp(unit: TimeUnit, value: i64) -> Value {
	match DateTime::from_timestamp_micros(unit.to_micros(value)) {
		Some(ts) => Value::Timestamp(ts.naive_utc()),
		None => Value::Utf8(value.to_string()),
	}
}

fn date(days: i32) -> Value {
	let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
	match epoch.and_then(|e| e.checked_add_signed(TimeDelta::days(days as i64))) {
		Some(ts) => Value::Timestamp(ts),
		None => Value::Utf8(days.to_string()),
	}
}

pub(super) fn from_duckdb(value: DuckValue) -> Value {
	match value {
		DuckValue::Null => Value::Undefined,
		DuckValue::Boolean(b) => Value::Boolean(b),
		DuckValue::TinyInt(i) => Value::Int8(i as i64),
		DuckValue::SmallInt(i) => Value::Int8(i as i64),
		DuckValue::Int(i) => Value::Int8(i as i64),
		DuckValue::BigInt(i) => Value::Int8(i),
		DuckValue::UTinyInt(i) => Value::Int8(i as i64),
		DuckValue::USmallInt(i) => Value::Int8(i as i64),
		DuckValue::UInt(i) => Value::Int8(i as i64),
		DuckValue::UBigInt(i) => match i64::try_from(i) {
			Ok(i) => Value::Int8(i),
			Err(_) => Value::Utf8(i.to_string()),
		},
		DuckValue::HugeInt(i) => match i64::try_from(i) {
			Ok(i) => Value::Int8(i),
			Err(_) => Value::Utf8(i.to_string()),
		},
		DuckValue::Float(f) => Value::Float8(f as f64),
		DuckValue::Double(f) => Value::Float8(f),
		DuckValue::Decimal(d) => Value::Utf8(d.to_string()),
		DuckValue::Timestamp(unit, v) => timestamp(unit, v),
		DuckValue::Date32(days) => date(days),
		DuckValue::Text(s) | DuckValue::Enum(s) => Value::Utf8(s),
		DuckValue::Blob(bytes) => Value::Utf8(String::from_utf8_lossy(&bytes).into_owned()),
		DuckValue::List(items) | DuckValue::Array(items) => Value::List(items.into_iter().map(from_duckdb).collect()),
		other => Value::Utf8(format!("{other:?}")),
	}
}
