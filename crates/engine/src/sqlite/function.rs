// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Scalar functions registered on every connection.
//!
//! The conversion functions back column type changes. SQLite's own CAST never
//! fails, these raise an error on values that do not convert so a conversion
//! either succeeds for every row or leaves the table untouched.
//!
//! `regex_extract`, `regex_replace` and `date_parse` are for user queries.
//! They take the pattern first and yield NULL instead of failing.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, SecondsFormat};
use regex::Regex;
use rusqlite::{
	Connection,
	functions::{Context, FunctionFlags},
	types::ValueRef,
};
use sheetdb_type::{
	Result, error,
	error::diagnostic::internal::internal,
	value::timestamp::{format_timestamp, parse_timestamp, parse_with_format},
};

pub(super) fn register(conn: &Connection) -> Result<()> {
	let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;
	let registered = conn
		.create_scalar_function("strptime", 2, flags, strptime)
		.and_then(|_| conn.create_scalar_function("to_timestamp", 1, flags, to_timestamp))
		.and_then(|_| conn.create_scalar_function("to_bigint", 1, flags, to_bigint))
		.and_then(|_| conn.create_scalar_function("to_double", 1, flags, to_double))
		.and_then(|_| conn.create_scalar_function("to_boolean", 1, flags, to_boolean))
		.and_then(|_| conn.create_scalar_function("regex_extract", 2, flags, regex_extract))
		.and_then(|_| conn.create_scalar_function("regex_replace", 3, flags, regex_replace))
		.and_then(|_| conn.create_scalar_function("regex_replace", 4, flags, regex_replace))
		.and_then(|_| conn.create_scalar_function("date_parse", 2, flags, date_parse));
	registered.map_err(|e| error!(internal(format!("failed to register scalar functions: {e}"))))
}

fn failed(message: String) -> rusqlite::Error {
	rusqlite::Error::UserFunctionError(message.into())
}

/// The argument as text, `None` for NULL.
fn text_arg(ctx: &Context<'_>, idx: usize) -> Option<String> {
	match ctx.get_raw(idx) {
		ValueRef::Null => None,
		ValueRef::Integer(i) => Some(i.to_string()),
		ValueRef::Real(f) => Some(f.to_string()),
		ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
	}
}

fn strptime(ctx: &Context<'_>) -> rusqlite::Result<Option<String>> {
	let Some(text) = text_arg(ctx, 0) else {
		return Ok(None);
	};
	let format: String = ctx.get(1)?;
	match parse_with_format(text.trim(), &format) {
		Some(ts) => Ok(Some(format_timestamp(&ts))),
		None => Err(failed(format!("could not parse string \"{text}\" according to format specifier \"{format}\""))),
	}
}

fn to_timestamp(ctx: &Context<'_>) -> rusqlite::Result<Option<String>> {
	let Some(text) = text_arg(ctx, 0) else {
		return Ok(None);
	};
	match parse_timestamp(&text) {
		Some(ts) => Ok(Some(format_timestamp(&ts))),
		None => Err(failed(format!("could not convert string '{text}' to TIMESTAMP"))),
	}
}

fn to_bigint(ctx: &Context<'_>) -> rusqlite::Result<Option<i64>> {
	match ctx.get_raw(0) {
		ValueRef::Null => Ok(None),
		ValueRef::Integer(i) => Ok(Some(i)),
		ValueRef::Real(f) => real_to_bigint(f).map(Some),
		ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
			let text = String::from_utf8_lossy(bytes);
			let trimmed = text.trim();
			if let Ok(i) = trimmed.parse::<i64>() {
				return Ok(Some(i));
			}
			match trimmed.parse::<f64>() {
				Ok(f) => real_to_bigint(f).map(Some),
				Err(_) => Err(failed(format!("could not convert string '{text}' to BIGINT"))),
			}
		}
	}
}

fn real_to_bigint(f: f64) -> rusqlite::Result<i64> {
	let rounded = f.round();
	if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded <= i64::MAX as f64 {
		Ok(rounded as i64)
	} else {
		Err(failed(format!("value {f} is out of range for BIGINT")))
	}
}

fn to_double(ctx: &Context<'_>) -> rusqlite::Result<Option<f64>> {
	match ctx.get_raw(0) {
		ValueRef::Null => Ok(None),
		ValueRef::Integer(i) => Ok(Some(i as f64)),
		ValueRef::Real(f) => Ok(Some(f)),
		ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
			let text = String::from_utf8_lossy(bytes);
			text.trim()
				.parse::<f64>()
				.map(Some)
				.map_err(|_| failed(format!("could not convert string '{text}' to DOUBLE")))
		}
	}
}

fn to_boolean(ctx: &Context<'_>) -> rusqlite::Result<Option<bool>> {
	match ctx.get_raw(0) {
		ValueRef::Null => Ok(None),
		ValueRef::Integer(i) => Ok(Some(i != 0)),
		ValueRef::Real(f) => Ok(Some(f != 0.0)),
		ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
			let text = String::from_utf8_lossy(bytes);
			match text.trim().to_ascii_lowercase().as_str() {
				"true" | "t" | "1" | "yes" | "y" => Ok(Some(true)),
				"false" | "f" | "0" | "no" | "n" => Ok(Some(false)),
				_ => Err(failed(format!("could not convert string '{text}' to BOOL"))),
			}
		}
	}
}

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The compiled pattern of argument 0, cached per statement. `None` when the
/// pattern does not compile.
fn pattern(ctx: &Context<'_>) -> rusqlite::Result<Arc<Option<Regex>>> {
	ctx.get_or_create_aux(0, |raw| -> std::result::Result<Option<Regex>, BoxError> {
		Ok(raw.as_str().ok().and_then(|p| Regex::new(p).ok()))
	})
}

/// First capture group of the pattern's first match.
fn regex_extract(ctx: &Context<'_>) -> rusqlite::Result<Option<String>> {
	let Some(text) = text_arg(ctx, 1) else {
		return Ok(None);
	};
	let pattern = pattern(ctx)?;
	let Some(re) = pattern.as_ref() else {
		return Ok(None);
	};
	Ok(re.captures(&text).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_string()))
}

/// Replaces every match, or only the first when the fourth argument is true.
fn regex_replace(ctx: &Context<'_>) -> rusqlite::Result<Option<String>> {
	let (Some(text), Some(replacement)) = (text_arg(ctx, 1), text_arg(ctx, 2)) else {
		return Ok(None);
	};
	let once = ctx.len() > 3 && ctx.get::<Option<i64>>(3)?.unwrap_or(0) != 0;
	let pattern = pattern(ctx)?;
	let Some(re) = pattern.as_ref() else {
		return Ok(None);
	};
	let replaced = if once {
		re.replace(&text, replacement.as_str())
	} else {
		re.replace_all(&text, replacement.as_str())
	};
	Ok(Some(replaced.into_owned()))
}

/// Parses with a strftime format: a date and time becomes an RFC 3339 UTC
/// timestamp with milliseconds, a bare date becomes `YYYY-MM-DD`.
fn date_parse(ctx: &Context<'_>) -> rusqlite::Result<Option<String>> {
	let (Some(format), Some(text)) = (text_arg(ctx, 0), text_arg(ctx, 1)) else {
		return Ok(None);
	};
	if let Ok(ts) = NaiveDateTime::parse_from_str(&text, &format) {
		return Ok(Some(ts.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true)));
	}
	Ok(NaiveDate::parse_from_str(&text, &format).ok().map(|d| d.format("%Y-%m-%d").to_string()))
}
