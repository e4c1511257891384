// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{Connection, params_from_iter, types::Value as SqliteValue};
use sheetdb_type::{
	Result, error,
	error::diagnostic::csv::{malformed_record, value_mismatch},
	value::timestamp::{format_timestamp, parse_timestamp, parse_with_format},
};
use tracing::{debug, instrument};

use super::{discard, sqlite_error};
use crate::{
	CsvColumn, CsvOptions, CsvSchema,
	delimited::{field, reader},
	sql::{column_definitions, quote_identifier},
};

/// How a raw field becomes a stored value, picked from the column's declared
/// type.
enum FieldParser {
	Text,
	Bigint,
	Double,
	Boolean,
	Date(String),
	Timestamp(Option<String>),
}

impl FieldParser {
	fn for_column(column: &CsvColumn, schema: &CsvSchema) -> Self {
		match column.native_type.base().as_str() {
			"BIGINT" | "INTEGER" | "INT" => FieldParser::Bigint,
			"DOUBLE" | "REAL" | "FLOAT" => FieldParser::Double,
			"BOOLEAN" | "BOOL" => FieldParser::Boolean,
			"DATE" => FieldParser::Date(schema.date_format.clone().unwrap_or_else(|| "%Y-%m-%d".to_string())),
			"TIMESTAMP" => FieldParser::Timestamp(schema.timestamp_format.clone()),
			_ => FieldParser::Text,
		}
	}

	/// Empty fields load as NULL. `Err` carries the offending text.
	fn parse(&self, raw: Option<&str>) -> std::result::Result<SqliteValue, String> {
		let Some(raw) = raw else {
			return Ok(SqliteValue::Null);
		};
		if let FieldParser::Text = self {
			return Ok(if raw.is_empty() {
				SqliteValue::Null
			} else {
				SqliteValue::Text(raw.to_string())
			});
		}

		let value = raw.trim();
		if value.is_empty() {
			return Ok(SqliteValue::Null);
		}

		let parsed = match self {
			FieldParser::Text => None,
			FieldParser::Bigint => value.parse::<i64>().ok().map(SqliteValue::Integer),
			FieldParser::Double => value.parse::<f64>().ok().map(SqliteValue::Real),
			FieldParser::Boolean => match value.to_ascii_lowercase().as_str() {
				"true" => Some(SqliteValue::Integer(1)),
				"false" => Some(SqliteValue::Integer(0)),
				_ => None,
			},
			FieldParser::Date(format) => NaiveDate::parse_from_str(value, format)
				.ok()
				.map(|d| SqliteValue::Text(d.format("%Y-%m-%d").to_string())),
			FieldParser::Timestamp(format) => {
				let ts = match format {
					Some(format) => parse_with_format(value, format),
					None => parse_timestamp(value),
				};
				ts.map(|ts| SqliteValue::Text(format_timestamp(&ts)))
			}
		};
		parsed.ok_or_else(|| raw.to_string())
	}
}

fn insert_records(
	conn: &Connection,
	insert: &str,
	path: &Path,
	schema: &CsvSchema,
	options: &CsvOptions,
	parsers: &[FieldParser],
) -> Result<u64> {
	let width = schema.columns.len();
	let mut stmt = conn.prepare(insert).map_err(|e| sqlite_error(insert, e))?;
	let mut reader = reader(path, options.delimiter)?;
	let mut record = csv::ByteRecord::new();
	let mut first = true;
	let mut loaded = 0u64;

	loop {
		let more = reader.read_byte_record(&mut record).map_err(|e| {
			let line = e.position().map(|p| p.line()).unwrap_or(0);
			error!(malformed_record(path, line, e.to_string()))
		})?;
		if !more {
			break;
		}
		if first {
			first = false;
			if options.has_header {
				continue;
			}
		}

		let line = record.position().map(|p| p.line()).unwrap_or(0);
		let mut values = Vec::with_capacity(width);
		for (idx, (parser, column)) in parsers.iter().zip(&schema.columns).enumerate() {
			let raw = field(&record, idx);
			let value = parser.parse(raw.as_deref()).map_err(|value| {
				error!(value_mismatch(path, line, &column.name, column.native_type.as_str(), &value))
			})?;
			values.push(value);
		}
		stmt.execute(params_from_iter(values)).map_err(|e| sqlite_error(insert, e))?;
		loaded += 1;
	}
	Ok(loaded)
}

#[instrument(name = "engine::sqlite::load_csv", level = "debug", skip_all, fields(table = %table, path = %path.display()))]
pub(super) fn load_csv(
	conn: &Connection,
	table: &str,
	path: &Path,
	schema: &CsvSchema,
	options: &CsvOptions,
) -> Result<()> {
	let width = schema.columns.len();
	let ddl = format!(
		"CREATE TABLE {} ({})",
		quote_identifier(table),
		column_definitions(schema.columns.iter().map(|c| (c.name.as_str(), c.native_type.as_str())))
	);
	let placeholders: Vec<String> = (1..=width).map(|idx| format!("?{idx}")).collect();
	let insert = format!("INSERT INTO {} VALUES ({})", quote_identifier(table), placeholders.join(", "));
	let parsers: Vec<FieldParser> = schema.columns.iter().map(|c| FieldParser::for_column(c, schema)).collect();

	let tx = conn.unchecked_transaction().map_err(|e| sqlite_error(&ddl, e))?;
	tx.execute_batch(&ddl).map_err(|e| sqlite_error(&ddl, e))?;
	let filled = insert_records(&tx, &insert, path, schema, options, &parsers)
		.and_then(|loaded| tx.commit().map(|()| loaded).map_err(|e| sqlite_error(&insert, e)));
	let loaded = match filled {
		Ok(loaded) => loaded,
		Err(err) => {
			discard(conn, table);
			return Err(err);
		}
	};
	debug!(rows = loaded, "csv loaded");
	Ok(())
}
