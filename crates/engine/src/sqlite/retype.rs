// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Column type changes. SQLite cannot alter a column's type in place, the
//! table is rebuilt inside one transaction: a copy with the new declared type
//! is filled through a converting select, then replaces the original.

use rusqlite::Connection;
use sheetdb_type::{
	Result, error,
	error::diagnostic::{catalog::column_not_found, column_type::unsupported_conversion},
};
use tracing::instrument;

use super::{declared_columns, discard, sqlite_error, value::is_boolean_decl};
use crate::{
	TypeChange,
	sql::{column_definitions, drop_table, quote_identifier, quote_literal, rename_table},
};

/// Expression converting `column`, declared as `source`, to the target type.
fn conversion(table: &str, column: &str, source: &str, change: &TypeChange) -> Result<String> {
	let quoted = quote_identifier(column);
	let target = change.sql_type.trim().to_ascii_uppercase();
	let expr = match target.as_str() {
		"BIGINT" => format!("to_bigint({quoted})"),
		"DOUBLE" => format!("to_double({quoted})"),
		"BOOLEAN" => format!("to_boolean({quoted})"),
		"VARCHAR" if is_boolean_decl(source) => format!(
			"CASE WHEN {quoted} IS NULL THEN NULL WHEN {quoted} THEN 'true' ELSE 'false' END"
		),
		"VARCHAR" => format!("CAST({quoted} AS TEXT)"),
		"TIMESTAMP" => match &change.format {
			Some(format) => format!("strptime({quoted}, {})", quote_literal(format)),
			None => format!("to_timestamp({quoted})"),
		},
		other => return Err(error!(unsupported_conversion(table, column, other))),
	};
	Ok(expr)
}

#[instrument(name = "engine::sqlite::alter_column_type", level = "debug", skip_all, fields(table = %table, column = %column, target = %change.sql_type))]
pub(super) fn alter_column_type(conn: &Connection, table: &str, column: &str, change: &TypeChange) -> Result<()> {
	let columns = declared_columns(conn, table)?;
	let Some(target) = columns.iter().position(|(name, _)| name.eq_ignore_ascii_case(column)) else {
		return Err(error!(column_not_found(table, column)));
	};

	let converted = conversion(table, &columns[target].0, &columns[target].1, change)?;
	let scratch = format!("{table}__retype");

	let definitions = column_definitions(columns.iter().enumerate().map(|(idx, (name, decl))| {
		if idx == target {
			(name.as_str(), change.sql_type.as_str())
		} else {
			(name.as_str(), decl.as_str())
		}
	}));
	let projection: Vec<String> = columns
		.iter()
		.enumerate()
		.map(|(idx, (name, _))| {
			if idx == target {
				converted.clone()
			} else {
				quote_identifier(name)
			}
		})
		.collect();

	let statements = [
		drop_table(&scratch),
		format!("CREATE TABLE {} ({definitions})", quote_identifier(&scratch)),
		format!(
			"INSERT INTO {} SELECT {} FROM {}",
			quote_identifier(&scratch),
			projection.join(", "),
			quote_identifier(table)
		),
		drop_table(table),
		rename_table(&scratch, table),
	];

	let tx = conn.unchecked_transaction().map_err(|e| sqlite_error(&statements[0], e))?;
	let rebuilt = statements
		.iter()
		.try_for_each(|statement| tx.execute_batch(statement).map_err(|e| sqlite_error(statement, e)))
		.and_then(|()| tx.commit().map_err(|e| sqlite_error(&statements[4], e)));
	if rebuilt.is_err() {
		discard(conn, &scratch);
	}
	rebuilt
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_conversion_expressions() {
		assert_eq!(conversion("t", "a", "TEXT", &TypeChange::to("BIGINT")).unwrap(), "to_bigint(\"a\")");
		assert_eq!(conversion("t", "a", "BIGINT", &TypeChange::to("VARCHAR")).unwrap(), "CAST(\"a\" AS TEXT)");
		assert_eq!(
			conversion("t", "a", "TEXT", &TypeChange::timestamp("%d/%m/%Y")).unwrap(),
			"strptime(\"a\", '%d/%m/%Y')"
		);
		assert!(conversion("t", "a", "BOOLEAN", &TypeChange::to("VARCHAR")).unwrap().starts_with("CASE"));
	}

	#[test]
	fn test_list_target_rejected() {
		let err = conversion("t", "a", "TEXT", &TypeChange::to("BIGINT[]")).unwrap_err();
		assert_eq!(err.diagnostic().code, "TYPE_004");
	}
}
