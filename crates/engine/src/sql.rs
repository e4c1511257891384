// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Statement builder. Identifiers cannot be bound as parameters, so every
//! statement that names a table or column is assembled here with the quoting
//! helpers below.

use sheetdb_type::Sort;

/// Quotes an identifier, doubling embedded double quotes.
pub fn quote_identifier(name: &str) -> String {
	format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quotes a string literal, doubling embedded single quotes.
pub fn quote_literal(value: &str) -> String {
	format!("'{}'", value.replace('\'', "''"))
}

/// Removes trailing whitespace and statement terminators from user SQL so it
/// can be embedded into a larger statement.
pub fn trim_statement(sql: &str) -> &str {
	sql.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace())
}

pub fn drop_table(table: &str) -> String {
	format!("DROP TABLE IF EXISTS {}", quote_identifier(table))
}

pub fn drop_view(view: &str) -> String {
	format!("DROP VIEW IF EXISTS {}", quote_identifier(view))
}

pub fn rename_table(from: &str, to: &str) -> String {
	format!("ALTER TABLE {} RENAME TO {}", quote_identifier(from), quote_identifier(to))
}

pub fn rename_view(from: &str, to: &str) -> String {
	format!("ALTER VIEW {} RENAME TO {}", quote_identifier(from), quote_identifier(to))
}

pub fn count(table: &str) -> String {
	format!("SELECT COUNT(*) FROM {}", quote_identifier(table))
}

pub fn count_non_null(table: &str, column: &str) -> String {
	format!("SELECT COUNT({}) FROM {}", quote_identifier(column), quote_identifier(table))
}

pub fn select_all(table: &str) -> String {
	format!("SELECT * FROM {}", quote_identifier(table))
}

/// `SELECT *` from a table of an attached database.
pub fn select_all_in(schema: &str, table: &str) -> String {
	format!("SELECT * FROM {}.{}", quote_identifier(schema), quote_identifier(table))
}

pub fn select_page(table: &str, limit: usize, offset: usize) -> String {
	if offset == 0 {
		format!("SELECT * FROM {} LIMIT {limit}", quote_identifier(table))
	} else {
		format!("SELECT * FROM {} LIMIT {limit} OFFSET {offset}", quote_identifier(table))
	}
}

/// Selected columns of a row range, in the given order.
pub fn select_columns(table: &str, columns: &[String], limit: usize, offset: usize) -> String {
	let columns: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();
	format!("SELECT {} FROM {} LIMIT {limit} OFFSET {offset}", columns.join(", "), quote_identifier(table))
}

/// `SELECT * FROM table ORDER BY ...`; sorts without a direction are skipped.
pub fn order_by(table: &str, sorts: &[Sort]) -> String {
	let keys: Vec<String> = sorts
		.iter()
		.filter_map(|s| s.direction.as_sql().map(|dir| format!("{} {dir}", quote_identifier(&s.column))))
		.collect();

	if keys.is_empty() {
		select_all(table)
	} else {
		format!("SELECT * FROM {} ORDER BY {}", quote_identifier(table), keys.join(", "))
	}
}

/// Deletes the row with the highest rowid if every listed column is NULL in
/// it.
pub fn delete_trailing_null_row(table: &str, columns: &[String]) -> String {
	let table = quote_identifier(table);
	let nulls: Vec<String> = columns.iter().map(|c| format!("{} IS NULL", quote_identifier(c))).collect();
	format!("DELETE FROM {table} WHERE rowid = (SELECT MAX(rowid) FROM {table}) AND {}", nulls.join(" AND "))
}

/// Column list for a `CREATE TABLE`, an empty type leaves the column untyped.
pub fn column_definitions<'a>(columns: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
	columns
		.into_iter()
		.map(|(name, sql_type)| {
			if sql_type.is_empty() {
				quote_identifier(name)
			} else {
				format!("{} {sql_type}", quote_identifier(name))
			}
		})
		.collect::<Vec<_>>()
		.join(", ")
}

/// Makes column names unique case-insensitively by appending `_dup` until a
/// name is free. `rowid` is treated as taken, the engines reserve it.
pub fn unique_column_names<I, S>(names: I) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	let mut taken: Vec<String> = vec!["rowid".to_string()];
	let mut result = Vec::new();
	for name in names {
		let mut name: String = name.into();
		while taken.iter().any(|t| t.eq_ignore_ascii_case(&name)) {
			name.push_str("_dup");
		}
		taken.push(name.clone());
		result.push(name);
	}
	result
}
