// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::path::Path;

use rusqlite::Connection;
use sheetdb_type::{DisplayType, Result, error, error::diagnostic::io::io_error};
use tracing::instrument;

use super::{
	declared_columns, sqlite_error,
	value::{from_sqlite, is_boolean_decl},
};
use crate::sql::select_all;

fn write_failed(err: csv::Error) -> sheetdb_type::Error {
	error!(io_error(std::io::Error::other(err.to_string())))
}

/// Writes `table` with a header row. NULL is written as an empty field,
/// boolean columns as `true`/`false`.
#[instrument(name = "engine::sqlite::export_csv", level = "debug", skip_all, fields(table = %table, path = %path.display()))]
pub(super) fn export_csv(conn: &Connection, table: &str, path: &Path, delimiter: u8) -> Result<()> {
	let columns = declared_columns(conn, table)?;
	let booleans: Vec<bool> = columns.iter().map(|(_, decl)| is_boolean_decl(decl)).collect();

	let sql = select_all(table);
	let mut stmt = conn.prepare(&sql).map_err(|e| sqlite_error(&sql, e))?;
	let mut writer = csv::WriterBuilder::new().delimiter(delimiter).from_path(path).map_err(write_failed)?;
	writer.write_record(columns.iter().map(|(name, _)| name.as_str())).map_err(write_failed)?;

	let mut rows = stmt.query([]).map_err(|e| sqlite_error(&sql, e))?;
	while let Some(row) = rows.next().map_err(|e| sqlite_error(&sql, e))? {
		let mut record = Vec::with_capacity(columns.len());
		for (idx, boolean) in booleans.iter().enumerate() {
			let value = from_sqlite(row.get_ref(idx).map_err(|e| sqlite_error(&sql, e))?);
			let value = if *boolean {
				value.coerce(DisplayType::Boolean)
			} else {
				value
			};
			record.push(value.as_string());
		}
		writer.write_record(&record).map_err(write_failed)?;
	}

	writer.flush()?;
	Ok(())
}
