// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{fs, path::Path};

use rusqlite::Connection;
use sheetdb_type::Result;
use tracing::{debug, instrument};

use super::sqlite_error;
use crate::sql::quote_identifier;

/// Attaches the database file at `path` under `alias`, returning its tables
/// in creation order. A missing file is an error rather than a new database.
#[instrument(name = "engine::sqlite::attach", level = "debug", skip(conn), fields(path = %path.display()))]
pub(super) fn attach(conn: &Connection, path: &Path, alias: &str) -> Result<Vec<String>> {
	fs::metadata(path)?;

	let sql = format!("ATTACH DATABASE ?1 AS {}", quote_identifier(alias));
	conn.execute(&sql, [path.to_string_lossy()]).map_err(|e| sqlite_error(&sql, e))?;

	let list = format!(
		"SELECT name FROM {}.sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY rowid",
		quote_identifier(alias)
	);
	let tables = conn
		.prepare(&list)
		.and_then(|mut stmt| {
			let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
			rows.collect::<rusqlite::Result<Vec<_>>>()
		})
		.map_err(|e| sqlite_error(&list, e));

	if tables.is_err() {
		detach(conn, alias)?;
	}
	let tables = tables?;
	debug!(tables = tables.len(), "database attached");
	Ok(tables)
}

pub(super) fn detach(conn: &Connection, alias: &str) -> Result<()> {
	let sql = format!("DETACH DATABASE {}", quote_identifier(alias));
	conn.execute_batch(&sql).map_err(|e| sqlite_error(&sql, e))
}
