// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The default engine, an embedded SQLite connection.
//!
//! SQLite stores values dynamically and keeps the declared column type only
//! as text. Declared types are reported as-is; columns without one are
//! classified by the storage classes they actually hold.

mod archive;
mod attach;
mod config;
mod connection;
mod export;
mod function;
mod load;
mod retype;
mod value;
mod view;

use std::path::Path;

pub use config::*;
use connection::{apply_pragmas, connect, convert_flags, resolve_db_path};
use rusqlite::Connection;
use sheetdb_type::{
	NativeType, Result, error,
	error::diagnostic::{catalog::table_not_found, engine::statement_failed},
};
use tracing::{debug, instrument, warn};

use crate::{
	CatalogObject, ColumnInfo, CsvOptions, CsvSchema, Engine, EngineKind, Frame, ObjectKind, SniffedCsv, TypeChange,
	sniff::sniff_file,
	sql::{column_definitions, drop_table, quote_identifier, trim_statement, unique_column_names},
};

pub(crate) fn sqlite_error(sql: &str, err: rusqlite::Error) -> sheetdb_type::Error {
	error!(statement_failed(sql, err.to_string()))
}

/// Drops a table a failed statement left behind. Runs after the transaction
/// has rolled back, outside of it.
pub(crate) fn discard(conn: &Connection, table: &str) {
	let sql = drop_table(table);
	if let Err(err) = conn.execute_batch(&sql) {
		warn!(table = %table, error = %err, "failed to discard partial table");
	}
}

/// Column names with their declared type text, empty when undeclared.
pub(crate) fn declared_columns(conn: &Connection, table: &str) -> Result<Vec<(String, String)>> {
	let sql = format!("PRAGMA table_info({})", quote_identifier(table));
	let mut stmt = conn.prepare(&sql).map_err(|e| sqlite_error(&sql, e))?;
	let columns = stmt
		.query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?)))
		.and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
		.map_err(|e| sqlite_error(&sql, e))?;

	if columns.is_empty() {
		return Err(error!(table_not_found(table)));
	}
	Ok(columns)
}

pub(crate) fn objects(conn: &Connection) -> Result<Vec<CatalogObject>> {
	let sql = "SELECT name, type FROM sqlite_master WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%' ORDER BY rowid";
	let mut stmt = conn.prepare(sql).map_err(|e| sqlite_error(sql, e))?;
	let objects = stmt
		.query_map([], |row| {
			let name: String = row.get(0)?;
			let kind: String = row.get(1)?;
			Ok(CatalogObject {
				name,
				kind: if kind == "view" {
					ObjectKind::View
				} else {
					ObjectKind::Table
				},
			})
		})
		.and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
		.map_err(|e| sqlite_error(sql, e))?;
	Ok(objects)
}

/// Native type of an undeclared column, from the storage classes it holds.
fn observed_type(conn: &Connection, table: &str, column: &str) -> Result<&'static str> {
	let sql = format!(
		"SELECT DISTINCT typeof({col}) FROM {table} WHERE {col} IS NOT NULL",
		col = quote_identifier(column),
		table = quote_identifier(table)
	);
	let mut stmt = conn.prepare(&sql).map_err(|e| sqlite_error(&sql, e))?;
	let classes = stmt
		.query_map([], |row| row.get::<_, String>(0))
		.and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
		.map_err(|e| sqlite_error(&sql, e))?;

	let has = |class: &str| classes.iter().any(|c| c == class);
	Ok(if has("blob") {
		"BLOB"
	} else if has("text") {
		"TEXT"
	} else if has("real") {
		"REAL"
	} else if has("integer") {
		"INTEGER"
	} else {
		"TEXT"
	})
}

pub struct SqliteEngine {
	conn: Connection,
}

impl SqliteEngine {
	#[instrument(name = "engine::sqlite::open", level = "debug", skip_all, fields(path = ?config.path))]
	pub fn open(config: SqliteConfig) -> Result<Self> {
		let path = resolve_db_path(config.path.clone());
		let conn = connect(&path, convert_flags(&config.flags))?;
		apply_pragmas(&conn, &config)?;
		function::register(&conn)?;
		debug!("sqlite engine opened");
		Ok(Self {
			conn,
		})
	}

	pub fn in_memory() -> Result<Self> {
		Self::open(SqliteConfig::in_memory())
	}
}

impl Engine for SqliteEngine {
	fn kind(&self) -> EngineKind {
		EngineKind::Sqlite
	}

	fn execute(&mut self, sql: &str) -> Result<()> {
		self.conn.execute_batch(sql).map_err(|e| sqlite_error(sql, e))
	}

	fn query(&mut self, sql: &str) -> Result<Frame> {
		let mut stmt = self.conn.prepare(sql).map_err(|e| sqlite_error(sql, e))?;
		let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();
		let width = columns.len();

		let mut rows = stmt.query([]).map_err(|e| sqlite_error(sql, e))?;
		let mut result = Vec::new();
		while let Some(row) = rows.next().map_err(|e| sqlite_error(sql, e))? {
			let mut values = Vec::with_capacity(width);
			for idx in 0..width {
				values.push(value::from_sqlite(row.get_ref(idx).map_err(|e| sqlite_error(sql, e))?));
			}
			result.push(values);
		}
		Ok(Frame::new(columns, result))
	}

	fn describe(&mut self, table: &str) -> Result<Vec<ColumnInfo>> {
		let declared = declared_columns(&self.conn, table)?;
		let mut result = Vec::with_capacity(declared.len());
		for (name, decl) in declared {
			let native_type = if decl.trim().is_empty() {
				NativeType::new(observed_type(&self.conn, table, &name)?)
			} else {
				NativeType::new(decl)
			};
			result.push(ColumnInfo {
				name,
				native_type,
			});
		}
		Ok(result)
	}

	fn objects(&mut self) -> Result<Vec<CatalogObject>> {
		objects(&self.conn)
	}

	#[instrument(name = "engine::sqlite::create_table_as", level = "debug", skip_all, fields(table = %table))]
	fn create_table_as(&mut self, table: &str, select: &str) -> Result<()> {
		let select = trim_statement(select);
		let (names, decls): (Vec<String>, Vec<String>) = {
			let stmt = self.conn.prepare(select).map_err(|e| sqlite_error(select, e))?;
			let columns = stmt
				.columns()
				.iter()
				.map(|c| (c.name().to_string(), c.decl_type().unwrap_or_default().to_string()))
				.unzip();
			columns
		};
		if names.is_empty() {
			return Err(error!(statement_failed(select, "statement does not return any columns")));
		}

		let names = unique_column_names(names);
		let ddl = format!(
			"CREATE TABLE {} ({})",
			quote_identifier(table),
			column_definitions(names.iter().map(String::as_str).zip(decls.iter().map(String::as_str)))
		);
		let insert = format!("INSERT INTO {} {select}", quote_identifier(table));

		let tx = self.conn.unchecked_transaction().map_err(|e| sqlite_error(&ddl, e))?;
		tx.execute_batch(&ddl).map_err(|e| sqlite_error(&ddl, e))?;
		let filled = tx
			.execute(&insert, [])
			.map_err(|e| sqlite_error(select, e))
			.and_then(|_| tx.commit().map_err(|e| sqlite_error(&insert, e)));
		if filled.is_err() {
			discard(&self.conn, table);
		}
		filled
	}

	fn rename_view(&mut self, from: &str, to: &str) -> Result<()> {
		view::rename_view(&self.conn, from, to)
	}

	fn alter_column_type(&mut self, table: &str, column: &str, change: &TypeChange) -> Result<()> {
		retype::alter_column_type(&self.conn, table, column, change)
	}

	fn sniff_csv(&mut self, path: &Path, options: &CsvOptions) -> Result<SniffedCsv> {
		sniff_file(path, options)
	}

	fn load_csv(&mut self, table: &str, path: &Path, schema: &CsvSchema, options: &CsvOptions) -> Result<()> {
		load::load_csv(&self.conn, table, path, schema, options)
	}

	fn export_csv(&mut self, table: &str, path: &Path, delimiter: u8) -> Result<()> {
		export::export_csv(&self.conn, table, path, delimiter)
	}

	fn export_database(&mut self, dir: &Path) -> Result<()> {
		archive::export_database(&self.conn, dir)
	}

	fn import_database(&mut self, dir: &Path) -> Result<()> {
		archive::import_database(&self.conn, dir)
	}

	fn attach_sqlite(&mut self, path: &Path, alias: &str) -> Result<Vec<String>> {
		attach::attach(&self.conn, path, alias)
	}

	fn detach(&mut self, alias: &str) -> Result<()> {
		attach::detach(&self.conn, alias)
	}

	fn sample_sql(&self, table: &str, rows: usize) -> String {
		format!("SELECT * FROM {} ORDER BY random() LIMIT {rows}", quote_identifier(table))
	}

	fn close(self: Box<Self>) -> Result<()> {
		let engine = *self;
		engine.conn.close().map_err(|(_, e)| sqlite_error("close", e))
	}
}
