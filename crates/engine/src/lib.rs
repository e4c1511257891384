// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

//! The narrow execution interface the datastore talks to, and its
//! implementations.
//!
//! An [`Engine`] owns exactly one connection to an embedded SQL engine. It is
//! not safe for concurrent use; callers serialize access.

use std::{
	fmt::{Display, Formatter},
	path::Path,
};

use sheetdb_type::{NativeType, Result};

pub mod delimited;
pub mod frame;
pub mod sniff;
pub mod sql;
pub mod sqlite;

#[cfg(feature = "duckdb")]
pub mod duckdb;

pub use delimited::{CsvColumn, CsvOptions, CsvSchema, ExportDelimiter, SniffedCsv};
pub use frame::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
	Sqlite,
	DuckDb,
}

impl Display for EngineKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			EngineKind::Sqlite => "sqlite",
			EngineKind::DuckDb => "duckdb",
		})
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
	Table,
	View,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogObject {
	pub name: String,
	pub kind: ObjectKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
	pub name: String,
	pub native_type: NativeType,
}

/// Target of a column type conversion. `format` is a strptime format and is
/// only meaningful for timestamp targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeChange {
	pub sql_type: String,
	pub format: Option<String>,
}

impl TypeChange {
	pub fn to(sql_type: impl Into<String>) -> Self {
		Self {
			sql_type: sql_type.into(),
			format: None,
		}
	}

	pub fn timestamp(format: impl Into<String>) -> Self {
		Self {
			sql_type: "TIMESTAMP".to_string(),
			format: Some(format.into()),
		}
	}
}

pub trait Engine {
	fn kind(&self) -> EngineKind;

	/// Runs statements that produce no rows.
	fn execute(&mut self, sql: &str) -> Result<()>;

	fn query(&mut self, sql: &str) -> Result<Frame>;

	/// Native column types of a table or view, in declaration order.
	fn describe(&mut self, table: &str) -> Result<Vec<ColumnInfo>>;

	fn objects(&mut self) -> Result<Vec<CatalogObject>>;

	fn object_kind(&mut self, name: &str) -> Result<Option<ObjectKind>> {
		Ok(self.objects()?.into_iter().find(|o| o.name.eq_ignore_ascii_case(name)).map(|o| o.kind))
	}

	/// `CREATE TABLE table AS select`, keeping the native column types of the
	/// select.
	fn create_table_as(&mut self, table: &str, select: &str) -> Result<()>;

	fn rename_view(&mut self, from: &str, to: &str) -> Result<()>;

	fn alter_column_type(&mut self, table: &str, column: &str, change: &TypeChange) -> Result<()>;

	/// Guesses column types and date/timestamp formats from the whole file.
	fn sniff_csv(&mut self, path: &Path, options: &CsvOptions) -> Result<SniffedCsv>;

	/// Bulk loads a CSV file into a new table using the given column types.
	fn load_csv(&mut self, table: &str, path: &Path, schema: &CsvSchema, options: &CsvOptions) -> Result<()>;

	fn export_csv(&mut self, table: &str, path: &Path, delimiter: u8) -> Result<()>;

	fn export_database(&mut self, dir: &Path) -> Result<()>;

	fn import_database(&mut self, dir: &Path) -> Result<()>;

	/// Attaches a SQLite database file as schema `alias` and lists its tables.
	fn attach_sqlite(&mut self, path: &Path, alias: &str) -> Result<Vec<String>>;

	fn detach(&mut self, alias: &str) -> Result<()>;

	/// A statement selecting up to `rows` sampled rows of `table`.
	fn sample_sql(&self, table: &str, rows: usize) -> String;

	fn close(self: Box<Self>) -> Result<()>;
}

impl<E: Engine + ?Sized> Engine for Box<E> {
	fn kind(&self) -> EngineKind {
		(**self).kind()
	}

	fn execute(&mut self, sql: &str) -> Result<()> {
		(**self).execute(sql)
	}

	fn query(&mut self, sql: &str) -> Result<Frame> {
		(**self).query(sql)
	}

	fn describe(&mut self, table: &str) -> Result<Vec<ColumnInfo>> {
		(**self).describe(table)
	}

	fn objects(&mut self) -> Result<Vec<CatalogObject>> {
		(**self).objects()
	}

	fn object_kind(&mut self, name: &str) -> Result<Option<ObjectKind>> {
		(**self).object_kind(name)
	}

	fn create_table_as(&mut self, table: &str, select: &str) -> Result<()> {
		(**self).create_table_as(table, select)
	}

	fn rename_view(&mut self, from: &str, to: &str) -> Result<()> {
		(**self).rename_view(from, to)
	}

	fn alter_column_type(&mut self, table: &str, column: &str, change: &TypeChange) -> Result<()> {
		(**self).alter_column_type(table, column, change)
	}

	fn sniff_csv(&mut self, path: &Path, options: &CsvOptions) -> Result<SniffedCsv> {
		(**self).sniff_csv(path, options)
	}

	fn load_csv(&mut self, table: &str, path: &Path, schema: &CsvSchema, options: &CsvOptions) -> Result<()> {
		(**self).load_csv(table, path, schema, options)
	}

	fn export_csv(&mut self, table: &str, path: &Path, delimiter: u8) -> Result<()> {
		(**self).export_csv(table, path, delimiter)
	}

	fn export_database(&mut self, dir: &Path) -> Result<()> {
		(**self).export_database(dir)
	}

	fn import_database(&mut self, dir: &Path) -> Result<()> {
		(**self).import_database(dir)
	}

	fn attach_sqlite(&mut self, path: &Path, alias: &str) -> Result<Vec<String>> {
		(**self).attach_sqlite(path, alias)
	}

	fn detach(&mut self, alias: &str) -> Result<()> {
		(**self).detach(alias)
	}

	fn sample_sql(&self, table: &str, rows: usize) -> String {
		(**self).sample_sql(table, rows)
	}

	fn close(self: Box<Self>) -> Result<()> {
		E::close(*self)
	}
}
