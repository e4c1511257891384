// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! An embedded DuckDB connection. CSV sniffing, loading, type changes and
//! database export are delegated to DuckDB's own facilities.

mod value;

use std::path::{Path, PathBuf};

use duckdb::Connection;
use sheetdb_type::{
	NativeType, Result, error,
	error::diagnostic::{
		catalog::{column_not_found, table_not_found},
		engine::statement_failed,
		internal::internal,
	},
};
use tracing::{debug, instrument};

use crate::{
	CatalogObject, ColumnInfo, CsvOptions, CsvSchema, Engine, EngineKind, Frame, ObjectKind, SniffedCsv, TypeChange,
	sql::{quote_identifier, quote_literal, rename_view, trim_statement},
};

fn duckdb_error(sql: &str, err: duckdb::Error) -> sheetdb_type::Error {
	error!(statement_failed(sql, err.to_string()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuckDbConfig {
	/// Database file; `None` opens a private in-memory database.
	pub path: Option<PathBuf>,
	pub threads: Option<usize>,
}

impl DuckDbConfig {
	pub fn in_memory() -> Self {
		Self::default()
	}

	pub fn path(mut self, path: impl AsRef<Path>) -> Self {
		self.path = Some(path.as_ref().to_path_buf());
		self
	}

	pub fn threads(mut self, threads: usize) -> Self {
		self.threads = Some(threads);
		self
	}
}

pub struct DuckDbEngine {
	conn: Connection,
}

impl DuckDbEngine {
	#[instrument(name = "engine::duckdb::open", level = "debug", skip_all, fields(path = ?config.path))]
	pub fn open(config: DuckDbConfig) -> Result<Self> {
		let mut flags = duckdb::Config::default();
		if let Some(threads) = config.threads {
			flags = flags
				.threads(threads as i64)
				.map_err(|e| error!(internal(format!("invalid duckdb thread count: {e}"))))?;
		}
		let conn = match &config.path {
			Some(path) => Connection::open_with_flags(path, flags),
			None => Connection::open_in_memory_with_flags(flags),
		}
		.map_err(|e| error!(internal(format!("failed to open duckdb database: {e}"))))?;
		debug!("duckdb engine opened");
		Ok(Self {
			conn,
		})
	}

	pub fn in_memory() -> Result<Self> {
		Self::open(DuckDbConfig::in_memory())
	}

	fn strings(&self, sql: &str, param: Option<&str>) -> Result<Vec<Vec<Option<String>>>> {
		let mut stmt = self.conn.prepare(sql).map_err(|e| duckdb_error(sql, e))?;
		let mut rows = match param {
			Some(param) => stmt.query([param]),
			None => stmt.query([]),
		}
		.map_err(|e| duckdb_error(sql, e))?;
		let width = rows.as_ref().map(|s| s.column_count()).unwrap_or(0);

		let mut result = Vec::new();
		while let Some(row) = rows.next().map_err(|e| duckdb_error(sql, e))? {
			let mut values = Vec::with_capacity(width);
			for idx in 0..width {
				values.push(row.get::<_, Option<String>>(idx).map_err(|e| duckdb_error(sql, e))?);
			}
			result.push(values);
		}
		Ok(result)
	}

	fn read_csv_arguments(path: &Path, options: &CsvOptions) -> String {
		format!(
			"{}, delim = {}, header = {}",
			quote_literal(&path.to_string_lossy()),
			quote_literal(&(options.delimiter as char).to_string()),
			options.has_header
		)
	}
}

impl Engine for DuckDbEngine {
	fn kind(&self) -> EngineKind {
		EngineKind::DuckDb
	}

	fn execute(&mut self, sql: &str) -> Result<()> {
		self.conn.execute_batch(sql).map_err(|e| duckdb_error(sql, e))
	}

	fn query(&mut self, sql: &str) -> Result<Frame> {
		let mut stmt = self.conn.prepare(sql).map_err(|e| duckdb_error(sql, e))?;
		let mut rows = stmt.query([]).map_err(|e| duckdb_error(sql, e))?;
		let columns: Vec<String> = rows.as_ref().map(|s| s.column_names()).unwrap_or_default();
		let width = columns.len();

		let mut result = Vec::new();
		while let Some(row) = rows.next().map_err(|e| duckdb_error(sql, e))? {
			let mut values = Vec::with_capacity(width);
			for idx in 0..width {
				let value: duckdb::types::Value = row.get(idx).map_err(|e| duckdb_error(sql, e))?;
				values.push(value::from_duckdb(value));
			}
			result.push(values);
		}
		Ok(Frame::new(columns, result))
	}

	fn describe(&mut self, table: &str) -> Result<Vec<ColumnInfo>> {
		let sql = "SELECT column_name, data_type FROM information_schema.columns \
		           WHERE lower(table_name) = lower(?) ORDER BY ordinal_position";
		let rows = self.strings(sql, Some(table))?;
		if rows.is_empty() {
			return Err(error!(table_not_found(table)));
		}
		Ok(rows
			.into_iter()
			.map(|mut row| {
				let native_type = row.pop().flatten().unwrap_or_default();
				let name = row.pop().flatten().unwrap_or_default();
				ColumnInfo {
					name,
					native_type: NativeType::new(native_type),
				}
			})
			.collect())
	}

	fn objects(&mut self) -> Result<Vec<CatalogObject>> {
		let sql = "SELECT table_name, table_type FROM information_schema.tables WHERE table_schema = 'main'";
		Ok(self
			.strings(sql, None)?
			.into_iter()
			.map(|mut row| {
				let kind = row.pop().flatten().unwrap_or_default();
				let name = row.pop().flatten().unwrap_or_default();
				CatalogObject {
					name,
					kind: if kind == "VIEW" {
						ObjectKind::View
					} else {
						ObjectKind::Table
					},
				}
			})
			.collect())
	}

	fn create_table_as(&mut self, table: &str, select: &str) -> Result<()> {
		let sql = format!("CREATE TABLE {} AS {}", quote_identifier(table), trim_statement(select));
		self.conn.execute_batch(&sql).map_err(|e| duckdb_error(trim_statement(select), e))
	}

	fn rename_view(&mut self, from: &str, to: &str) -> Result<()> {
		self.execute(&rename_view(from, to))
	}

	#[instrument(name = "engine::duckdb::alter_column_type", level = "debug", skip_all, fields(table = %table, column = %column, target = %change.sql_type))]
	fn alter_column_type(&mut self, table: &str, column: &str, change: &TypeChange) -> Result<()> {
		let Some(info) = self.describe(table)?.into_iter().find(|c| c.name.eq_ignore_ascii_case(column)) else {
			return Err(error!(column_not_found(table, column)));
		};
		let quoted = quote_identifier(&info.name);
		let sql = match &change.format {
			Some(format) => format!(
				"ALTER TABLE {} ALTER {quoted} SET DATA TYPE {} USING strptime(CAST({quoted} AS VARCHAR), {})",
				quote_identifier(table),
				change.sql_type,
				quote_literal(format)
			),
			None => format!("ALTER TABLE {} ALTER {quoted} TYPE {}", quote_identifier(table), change.sql_type),
		};
		self.conn.execute_batch(&sql).map_err(|e| duckdb_error(&sql, e))
	}

	#[instrument(name = "engine::duckdb::sniff_csv", level = "debug", skip_all, fields(path = %path.display()))]
	fn sniff_csv(&mut self, path: &Path, options: &CsvOptions) -> Result<SniffedCsv> {
		let arguments = Self::read_csv_arguments(path, options);
		let types_sql = format!(
			"SELECT col.type FROM (SELECT UNNEST(Columns) AS col FROM sniff_csv({arguments}, sample_size = -1))"
		);
		let formats_sql = format!("SELECT DateFormat, TimestampFormat FROM sniff_csv({arguments}, sample_size = -1)");

		let types = self
			.strings(&types_sql, None)?
			.into_iter()
			.map(|mut row| NativeType::new(row.pop().flatten().unwrap_or_default()))
			.collect();
		let mut formats = self.strings(&formats_sql, None)?.into_iter().next().unwrap_or_default();
		let timestamp_format = formats.pop().flatten().filter(|f| !f.is_empty());
		let date_format = formats.pop().flatten().filter(|f| !f.is_empty());

		Ok(SniffedCsv {
			types,
			date_format,
			timestamp_format,
		})
	}

	#[instrument(name = "engine::duckdb::load_csv", level = "debug", skip_all, fields(table = %table, path = %path.display()))]
	fn load_csv(&mut self, table: &str, path: &Path, schema: &CsvSchema, options: &CsvOptions) -> Result<()> {
		let columns: Vec<String> = schema
			.columns
			.iter()
			.map(|c| format!("{}: {}", quote_literal(&c.name), quote_literal(c.native_type.as_str())))
			.collect();
		let mut arguments = format!(
			"{}, columns = {{{}}}, null_padding = true, parallel = false, auto_detect = false",
			Self::read_csv_arguments(path, options),
			columns.join(", ")
		);
		if let Some(format) = &schema.date_format {
			arguments.push_str(&format!(", dateformat = {}", quote_literal(format)));
		}
		if let Some(format) = &schema.timestamp_format {
			arguments.push_str(&format!(", timestampformat = {}", quote_literal(format)));
		}

		let sql = format!("CREATE TABLE {} AS SELECT * FROM read_csv({arguments})", quote_identifier(table));
		self.conn.execute_batch(&sql).map_err(|e| duckdb_error(&sql, e))
	}

	fn export_csv(&mut self, table: &str, path: &Path, delimiter: u8) -> Result<()> {
		let sql = format!(
			"COPY {} TO {} (HEADER, DELIMITER {})",
			quote_identifier(table),
			quote_literal(&path.to_string_lossy()),
			quote_literal(&(delimiter as char).to_string())
		);
		self.conn.execute_batch(&sql).map_err(|e| duckdb_error(&sql, e))
	}

	fn export_database(&mut self, dir: &Path) -> Result<()> {
		let sql = format!("EXPORT DATABASE {} (FORMAT PARQUET, COMPRESSION ZSTD)", quote_literal(&dir.to_string_lossy()));
		self.conn.execute_batch(&sql).map_err(|e| duckdb_error(&sql, e))
	}

	fn import_database(&mut self, dir: &Path) -> Result<()> {
		let sql = format!("IMPORT DATABASE {}", quote_literal(&dir.to_string_lossy()));
		self.conn.execute_batch(&sql).map_err(|e| duckdb_error(&sql, e))
	}

	/// Reads the file through DuckDB's sqlite extension.
	fn attach_sqlite(&mut self, path: &Path, alias: &str) -> Result<Vec<String>> {
		let sql = format!(
			"ATTACH {} AS {} (TYPE sqlite, READ_ONLY)",
			quote_literal(&path.to_string_lossy()),
			quote_identifier(alias)
		);
		self.conn.execute_batch(&sql).map_err(|e| duckdb_error(&sql, e))?;
		let tables = self.strings(
			"SELECT table_name FROM information_schema.tables WHERE table_catalog = ? AND table_type = 'BASE TABLE'",
			Some(alias),
		)?;
		Ok(tables.into_iter().filter_map(|mut row| row.pop().flatten()).collect())
	}

	fn detach(&mut self, alias: &str) -> Result<()> {
		let sql = format!("DETACH {}", quote_identifier(alias));
		self.conn.execute_batch(&sql).map_err(|e| duckdb_error(&sql, e))
	}

	fn sample_sql(&self, table: &str, rows: usize) -> String {
		format!("SELECT * FROM {} USING SAMPLE {rows} ROWS", quote_identifier(table))
	}

	fn close(self: Box<Self>) -> Result<()> {
		let engine = *self;
		engine.conn.close().map_err(|(_, e)| duckdb_error("close", e))
	}
}

#[cfg(test)]
mod tests {
	use sheetdb_testing::{fixture::write_csv, tempdir::temp_dir};

	use super::*;

	#[test]
	fn test_sniff_and_load() {
		temp_dir(|dir| {
			let path = write_csv(dir, "in.csv", "id,name,when\n1,a,2024-01-05\n2,b,2024-02-06\n")?;
			let mut engine = DuckDbEngine::in_memory()?;
			let options = CsvOptions::default();
			let sniffed = engine.sniff_csv(&path, &options)?;
			assert_eq!(sniffed.types.len(), 3);
			assert_eq!(sniffed.types[0].as_str(), "BIGINT");

			let schema = CsvSchema {
				columns: ["id", "name", "when"]
					.iter()
					.zip(&sniffed.types)
					.map(|(name, native_type)| crate::CsvColumn {
						name: name.to_string(),
						native_type: native_type.clone(),
					})
					.collect(),
				date_format: sniffed.date_format.clone(),
				timestamp_format: sniffed.timestamp_format.clone(),
			};
			engine.load_csv("t", &path, &schema, &options)?;
			assert_eq!(engine.query("SELECT COUNT(*) FROM t")?.scalar_u64(), 2);
			Ok(())
		})
		.expect("test failed");
	}

	#[test]
	fn test_alter_with_format() {
		let mut engine = DuckDbEngine::in_memory().unwrap();
		engine.execute("CREATE TABLE t (d VARCHAR); INSERT INTO t VALUES ('5-Jan-2024')").unwrap();
		engine.alter_column_type("t", "d", &TypeChange::timestamp("%d-%b-%Y")).unwrap();
		let types: Vec<String> = engine.describe("t").unwrap().into_iter().map(|c| c.native_type.to_string()).collect();
		assert_eq!(types, vec!["TIMESTAMP"]);
	}
}
