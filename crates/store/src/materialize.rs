// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Turns a table into a [`QueryResult`]: settles column types into the display
//! set, counts rows, fetches the first page and estimates column widths.

use sheetdb_engine::{Engine, sql};
use sheetdb_type::{
	Column, DisplayType, QueryResult, Result, Row, Value, error,
	error::diagnostic::column_type::{type_fix_not_converging, unsupported_native_type},
	value::timestamp::TIMESTAMP_WIDTH,
};
use tracing::{debug, instrument};

use crate::{
	config::DatastoreConfig,
	normalize::{classify, plan_fix},
};

/// Display types of every column of `table`. Fails on a column outside the
/// display set.
pub fn display_types<E: Engine + ?Sized>(engine: &mut E, table: &str) -> Result<Vec<Column>> {
	engine
		.describe(table)?
		.into_iter()
		.map(|info| match classify(&info.native_type) {
			Some(display_type) => Ok(Column::new(info.name, display_type)),
			None => Err(error!(unsupported_native_type(table, &info.name, info.native_type.as_str()))),
		})
		.collect()
}

fn coerce_rows(rows: Vec<Row>, columns: &[Column]) -> Vec<Row> {
	rows.into_iter()
		.map(|row| {
			row.into_iter()
				.enumerate()
				.map(|(idx, value)| match columns.get(idx) {
					Some(column) => value.coerce(column.display_type),
					None => value,
				})
				.collect()
		})
		.collect()
}

/// Width of a value as displayed in a grid cell: the longest line.
fn value_width(value: &Value, display_type: DisplayType) -> usize {
	match value {
		Value::Undefined => 0,
		_ if display_type == DisplayType::Timestamp => TIMESTAMP_WIDTH,
		other => other.to_string().lines().map(|line| line.chars().count()).max().unwrap_or(0),
	}
}

fn column_widths(columns: &mut [Column], sample: &[Row]) {
	for (idx, column) in columns.iter_mut().enumerate() {
		column.max_char_width = sample
			.iter()
			.filter_map(|row| row.get(idx))
			.map(|value| value_width(value, column.display_type))
			.max()
			.unwrap_or(0);
	}
}

pub struct Materializer<'a, E: Engine + ?Sized> {
	engine: &'a mut E,
	config: &'a DatastoreConfig,
}

impl<'a, E: Engine + ?Sized> Materializer<'a, E> {
	pub fn new(engine: &'a mut E, config: &'a DatastoreConfig) -> Self {
		Self {
			engine,
			config,
		}
	}

	#[instrument(name = "store::materialize", level = "debug", skip(self, sql))]
	pub fn materialize(&mut self, table: &str, sql: Option<&str>) -> Result<QueryResult> {
		let count = self.engine.query(&sql::count(table))?.scalar_u64();

		let mut columns = self.settle_types(table)?;

		let page = self.engine.query(&sql::select_page(table, self.config.page_size, 0))?;
		let rows = coerce_rows(page.rows, &columns);

		let sample_sql = self.engine.sample_sql(table, self.config.sample_size);
		let sample = self.engine.query(&sample_sql)?;
		let sample = coerce_rows(sample.rows, &columns);
		column_widths(&mut columns, &sample);

		debug!(count, rows = rows.len(), "materialized");

		Ok(QueryResult {
			name: table.to_string(),
			sql: sql.map(str::to_string),
			columns,
			rows,
			count,
		})
	}

	/// The next `load_more_size` rows from `offset`.
	#[instrument(name = "store::materialize::load_more", level = "debug", skip(self))]
	pub fn load_more(&mut self, table: &str, offset: usize) -> Result<Vec<Row>> {
		let columns = display_types(&mut *self.engine, table)?;
		let frame = self.engine.query(&sql::select_page(table, self.config.load_more_size, offset))?;
		Ok(coerce_rows(frame.rows, &columns))
	}

	/// Converts columns outside the display set until every column is in it.
	/// Each pass converts all offending columns and starts over, since a
	/// conversion may change how the engine reports other columns.
	fn settle_types(&mut self, table: &str) -> Result<Vec<Column>> {
		let attempts = self.engine.describe(table)?.len() + 1;

		for attempt in 0..attempts {
			let described = self.engine.describe(table)?;

			let mut columns = Vec::with_capacity(described.len());
			let mut fixes = Vec::new();
			for info in described {
				match classify(&info.native_type) {
					Some(display_type) => columns.push(Column::new(info.name, display_type)),
					None => match plan_fix(&info.native_type) {
						Some(change) => fixes.push((info, change)),
						None => {
							return Err(error!(unsupported_native_type(
								table,
								&info.name,
								info.native_type.as_str()
							)));
						}
					},
				}
			}

			if fixes.is_empty() {
				return Ok(columns);
			}

			for (info, change) in fixes {
				debug!(attempt, column = %info.name, from = %info.native_type, to = %change.sql_type, "converting column");
				self.engine.alter_column_type(table, &info.name, &change)?;
			}
		}

		Err(error!(type_fix_not_converging(table, attempts)))
	}
}

#[cfg(test)]
mod tests {
	use sheetdb_engine::sqlite::SqliteEngine;

	use super::*;

	fn engine() -> SqliteEngine {
		SqliteEngine::in_memory().unwrap()
	}

	/// Inserts `1..=rows` into `table` as `select` over the counter `n`.
	fn fill(engine: &mut SqliteEngine, table: &str, rows: usize, select: &str) {
		engine.execute(&format!(
			"INSERT INTO {table} WITH RECURSIVE c(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM c WHERE n < {rows}) {select}"
		))
		.unwrap();
	}

	mod materialize {
		use super::*;

		#[test]
		fn test_count_is_full_count() {
			let mut engine = engine();
			engine.execute("CREATE TABLE t (n BIGINT)").unwrap();
			fill(&mut engine, "t", 25, "SELECT n FROM c");

			let config = DatastoreConfig::default().page_size(10);
			let result = Materializer::new(&mut engine, &config).materialize("t", None).unwrap();
			assert_eq!(result.count, 25);
			assert_eq!(result.rows.len(), 10);
			assert_eq!(result.rows[0], vec![Value::Int8(1)]);
		}

		#[test]
		fn test_converts_types_outside_the_set() {
			let mut engine = engine();
			engine.execute("CREATE TABLE t (a INTEGER, b DECIMAL(8,2), c DATE, d VARCHAR)").unwrap();
			engine.execute("INSERT INTO t VALUES (1, 2.5, '2024-01-02', 'x')").unwrap();

			let config = DatastoreConfig::default();
			let result = Materializer::new(&mut engine, &config).materialize("t", Some("SELECT 1")).unwrap();

			let types: Vec<DisplayType> = result.columns.iter().map(|c| c.display_type).collect();
			assert_eq!(types, vec![DisplayType::Bigint, DisplayType::Double, DisplayType::Timestamp, DisplayType::Varchar]);
			assert_eq!(result.sql.as_deref(), Some("SELECT 1"));
			assert_eq!(result.rows[0][0], Value::Int8(1));
			assert_eq!(result.rows[0][1], Value::Float8(2.5));
			assert!(matches!(result.rows[0][2], Value::Timestamp(_)));
		}

		#[test]
		fn test_unfixable_type() {
			let mut engine = engine();
			engine.execute("CREATE TABLE t (a BLOB)").unwrap();

			let config = DatastoreConfig::default();
			let err = Materializer::new(&mut engine, &config).materialize("t", None).unwrap_err();
			assert_eq!(err.code, "TYPE_001");
			assert_eq!(err.table.as_deref(), Some("t"));
		}

		#[test]
		fn test_widths() {
			let mut engine = engine();
			engine.execute("CREATE TABLE t (a VARCHAR, b TIMESTAMP, c BIGINT)").unwrap();
			engine
				.execute("INSERT INTO t VALUES ('short', '2024-01-02 03:04:05', 7), ('two\nlines here', NULL, 12345)")
				.unwrap();

			let config = DatastoreConfig::default();
			let result = Materializer::new(&mut engine, &config).materialize("t", None).unwrap();
			let widths: Vec<usize> = result.columns.iter().map(|c| c.max_char_width).collect();
			assert_eq!(widths, vec![10, TIMESTAMP_WIDTH, 5]);
		}

		#[test]
		fn test_widths_cover_rows_past_the_first_page() {
			let mut engine = engine();
			engine.execute("CREATE TABLE t (a VARCHAR, b BOOLEAN)").unwrap();
			engine.execute("INSERT INTO t VALUES ('a', 1), ('abc', NULL), ('abcdefgh', 0)").unwrap();

			let config = DatastoreConfig::default().page_size(1);
			let result = Materializer::new(&mut engine, &config).materialize("t", None).unwrap();
			assert_eq!(result.rows.len(), 1);
			let widths: Vec<usize> = result.columns.iter().map(|c| c.max_char_width).collect();
			assert_eq!(widths, vec![8, 5]);
		}

		#[test]
		fn test_empty_table() {
			let mut engine = engine();
			engine.execute("CREATE TABLE t (a VARCHAR)").unwrap();

			let config = DatastoreConfig::default();
			let result = Materializer::new(&mut engine, &config).materialize("t", None).unwrap();
			assert_eq!(result.count, 0);
			assert!(result.rows.is_empty());
			assert_eq!(result.columns[0].max_char_width, 0);
		}
	}

	mod load_more {
		use super::*;

		#[test]
		fn test_pages_from_offset() {
			let mut engine = engine();
			engine.execute("CREATE TABLE t (n BIGINT, flag BOOLEAN)").unwrap();
			fill(&mut engine, "t", 30, "SELECT n, n % 2 FROM c");

			let config = DatastoreConfig::default().load_more_size(8);
			let rows = Materializer::new(&mut engine, &config).load_more("t", 25).unwrap();
			assert_eq!(rows.len(), 5);
			assert_eq!(rows[0], vec![Value::Int8(26), Value::Boolean(false)]);
		}
	}
}
