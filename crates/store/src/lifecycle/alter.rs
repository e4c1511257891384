// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use sheetdb_engine::{Engine, TypeChange};
use sheetdb_type::{
	DisplayType, QueryResult, Result, error,
	error::diagnostic::{
		catalog::column_not_found,
		column_type::{timestamp_format_required, unsupported_conversion},
	},
};
use tracing::{instrument, warn};

use super::TableLifecycle;

impl<E: Engine + ?Sized> TableLifecycle<'_, E> {
	/// Converts `column` to `display_type`. Timestamp targets parse the current
	/// values with `timestamp_format`.
	#[instrument(name = "store::lifecycle::change_column_type", level = "debug", skip(self))]
	pub fn change_column_type(
		&mut self,
		table: &str,
		column: &str,
		display_type: DisplayType,
		timestamp_format: Option<&str>,
	) -> Result<QueryResult> {
		let table = self.resolve(table)?;
		let column = self
			.engine
			.describe(&table)?
			.into_iter()
			.find(|c| c.name.eq_ignore_ascii_case(column))
			.map(|c| c.name)
			.ok_or_else(|| error!(column_not_found(&table, column)))?;

		let change = match (display_type, display_type.sql_type()) {
			(DisplayType::Timestamp, _) => match timestamp_format.map(str::trim) {
				Some(format) if !format.is_empty() => TypeChange::timestamp(format),
				_ => return Err(error!(timestamp_format_required(&table, &column))),
			},
			(_, Some(sql_type)) => TypeChange::to(sql_type),
			(_, None) => return Err(error!(unsupported_conversion(&table, &column, display_type.as_str()))),
		};

		self.engine.alter_column_type(&table, &column, &change)?;

		if let Some(shadow) = self.registry.shadow_of(&table).map(str::to_string) {
			if let Err(err) = self.engine.alter_column_type(&shadow, &column, &change) {
				warn!(shadow = %shadow, error = %err, "unsorted rows keep their previous column type");
			}
		}

		self.materialize(&table, None)
	}
}

#[cfg(test)]
mod tests {
	use sheetdb_engine::sqlite::SqliteEngine;
	use sheetdb_type::{Sort, Value};

	use super::*;
	use crate::{config::DatastoreConfig, registry::NameRegistry};

	fn setup() -> (SqliteEngine, NameRegistry, DatastoreConfig) {
		let mut engine = SqliteEngine::in_memory().unwrap();
		engine
			.execute("CREATE TABLE t (n VARCHAR, d VARCHAR); INSERT INTO t VALUES ('1', '02/03/2024'), ('2', NULL)")
			.unwrap();
		let mut registry = NameRegistry::new();
		registry.register("t").unwrap();
		(engine, registry, DatastoreConfig::default())
	}

	#[test]
	fn test_to_bigint() {
		let (mut engine, mut registry, config) = setup();
		let result = TableLifecycle::new(&mut engine, &mut registry, &config)
			.change_column_type("t", "N", DisplayType::Bigint, None)
			.unwrap();
		assert_eq!(result.column("n").map(|c| c.display_type), Some(DisplayType::Bigint));
		assert_eq!(result.rows[1][0], Value::Int8(2));
	}

	#[test]
	fn test_to_timestamp() {
		let (mut engine, mut registry, config) = setup();
		let result = TableLifecycle::new(&mut engine, &mut registry, &config)
			.change_column_type("t", "d", DisplayType::Timestamp, Some("%d/%m/%Y"))
			.unwrap();
		assert_eq!(result.column("d").map(|c| c.display_type), Some(DisplayType::Timestamp));
		assert_eq!(result.rows[0][1].to_string(), "2024-03-02 00:00:00");
		assert_eq!(result.rows[1][1], Value::Undefined);
	}

	#[test]
	fn test_timestamp_requires_format() {
		let (mut engine, mut registry, config) = setup();
		for format in [None, Some(""), Some("  ")] {
			let err = TableLifecycle::new(&mut engine, &mut registry, &config)
				.change_column_type("t", "d", DisplayType::Timestamp, format)
				.unwrap_err();
			assert_eq!(err.code, "TYPE_003");
		}
	}

	#[test]
	fn test_list_is_not_a_target() {
		let (mut engine, mut registry, config) = setup();
		let err = TableLifecycle::new(&mut engine, &mut registry, &config)
			.change_column_type("t", "n", DisplayType::List, None)
			.unwrap_err();
		assert_eq!(err.code, "TYPE_004");
	}

	#[test]
	fn test_unknown_column_and_table() {
		let (mut engine, mut registry, config) = setup();
		let mut lifecycle = TableLifecycle::new(&mut engine, &mut registry, &config);
		assert_eq!(lifecycle.change_column_type("t", "x", DisplayType::Bigint, None).unwrap_err().code, "CATALOG_003");
		assert_eq!(lifecycle.change_column_type("u", "n", DisplayType::Bigint, None).unwrap_err().code, "CATALOG_001");
	}

	#[test]
	fn test_failed_conversion_keeps_table() {
		let (mut engine, mut registry, config) = setup();
		let err = TableLifecycle::new(&mut engine, &mut registry, &config)
			.change_column_type("t", "d", DisplayType::Bigint, None)
			.unwrap_err();
		assert_eq!(err.code, "ENGINE_001");

		let result = TableLifecycle::new(&mut engine, &mut registry, &config).load_table("t").unwrap();
		assert_eq!(result.column("d").map(|c| c.display_type), Some(DisplayType::Varchar));
	}

	#[test]
	fn test_sorted_table_restores_converted_rows() {
		let (mut engine, mut registry, config) = setup();
		let mut lifecycle = TableLifecycle::new(&mut engine, &mut registry, &config);
		lifecycle.sort("t", &[Sort::desc("n")]).unwrap();
		lifecycle.change_column_type("t", "n", DisplayType::Bigint, None).unwrap();

		let restored = lifecycle.sort("t", &[]).unwrap();
		assert_eq!(restored.column("n").map(|c| c.display_type), Some(DisplayType::Bigint));
		assert_eq!(restored.rows[0][0], Value::Int8(1));
	}
}
