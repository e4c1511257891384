// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use sheetdb_engine::{Engine, sql};
use sheetdb_type::{
	QueryResult, Result, Sort, SortDirection, error, error::diagnostic::catalog::column_not_found,
};
use tracing::{debug, instrument, warn};

use super::TableLifecycle;

impl<E: Engine + ?Sized> TableLifecycle<'_, E> {
	/// Sorts `table` in place. The first sort moves the original rows into a
	/// shadow table; sorting with no direction left restores them.
	#[instrument(name = "store::lifecycle::sort", level = "debug", skip(self, sorts))]
	pub fn sort(&mut self, table: &str, sorts: &[Sort]) -> Result<QueryResult> {
		let table = self.resolve(table)?;
		let existing = self.registry.shadow_of(&table).map(str::to_string);

		let active = self.active_sorts(&table, sorts)?;

		if active.is_empty() {
			if let Some(shadow) = existing {
				debug!(table = %table, shadow = %shadow, "restoring unsorted rows");
				self.drop_object(&table)?;
				self.rename_object(&shadow, &table)?;
				self.registry.release(&shadow);
			}
			return self.materialize(&table, None);
		}

		let sorted = existing.is_some();
		let shadow = match existing {
			Some(shadow) => {
				self.drop_object(&table)?;
				shadow
			}
			None => {
				let shadow = self.registry.reserve_shadow(&table);
				if let Err(err) = self.rename_object(&table, &shadow) {
					self.registry.release(&shadow);
					return Err(err);
				}
				shadow
			}
		};

		let select = sql::order_by(&shadow, &active);
		if let Err(err) = self.engine.create_table_as(&table, &select) {
			self.recover(&table, &shadow, sorted);
			return Err(err);
		}

		self.materialize(&table, Some(&select))
	}

	/// Sorts with a direction, their columns resolved to the table's spelling.
	fn active_sorts(&mut self, table: &str, sorts: &[Sort]) -> Result<Vec<Sort>> {
		let columns = self.engine.describe(table)?;
		sorts.iter()
			.filter(|sort| sort.direction != SortDirection::None)
			.map(|sort| {
				columns.iter()
					.find(|c| c.name.eq_ignore_ascii_case(&sort.column))
					.map(|c| Sort::new(c.name.clone(), sort.direction))
					.ok_or_else(|| error!(column_not_found(table, &sort.column)))
			})
			.collect()
	}

	/// Puts the unsorted rows back under `table` after a failed sort.
	fn recover(&mut self, table: &str, shadow: &str, was_sorted: bool) {
		let restored = if was_sorted {
			self.engine.create_table_as(table, &sql::select_all(shadow))
		} else {
			self.rename_object(shadow, table).map(|_| {
				self.registry.release(shadow);
			})
		};
		if let Err(err) = restored {
			warn!(table, error = %err, "failed to restore table after sort");
		}
	}
}

#[cfg(test)]
mod tests {
	use sheetdb_engine::sqlite::SqliteEngine;
	use sheetdb_type::Value;

	use super::*;
	use crate::{config::DatastoreConfig, registry::NameRegistry};

	fn setup() -> (SqliteEngine, NameRegistry, DatastoreConfig) {
		let mut engine = SqliteEngine::in_memory().unwrap();
		engine.execute("CREATE TABLE t (a BIGINT, b VARCHAR); INSERT INTO t VALUES (2, 'x'), (1, 'y'), (3, 'x')").unwrap();
		let mut registry = NameRegistry::new();
		registry.register("t").unwrap();
		(engine, registry, DatastoreConfig::default())
	}

	fn column(result: &QueryResult, idx: usize) -> Vec<Value> {
		result.rows.iter().map(|row| row[idx].clone()).collect()
	}

	fn ints(values: &[i64]) -> Vec<Value> {
		values.iter().map(|v| Value::Int8(*v)).collect()
	}

	#[test]
	fn test_sort_and_restore() {
		let (mut engine, mut registry, config) = setup();
		let mut lifecycle = TableLifecycle::new(&mut engine, &mut registry, &config);

		let sorted = lifecycle.sort("t", &[Sort::asc("a")]).unwrap();
		assert_eq!(column(&sorted, 0), ints(&[1, 2, 3]));
		assert_eq!(sorted.sql.as_deref(), Some("SELECT * FROM \"t__unsorted\" ORDER BY \"a\" ASC"));

		let resorted = lifecycle.sort("t", &[Sort::desc("a")]).unwrap();
		assert_eq!(column(&resorted, 0), ints(&[3, 2, 1]));

		let restored = lifecycle.sort("t", &[Sort::none("a")]).unwrap();
		assert_eq!(column(&restored, 0), ints(&[2, 1, 3]));
		assert_eq!(restored.sql, None);

		assert_eq!(registry.names(), ["t".to_string()]);
		let objects: Vec<String> = engine.objects().unwrap().into_iter().map(|o| o.name).collect();
		assert_eq!(objects, vec!["t"]);
	}

	#[test]
	fn test_multiple_keys() {
		let (mut engine, mut registry, config) = setup();
		let result = TableLifecycle::new(&mut engine, &mut registry, &config)
			.sort("t", &[Sort::asc("B"), Sort::desc("missing")])
			.unwrap_err();
		assert_eq!(result.code, "CATALOG_003");

		let result = TableLifecycle::new(&mut engine, &mut registry, &config)
			.sort("t", &[Sort::asc("B"), Sort::none("missing"), Sort::desc("a")])
			.unwrap();
		assert_eq!(column(&result, 0), ints(&[3, 2, 1]));
		assert_eq!(registry.names(), ["t".to_string(), "t__unsorted".to_string()]);
		assert_eq!(registry.shadow_of("t"), Some("t__unsorted"));
	}

	#[test]
	fn test_user_table_with_shadow_like_name() {
		let (mut engine, mut registry, config) = setup();
		engine.execute("CREATE TABLE t__unsorted (a BIGINT); INSERT INTO t__unsorted VALUES (100), (200)").unwrap();
		registry.register("t__unsorted").unwrap();
		let mut lifecycle = TableLifecycle::new(&mut engine, &mut registry, &config);

		let sorted = lifecycle.sort("t", &[Sort::asc("a")]).unwrap();
		assert_eq!(column(&sorted, 0), ints(&[1, 2, 3]));
		assert_eq!(sorted.sql.as_deref(), Some("SELECT * FROM \"t__unsorted_1\" ORDER BY \"a\" ASC"));

		let restored = lifecycle.sort("t", &[]).unwrap();
		assert_eq!(column(&restored, 0), ints(&[2, 1, 3]));

		let untouched = lifecycle.load_table("t__unsorted").unwrap();
		assert_eq!(column(&untouched, 0), ints(&[100, 200]));
		assert_eq!(registry.tables(), vec!["t".to_string(), "t__unsorted".to_string()]);
	}

	#[test]
	fn test_unsorted_table_without_directions_is_unchanged() {
		let (mut engine, mut registry, config) = setup();
		let result = TableLifecycle::new(&mut engine, &mut registry, &config).sort("t", &[Sort::none("a")]).unwrap();
		assert_eq!(column(&result, 0), ints(&[2, 1, 3]));
		assert_eq!(registry.names(), ["t".to_string()]);
	}

	#[test]
	fn test_unknown_table() {
		let (mut engine, mut registry, config) = setup();
		let err = TableLifecycle::new(&mut engine, &mut registry, &config).sort("nope", &[Sort::asc("a")]).unwrap_err();
		assert_eq!(err.code, "CATALOG_001");
	}
}
