// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::path::Path;

use sheetdb_engine::{Engine, sql};
use sheetdb_type::{QueryResult, Result};
use tracing::{debug, instrument, warn};

use super::TableLifecycle;

/// Schema the source database is attached under while its tables are copied.
const SOURCE_ALIAS: &str = "sheetdb_source";

impl<E: Engine + ?Sized> TableLifecycle<'_, E> {
	/// Copies every table of the SQLite database file at `path` into a new
	/// table of its own. Tables copied before a failure stay.
	#[instrument(name = "store::lifecycle::add_sqlite", level = "debug", skip(self), fields(path = %path.display()))]
	pub fn add_sqlite(&mut self, path: &Path) -> Result<Vec<QueryResult>> {
		let sources = self.engine.attach_sqlite(path, SOURCE_ALIAS)?;
		let copied = self.copy_attached(&sources);
		if let Err(err) = self.engine.detach(SOURCE_ALIAS) {
			warn!(error = %err, "failed to detach source database");
		}
		copied
	}

	fn copy_attached(&mut self, sources: &[String]) -> Result<Vec<QueryResult>> {
		let mut results = Vec::with_capacity(sources.len());
		for source in sources {
			let table = self.registry.reserve(source, None);
			if let Err(err) = self.engine.create_table_as(&table, &sql::select_all_in(SOURCE_ALIAS, source)) {
				self.registry.release(&table);
				return Err(err);
			}
			debug!(source = %source, table = %table, "table copied");
			results.push(self.materialize(&table, None)?);
		}
		Ok(results)
	}
}

#[cfg(test)]
mod tests {
	use sheetdb_engine::sqlite::{SqliteConfig, SqliteEngine};
	use sheetdb_testing::tempdir::temp_dir;
	use sheetdb_type::{DisplayType, Value};

	use super::*;
	use crate::{config::DatastoreConfig, registry::NameRegistry};

	fn source_database(path: &Path, statements: &str) -> Result<()> {
		let mut source = SqliteEngine::open(SqliteConfig::new(path))?;
		source.execute(statements)?;
		Box::new(source).close()
	}

	#[test]
	fn test_tables_are_copied_under_free_names() {
		temp_dir(|dir| {
			let file = dir.join("source.db");
			source_database(
				&file,
				"CREATE TABLE orders (id BIGINT, total DOUBLE); INSERT INTO orders VALUES (1, 9.5), (2, 3.0); \
				 CREATE TABLE \"my notes\" (body TEXT); INSERT INTO \"my notes\" VALUES ('hi')",
			)?;

			let mut engine = SqliteEngine::in_memory()?;
			engine.execute("CREATE TABLE orders (x BIGINT)")?;
			let mut registry = NameRegistry::new();
			registry.register("orders")?;
			let config = DatastoreConfig::default();

			let results = TableLifecycle::new(&mut engine, &mut registry, &config).add_sqlite(&file)?;
			let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
			assert_eq!(names, vec!["orders_1", "mynotes"]);
			assert_eq!(results[0].count, 2);
			assert_eq!(results[0].columns[1].display_type, DisplayType::Double);
			assert_eq!(results[1].rows, vec![vec![Value::Utf8("hi".into())]]);

			let objects: Vec<String> = engine.objects()?.into_iter().map(|o| o.name).collect();
			assert_eq!(objects, registry.names());
			Ok(())
		})
		.expect("test failed");
	}

	#[test]
	fn test_missing_file() {
		temp_dir(|dir| {
			let mut engine = SqliteEngine::in_memory()?;
			let mut registry = NameRegistry::new();
			let config = DatastoreConfig::default();

			let err =
				TableLifecycle::new(&mut engine, &mut registry, &config).add_sqlite(&dir.join("nope.db")).unwrap_err();
			assert_eq!(err.code, "IO_001");
			assert!(registry.names().is_empty());
			Ok(())
		})
		.expect("test failed");
	}
}
