// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::path::Path;

use sheetdb_engine::{Engine, EngineKind, ExportDelimiter};
use sheetdb_type::{
	Copied, CopySelection, DisplayType, QueryResult, Result, Row, Sort, error,
	error::diagnostic::catalog::table_not_found,
};
use tracing::{debug, instrument};

use crate::{
	config::DatastoreConfig,
	copy,
	datastore::{AddCsv, Datastore},
	lifecycle::TableLifecycle,
	materialize::Materializer,
	registry::NameRegistry,
};

/// A datastore session running on the caller's thread. It owns one engine
/// connection and the registry of the names that exist in it.
pub struct Session<E: Engine = Box<dyn Engine + Send>> {
	engine: E,
	registry: NameRegistry,
	config: DatastoreConfig,
}

impl Session {
	/// Opens the engine named by `config`.
	pub fn open(config: DatastoreConfig) -> Result<Self> {
		let engine = config.engine.open()?;
		Self::with_engine(engine, config)
	}
}

impl<E: Engine> Session<E> {
	/// Wraps an open engine. Tables and views already in it are registered.
	pub fn with_engine(mut engine: E, config: DatastoreConfig) -> Result<Self> {
		let mut registry = NameRegistry::new();
		for object in engine.objects()? {
			registry.register(&object.name)?;
		}
		debug!(engine = %engine.kind(), tables = registry.names().len(), "session opened");
		Ok(Self {
			engine,
			registry,
			config,
		})
	}

	pub fn kind(&self) -> EngineKind {
		self.engine.kind()
	}

	pub fn config(&self) -> &DatastoreConfig {
		&self.config
	}

	pub fn registry(&self) -> &NameRegistry {
		&self.registry
	}

	fn lifecycle(&mut self) -> TableLifecycle<'_, E> {
		TableLifecycle::new(&mut self.engine, &mut self.registry, &self.config)
	}

	fn resolve(&self, table: &str) -> Result<String> {
		self.registry.resolve(table).map(str::to_string).ok_or_else(|| error!(table_not_found(table)))
	}
}

impl<E: Engine> Datastore for Session<E> {
	#[instrument(name = "store::session::add_csv", level = "debug", skip_all, fields(path = %request.path.display()))]
	fn add_csv(&mut self, request: &AddCsv) -> Result<QueryResult> {
		self.lifecycle().add_csv(request)
	}

	fn add_sqlite(&mut self, path: &Path) -> Result<Vec<QueryResult>> {
		self.lifecycle().add_sqlite(path)
	}

	#[instrument(name = "store::session::export_csv", level = "debug", skip(self, path), fields(path = %path.display()))]
	fn export_csv(&mut self, table: &str, path: &Path, delimiter: ExportDelimiter) -> Result<()> {
		let table = self.resolve(table)?;
		self.engine.export_csv(&table, path, delimiter.as_byte())
	}

	#[instrument(name = "store::session::query", level = "debug", skip(self, sql))]
	fn query(&mut self, sql: &str, table: Option<&str>) -> Result<QueryResult> {
		self.lifecycle().run_query(sql, table)
	}

	fn sort(&mut self, table: &str, sorts: &[Sort]) -> Result<QueryResult> {
		self.lifecycle().sort(table, sorts)
	}

	#[instrument(name = "store::session::copy", level = "debug", skip(self, selection))]
	fn copy(&mut self, table: &str, selection: &CopySelection) -> Result<Copied> {
		let table = self.resolve(table)?;
		copy::copy(&mut self.engine, &table, selection)
	}

	fn load_more(&mut self, table: &str, offset: usize) -> Result<Vec<Row>> {
		let table = self.resolve(table)?;
		Materializer::new(&mut self.engine, &self.config).load_more(&table, offset)
	}

	fn drop_table(&mut self, table: &str) -> Result<()> {
		let table = self.registry.resolve(table).unwrap_or(table).to_string();
		self.lifecycle().drop(&table)
	}

	fn rename_table(&mut self, from: &str, to: &str) -> Result<()> {
		self.lifecycle().rename(from, to)
	}

	fn change_column_type(
		&mut self,
		table: &str,
		column: &str,
		display_type: DisplayType,
		timestamp_format: Option<&str>,
	) -> Result<QueryResult> {
		self.lifecycle().change_column_type(table, column, display_type, timestamp_format)
	}

	fn get_all_tables(&mut self) -> Result<Vec<String>> {
		Ok(self.registry.tables())
	}

	fn reserve_table_name(&mut self, candidate: &str) -> Result<String> {
		Ok(self.registry.reserve(candidate, None))
	}

	fn load_table(&mut self, table: &str) -> Result<QueryResult> {
		self.lifecycle().load_table(table)
	}

	#[instrument(name = "store::session::import", level = "debug", skip(self), fields(dir = %dir.display()))]
	fn import(&mut self, dir: &Path) -> Result<()> {
		self.engine.import_database(dir)?;
		for object in self.engine.objects()? {
			if !self.registry.contains(&object.name) {
				self.registry.register(&object.name)?;
			}
		}
		Ok(())
	}

	#[instrument(name = "store::session::export", level = "debug", skip(self), fields(dir = %dir.display()))]
	fn export(&mut self, dir: &Path) -> Result<()> {
		self.engine.export_database(dir)
	}

	fn close(self) -> Result<()> {
		debug!("closing session");
		E::close(Box::new(self.engine))
	}
}
