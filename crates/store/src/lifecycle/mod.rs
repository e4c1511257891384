// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Creates, replaces, renames and drops tables.
//!
//! Every statement that changes the catalog is issued from here, paired with
//! the matching [`NameRegistry`] mutation, so the registry and the engine
//! catalog agree after every operation that returns.

mod alter;
mod attach;
mod csv;
mod query;
mod sort;

pub use query::references_source;
use sheetdb_engine::{Engine, ObjectKind, sql};
use sheetdb_type::{
	QueryResult, Result, error,
	error::diagnostic::catalog::{table_already_exists, table_not_found},
};
use tracing::{debug, instrument};

use crate::{config::DatastoreConfig, materialize::Materializer, registry::NameRegistry};

pub struct TableLifecycle<'a, E: Engine + ?Sized> {
	engine: &'a mut E,
	registry: &'a mut NameRegistry,
	config: &'a DatastoreConfig,
}

impl<'a, E: Engine + ?Sized> TableLifecycle<'a, E> {
	pub fn new(engine: &'a mut E, registry: &'a mut NameRegistry, config: &'a DatastoreConfig) -> Self {
		Self {
			engine,
			registry,
			config,
		}
	}

	/// The registered spelling of `table`.
	pub(crate) fn resolve(&self, table: &str) -> Result<String> {
		self.registry.resolve(table).map(str::to_string).ok_or_else(|| error!(table_not_found(table)))
	}

	pub fn materialize(&mut self, table: &str, sql: Option<&str>) -> Result<QueryResult> {
		Materializer::new(&mut *self.engine, self.config).materialize(table, sql)
	}

	pub fn load_table(&mut self, table: &str) -> Result<QueryResult> {
		let table = self.resolve(table)?;
		self.materialize(&table, None)
	}

	/// Drops a table or view together with its sort shadow. Names that do not
	/// exist are ignored.
	#[instrument(name = "store::lifecycle::drop", level = "debug", skip(self))]
	pub fn drop(&mut self, table: &str) -> Result<()> {
		if let Some(shadow) = self.registry.shadow_of(table).map(str::to_string) {
			self.drop_object(&shadow)?;
			self.registry.release(&shadow);
		}
		self.drop_object(table)?;
		self.registry.release(table);
		Ok(())
	}

	/// Renames a table or view. A sort shadow stays paired with the new name.
	#[instrument(name = "store::lifecycle::rename", level = "debug", skip(self))]
	pub fn rename(&mut self, from: &str, to: &str) -> Result<()> {
		let from = self.resolve(from)?;
		if from == to {
			return Ok(());
		}
		if self.registry.contains(to) && !from.eq_ignore_ascii_case(to) {
			return Err(error!(table_already_exists(to)));
		}

		self.rename_object(&from, to)?;
		self.registry.rename(&from, to)
	}

	/// Drops one engine object, leaving the registry alone.
	pub(crate) fn drop_object(&mut self, name: &str) -> Result<()> {
		let statement = match self.engine.object_kind(name)? {
			Some(ObjectKind::Table) => sql::drop_table(name),
			Some(ObjectKind::View) => sql::drop_view(name),
			None => {
				debug!(name, "nothing to drop");
				return Ok(());
			}
		};
		self.engine.execute(&statement)
	}

	/// Renames one engine object, leaving the registry alone.
	pub(crate) fn rename_object(&mut self, from: &str, to: &str) -> Result<()> {
		let kind = self.engine.object_kind(from)?.ok_or_else(|| error!(table_not_found(from)))?;
		let rename = |engine: &mut E, from: &str, to: &str| match kind {
			ObjectKind::Table => engine.execute(&sql::rename_table(from, to)),
			ObjectKind::View => engine.rename_view(from, to),
		};

		if from.eq_ignore_ascii_case(to) {
			// the engines treat a case-only rename as a collision
			let interim = format!("{to}__renaming");
			rename(&mut *self.engine, from, &interim)?;
			return rename(&mut *self.engine, &interim, to);
		}
		rename(&mut *self.engine, from, to)
	}
}
