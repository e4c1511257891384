// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::path::Path;

use sheetdb_engine::{CsvOptions, CsvSchema, Engine, TypeChange, sql};
use sheetdb_type::{DisplayType, QueryResult, Result};
use tracing::{debug, instrument};

use super::TableLifecycle;
use crate::{datastore::AddCsv, detect::detect, normalize::classify};

/// Date and timestamp layouts tried on text columns the sniffer left alone,
/// in order. The first layout every value of a column parses under wins.
pub const TEXT_DATE_FORMATS: &[&str] = &[
	"%Y-%m-%d %H:%M",
	"%-d-%B-%Y",
	"%-d-%b-%Y",
	"%-d %B %Y",
	"%-d %b %Y",
	"%-d-%b-%y",
	"%-d %b %y",
	"%B %-d, %Y",
	"%b %-d, %Y",
	"%d/%m/%Y",
	"%d/%m/%y",
	"%d.%m.%Y",
];

/// Base name of a table imported from `path`.
fn table_base(path: &Path) -> String {
	path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default()
}

impl<E: Engine + ?Sized> TableLifecycle<'_, E> {
	/// Imports a CSV file into a new table, or in place of `request.replace`.
	#[instrument(name = "store::lifecycle::add_csv", level = "debug", skip_all, fields(path = %request.path.display()))]
	pub fn add_csv(&mut self, request: &AddCsv) -> Result<QueryResult> {
		let options = CsvOptions::new(request.delimiter, request.has_header)?;
		let schema = detect(&mut *self.engine, &request.path, &options, request.auto_detect)?;

		let table = self.registry.reserve(&table_base(&request.path), None);
		if let Err(err) = self.load_file(&table, &request.path, &schema, &options) {
			self.registry.release(&table);
			return Err(err);
		}

		let table = match request.replace.as_deref() {
			Some(target) if !target.eq_ignore_ascii_case(&table) => {
				let target = self.registry.resolve(target).unwrap_or(target).to_string();
				debug!(table = %table, target = %target, "replacing table");
				self.drop(&target)?;
				self.rename(&table, &target)?;
				target
			}
			_ => table,
		};

		if request.auto_detect {
			self.detect_text_dates(&table)?;
		}

		self.materialize(&table, None)
	}

	fn load_file(&mut self, table: &str, path: &Path, schema: &CsvSchema, options: &CsvOptions) -> Result<()> {
		self.engine.execute(&sql::drop_table(table))?;
		self.engine.load_csv(table, path, schema, options)?;

		let columns: Vec<String> = schema.columns.iter().map(|c| c.name.clone()).collect();
		self.engine.execute(&sql::delete_trailing_null_row(table, &columns))
	}

	/// Converts text columns whose every value parses under one of
	/// [`TEXT_DATE_FORMATS`] to timestamps.
	fn detect_text_dates(&mut self, table: &str) -> Result<()> {
		let text_columns: Vec<String> = self
			.engine
			.describe(table)?
			.into_iter()
			.filter(|c| classify(&c.native_type) == Some(DisplayType::Varchar))
			.map(|c| c.name)
			.collect();

		for column in text_columns {
			if self.engine.query(&sql::count_non_null(table, &column))?.scalar_u64() == 0 {
				continue;
			}
			for format in TEXT_DATE_FORMATS {
				match self.engine.alter_column_type(table, &column, &TypeChange::timestamp(*format)) {
					Ok(()) => {
						debug!(column = %column, format, "text column converted to timestamp");
						break;
					}
					Err(err) => debug!(column = %column, format, error = %err.message, "format does not fit"),
				}
			}
		}
		Ok(())
	}
}
