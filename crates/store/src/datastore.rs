// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::path::{Path, PathBuf};

use sheetdb_engine::ExportDelimiter;
use sheetdb_type::{Copied, CopySelection, DisplayType, QueryResult, Result, Row, Sort};

/// A CSV import request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddCsv {
	pub path: PathBuf,
	pub has_header: bool,
	pub delimiter: char,
	/// Table the import replaces, if any.
	pub replace: Option<String>,
	pub auto_detect: bool,
}

impl AddCsv {
	pub fn new(path: impl AsRef<Path>) -> Self {
		Self {
			path: path.as_ref().to_path_buf(),
			has_header: true,
			delimiter: ',',
			replace: None,
			auto_detect: true,
		}
	}

	pub fn has_header(mut self, has_header: bool) -> Self {
		self.has_header = has_header;
		self
	}

	pub fn delimiter(mut self, delimiter: char) -> Self {
		self.delimiter = delimiter;
		self
	}

	/// An empty name means no replacement.
	pub fn replace(mut self, table: impl Into<String>) -> Self {
		let table = table.into();
		self.replace = if table.is_empty() {
			None
		} else {
			Some(table)
		};
		self
	}

	pub fn auto_detect(mut self, auto_detect: bool) -> Self {
		self.auto_detect = auto_detect;
		self
	}
}

/// The operations a caller performs on a session, independent of the engine
/// behind it.
pub trait Datastore {
	/// Imports a CSV file into a new table, or into the replaced one.
	fn add_csv(&mut self, request: &AddCsv) -> Result<QueryResult>;

	/// Copies every table of a SQLite database file into a new table each.
	fn add_sqlite(&mut self, path: &Path) -> Result<Vec<QueryResult>>;

	fn export_csv(&mut self, table: &str, path: &Path, delimiter: ExportDelimiter) -> Result<()>;

	/// Runs `sql` into a new table. With a `table` the result replaces that
	/// table unless the query reads from it.
	fn query(&mut self, sql: &str, table: Option<&str>) -> Result<QueryResult>;

	fn sort(&mut self, table: &str, sorts: &[Sort]) -> Result<QueryResult>;

	fn copy(&mut self, table: &str, selection: &CopySelection) -> Result<Copied>;

	fn load_more(&mut self, table: &str, offset: usize) -> Result<Vec<Row>>;

	/// Drops a table or view. Unknown names are ignored.
	fn drop_table(&mut self, table: &str) -> Result<()>;

	fn rename_table(&mut self, from: &str, to: &str) -> Result<()>;

	fn change_column_type(
		&mut self,
		table: &str,
		column: &str,
		display_type: DisplayType,
		timestamp_format: Option<&str>,
	) -> Result<QueryResult>;

	fn get_all_tables(&mut self) -> Result<Vec<String>>;

	fn reserve_table_name(&mut self, candidate: &str) -> Result<String>;

	fn load_table(&mut self, table: &str) -> Result<QueryResult>;

	/// Loads a whole database previously written by [`Datastore::export`].
	fn import(&mut self, dir: &Path) -> Result<()>;

	fn export(&mut self, dir: &Path) -> Result<()>;

	fn close(self) -> Result<()>
	where
		Self: Sized;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_add_csv_defaults() {
		let request = AddCsv::new("/tmp/a.csv");
		assert!(request.has_header);
		assert!(request.auto_detect);
		assert_eq!(request.delimiter, ',');
		assert_eq!(request.replace, None);
	}

	#[test]
	fn test_empty_replace_is_none() {
		assert_eq!(AddCsv::new("a.csv").replace("").replace, None);
		assert_eq!(AddCsv::new("a.csv").replace("t").replace.as_deref(), Some("t"));
	}
}
