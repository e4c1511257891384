// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Database export directory layout:
//!
//! ```text
//! <dir>/manifest.json       tables, declared column types, view definitions
//! <dir>/table_0000.cols.zst one file per table, column-major values
//! ```
//!
//! Table files hold the postcard encoding of the table's columns, compressed
//! with zstd.

use std::{fs, path::Path};

use rusqlite::{Connection, params_from_iter};
use serde::{Deserialize, Serialize};
use sheetdb_type::{
	Result, Value, error,
	error::diagnostic::{
		archive::{archive_codec, archive_invalid},
		catalog::table_already_exists,
	},
};
use tracing::{debug, instrument};

use super::{declared_columns, objects, sqlite_error, value::to_sqlite};
use crate::{
	ObjectKind,
	sql::{column_definitions, quote_identifier, select_all},
};

const MANIFEST: &str = "manifest.json";
const ARCHIVE_VERSION: u32 = 1;
const ZSTD_LEVEL: i32 = 3;

#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
	version: u32,
	tables: Vec<ManifestTable>,
	views: Vec<ManifestView>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ManifestTable {
	name: String,
	file: String,
	rows: u64,
	columns: Vec<ManifestColumn>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ManifestColumn {
	name: String,
	declared_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ManifestView {
	name: String,
	sql: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ColumnValues {
	name: String,
	values: Vec<Value>,
}

#[instrument(name = "engine::sqlite::export_database", level = "debug", skip_all, fields(dir = %dir.display()))]
pub(super) fn export_database(conn: &Connection, dir: &Path) -> Result<()> {
	fs::create_dir_all(dir)?;

	let mut manifest = Manifest {
		version: ARCHIVE_VERSION,
		tables: Vec::new(),
		views: Vec::new(),
	};

	for object in objects(conn)? {
		match object.kind {
			ObjectKind::View => {
				let sql: String = conn
					.query_row("SELECT sql FROM sqlite_master WHERE type = 'view' AND name = ?1", [&object.name], |row| {
						row.get(0)
					})
					.map_err(|e| sqlite_error("SELECT sql FROM sqlite_master", e))?;
				manifest.views.push(ManifestView {
					name: object.name,
					sql,
				});
			}
			ObjectKind::Table => {
				let file = format!("table_{:04}.cols.zst", manifest.tables.len());
				let table = export_table(conn, &object.name, &dir.join(&file), file)?;
				manifest.tables.push(table);
			}
		}
	}

	let json = serde_json::to_vec_pretty(&manifest).map_err(|e| error!(archive_invalid(dir, e.to_string())))?;
	fs::write(dir.join(MANIFEST), json)?;
	debug!(tables = manifest.tables.len(), views = manifest.views.len(), "database exported");
	Ok(())
}

fn export_table(conn: &Connection, table: &str, path: &Path, file: String) -> Result<ManifestTable> {
	let declared = declared_columns(conn, table)?;
	let mut columns: Vec<ColumnValues> = declared
		.iter()
		.map(|(name, _)| ColumnValues {
			name: name.clone(),
			values: Vec::new(),
		})
		.collect();

	let sql = select_all(table);
	let mut stmt = conn.prepare(&sql).map_err(|e| sqlite_error(&sql, e))?;
	let mut rows = stmt.query([]).map_err(|e| sqlite_error(&sql, e))?;
	let mut count = 0u64;
	while let Some(row) = rows.next().map_err(|e| sqlite_error(&sql, e))? {
		for (idx, column) in columns.iter_mut().enumerate() {
			let value = row.get_ref(idx).map_err(|e| sqlite_error(&sql, e))?;
			column.values.push(super::value::from_sqlite(value));
		}
		count += 1;
	}

	let encoded = postcard::to_allocvec(&columns).map_err(|e| error!(archive_codec(table, e.to_string())))?;
	let compressed = zstd::encode_all(encoded.as_slice(), ZSTD_LEVEL)?;
	fs::write(path, compressed)?;

	Ok(ManifestTable {
		name: table.to_string(),
		file,
		rows: count,
		columns: declared
			.into_iter()
			.map(|(name, declared_type)| ManifestColumn {
				name,
				declared_type,
			})
			.collect(),
	})
}

#[instrument(name = "engine::sqlite::import_database", level = "debug", skip_all, fields(dir = %dir.display()))]
pub(super) fn import_database(conn: &Connection, dir: &Path) -> Result<()> {
	let raw = fs::read(dir.join(MANIFEST)).map_err(|e| error!(archive_invalid(dir, e.to_string())))?;
	let manifest: Manifest = serde_json::from_slice(&raw).map_err(|e| error!(archive_invalid(dir, e.to_string())))?;
	if manifest.version != ARCHIVE_VERSION {
		return Err(error!(archive_invalid(dir, format!("unsupported archive version {}", manifest.version))));
	}

	let existing = objects(conn)?;
	let names = manifest.tables.iter().map(|t| &t.name).chain(manifest.views.iter().map(|v| &v.name));
	for name in names {
		if existing.iter().any(|o| o.name.eq_ignore_ascii_case(name)) {
			return Err(error!(table_already_exists(name)));
		}
	}

	let tx = conn.unchecked_transaction().map_err(|e| sqlite_error("BEGIN", e))?;
	for table in &manifest.tables {
		import_table(&tx, dir, table)?;
	}
	for view in &manifest.views {
		tx.execute_batch(&view.sql).map_err(|e| sqlite_error(&view.sql, e))?;
	}
	tx.commit().map_err(|e| sqlite_error("COMMIT", e))?;

	debug!(tables = manifest.tables.len(), views = manifest.views.len(), "database imported");
	Ok(())
}

fn import_table(conn: &Connection, dir: &Path, table: &ManifestTable) -> Result<()> {
	let compressed = fs::read(dir.join(&table.file)).map_err(|e| error!(archive_invalid(dir, e.to_string())))?;
	let encoded = zstd::decode_all(compressed.as_slice()).map_err(|e| error!(archive_codec(&table.name, e.to_string())))?;
	let columns: Vec<ColumnValues> =
		postcard::from_bytes(&encoded).map_err(|e| error!(archive_codec(&table.name, e.to_string())))?;

	if columns.len() != table.columns.len() || columns.iter().any(|c| c.values.len() as u64 != table.rows) {
		return Err(error!(archive_codec(&table.name, "column data does not match the manifest")));
	}

	let ddl = format!(
		"CREATE TABLE {} ({})",
		quote_identifier(&table.name),
		column_definitions(table.columns.iter().map(|c| (c.name.as_str(), c.declared_type.as_str())))
	);
	conn.execute_batch(&ddl).map_err(|e| sqlite_error(&ddl, e))?;

	let placeholders: Vec<String> = (1..=columns.len()).map(|idx| format!("?{idx}")).collect();
	let insert = format!("INSERT INTO {} VALUES ({})", quote_identifier(&table.name), placeholders.join(", "));
	let mut stmt = conn.prepare(&insert).map_err(|e| sqlite_error(&insert, e))?;
	for row in 0..table.rows as usize {
		let values = columns.iter().map(|c| to_sqlite(&c.values[row]));
		stmt.execute(params_from_iter(values)).map_err(|e| sqlite_error(&insert, e))?;
	}
	Ok(())
}
