// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use rusqlite::Connection;
use sheetdb_type::{Result, error, error::diagnostic::internal::internal};

use super::{DbPath, OpenFlags, SqliteConfig};

fn connection_failed(path: String, error: String) -> String {
	format!("failed to open database at {}: {}", path, error)
}

pub(super) fn connect(path: &DbPath, flags: rusqlite::OpenFlags) -> Result<Connection> {
	match path {
		DbPath::Memory => Connection::open_in_memory_with_flags(flags)
			.map_err(|e| error!(internal(connection_failed(":memory:".to_string(), e.to_string())))),
		DbPath::File(path) => Connection::open_with_flags(path, flags)
			.map_err(|e| error!(internal(connection_failed(path.display().to_string(), e.to_string())))),
	}
}

/// Resolves the database path, creating directories as needed.
pub(super) fn resolve_db_path(db_path: DbPath) -> DbPath {
	match db_path {
		DbPath::Memory => DbPath::Memory,
		DbPath::File(config_path) => {
			if config_path.extension().is_none() {
				std::fs::create_dir_all(&config_path).ok();
				DbPath::File(config_path.join("session.db"))
			} else {
				if let Some(parent) = config_path.parent() {
					std::fs::create_dir_all(parent).ok();
				}
				DbPath::File(config_path)
			}
		}
	}
}

pub(super) fn convert_flags(flags: &OpenFlags) -> rusqlite::OpenFlags {
	let mut rusqlite_flags = rusqlite::OpenFlags::empty();

	if flags.read_write {
		rusqlite_flags |= rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE;
	}
	if flags.create {
		rusqlite_flags |= rusqlite::OpenFlags::SQLITE_OPEN_CREATE;
	}
	if flags.full_mutex {
		rusqlite_flags |= rusqlite::OpenFlags::SQLITE_OPEN_FULL_MUTEX;
	}
	if flags.no_mutex {
		rusqlite_flags |= rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX;
	}
	if flags.shared_cache {
		rusqlite_flags |= rusqlite::OpenFlags::SQLITE_OPEN_SHARED_CACHE;
	}
	if flags.private_cache {
		rusqlite_flags |= rusqlite::OpenFlags::SQLITE_OPEN_PRIVATE_CACHE;
	}
	if flags.uri {
		rusqlite_flags |= rusqlite::OpenFlags::SQLITE_OPEN_URI;
	}

	rusqlite_flags
}

pub(super) fn apply_pragmas(conn: &Connection, config: &SqliteConfig) -> Result<()> {
	let pragmas = [
		("journal_mode", config.journal_mode.as_str()),
		("synchronous", config.synchronous_mode.as_str()),
		("temp_store", config.temp_store.as_str()),
	];
	for (name, value) in pragmas {
		conn.pragma_update(None, name, value)
			.map_err(|e| error!(internal(format!("failed to set pragma {name}={value}: {e}"))))?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use sheetdb_testing::tempdir::temp_dir;

	use super::*;
	use crate::sqlite::{JournalMode, SynchronousMode, TempStore};

	#[test]
	fn test_directory_path_gets_database_file() {
		temp_dir(|dir| {
			let resolved = resolve_db_path(DbPath::File(dir.join("session")));
			assert_eq!(resolved, DbPath::File(dir.join("session").join("session.db")));
			assert!(dir.join("session").is_dir());
			Ok(())
		})
		.expect("test failed");
	}

	#[test]
	fn test_file_path_creates_parent() {
		temp_dir(|dir| {
			let resolved = resolve_db_path(DbPath::File(dir.join("nested").join("data.db")));
			assert_eq!(resolved, DbPath::File(dir.join("nested").join("data.db")));
			assert!(dir.join("nested").is_dir());
			Ok(())
		})
		.expect("test failed");
	}

	#[test]
	fn test_default_journal_supports_rollback() {
		let config = SqliteConfig::in_memory();
		assert_eq!(config.journal_mode, JournalMode::Memory);

		let conn = connect(&resolve_db_path(config.path.clone()), convert_flags(&config.flags)).unwrap();
		apply_pragmas(&conn, &config).unwrap();
		let journal_mode: String = conn.pragma_query_value(None, "journal_mode", |row| row.get(0)).unwrap();
		assert_eq!(journal_mode.to_uppercase(), "MEMORY");

		conn.execute_batch("CREATE TABLE t (a BIGINT)").unwrap();
		{
			let tx = conn.unchecked_transaction().unwrap();
			tx.execute_batch("INSERT INTO t VALUES (1)").unwrap();
		}
		let count: i64 = conn.query_row("SELECT count(*) FROM t", [], |row| row.get(0)).unwrap();
		assert_eq!(count, 0);
	}

	#[test]
	fn test_pragma_settings_applied() {
		temp_dir(|dir| {
			let config = SqliteConfig::new(dir.join("pragma.db"))
				.journal_mode(JournalMode::Delete)
				.synchronous_mode(SynchronousMode::Extra)
				.temp_store(TempStore::File);

			let conn = connect(&resolve_db_path(config.path.clone()), convert_flags(&config.flags))?;
			apply_pragmas(&conn, &config)?;

			let journal_mode: String = conn.pragma_query_value(None, "journal_mode", |row| row.get(0)).unwrap();
			assert_eq!(journal_mode.to_uppercase(), "DELETE");

			let synchronous: i32 = conn.pragma_query_value(None, "synchronous", |row| row.get(0)).unwrap();
			assert_eq!(synchronous, 3);

			let temp_store: i32 = conn.pragma_query_value(None, "temp_store", |row| row.get(0)).unwrap();
			assert_eq!(temp_store, 1);
			Ok(())
		})
		.expect("test failed");
	}
}
