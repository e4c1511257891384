// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#[cfg(feature = "duckdb")]
use sheetdb_engine::duckdb::{DuckDbConfig, DuckDbEngine};
use sheetdb_engine::{
	Engine,
	sqlite::{SqliteConfig, SqliteEngine},
};
use sheetdb_type::{Result, error, error::diagnostic::engine::engine_unavailable};

/// Rows returned by the initial page of a result.
pub const PAGE_SIZE: usize = 1000;

/// Rows returned per `load_more` call.
pub const LOAD_MORE_SIZE: usize = 10000;

/// Rows sampled to estimate column widths.
pub const SAMPLE_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineConfig {
	Sqlite(SqliteConfig),
	#[cfg(feature = "duckdb")]
	DuckDb(DuckDbConfig),
}

impl EngineConfig {
	/// Default configuration of the engine called `name`.
	pub fn from_name(name: &str) -> Result<Self> {
		match name.trim().to_ascii_lowercase().as_str() {
			"sqlite" => Ok(EngineConfig::Sqlite(SqliteConfig::in_memory())),
			#[cfg(feature = "duckdb")]
			"duckdb" => Ok(EngineConfig::DuckDb(DuckDbConfig::in_memory())),
			other => Err(error!(engine_unavailable(other))),
		}
	}

	pub fn open(&self) -> Result<Box<dyn Engine + Send>> {
		match self {
			EngineConfig::Sqlite(config) => Ok(Box::new(SqliteEngine::open(config.clone())?)),
			#[cfg(feature = "duckdb")]
			EngineConfig::DuckDb(config) => Ok(Box::new(DuckDbEngine::open(config.clone())?)),
		}
	}
}

impl Default for EngineConfig {
	fn default() -> Self {
		EngineConfig::Sqlite(SqliteConfig::in_memory())
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatastoreConfig {
	pub engine: EngineConfig,
	pub page_size: usize,
	pub load_more_size: usize,
	pub sample_size: usize,
}

impl DatastoreConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn engine(mut self, engine: EngineConfig) -> Self {
		self.engine = engine;
		self
	}

	pub fn page_size(mut self, rows: usize) -> Self {
		self.page_size = rows;
		self
	}

	pub fn load_more_size(mut self, rows: usize) -> Self {
		self.load_more_size = rows;
		self
	}

	pub fn sample_size(mut self, rows: usize) -> Self {
		self.sample_size = rows;
		self
	}
}

impl Default for DatastoreConfig {
	fn default() -> Self {
		Self {
			engine: EngineConfig::default(),
			page_size: PAGE_SIZE,
			load_more_size: LOAD_MORE_SIZE,
			sample_size: SAMPLE_SIZE,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = DatastoreConfig::default();
		assert_eq!(config.page_size, 1000);
		assert_eq!(config.load_more_size, 10000);
		assert_eq!(config.sample_size, 100);
		assert!(matches!(config.engine, EngineConfig::Sqlite(_)));
	}

	#[test]
	fn test_engine_from_name() {
		assert!(matches!(EngineConfig::from_name("SQLite").unwrap(), EngineConfig::Sqlite(_)));
		assert_eq!(EngineConfig::from_name("oracle").unwrap_err().code, "ENGINE_002");
	}

	#[cfg(not(feature = "duckdb"))]
	#[test]
	fn test_duckdb_requires_feature() {
		assert_eq!(EngineConfig::from_name("duckdb").unwrap_err().code, "ENGINE_002");
	}
}
