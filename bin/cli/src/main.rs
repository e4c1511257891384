// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

use std::{
	io::{self, Write},
	path::{Path, PathBuf},
	process::ExitCode,
};

use clap::{ArgAction, CommandFactory, Parser, error::ErrorKind};
use sheetdb_engine::ExportDelimiter;
use sheetdb_store::{AddCsv, Datastore, DatastoreConfig, EngineConfig, Session};
use sheetdb_type::{QueryResult, Result, Sort, error, error::diagnostic::catalog::table_not_found};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Load CSV files into SQL tables, query, sort and export them.
#[derive(Parser, Debug)]
#[command(name = "sheetdb", version, about, long_about = None)]
struct Args {
	/// Engine backing the session: sqlite or duckdb
	#[arg(long, default_value = "sqlite")]
	engine: String,

	/// Raise log verbosity, repeat for more
	#[arg(short, long, action = ArgAction::Count)]
	verbose: u8,

	/// CSV files to import, one table each
	#[arg(value_name = "CSV")]
	files: Vec<PathBuf>,

	/// SQLite database files whose tables are imported
	#[arg(long = "sqlite", value_name = "DB")]
	databases: Vec<PathBuf>,

	/// Field delimiter of the CSV files
	#[arg(long, default_value_t = ',')]
	delimiter: char,

	/// Treat the first row as data
	#[arg(long)]
	no_header: bool,

	/// Import every column as text
	#[arg(long)]
	no_detect: bool,

	/// SQL to run after the imports, in order
	#[arg(long = "query", value_name = "SQL")]
	queries: Vec<String>,

	/// Table the query results replace
	#[arg(long, value_name = "TABLE")]
	into: Option<String>,

	/// Sort the last table, as column:asc|desc|none
	#[arg(long = "sort", value_name = "COLUMN:DIRECTION")]
	sorts: Vec<Sort>,

	/// Write the last table to a CSV file
	#[arg(long, value_name = "PATH")]
	export: Option<PathBuf>,

	/// Delimiter of the exported CSV file
	#[arg(long, default_value = "comma")]
	export_delimiter: ExportDelimiter,

	/// Write the whole session to a directory
	#[arg(long, value_name = "DIR")]
	export_database: Option<PathBuf>,

	/// Load a directory written by --export-database before anything else
	#[arg(long, value_name = "DIR")]
	import_database: Option<PathBuf>,
}

impl Args {
	fn validate(&self) -> std::result::Result<(), clap::Error> {
		let has_source = !self.files.is_empty()
			|| !self.databases.is_empty()
			|| !self.queries.is_empty()
			|| self.import_database.is_some();
		if (!self.sorts.is_empty() || self.export.is_some()) && !has_source {
			return Err(Args::command().error(
				ErrorKind::MissingRequiredArgument,
				"--sort and --export need a table: pass a CSV file, --sqlite, --query or --import-database",
			));
		}
		Ok(())
	}

	fn request(&self, path: &Path) -> AddCsv {
		AddCsv::new(path).delimiter(self.delimiter).has_header(!self.no_header).auto_detect(!self.no_detect)
	}
}

fn init_logging(verbose: u8) {
	let level = match verbose {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn print(out: &mut impl Write, result: &QueryResult) -> Result<()> {
	if let Some(sql) = &result.sql {
		writeln!(out, "-- {sql}")?;
	}
	writeln!(out, "{result}")?;
	Ok(())
}

fn run(args: &Args, out: &mut impl Write) -> Result<()> {
	let config = DatastoreConfig::new().engine(EngineConfig::from_name(&args.engine)?);
	let mut session = Session::open(config)?;
	info!(engine = %session.kind(), "session opened");

	if let Some(dir) = &args.import_database {
		session.import(dir)?;
		debug!(tables = ?session.get_all_tables()?, "database imported");
	}

	let mut current = None;
	for path in &args.databases {
		for result in session.add_sqlite(path)? {
			print(out, &result)?;
			current = Some(result.name);
		}
	}

	for path in &args.files {
		let result = session.add_csv(&args.request(path))?;
		print(out, &result)?;
		current = Some(result.name);
	}

	for sql in &args.queries {
		let result = session.query(sql, args.into.as_deref())?;
		print(out, &result)?;
		current = Some(result.name);
	}

	if !args.sorts.is_empty() || args.export.is_some() {
		let table = match current {
			Some(table) => table,
			None => session.get_all_tables()?.pop().ok_or_else(|| error!(table_not_found("")))?,
		};

		if !args.sorts.is_empty() {
			let result = session.sort(&table, &args.sorts)?;
			print(out, &result)?;
		}

		if let Some(path) = &args.export {
			session.export_csv(&table, path, args.export_delimiter)?;
			info!(table = %table, path = %path.display(), "table exported");
		}
	}

	if let Some(dir) = &args.export_database {
		session.export(dir)?;
		info!(dir = %dir.display(), "database exported");
	}

	session.close()
}

fn main() -> ExitCode {
	let args = Args::parse();
	if let Err(err) = args.validate() {
		err.exit();
	}
	init_logging(args.verbose);

	let stdout = io::stdout();
	match run(&args, &mut stdout.lock()) {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			eprintln!("{err}");
			ExitCode::FAILURE
		}
	}
}
