// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::path::Path;

use sheetdb_engine::{
	CsvColumn, CsvOptions, CsvSchema, Engine,
	delimited::{field, reader},
	sql::unique_column_names,
};
use sheetdb_type::{
	NativeType, Result, error,
	error::diagnostic::csv::{malformed_record, no_columns},
};
use tracing::{debug, instrument};

use crate::registry::sanitize;

const GENERIC_TYPE: &str = "VARCHAR";

/// Trimmed fields of the first record.
fn first_row(path: &Path, options: &CsvOptions) -> Result<Vec<String>> {
	let mut reader = reader(path, options.delimiter)?;
	let mut record = csv::ByteRecord::new();
	let found = reader.read_byte_record(&mut record).map_err(|e| {
		let line = e.position().map(|p| p.line()).unwrap_or(0);
		error!(malformed_record(path, line, e.to_string()))
	})?;
	if !found || record.is_empty() {
		return Err(error!(no_columns(path)));
	}
	Ok((0..record.len()).filter_map(|idx| field(&record, idx)).map(|f| f.trim().to_string()).collect())
}

/// Column names from the first row, or `column_1`, `column_2`, ... without a
/// header. Names are sanitized and made unique.
pub fn column_names(first_row: &[String], has_header: bool) -> Vec<String> {
	let candidates = first_row.iter().enumerate().map(|(idx, candidate)| {
		if has_header {
			sanitize(candidate)
		} else {
			format!("column_{}", idx + 1)
		}
	});
	unique_column_names(candidates)
}

/// Works out the column names and types a CSV file is loaded with. Type
/// guesses come from the engine's sniffer over the whole file; without
/// `auto_detect` every column is text.
#[instrument(name = "store::detect", level = "debug", skip_all, fields(path = %path.display(), auto_detect))]
pub fn detect<E: Engine + ?Sized>(
	engine: &mut E,
	path: &Path,
	options: &CsvOptions,
	auto_detect: bool,
) -> Result<CsvSchema> {
	let names = column_names(&first_row(path, options)?, options.has_header);

	let (types, date_format, timestamp_format) = if auto_detect {
		let sniffed = engine.sniff_csv(path, options)?;
		if sniffed.types.len() != names.len() {
			debug!(sniffed = sniffed.types.len(), header = names.len(), "sniffed column count differs from header");
		}
		(sniffed.types, sniffed.date_format, sniffed.timestamp_format)
	} else {
		(Vec::new(), None, None)
	};

	let columns = names
		.into_iter()
		.enumerate()
		.map(|(idx, name)| CsvColumn {
			name,
			native_type: types.get(idx).cloned().unwrap_or_else(|| NativeType::new(GENERIC_TYPE)),
		})
		.collect();

	Ok(CsvSchema {
		columns,
		date_format,
		timestamp_format,
	})
}
