// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	fs::File,
	io::{BufRead, BufReader},
	path::Path,
	str::FromStr,
};

use serde::{Deserialize, Serialize};
use sheetdb_type::{NativeType, Result, error, error::diagnostic::csv::{file_unreadable, invalid_delimiter}};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
	pub delimiter: u8,
	pub has_header: bool,
}

impl CsvOptions {
	pub fn new(delimiter: char, has_header: bool) -> Result<Self> {
		Ok(Self {
			delimiter: validate_delimiter(delimiter)?,
			has_header,
		})
	}
}

impl Default for CsvOptions {
	fn default() -> Self {
		Self {
			delimiter: b',',
			has_header: true,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvColumn {
	pub name: String,
	pub native_type: NativeType,
}

/// Column names and types a CSV file is loaded with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvSchema {
	pub columns: Vec<CsvColumn>,
	pub date_format: Option<String>,
	pub timestamp_format: Option<String>,
}

/// An engine's guess at a file's column types, positionally aligned with the
/// file's first row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SniffedCsv {
	pub types: Vec<NativeType>,
	pub date_format: Option<String>,
	pub timestamp_format: Option<String>,
}

/// Delimiters offered for export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportDelimiter {
	Comma,
	Tab,
	Pipe,
	Semicolon,
	Colon,
	Tilde,
}

impl ExportDelimiter {
	pub fn as_byte(&self) -> u8 {
		match self {
			ExportDelimiter::Comma => b',',
			ExportDelimiter::Tab => b'\t',
			ExportDelimiter::Pipe => b'|',
			ExportDelimiter::Semicolon => b';',
			ExportDelimiter::Colon => b':',
			ExportDelimiter::Tilde => b'~',
		}
	}
}

impl Display for ExportDelimiter {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			ExportDelimiter::Comma => "comma",
			ExportDelimiter::Tab => "tab",
			ExportDelimiter::Pipe => "pipe",
			ExportDelimiter::Semicolon => "semicolon",
			ExportDelimiter::Colon => "colon",
			ExportDelimiter::Tilde => "tilde",
		})
	}
}

impl FromStr for ExportDelimiter {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		if s == "\t" {
			return Ok(ExportDelimiter::Tab);
		}
		match s.trim().to_ascii_lowercase().as_str() {
			"comma" | "," => Ok(ExportDelimiter::Comma),
			"tab" => Ok(ExportDelimiter::Tab),
			"pipe" | "|" => Ok(ExportDelimiter::Pipe),
			"semicolon" | ";" => Ok(ExportDelimiter::Semicolon),
			"colon" | ":" => Ok(ExportDelimiter::Colon),
			"tilde" | "~" => Ok(ExportDelimiter::Tilde),
			other => Err(format!("unknown delimiter '{other}'")),
		}
	}
}

pub fn validate_delimiter(delimiter: char) -> Result<u8> {
	if !delimiter.is_ascii() || matches!(delimiter, '"' | '\n' | '\r') {
		return Err(error!(invalid_delimiter(delimiter)));
	}
	Ok(delimiter as u8)
}

/// Opens `path` positioned after a UTF-8 byte order mark, if there is one.
pub fn open_without_bom(path: &Path) -> Result<BufReader<File>> {
	let file = File::open(path).map_err(|e| error!(file_unreadable(path, e.to_string())))?;
	let mut reader = BufReader::new(file);
	let starts_with_bom = reader.fill_buf()?.starts_with(UTF8_BOM);
	if starts_with_bom {
		reader.consume(UTF8_BOM.len());
	}
	Ok(reader)
}

/// A record reader that tolerates ragged rows. Header handling is left to the
/// caller, the first row is returned as a record.
pub fn reader(path: &Path, delimiter: u8) -> Result<csv::Reader<BufReader<File>>> {
	Ok(csv::ReaderBuilder::new()
		.has_headers(false)
		.flexible(true)
		.delimiter(delimiter)
		.from_reader(open_without_bom(path)?))
}

pub fn field(record: &csv::ByteRecord, idx: usize) -> Option<String> {
	record.get(idx).map(|bytes| String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(test)]
mod tests {
	use sheetdb_testing::{fixture::write_csv, tempdir::temp_dir};

	use super::*;

	#[test]
	fn test_validate_delimiter() {
		assert_eq!(validate_delimiter(';').unwrap(), b';');
		assert_eq!(validate_delimiter('"').unwrap_err().diagnostic().code, "CSV_003");
		assert_eq!(validate_delimiter('§').unwrap_err().diagnostic().code, "CSV_003");
	}

	#[test]
	fn test_export_delimiter_names() {
		assert_eq!("Tab".parse::<ExportDelimiter>(), Ok(ExportDelimiter::Tab));
		assert_eq!(ExportDelimiter::Tilde.as_byte(), b'~');
		assert!("space".parse::<ExportDelimiter>().is_err());
	}

	#[test]
	fn test_bom_is_skipped() {
		temp_dir(|dir| {
			let path = write_csv(dir, "bom.csv", "\u{feff}id,name\n1,a\n")?;
			let mut reader = reader(&path, b',')?;
			let mut record = csv::ByteRecord::new();
			assert!(reader.read_byte_record(&mut record).unwrap());
			assert_eq!(field(&record, 0).as_deref(), Some("id"));
			Ok(())
		})
		.expect("test failed");
	}

	#[test]
	fn test_missing_file() {
		let err = open_without_bom(Path::new("/definitely/not/here.csv")).unwrap_err();
		assert_eq!(err.diagnostic().code, "CSV_001");
	}
}
