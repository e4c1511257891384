// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::path::Path;

use super::{Diagnostic, DiagnosticColumn};

pub fn file_unreadable(path: &Path, reason: impl Into<String>) -> Diagnostic {
	let mut result = Diagnostic::new("CSV_001", format!("cannot read CSV file `{}`", path.display()));
	result.label = Some(reason.into());
	result.help = Some("check that the file exists and is readable".to_string());
	result
}

pub fn no_columns(path: &Path) -> Diagnostic {
	let mut result = Diagnostic::new("CSV_002", format!("CSV file `{}` has no columns", path.display()));
	result.label = Some("the first row is empty".to_string());
	result.help = Some("a CSV file needs at least one field in its first row".to_string());
	result
}

pub fn invalid_delimiter(delimiter: char) -> Diagnostic {
	let mut result = Diagnostic::new("CSV_003", format!("invalid delimiter {delimiter:?}"));
	result.label = Some("the delimiter must be a single ASCII character".to_string());
	result.help = Some("use one of: comma, tab, pipe, semicolon, colon, tilde".to_string());
	result.notes = vec!["quote characters and line breaks cannot be used as delimiters".to_string()];
	result
}

pub fn malformed_record(path: &Path, line: u64, reason: impl Into<String>) -> Diagnostic {
	let mut result = Diagnostic::new("CSV_004", format!("malformed CSV record in `{}` at line {line}", path.display()));
	result.label = Some(reason.into());
	result
}

pub fn value_mismatch(path: &Path, line: u64, column: &str, native_type: &str, value: &str) -> Diagnostic {
	Diagnostic {
		code: "CSV_004".to_string(),
		statement: None,
		message: format!(
			"could not convert '{value}' to {native_type} in `{}` at line {line}, column `{column}`",
			path.display()
		),
		table: None,
		column: Some(DiagnosticColumn {
			name: column.to_string(),
			native_type: Some(native_type.to_string()),
		}),
		label: Some(format!("'{value}' is not a valid {native_type}")),
		help: Some("re-import with type detection disabled to load the column as text".to_string()),
		notes: vec![],
		cause: None,
	}
}
