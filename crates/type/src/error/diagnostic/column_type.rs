// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use super::{Diagnostic, DiagnosticColumn};

pub fn unsupported_native_type(table: &str, column: &str, native_type: &str) -> Diagnostic {
	Diagnostic {
		code: "TYPE_001".to_string(),
		statement: None,
		message: format!("column `{column}` of table `{table}` has unsupported type {native_type}"),
		table: Some(table.to_string()),
		column: Some(DiagnosticColumn {
			name: column.to_string(),
			native_type: Some(native_type.to_string()),
		}),
		label: Some("the column cannot be displayed".to_string()),
		help: Some("cast the column to bigint, double, boolean, varchar or timestamp in the query".to_string()),
		notes: vec![],
		cause: None,
	}
}

pub fn type_fix_not_converging(table: &str, attempts: usize) -> Diagnostic {
	let mut result = Diagnostic::new(
		"TYPE_002",
		format!("column types of table `{table}` did not settle after {attempts} correction passes"),
	);
	result.table = Some(table.to_string());
	result.label = Some("type correction did not converge".to_string());
	result.notes = vec!["every correction pass must convert at least one column to a supported type".to_string()];
	result
}

pub fn timestamp_format_required(table: &str, column: &str) -> Diagnostic {
	Diagnostic {
		code: "TYPE_003".to_string(),
		statement: None,
		message: format!("converting column `{column}` to timestamp requires a format"),
		table: Some(table.to_string()),
		column: Some(DiagnosticColumn {
			name: column.to_string(),
			native_type: None,
		}),
		label: Some("missing timestamp format".to_string()),
		help: Some("pass a strptime format such as '%Y-%m-%d %H:%M:%S'".to_string()),
		notes: vec![],
		cause: None,
	}
}

pub fn unsupported_conversion(table: &str, column: &str, target: &str) -> Diagnostic {
	let mut result =
		Diagnostic::new("TYPE_004", format!("column `{column}` of table `{table}` cannot be converted to {target}"));
	result.table = Some(table.to_string());
	result.column = Some(DiagnosticColumn {
		name: column.to_string(),
		native_type: None,
	});
	result
}

pub fn value_conversion_failed(value: &str, target: &str) -> Diagnostic {
	let mut result = Diagnostic::new("TYPE_005", format!("could not convert '{value}' to {target}"));
	result.label = Some(format!("'{value}' is not a valid {target}"));
	result
}
