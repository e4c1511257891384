// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use super::{Diagnostic, DiagnosticColumn};

pub fn table_not_found(table: &str) -> Diagnostic {
	Diagnostic {
		code: "CATALOG_001".to_string(),
		statement: None,
		message: format!("table `{table}` not found"),
		table: Some(table.to_string()),
		column: None,
		label: Some("unknown table".to_string()),
		help: Some("import the table first or check the name for typos".to_string()),
		notes: vec![],
		cause: None,
	}
}

pub fn table_already_exists(table: &str) -> Diagnostic {
	Diagnostic {
		code: "CATALOG_002".to_string(),
		statement: None,
		message: format!("table `{table}` already exists"),
		table: Some(table.to_string()),
		column: None,
		label: Some("name is already taken".to_string()),
		help: Some("choose a different name or drop the existing table first".to_string()),
		notes: vec!["table names are compared case-insensitively".to_string()],
		cause: None,
	}
}

pub fn column_not_found(table: &str, column: &str) -> Diagnostic {
	Diagnostic {
		code: "CATALOG_003".to_string(),
		statement: None,
		message: format!("column `{column}` not found in table `{table}`"),
		table: Some(table.to_string()),
		column: Some(DiagnosticColumn {
			name: column.to_string(),
			native_type: None,
		}),
		label: Some("unknown column".to_string()),
		help: None,
		notes: vec![],
		cause: None,
	}
}
