// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::path::Path;

use super::Diagnostic;

pub fn archive_invalid(dir: &Path, reason: impl Into<String>) -> Diagnostic {
	let mut result = Diagnostic::new("ARCHIVE_001", format!("`{}` is not a database export", dir.display()));
	result.label = Some(reason.into());
	result.help = Some("point the import at a directory written by a database export".to_string());
	result
}

pub fn archive_codec(table: &str, reason: impl Into<String>) -> Diagnostic {
	let mut result = Diagnostic::new("ARCHIVE_002", format!("could not encode or decode table `{table}`"));
	result.table = Some(table.to_string());
	result.label = Some(reason.into());
	result
}
