// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;

/// Creates an internal error diagnostic carrying the source location it was
/// raised at.
pub fn internal_with_context(
	reason: impl Into<String>,
	file: &str,
	line: u32,
	column: u32,
	module_path: &str,
) -> Diagnostic {
	let reason = reason.into();

	Diagnostic {
		code: "INTERNAL_ERROR".to_string(),
		statement: None,
		message: format!("internal error: {reason}"),
		table: None,
		column: None,
		label: Some(format!("invariant violated at {file}:{line}:{column}")),
		help: Some("this is a bug; the session should be closed and reopened".to_string()),
		notes: vec![
			format!("module: {module_path}"),
			format!("version: {}", env!("CARGO_PKG_VERSION")),
		],
		cause: None,
	}
}

/// Internal error without location context.
pub fn internal(reason: impl Into<String>) -> Diagnostic {
	internal_with_context(reason, "unknown", 0, 0, "unknown")
}
