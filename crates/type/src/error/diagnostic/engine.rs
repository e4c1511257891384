// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;

/// The engine rejected a statement. The engine's own message is kept verbatim
/// since it usually names the offending line, column or value.
pub fn statement_failed(sql: &str, engine_message: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "ENGINE_001".to_string(),
		statement: Some(sql.to_string()),
		message: engine_message.into(),
		table: None,
		column: None,
		label: Some("statement failed".to_string()),
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn engine_unavailable(engine: &str) -> Diagnostic {
	let mut result = Diagnostic::new("ENGINE_002", format!("engine `{engine}` is not available in this build"));
	result.help = Some(format!("rebuild with the `{engine}` feature enabled"));
	result
}
