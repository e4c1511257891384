// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};

pub mod archive;
pub mod catalog;
pub mod column_type;
pub mod csv;
pub mod engine;
pub mod internal;
pub mod io;
pub mod render;

/// A coded, renderable error description.
///
/// `statement` carries the SQL that was executing; `table` and `column` name
/// the object the failure is about so callers can render an actionable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
	pub code: String,
	pub statement: Option<String>,
	pub message: String,
	pub table: Option<String>,
	pub column: Option<DiagnosticColumn>,
	pub label: Option<String>,
	pub help: Option<String>,
	pub notes: Vec<String>,
	pub cause: Option<Box<Diagnostic>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticColumn {
	pub name: String,
	pub native_type: Option<String>,
}

impl Diagnostic {
	pub(crate) fn new(code: &str, message: impl Into<String>) -> Self {
		Self {
			code: code.to_string(),
			statement: None,
			message: message.into(),
			table: None,
			column: None,
			label: None,
			help: None,
			notes: vec![],
			cause: None,
		}
	}
}
