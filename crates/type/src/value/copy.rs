// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};

/// A rectangular selection of a table to copy to the clipboard. Rows are
/// zero based and inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopySelection {
	pub columns: Vec<String>,
	pub start_row: usize,
	pub end_row: usize,
	pub include_row_numbers: bool,
	pub include_column_names: bool,
}

/// The same selection rendered as delimited text and as an HTML table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Copied {
	pub text: String,
	pub html: String,
}
