// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use super::{Value, column::Column};

/// Values aligned positionally to the result's columns.
pub type Row = Vec<Value>;

/// One materialized page of a table together with its column metadata and
/// the table's full row count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
	pub name: String,
	pub sql: Option<String>,
	pub columns: Vec<Column>,
	pub rows: Vec<Row>,
	pub count: u64,
}

impl QueryResult {
	pub fn column(&self, name: &str) -> Option<&Column> {
		self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
	}

	pub fn column_names(&self) -> Vec<&str> {
		self.columns.iter().map(|c| c.name.as_str()).collect()
	}
}

fn escape_control_chars(s: &str) -> String {
	s.replace('\n', "\\n").replace('\t', "\\t").replace('\r', "\\r")
}

fn width(s: &str) -> usize {
	s.chars().count()
}

fn centered(text: &str, w: usize) -> String {
	let pad = w.saturating_sub(width(text));
	let l = pad / 2;
	let r = pad - l;
	format!(" {:l$}{}{:r$} ", "", text, "")
}

impl Display for QueryResult {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let headers: Vec<String> = self
			.columns
			.iter()
			.map(|c| escape_control_chars(&format!("{} ({})", c.name, c.display_type)))
			.collect();

		let cells: Vec<Vec<String>> = self
			.rows
			.iter()
			.map(|row| row.iter().map(|v| escape_control_chars(&v.to_string())).collect())
			.collect();

		let mut col_widths: Vec<usize> = headers.iter().map(|h| width(h)).collect();
		for row in &cells {
			for (idx, cell) in row.iter().enumerate() {
				if let Some(w) = col_widths.get_mut(idx) {
					*w = (*w).max(width(cell));
				}
			}
		}

		for w in &mut col_widths {
			*w += 2;
		}

		let sep: String = if col_widths.is_empty() {
			"++".to_string()
		} else {
			col_widths.iter().map(|w| format!("+{}", "-".repeat(*w + 2))).collect::<String>() + "+"
		};

		writeln!(f, "{}", sep)?;

		let header_parts: Vec<String> =
			headers.iter().zip(&col_widths).map(|(name, w)| centered(name, *w)).collect();
		writeln!(f, "|{}|", header_parts.join("|"))?;
		writeln!(f, "{}", sep)?;

		for row in &cells {
			let row_parts: Vec<String> =
				col_widths.iter().enumerate().map(|(idx, w)| centered(row.get(idx).map_or("", |c| c.as_str()), *w)).collect();
			writeln!(f, "|{}|", row_parts.join("|"))?;
		}

		writeln!(f, "{}", sep)?;

		let shown = self.rows.len() as u64;
		if shown < self.count {
			writeln!(f, "{} of {} rows in `{}`", shown, self.count, self.name)
		} else {
			writeln!(f, "{} rows in `{}`", self.count, self.name)
		}
	}
}
