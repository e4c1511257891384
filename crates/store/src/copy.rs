// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Clipboard rendering of a rectangular selection, as delimited text and as
//! an HTML table.

use sheetdb_engine::{Engine, sql};
use sheetdb_type::{
	Column, Copied, CopySelection, Result, Row, error, error::diagnostic::catalog::column_not_found, internal_error,
};
use tracing::instrument;

use crate::materialize::display_types;

const TABLE_OPEN: &str = "<table style=\"border-collapse: collapse;\">";
const TH_OPEN: &str = "<th style=\"border: 1px solid #ccc;\">";
const TD_OPEN: &str = "<td style=\"border: 1px solid #ccc;\">";
const ROW_NUMBER_HEADER: &str = "*";
/// Largest LIMIT or OFFSET the engines accept.
const MAX_SQL_ROWS: usize = i64::MAX as usize;

fn escape_html(text: &str) -> String {
	let mut result = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => result.push_str("&amp;"),
			'<' => result.push_str("&lt;"),
			'>' => result.push_str("&gt;"),
			'"' => result.push_str("&quot;"),
			'\'' => result.push_str("&#39;"),
			c => result.push(c),
		}
	}
	result
}

/// The selected columns in their registered spelling, in selection order.
fn resolve_columns(table: &str, columns: &[Column], selection: &CopySelection) -> Result<Vec<Column>> {
	selection
		.columns
		.iter()
		.map(|name| {
			columns
				.iter()
				.find(|c| c.name.eq_ignore_ascii_case(name))
				.cloned()
				.ok_or_else(|| error!(column_not_found(table, name)))
		})
		.collect()
}

fn render_text(columns: &[Column], rows: &[Row], selection: &CopySelection) -> Result<String> {
	let mut writer = csv::WriterBuilder::new().terminator(csv::Terminator::Any(b'\n')).from_writer(Vec::new());

	if selection.include_column_names {
		let mut header: Vec<&str> = Vec::with_capacity(columns.len() + 1);
		if selection.include_row_numbers {
			header.push(ROW_NUMBER_HEADER);
		}
		header.extend(columns.iter().map(|c| c.name.as_str()));
		writer.write_record(&header).map_err(|e| error!(internal_error!("copy text: {}", e)))?;
	}

	for (idx, row) in rows.iter().enumerate() {
		let mut record: Vec<String> = Vec::with_capacity(row.len() + 1);
		if selection.include_row_numbers {
			record.push((selection.start_row + 1 + idx).to_string());
		}
		record.extend(row.iter().map(|v| v.as_string()));
		writer.write_record(&record).map_err(|e| error!(internal_error!("copy text: {}", e)))?;
	}

	let bytes = writer.into_inner().map_err(|e| error!(internal_error!("copy text: {}", e)))?;
	let text = String::from_utf8_lossy(&bytes);
	Ok(text.trim_end_matches('\n').to_string())
}

fn render_html(columns: &[Column], rows: &[Row], selection: &CopySelection) -> String {
	let mut html = String::from(TABLE_OPEN);

	if selection.include_column_names {
		html.push_str("<tr>");
		if selection.include_row_numbers {
			html.push_str(TH_OPEN);
			html.push_str(ROW_NUMBER_HEADER);
			html.push_str("</th>");
		}
		for column in columns {
			html.push_str(TH_OPEN);
			html.push_str(&escape_html(&column.name));
			html.push_str("</th>");
		}
		html.push_str("</tr>");
	}

	for (idx, row) in rows.iter().enumerate() {
		html.push_str("<tr>");
		if selection.include_row_numbers {
			html.push_str(TD_OPEN);
			html.push_str(&(selection.start_row + 1 + idx).to_string());
			html.push_str("</td>");
		}
		for value in row {
			html.push_str(TD_OPEN);
			html.push_str(&escape_html(&value.as_string()));
			html.push_str("</td>");
		}
		html.push_str("</tr>");
	}

	html.push_str("</table>");
	html
}

/// Renders rows `start_row..=end_row` of the selected columns. A range with
/// `end_row < start_row` selects no rows.
#[instrument(name = "store::copy", level = "debug", skip(engine, selection), fields(start = selection.start_row, end = selection.end_row))]
pub fn copy<E: Engine + ?Sized>(engine: &mut E, table: &str, selection: &CopySelection) -> Result<Copied> {
	let available = display_types(engine, table)?;
	let columns = resolve_columns(table, &available, selection)?;

	let rows = if selection.end_row < selection.start_row || columns.is_empty() {
		Vec::new()
	} else {
		let names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
		let limit = (selection.end_row - selection.start_row).saturating_add(1).min(MAX_SQL_ROWS);
		let offset = selection.start_row.min(MAX_SQL_ROWS);
		let frame = engine.query(&sql::select_columns(table, &names, limit, offset))?;
		frame
			.rows
			.into_iter()
			.map(|row| row.into_iter().zip(&columns).map(|(value, column)| value.coerce(column.display_type)).collect())
			.collect()
	};

	Ok(Copied {
		text: render_text(&columns, &rows, selection)?,
		html: render_html(&columns, &rows, selection),
	})
}
