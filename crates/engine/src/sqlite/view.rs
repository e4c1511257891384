// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! SQLite cannot rename a view. A rename drops the view and creates it again
//! from its stored definition under the new name.

use rusqlite::{Connection, OptionalExtension};
use sheetdb_type::{
	Result, error,
	error::diagnostic::{catalog::table_not_found, engine::statement_failed},
	return_error,
};
use tracing::instrument;

use super::sqlite_error;
use crate::sql::{drop_view, quote_identifier};

const DEFINITION: &str = "SELECT sql FROM sqlite_master WHERE type = 'view' AND name = ?1 COLLATE NOCASE";

#[instrument(name = "engine::sqlite::rename_view", level = "debug", skip(conn))]
pub(super) fn rename_view(conn: &Connection, from: &str, to: &str) -> Result<()> {
	let definition: String = conn
		.query_row(DEFINITION, [from], |row| row.get(0))
		.optional()
		.map_err(|e| sqlite_error(DEFINITION, e))?
		.ok_or_else(|| error!(table_not_found(from)))?;
	let Some(body) = body_after_name(&definition) else {
		return_error!(statement_failed(&definition, "unrecognised view definition"));
	};
	let create = format!("CREATE VIEW {} {body}", quote_identifier(to));
	let drop = drop_view(from);

	let tx = conn.unchecked_transaction().map_err(|e| sqlite_error(&drop, e))?;
	tx.execute_batch(&drop).map_err(|e| sqlite_error(&drop, e))?;
	tx.execute_batch(&create).map_err(|e| sqlite_error(&create, e))?;
	tx.commit().map_err(|e| sqlite_error(&create, e))
}

/// The part of a `CREATE VIEW` statement after the view's name: an optional
/// column list, `AS` and the select.
fn body_after_name(definition: &str) -> Option<&str> {
	let mut rest = keyword(definition, "CREATE")?;
	if let Some(after) = keyword(rest, "TEMP").or_else(|| keyword(rest, "TEMPORARY")) {
		rest = after;
	}
	rest = keyword(rest, "VIEW")?;
	if let Some(after) = keyword(rest, "IF") {
		rest = keyword(keyword(after, "NOT")?, "EXISTS")?;
	}
	let body = skip_name(rest)?.trim_start();
	(body.starts_with('(') || keyword(body, "AS").is_some()).then_some(body)
}

fn is_word(c: char) -> bool {
	c.is_alphanumeric() || c == '_' || c == '$'
}

/// The text after `word` when it starts `text`, ignoring case.
fn keyword<'a>(text: &'a str, word: &str) -> Option<&'a str> {
	let text = text.trim_start();
	let head = text.get(..word.len())?;
	let rest = &text[word.len()..];
	(head.eq_ignore_ascii_case(word) && !rest.starts_with(is_word)).then_some(rest)
}

/// Skips a possibly schema-qualified identifier, bare or quoted.
fn skip_name(text: &str) -> Option<&str> {
	let mut rest = text.trim_start();
	loop {
		rest = match rest.chars().next()? {
			'"' => skip_quoted(&rest[1..], '"')?,
			'`' => skip_quoted(&rest[1..], '`')?,
			'[' => &rest[rest.find(']')? + 1..],
			c if is_word(c) => rest.trim_start_matches(is_word),
			_ => return None,
		};
		match rest.trim_start().strip_prefix('.') {
			Some(after) => rest = after.trim_start(),
			None => return Some(rest),
		}
	}
}

/// Text after the closing `quote`, a doubled quote being part of the name.
fn skip_quoted(text: &str, quote: char) -> Option<&str> {
	let mut chars = text.char_indices().peekable();
	while let Some((idx, c)) = chars.next() {
		if c != quote {
			continue;
		}
		if chars.peek().is_some_and(|(_, next)| *next == quote) {
			chars.next();
			continue;
		}
		return Some(&text[idx + c.len_utf8()..]);
	}
	None
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_body_after_name() {
		assert_eq!(body_after_name("CREATE VIEW v AS SELECT 1"), Some("AS SELECT 1"));
		assert_eq!(body_after_name("create temp view if not exists main.v(a) as select 1"), Some("(a) as select 1"));
		assert_eq!(
			body_after_name("CREATE VIEW \"we\"\"ird AS x\" AS SELECT * FROM t"),
			Some("AS SELECT * FROM t")
		);
		assert_eq!(body_after_name("CREATE VIEW [a b] AS SELECT 2"), Some("AS SELECT 2"));
		assert_eq!(body_after_name("CREATE VIEWS v AS SELECT 1"), None);
		assert_eq!(body_after_name("CREATE TABLE t (a)"), None);
	}
}
