// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use sheetdb_engine::{Engine, sql::trim_statement};
use sheetdb_type::{QueryResult, Result};
use tracing::{debug, instrument, warn};

use super::TableLifecycle;

/// Base name of tables created by queries.
const QUERY_TABLE: &str = "query";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
	Word(String),
	Quoted(String),
	Dot,
	Comma,
	Open,
	Close,
	Semicolon,
	Other,
}

/// Splits SQL into the tokens relevant for finding table references. String
/// literals and comments produce no tokens.
fn tokenize(sql: &str) -> Vec<Token> {
	let chars: Vec<char> = sql.chars().collect();
	let mut tokens = Vec::new();
	let mut idx = 0;

	while idx < chars.len() {
		let c = chars[idx];
		match c {
			c if c.is_whitespace() => idx += 1,
			'\'' => {
				idx += 1;
				while idx < chars.len() {
					if chars[idx] == '\'' {
						if chars.get(idx + 1) == Some(&'\'') {
							idx += 2;
							continue;
						}
						break;
					}
					idx += 1;
				}
				idx += 1;
			}
			'"' | '`' => {
				let quote = c;
				let mut ident = String::new();
				idx += 1;
				while idx < chars.len() {
					if chars[idx] == quote {
						if chars.get(idx + 1) == Some(&quote) {
							ident.push(quote);
							idx += 2;
							continue;
						}
						break;
					}
					ident.push(chars[idx]);
					idx += 1;
				}
				idx += 1;
				tokens.push(Token::Quoted(ident));
			}
			'-' if chars.get(idx + 1) == Some(&'-') => {
				while idx < chars.len() && chars[idx] != '\n' {
					idx += 1;
				}
			}
			'/' if chars.get(idx + 1) == Some(&'*') => {
				idx += 2;
				while idx < chars.len() && !(chars[idx] == '*' && chars.get(idx + 1) == Some(&'/')) {
					idx += 1;
				}
				idx += 2;
			}
			c if c.is_alphabetic() || c == '_' => {
				let start = idx;
				while idx < chars.len() && (chars[idx].is_alphanumeric() || chars[idx] == '_' || chars[idx] == '$') {
					idx += 1;
				}
				tokens.push(Token::Word(chars[start..idx].iter().collect()));
			}
			c if c.is_ascii_digit() => {
				while idx < chars.len() && (chars[idx].is_alphanumeric() || chars[idx] == '.' || chars[idx] == '_') {
					idx += 1;
				}
				tokens.push(Token::Other);
			}
			'.' => {
				idx += 1;
				tokens.push(Token::Dot);
			}
			',' => {
				idx += 1;
				tokens.push(Token::Comma);
			}
			'(' => {
				idx += 1;
				tokens.push(Token::Open);
			}
			')' => {
				idx += 1;
				tokens.push(Token::Close);
			}
			';' => {
				idx += 1;
				tokens.push(Token::Semicolon);
			}
			_ => {
				idx += 1;
				tokens.push(Token::Other);
			}
		}
	}
	tokens
}

/// Keywords ending the table list of a `FROM` clause.
const CLAUSE_KEYWORDS: &[&str] = &[
	"WHERE", "GROUP", "ORDER", "HAVING", "LIMIT", "OFFSET", "UNION", "INTERSECT", "EXCEPT", "WINDOW", "QUALIFY", "ON",
	"USING", "SELECT", "RETURNING",
];

fn is_keyword(token: &Token, keyword: &str) -> bool {
	matches!(token, Token::Word(word) if word.eq_ignore_ascii_case(keyword))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
	From,
	Join,
	List,
}

#[derive(Debug)]
struct Reference {
	position: Position,
	depth: usize,
}

/// The object name of a possibly schema-qualified name starting at `idx`,
/// and the index after it. `None` for function calls and subqueries.
fn object_name(tokens: &[Token], mut idx: usize) -> Option<(String, usize)> {
	let name = loop {
		let part = match tokens.get(idx) {
			Some(Token::Word(word)) => word.clone(),
			Some(Token::Quoted(ident)) => ident.clone(),
			_ => return None,
		};
		idx += 1;
		if tokens.get(idx) == Some(&Token::Dot) {
			idx += 1;
			continue;
		}
		break part;
	};
	if tokens.get(idx) == Some(&Token::Open) {
		return None;
	}
	Some((name, idx))
}

fn references(tokens: &[Token], source: &str) -> Vec<Reference> {
	let mut result = Vec::new();
	let mut depth = 0usize;
	// depths with an open FROM table list
	let mut lists: Vec<usize> = Vec::new();
	let mut idx = 0;

	while idx < tokens.len() {
		let token = &tokens[idx];
		let position = match token {
			Token::Open => {
				depth += 1;
				None
			}
			Token::Close => {
				depth = depth.saturating_sub(1);
				lists.retain(|d| *d <= depth);
				None
			}
			Token::Semicolon => {
				lists.clear();
				None
			}
			Token::Comma if lists.last() == Some(&depth) => Some(Position::List),
			_ if is_keyword(token, "FROM") => {
				lists.retain(|d| *d != depth);
				lists.push(depth);
				Some(Position::From)
			}
			_ if is_keyword(token, "JOIN") => Some(Position::Join),
			_ if CLAUSE_KEYWORDS.iter().any(|k| is_keyword(token, k)) => {
				lists.retain(|d| *d != depth);
				None
			}
			_ => None,
		};
		idx += 1;

		let Some(position) = position else {
			continue;
		};
		if is_keyword(tokens.get(idx).unwrap_or(&Token::Other), "LATERAL") {
			idx += 1;
		}
		if let Some((name, next)) = object_name(tokens, idx) {
			if name.eq_ignore_ascii_case(source) {
				result.push(Reference {
					position,
					depth,
				});
			}
			idx = next;
		}
	}
	result
}

/// Whether `sql` reads from `source` in a way that forbids replacing `source`
/// with its result. Reading `source` once through the top-level `FROM` is
/// allowed; joins, repeated reads and reads from subqueries are not.
pub fn references_source(sql: &str, source: &str) -> bool {
	let references = references(&tokenize(sql), source);
	match references.as_slice() {
		[] => false,
		[
			Reference {
				position: Position::From,
				depth: 0,
			},
		] => false,
		_ => true,
	}
}

impl<E: Engine + ?Sized> TableLifecycle<'_, E> {
	/// Runs `sql` into a new table. With a `source` that the query does not
	/// read from, the new table replaces `source`.
	#[instrument(name = "store::lifecycle::run_query", level = "debug", skip(self, sql))]
	pub fn run_query(&mut self, sql: &str, source: Option<&str>) -> Result<QueryResult> {
		let select = trim_statement(sql);
		let table = self.registry.reserve(QUERY_TABLE, Some(1));

		if let Err(err) = self.engine.create_table_as(&table, select) {
			self.registry.release(&table);
			return Err(err);
		}

		let target = match source {
			Some(source) if !source.is_empty() && !source.eq_ignore_ascii_case(&table) => {
				if references_source(select, source) {
					debug!(source, "query reads from its source, keeping the result separate");
					None
				} else {
					Some(self.registry.resolve(source).unwrap_or(source).to_string())
				}
			}
			_ => None,
		};

		let name = match target {
			Some(target) => {
				self.drop(&target)?;
				self.rename(&table, &target)?;
				target
			}
			None => table.clone(),
		};

		match self.materialize(&name, Some(select)) {
			Ok(result) => Ok(result),
			Err(err) => {
				if name == table {
					if let Err(cleanup) = self.drop(&table) {
						warn!(table = %table, error = %cleanup, "failed to drop unusable query result");
					}
				}
				Err(err)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	mod references_source {
		use super::*;

		#[test]
		fn test_single_top_level_from_folds() {
			assert!(!references_source("SELECT * FROM t ORDER BY a", "t"));
			assert!(!references_source("select a, count(*) from T group by a", "t"));
			assert!(!references_source("SELECT * FROM \"t\" WHERE a > 1", "t"));
			assert!(!references_source("SELECT * FROM main.t", "t"));
		}

		#[test]
		fn test_no_reference_folds() {
			assert!(!references_source("SELECT * FROM other", "t"));
			assert!(!references_source("SELECT * FROM tt", "t"));
			assert!(!references_source("SELECT 1", "t"));
		}

		#[test]
		fn test_join_blocks() {
			assert!(references_source("SELECT * FROM a JOIN t ON a.id = t.id", "t"));
			assert!(references_source("SELECT * FROM t\nLEFT JOIN t AS u ON t.id = u.id", "t"));
		}

		#[test]
		fn test_comma_list_blocks() {
			assert!(references_source("SELECT * FROM a, t WHERE a.id = t.id", "t"));
			assert!(references_source("SELECT * FROM a , \"T\"", "t"));
		}

		#[test]
		fn test_comma_outside_from_does_not_count() {
			assert!(!references_source("SELECT a, t FROM t", "t"));
			assert!(!references_source("SELECT * FROM t WHERE x IN (1, 2) ORDER BY a, t", "t"));
		}

		#[test]
		fn test_subquery_blocks() {
			assert!(references_source("SELECT * FROM a WHERE id IN (SELECT id FROM t)", "t"));
			assert!(references_source("SELECT * FROM (SELECT * FROM t) x", "t"));
			assert!(references_source("SELECT * FROM t WHERE a = (SELECT max(a) FROM t)", "t"));
		}

		#[test]
		fn test_literals_and_comments_are_ignored() {
			assert!(!references_source("SELECT 'join t' AS x FROM a", "t"));
			assert!(!references_source("SELECT * FROM t -- JOIN t", "t"));
			assert!(!references_source("SELECT * FROM t /* , t */", "t"));
			assert!(!references_source("SELECT 'it''s from t' FROM t", "t"));
		}

		#[test]
		fn test_table_functions_are_not_tables() {
			assert!(!references_source("SELECT * FROM t(1)", "t"));
		}

		#[test]
		fn test_schema_qualified_names() {
			assert!(!references_source("SELECT * FROM main.t", "t"));
			assert!(!references_source("SELECT * FROM \"main\".\"t\" WHERE a > 1", "t"));
			assert!(references_source("SELECT * FROM x JOIN main.t ON 1", "t"));
			assert!(!references_source("SELECT * FROM main.other", "t"));
		}

		#[test]
		fn test_quoted_names_with_escapes() {
			assert!(!references_source("SELECT * FROM \"we\"\"ird\"", "we\"ird"));
			assert!(references_source("SELECT * FROM x JOIN \"we\"\"ird\" ON 1", "we\"ird"));
		}
	}

	mod run_query {
		use sheetdb_engine::sqlite::SqliteEngine;
		use sheetdb_type::Value;

		use super::*;
		use crate::{config::DatastoreConfig, registry::NameRegistry};

		fn setup() -> (SqliteEngine, NameRegistry, DatastoreConfig) {
			let mut engine = SqliteEngine::in_memory().unwrap();
			engine.execute("CREATE TABLE t (a BIGINT); INSERT INTO t VALUES (2), (1), (3)").unwrap();
			let mut registry = NameRegistry::new();
			registry.register("t").unwrap();
			(engine, registry, DatastoreConfig::default())
		}

		#[test]
		fn test_new_table_without_source() {
			let (mut engine, mut registry, config) = setup();
			let result =
				TableLifecycle::new(&mut engine, &mut registry, &config).run_query("SELECT a * 2 AS b FROM t;", None).unwrap();
			assert_eq!(result.name, "query_1");
			assert_eq!(result.sql.as_deref(), Some("SELECT a * 2 AS b FROM t"));
			assert_eq!(result.count, 3);
			assert_eq!(registry.names(), ["t".to_string(), "query_1".to_string()]);
		}

		#[test]
		fn test_folds_into_source() {
			let (mut engine, mut registry, config) = setup();
			let result = TableLifecycle::new(&mut engine, &mut registry, &config)
				.run_query("SELECT * FROM t ORDER BY a", Some("t"))
				.unwrap();
			assert_eq!(result.name, "t");
			assert_eq!(result.rows, vec![vec![Value::Int8(1)], vec![Value::Int8(2)], vec![Value::Int8(3)]]);
			assert_eq!(registry.names(), ["t".to_string()]);
			let objects: Vec<String> = engine.objects().unwrap().into_iter().map(|o| o.name).collect();
			assert_eq!(objects, vec!["t"]);
		}

		#[test]
		fn test_self_join_keeps_source() {
			let (mut engine, mut registry, config) = setup();
			let result = TableLifecycle::new(&mut engine, &mut registry, &config)
				.run_query("SELECT x.a FROM t x JOIN t y ON x.a = y.a", Some("t"))
				.unwrap();
			assert_eq!(result.name, "query_1");
			assert_eq!(registry.names(), ["t".to_string(), "query_1".to_string()]);
		}

		#[test]
		fn test_failed_statement_releases_name() {
			let (mut engine, mut registry, config) = setup();
			let err =
				TableLifecycle::new(&mut engine, &mut registry, &config).run_query("SELECT * FROM nope", None).unwrap_err();
			assert_eq!(err.code, "ENGINE_001");
			assert_eq!(err.statement.as_deref(), Some("SELECT * FROM nope"));
			assert_eq!(registry.names(), ["t".to_string()]);
		}
	}
}
