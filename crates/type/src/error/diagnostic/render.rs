// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::Write;

use super::Diagnostic;

pub trait DiagnosticRenderer {
	fn render(&self, diagnostic: &Diagnostic) -> String;
}

pub struct DefaultRenderer;

impl DiagnosticRenderer for DefaultRenderer {
	fn render(&self, diagnostic: &Diagnostic) -> String {
		let mut output = String::new();
		render_into(&mut output, diagnostic, 0);
		output
	}
}

impl DefaultRenderer {
	pub fn render_string(diagnostic: &Diagnostic) -> String {
		DefaultRenderer.render(diagnostic)
	}
}

fn render_into(output: &mut String, d: &Diagnostic, depth: usize) {
	let indent = "  ".repeat(depth);

	let _ = writeln!(output, "{indent}error[{}]: {}", d.code, d.message);

	if let Some(statement) = &d.statement {
		for (idx, line) in statement.lines().enumerate() {
			let gutter = if idx == 0 {
				"-->"
			} else {
				"   "
			};
			let _ = writeln!(output, "{indent}  {gutter} {line}");
		}
	}

	if let Some(label) = &d.label {
		let _ = writeln!(output, "{indent}   = {label}");
	}

	if let Some(table) = &d.table {
		let _ = writeln!(output, "\n{indent}note: table `{table}`");
	}

	if let Some(col) = &d.column {
		match &col.native_type {
			Some(native) => {
				let _ = writeln!(output, "\n{indent}note: column `{}` is of type `{native}`", col.name);
			}
			None => {
				let _ = writeln!(output, "\n{indent}note: column `{}`", col.name);
			}
		}
	}

	if let Some(help) = &d.help {
		let _ = writeln!(output, "\n{indent}help: {help}");
	}

	for note in &d.notes {
		let _ = writeln!(output, "\n{indent}note: {note}");
	}

	if let Some(cause) = &d.cause {
		let _ = writeln!(output, "\n{indent}caused by:");
		render_into(output, cause, depth + 1);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::diagnostic::{catalog::table_not_found, engine::statement_failed};

	#[test]
	fn test_render_code_and_message() {
		let out = DefaultRenderer::render_string(&table_not_found("orders"));
		assert!(out.starts_with("error[CATALOG_001]:"));
		assert!(out.contains("orders"));
	}

	#[test]
	fn test_render_statement() {
		let out = DefaultRenderer::render_string(&statement_failed("SELECT *\nFROM nope", "no such table: nope"));
		assert!(out.contains("--> SELECT *"));
		assert!(out.contains("    FROM nope"));
		assert!(out.contains("no such table: nope"));
	}

	#[test]
	fn test_render_cause() {
		let mut outer = table_not_found("a");
		outer.cause = Some(Box::new(table_not_found("b")));
		let out = DefaultRenderer::render_string(&outer);
		assert!(out.contains("caused by:"));
		assert!(out.contains("  error[CATALOG_001]"));
	}
}
