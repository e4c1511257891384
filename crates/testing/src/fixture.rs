// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fs,
	path::{Path, PathBuf},
};

/// Writes `content` verbatim to `dir/name` and returns the full path.
pub fn write_csv(dir: &Path, name: &str, content: &str) -> std::io::Result<PathBuf> {
	let path = dir.join(name);
	fs::write(&path, content)?;
	Ok(path)
}

/// Writes a CSV with a header row and `rows` rows produced by `row`.
pub fn write_generated_csv<F>(dir: &Path, name: &str, header: &[&str], rows: usize, row: F) -> std::io::Result<PathBuf>
where
	F: Fn(usize) -> Vec<String>,
{
	let mut content = header.join(",");
	content.push('\n');
	for idx in 0..rows {
		content.push_str(&row(idx).join(","));
		content.push('\n');
	}
	write_csv(dir, name, &content)
}

/// Reads a delimited file into rows of fields. Only meant for fixtures that
/// contain no quoting.
pub fn read_plain_rows(path: &Path, delimiter: char) -> std::io::Result<Vec<Vec<String>>> {
	let content = fs::read_to_string(path)?;
	Ok(content.lines().map(|line| line.split(delimiter).map(str::to_string).collect()).collect())
}
