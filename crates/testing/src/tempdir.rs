// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{env, fs, path::Path};

use sheetdb_type::Result;
use uuid::Uuid;

/// Runs `f` with a fresh, uniquely named directory that is removed afterwards,
/// whether or not `f` succeeded.
pub fn temp_dir<F>(f: F) -> Result<()>
where
	F: FnOnce(&Path) -> Result<()>,
{
	let mut path = env::temp_dir();
	path.push(format!("sheetdb-{}", Uuid::new_v4()));

	fs::create_dir(&path)?;
	let result = f(&path);

	let _ = fs::remove_dir_all(&path);
	result
}

#[cfg(test)]
mod tests {
	use sheetdb_type::{error, error::diagnostic::internal::internal};

	use super::*;

	#[test]
	fn test_directory_is_removed() {
		let mut seen = None;
		temp_dir(|path| {
			assert!(path.is_dir());
			seen = Some(path.to_path_buf());
			Ok(())
		})
		.expect("test failed");
		assert!(!seen.unwrap().exists());
	}

	#[test]
	fn test_error_is_returned_after_cleanup() {
		let mut seen = None;
		let result = temp_dir(|path| {
			seen = Some(path.to_path_buf());
			Err(error!(internal("boom")))
		});
		assert!(result.is_err());
		assert!(!seen.unwrap().exists());
	}
}
