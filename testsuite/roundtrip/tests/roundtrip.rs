// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::path::Path;

use sheetdb_engine::ExportDelimiter;
use sheetdb_store::{AddCsv, Datastore, DatastoreConfig, Session};
use sheetdb_testing::tempdir::temp_dir;
use sheetdb_type::{QueryResult, Result, Sort};
use test_each_file::test_each_path;

fn session() -> Result<Session> {
	Session::open(DatastoreConfig::default())
}

fn assert_same_table(left: &QueryResult, right: &QueryResult) {
	assert_eq!(left.columns, right.columns);
	assert_eq!(left.rows, right.rows);
	assert_eq!(left.count, right.count);
}

/// Importing, exporting and importing the export again yields the same table.
fn csv_roundtrip(path: &Path, auto_detect: bool) {
	temp_dir(|dir| {
		let mut session = session()?;
		let original = session.add_csv(&AddCsv::new(path).auto_detect(auto_detect))?;

		let exported = dir.join("exported.csv");
		session.export_csv(&original.name, &exported, ExportDelimiter::Comma)?;
		let reloaded = session.add_csv(&AddCsv::new(&exported).auto_detect(auto_detect))?;

		assert_same_table(&original, &reloaded);
		session.close()
	})
	.expect("test failed")
}

test_each_path! { in "testsuite/roundtrip/tests/fixtures" as csv_detected => test_csv_detected }
test_each_path! { in "testsuite/roundtrip/tests/fixtures" as csv_text => test_csv_text }

fn test_csv_detected(path: &Path) {
	csv_roundtrip(path, true)
}

fn test_csv_text(path: &Path) {
	csv_roundtrip(path, false)
}

test_each_path! { in "testsuite/roundtrip/tests/fixtures" as sort => test_sort }

/// Sorting by every column in turn and clearing the sort restores the import order.
fn test_sort(path: &Path) {
	let run = || -> Result<()> {
		let mut session = session()?;
		let original = session.add_csv(&AddCsv::new(path))?;

		for column in original.column_names() {
			let sorted = session.sort(&original.name, &[Sort::desc(column)])?;
			assert_eq!(sorted.count, original.count);
			assert_eq!(session.get_all_tables()?, vec![original.name.clone()]);
		}

		let restored = session.sort(&original.name, &[])?;
		assert_same_table(&original, &restored);
		session.close()
	};
	run().expect("test failed")
}

test_each_path! { in "testsuite/roundtrip/tests/fixtures" as database => test_database }

/// A session written to a directory loads into a fresh session unchanged.
fn test_database(path: &Path) {
	temp_dir(|dir| {
		let archive = dir.join("archive");

		let mut source = session()?;
		let original = source.add_csv(&AddCsv::new(path))?;
		source.export(&archive)?;
		source.close()?;

		let mut target = session()?;
		target.import(&archive)?;
		assert_eq!(target.get_all_tables()?, vec![original.name.clone()]);
		assert_same_table(&original, &target.load_table(&original.name)?);
		target.close()
	})
	.expect("test failed")
}
