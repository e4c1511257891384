// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Whole-file CSV type inference for engines without a sniffing facility of
//! their own.
//!
//! Every column starts out as a candidate for every type. Each non-empty value
//! eliminates the types it does not parse as; after the last record the
//! narrowest surviving type wins, in the order boolean, bigint, double, date,
//! timestamp. One date format and one timestamp format are chosen for the
//! whole file, columns that only parse under another format fall back to
//! varchar.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use sheetdb_type::{NativeType, Result, error, error::diagnostic::csv::malformed_record};
use tracing::instrument;

use crate::delimited::{CsvOptions, SniffedCsv, field, reader};

pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%d-%m-%Y", "%m-%d-%Y", "%Y/%m/%d", "%d.%m.%Y"];

pub const TIMESTAMP_FORMATS: &[&str] = &[
	"%Y-%m-%d %H:%M:%S%.f",
	"%Y-%m-%dT%H:%M:%S%.f",
	"%Y-%m-%d %H:%M",
	"%m/%d/%Y %H:%M:%S",
	"%d/%m/%Y %H:%M:%S",
	"%m/%d/%Y %H:%M",
	"%d/%m/%Y %H:%M",
];

#[derive(Debug)]
struct Candidates {
	non_empty: usize,
	boolean: bool,
	bigint: bool,
	double: bool,
	dates: Vec<&'static str>,
	timestamps: Vec<&'static str>,
}

enum Guess {
	Varchar,
	Boolean,
	Bigint,
	Double,
	Date,
	Timestamp,
}

impl Candidates {
	fn new() -> Self {
		Self {
			non_empty: 0,
			boolean: true,
			bigint: true,
			double: true,
			dates: DATE_FORMATS.to_vec(),
			timestamps: TIMESTAMP_FORMATS.to_vec(),
		}
	}

	fn observe(&mut self, raw: &str) {
		let value = raw.trim();
		if value.is_empty() {
			return;
		}
		self.non_empty += 1;

		if self.boolean && !is_boolean(value) {
			self.boolean = false;
		}
		if self.bigint && value.parse::<i64>().is_err() {
			self.bigint = false;
		}
		if self.double && !is_double(value) {
			self.double = false;
		}
		self.dates.retain(|format| NaiveDate::parse_from_str(value, format).is_ok());
		self.timestamps.retain(|format| NaiveDateTime::parse_from_str(value, format).is_ok());
	}

	fn guess(&self) -> Guess {
		if self.non_empty == 0 {
			Guess::Varchar
		} else if self.boolean {
			Guess::Boolean
		} else if self.bigint {
			Guess::Bigint
		} else if self.double {
			Guess::Double
		} else if !self.dates.is_empty() {
			Guess::Date
		} else if !self.timestamps.is_empty() {
			Guess::Timestamp
		} else {
			Guess::Varchar
		}
	}
}

fn is_boolean(value: &str) -> bool {
	value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
}

fn is_double(value: &str) -> bool {
	value.bytes().any(|b| b.is_ascii_digit()) && value.parse::<f64>().is_ok()
}

/// The format most columns agree on; ties go to the earlier format.
fn best_format(formats: &[&'static str], columns: &[&Vec<&'static str>]) -> Option<&'static str> {
	let mut best: Option<(&'static str, usize)> = None;
	for &format in formats {
		let supporters = columns.iter().filter(|c| c.contains(&format)).count();
		if supporters > 0 && best.is_none_or(|(_, n)| supporters > n) {
			best = Some((format, supporters));
		}
	}
	best.map(|(format, _)| format)
}

#[instrument(name = "engine::sniff::sniff_file", level = "debug", skip_all, fields(path = %path.display()))]
pub fn sniff_file(path: &Path, options: &CsvOptions) -> Result<SniffedCsv> {
	let mut reader = reader(path, options.delimiter)?;
	let mut record = csv::ByteRecord::new();

	let mut columns: Vec<Candidates> = Vec::new();
	let mut first = true;

	loop {
		let more = reader.read_byte_record(&mut record).map_err(|e| {
			let line = e.position().map(|p| p.line()).unwrap_or(0);
			error!(malformed_record(path, line, e.to_string()))
		})?;
		if !more {
			break;
		}

		if first {
			first = false;
			columns = (0..record.len()).map(|_| Candidates::new()).collect();
			if options.has_header {
				continue;
			}
		}

		for (idx, candidates) in columns.iter_mut().enumerate() {
			if let Some(value) = field(&record, idx) {
				candidates.observe(&value);
			}
		}
	}

	let guesses: Vec<Guess> = columns.iter().map(Candidates::guess).collect();

	let date_columns: Vec<&Vec<&'static str>> =
		columns.iter().zip(&guesses).filter(|(_, g)| matches!(g, Guess::Date)).map(|(c, _)| &c.dates).collect();
	let timestamp_columns: Vec<&Vec<&'static str>> = columns
		.iter()
		.zip(&guesses)
		.filter(|(_, g)| matches!(g, Guess::Timestamp))
		.map(|(c, _)| &c.timestamps)
		.collect();

	let date_format = best_format(DATE_FORMATS, &date_columns);
	let timestamp_format = best_format(TIMESTAMP_FORMATS, &timestamp_columns);

	let types = columns
		.iter()
		.zip(guesses)
		.map(|(candidates, guess)| {
			let tag = match guess {
				Guess::Varchar => "VARCHAR",
				Guess::Boolean => "BOOLEAN",
				Guess::Bigint => "BIGINT",
				Guess::Double => "DOUBLE",
				Guess::Date => match date_format {
					Some(format) if candidates.dates.contains(&format) => "DATE",
					_ => "VARCHAR",
				},
				Guess::Timestamp => match timestamp_format {
					Some(format) if candidates.timestamps.contains(&format) => "TIMESTAMP",
					_ => "VARCHAR",
				},
			};
			NativeType::new(tag)
		})
		.collect();

	Ok(SniffedCsv {
		types,
		date_format: date_format.map(str::to_string),
		timestamp_format: timestamp_format.map(str::to_string),
	})
}
