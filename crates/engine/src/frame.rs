// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use sheetdb_type::Value;

/// Raw rows returned by an engine query, before any display type conversion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
	pub columns: Vec<String>,
	pub rows: Vec<Vec<Value>>,
}

impl Frame {
	pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
		Self {
			columns,
			rows,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	/// The first value of the first row.
	pub fn scalar(&self) -> Option<&Value> {
		self.rows.first().and_then(|row| row.first())
	}

	/// The first value of the first row as an integer, 0 if absent.
	pub fn scalar_u64(&self) -> u64 {
		match self.scalar() {
			Some(Value::Int8(v)) => (*v).max(0) as u64,
			Some(Value::Float8(v)) if *v > 0.0 => *v as u64,
			_ => 0,
		}
	}

	pub fn column_index(&self, name: &str) -> Option<usize> {
		self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_scalar_u64_defaults_to_zero() {
		assert_eq!(Frame::default().scalar_u64(), 0);
		assert_eq!(Frame::new(vec!["n".into()], vec![vec![Value::Undefined]]).scalar_u64(), 0);
	}

	#[test]
	fn test_scalar_u64() {
		assert_eq!(Frame::new(vec!["n".into()], vec![vec![Value::Int8(42)]]).scalar_u64(), 42);
	}
}
