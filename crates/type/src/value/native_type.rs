// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// The engine's own type tag for a column, e.g. `DECIMAL(18,3)`, `INTEGER[]`
/// or `TIMESTAMP WITH TIME ZONE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NativeType(String);

/// Shape of a native type tag once list and array suffixes are peeled off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeShape {
	Scalar(String),
	/// Variable length list, `T[]`.
	List(NativeType),
	/// Fixed size array, `T[N]`.
	Array(NativeType, usize),
}

impl NativeType {
	pub fn new(tag: impl Into<String>) -> Self {
		Self(tag.into().trim().to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Upper-cased tag with any parenthesised parameters removed,
	/// `decimal(18, 3)` becomes `DECIMAL`.
	pub fn base(&self) -> String {
		let upper = self.0.to_ascii_uppercase();
		let stripped = match upper.find('(') {
			Some(open) if !upper.starts_with("STRUCT") && !upper.starts_with("MAP") && !upper.starts_with("UNION") => {
				let close = upper.rfind(')').map(|c| c + 1).unwrap_or(upper.len());
				format!("{}{}", &upper[..open], &upper[close..])
			}
			_ => upper,
		};
		stripped.split_whitespace().collect::<Vec<_>>().join(" ")
	}

	pub fn shape(&self) -> NativeShape {
		let tag = self.0.trim();
		if let Some(element) = tag.strip_suffix("[]") {
			return NativeShape::List(NativeType::new(element));
		}
		if tag.ends_with(']') {
			if let Some(open) = tag.rfind('[') {
				let size = &tag[open + 1..tag.len() - 1];
				if let Ok(size) = size.trim().parse::<usize>() {
					return NativeShape::Array(NativeType::new(&tag[..open]), size);
				}
			}
		}
		NativeShape::Scalar(self.base())
	}
}

impl Display for NativeType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for NativeType {
	fn from(tag: &str) -> Self {
		NativeType::new(tag)
	}
}

impl From<String> for NativeType {
	fn from(tag: String) -> Self {
		NativeType::new(tag)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_base_strips_parameters() {
		assert_eq!(NativeType::new("decimal(18, 3)").base(), "DECIMAL");
		assert_eq!(NativeType::new("VARCHAR(255)").base(), "VARCHAR");
		assert_eq!(NativeType::new("timestamp  with time zone").base(), "TIMESTAMP WITH TIME ZONE");
	}

	#[test]
	fn test_base_keeps_nested_types() {
		assert_eq!(NativeType::new("STRUCT(a INTEGER)").base(), "STRUCT(A INTEGER)");
	}

	#[test]
	fn test_shape_list() {
		assert_eq!(NativeType::new("INTEGER[]").shape(), NativeShape::List(NativeType::new("INTEGER")));
	}

	#[test]
	fn test_shape_fixed_array() {
		assert_eq!(NativeType::new("DOUBLE[3]").shape(), NativeShape::Array(NativeType::new("DOUBLE"), 3));
	}

	#[test]
	fn test_shape_scalar() {
		assert_eq!(NativeType::new("bigint").shape(), NativeShape::Scalar("BIGINT".into()));
	}
}
