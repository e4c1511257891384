// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
	Asc,
	Desc,
	None,
}

impl SortDirection {
	pub fn as_sql(&self) -> Option<&'static str> {
		match self {
			SortDirection::Asc => Some("ASC"),
			SortDirection::Desc => Some("DESC"),
			SortDirection::None => None,
		}
	}
}

impl Display for SortDirection {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			SortDirection::Asc => "asc",
			SortDirection::Desc => "desc",
			SortDirection::None => "none",
		})
	}
}

impl FromStr for SortDirection {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"asc" => Ok(SortDirection::Asc),
			"desc" => Ok(SortDirection::Desc),
			"none" | "" => Ok(SortDirection::None),
			other => Err(format!("unknown sort direction '{other}'")),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
	pub column: String,
	pub direction: SortDirection,
}

impl Sort {
	pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
		Self {
			column: column.into(),
			direction,
		}
	}

	pub fn asc(column: impl Into<String>) -> Self {
		Self::new(column, SortDirection::Asc)
	}

	pub fn desc(column: impl Into<String>) -> Self {
		Self::new(column, SortDirection::Desc)
	}

	pub fn none(column: impl Into<String>) -> Self {
		Self::new(column, SortDirection::None)
	}
}

/// Parses `column:direction`; a bare column name sorts ascending.
impl FromStr for Sort {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.rsplit_once(':') {
			Some((column, direction)) if !column.is_empty() => Ok(Sort::new(column, direction.parse()?)),
			_ if !s.is_empty() => Ok(Sort::asc(s)),
			_ => Err("empty sort specification".to_string()),
		}
	}
}
