// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Serialize};

/// The closed set of column types a caller can render, sort and chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayType {
	Bigint,
	Double,
	Boolean,
	Varchar,
	Timestamp,
	List,
}

impl DisplayType {
	pub const ALL: [DisplayType; 6] = [
		DisplayType::Bigint,
		DisplayType::Double,
		DisplayType::Boolean,
		DisplayType::Varchar,
		DisplayType::Timestamp,
		DisplayType::List,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			DisplayType::Bigint => "bigint",
			DisplayType::Double => "double",
			DisplayType::Boolean => "boolean",
			DisplayType::Varchar => "varchar",
			DisplayType::Timestamp => "timestamp",
			DisplayType::List => "list",
		}
	}

	/// SQL type used when a column is declared or converted to this type.
	/// Lists have no single scalar declaration.
	pub fn sql_type(&self) -> Option<&'static str> {
		match self {
			DisplayType::Bigint => Some("BIGINT"),
			DisplayType::Double => Some("DOUBLE"),
			DisplayType::Boolean => Some("BOOLEAN"),
			DisplayType::Varchar => Some("VARCHAR"),
			DisplayType::Timestamp => Some("TIMESTAMP"),
			DisplayType::List => None,
		}
	}
}

impl Display for DisplayType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for DisplayType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let lower = s.trim().to_ascii_lowercase();
		DisplayType::ALL
			.into_iter()
			.find(|t| t.as_str() == lower)
			.ok_or_else(|| format!("unknown column type '{s}'"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_from_str_case_insensitive() {
		assert_eq!("BIGINT".parse::<DisplayType>(), Ok(DisplayType::Bigint));
		assert_eq!(" timestamp ".parse::<DisplayType>(), Ok(DisplayType::Timestamp));
		assert!("decimal".parse::<DisplayType>().is_err());
	}

	#[test]
	fn test_display_roundtrips_through_from_str() {
		for t in DisplayType::ALL {
			assert_eq!(t.to_string().parse::<DisplayType>(), Ok(t));
		}
	}

	#[test]
	fn test_list_has_no_scalar_declaration() {
		assert_eq!(DisplayType::List.sql_type(), None);
		assert_eq!(DisplayType::Double.sql_type(), Some("DOUBLE"));
	}
}
