// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Maps engine native types onto the closed set of display types.
//!
//! [`classify`] recognizes the native spellings of the six display types.
//! Anything else goes through [`plan_fix`], which either names the conversion
//! that brings the column into the set or reports that no conversion exists.

use sheetdb_engine::TypeChange;
use sheetdb_type::{
	DisplayType, NativeType,
	value::native_type::NativeShape,
};

const INTEGER_LIKE: &[&str] = &[
	"TINYINT", "SMALLINT", "INTEGER", "INT", "INT1", "INT2", "INT4", "MEDIUMINT", "UTINYINT", "USMALLINT", "UINTEGER",
	"UBIGINT", "HUGEINT", "UHUGEINT",
];

const DECIMAL_LIKE: &[&str] = &["DECIMAL", "NUMERIC", "NUM", "REAL", "FLOAT", "FLOAT4"];

const TEMPORAL_LIKE: &[&str] = &[
	"DATE",
	"TIME",
	"TIMETZ",
	"TIME WITH TIME ZONE",
	"TIMESTAMP_S",
	"TIMESTAMP_MS",
	"TIMESTAMP_NS",
	"TIMESTAMPTZ",
	"TIMESTAMP WITH TIME ZONE",
];

fn classify_scalar(base: &str) -> Option<DisplayType> {
	match base {
		"BIGINT" | "INT8" | "LONG" => Some(DisplayType::Bigint),
		"DOUBLE" | "FLOAT8" | "DOUBLE PRECISION" => Some(DisplayType::Double),
		"BOOLEAN" | "BOOL" | "LOGICAL" => Some(DisplayType::Boolean),
		"VARCHAR" | "TEXT" | "STRING" | "CHAR" | "BPCHAR" => Some(DisplayType::Varchar),
		"TIMESTAMP" | "DATETIME" => Some(DisplayType::Timestamp),
		_ => None,
	}
}

/// The display type of a native type, `None` when it is outside the set.
pub fn classify(native: &NativeType) -> Option<DisplayType> {
	match native.shape() {
		NativeShape::Scalar(base) => classify_scalar(&base),
		NativeShape::List(element) => classify(&element).map(|_| DisplayType::List),
		NativeShape::Array(..) => None,
	}
}

fn fix_scalar(base: &str) -> Option<&'static str> {
	if INTEGER_LIKE.contains(&base) {
		Some("BIGINT")
	} else if DECIMAL_LIKE.contains(&base) {
		Some("DOUBLE")
	} else if TEMPORAL_LIKE.contains(&base) {
		Some("TIMESTAMP")
	} else {
		None
	}
}

/// Native declaration of a list element once it is in the supported set.
fn element_declaration(element: &NativeType) -> Option<String> {
	if classify(element).is_some() {
		return Some(element.as_str().to_string());
	}
	plan_fix(element).map(|change| change.sql_type)
}

/// The conversion bringing `native` into the supported set. `None` for
/// supported types and for types no conversion exists for.
pub fn plan_fix(native: &NativeType) -> Option<TypeChange> {
	if classify(native).is_some() {
		return None;
	}
	match native.shape() {
		NativeShape::Scalar(base) => fix_scalar(&base).map(TypeChange::to),
		NativeShape::List(element) | NativeShape::Array(element, _) => {
			element_declaration(&element).map(|element| TypeChange::to(format!("{element}[]")))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn native(tag: &str) -> NativeType {
		NativeType::new(tag)
	}

	mod classify {
		use super::*;

		#[test]
		fn test_supported_spellings() {
			assert_eq!(classify(&native("BIGINT")), Some(DisplayType::Bigint));
			assert_eq!(classify(&native("double")), Some(DisplayType::Double));
			assert_eq!(classify(&native("BOOLEAN")), Some(DisplayType::Boolean));
			assert_eq!(classify(&native("VARCHAR(255)")), Some(DisplayType::Varchar));
			assert_eq!(classify(&native("TEXT")), Some(DisplayType::Varchar));
			assert_eq!(classify(&native("TIMESTAMP")), Some(DisplayType::Timestamp));
			assert_eq!(classify(&native("VARCHAR[]")), Some(DisplayType::List));
		}

		#[test]
		fn test_outside_the_set() {
			for tag in ["INTEGER", "DECIMAL(18,3)", "DATE", "SMALLINT[]", "BIGINT[3]", "BLOB", "STRUCT(a INT)"] {
				assert_eq!(classify(&native(tag)), None, "{tag}");
			}
		}
	}

	mod plan_fix {
		use super::*;

		fn target(tag: &str) -> Option<String> {
			plan_fix(&native(tag)).map(|change| change.sql_type)
		}

		#[test]
		fn test_fix_classes() {
			assert_eq!(target("INTEGER").as_deref(), Some("BIGINT"));
			assert_eq!(target("HUGEINT").as_deref(), Some("BIGINT"));
			assert_eq!(target("DECIMAL(18,3)").as_deref(), Some("DOUBLE"));
			assert_eq!(target("REAL").as_deref(), Some("DOUBLE"));
			assert_eq!(target("DATE").as_deref(), Some("TIMESTAMP"));
			assert_eq!(target("TIMESTAMP WITH TIME ZONE").as_deref(), Some("TIMESTAMP"));
		}

		#[test]
		fn test_lists_and_arrays() {
			assert_eq!(target("SMALLINT[]").as_deref(), Some("BIGINT[]"));
			assert_eq!(target("VARCHAR[4]").as_deref(), Some("VARCHAR[]"));
			assert_eq!(target("DATE[2]").as_deref(), Some("TIMESTAMP[]"));
			assert_eq!(target("BLOB[]"), None);
		}

		#[test]
		fn test_supported_needs_no_fix() {
			assert_eq!(target("BIGINT"), None);
			assert_eq!(target("BIGINT[]"), None);
		}

		#[test]
		fn test_unfixable() {
			assert_eq!(target("BLOB"), None);
			assert_eq!(target("INTERVAL"), None);
			assert_eq!(target("STRUCT(a INTEGER)"), None);
		}

		#[test]
		fn test_fix_converges() {
			for tag in ["INTEGER", "DECIMAL(4,1)", "DATE", "SMALLINT[]", "INTEGER[3]", "DATE[]"] {
				let fixed = plan_fix(&native(tag)).unwrap();
				assert!(classify(&native(&fixed.sql_type)).is_some(), "{tag} -> {}", fixed.sql_type);
			}
		}
	}
}
