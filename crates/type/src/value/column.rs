// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};

use super::display_type::DisplayType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
	pub name: String,
	pub display_type: DisplayType,
	/// Widest rendered value over a sample of rows. Presentation only.
	pub max_char_width: usize,
}

impl Column {
	pub fn new(name: impl Into<String>, display_type: DisplayType) -> Self {
		Self {
			name: name.into(),
			display_type,
			max_char_width: 0,
		}
	}
}
