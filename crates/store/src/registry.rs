// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Names of the tables and views that exist in a session.
//!
//! The registry is the only writer of the name set. Every create, rename and
//! drop against the engine goes through it, so it mirrors the engine catalog
//! for the lifetime of the session. Names compare case-insensitively.
//!
//! A sorted table keeps its unsorted rows in a shadow table. Which names are
//! shadows is recorded here, never inferred from the name.

use sheetdb_type::{
	Result, error,
	error::diagnostic::catalog::{table_already_exists, table_not_found},
	return_error,
};

/// Strips every character outside `[A-Za-z0-9_]` and surrounding
/// underscores. A blank result becomes `empty`.
pub fn sanitize(candidate: &str) -> String {
	let kept: String = candidate.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '_').collect();
	let trimmed = kept.trim_matches('_');
	if trimmed.is_empty() {
		"empty".to_string()
	} else {
		trimmed.to_string()
	}
}

/// Suffix of the name a shadow table is reserved under.
pub const SHADOW_SUFFIX: &str = "__unsorted";

#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
	names: Vec<String>,
	/// Sorted tables paired with their shadow.
	shadows: Vec<(String, String)>,
}

impl NameRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn contains(&self, name: &str) -> bool {
		self.position(name).is_some()
	}

	/// The registered spelling of `name`.
	pub fn resolve(&self, name: &str) -> Option<&str> {
		self.position(name).map(|idx| self.names[idx].as_str())
	}

	/// Registered names in registration order, shadows included.
	pub fn names(&self) -> &[String] {
		&self.names
	}

	/// Registered names that are not shadows, in registration order.
	pub fn tables(&self) -> Vec<String> {
		self.names.iter().filter(|name| !self.is_shadow(name)).cloned().collect()
	}

	/// The shadow holding the unsorted rows of `table`, if it is sorted.
	pub fn shadow_of(&self, table: &str) -> Option<&str> {
		self.shadows.iter().find(|(t, _)| t.eq_ignore_ascii_case(table)).map(|(_, shadow)| shadow.as_str())
	}

	pub fn is_shadow(&self, name: &str) -> bool {
		self.shadows.iter().any(|(_, shadow)| shadow.eq_ignore_ascii_case(name))
	}

	/// Reserves a free name for the shadow of `table` and records the pair.
	pub fn reserve_shadow(&mut self, table: &str) -> String {
		let shadow = self.reserve(&format!("{table}{SHADOW_SUFFIX}"), None);
		self.shadows.push((table.to_string(), shadow.clone()));
		shadow
	}

	/// Sanitizes `candidate` and registers the first free name among `base`,
	/// `base_N`, `base_N+1`, ... where `N` starts at `suffix`, or among `base`,
	/// `base_1`, `base_2`, ... without one.
	pub fn reserve(&mut self, candidate: &str, suffix: Option<u32>) -> String {
		let base = sanitize(candidate);
		let mut number = suffix;
		loop {
			let name = match number {
				Some(number) => format!("{base}_{number}"),
				None => base.clone(),
			};
			if !self.contains(&name) {
				self.names.push(name.clone());
				return name;
			}
			number = Some(number.map_or(1, |n| n + 1));
		}
	}

	/// Registers `name` verbatim, for objects whose name is already decided.
	pub fn register(&mut self, name: &str) -> Result<()> {
		if self.contains(name) {
			return_error!(table_already_exists(name));
		}
		self.names.push(name.to_string());
		Ok(())
	}

	/// Forgets `name`, returning whether it was registered. A shadow pairing
	/// on either side goes with it.
	pub fn release(&mut self, name: &str) -> bool {
		self.shadows.retain(|(table, shadow)| !table.eq_ignore_ascii_case(name) && !shadow.eq_ignore_ascii_case(name));
		match self.position(name) {
			Some(idx) => {
				self.names.remove(idx);
				true
			}
			None => false,
		}
	}

	/// Renames in place, keeping the registration order. A change of case
	/// only is allowed.
	pub fn rename(&mut self, from: &str, to: &str) -> Result<()> {
		let Some(idx) = self.position(from) else {
			return Err(error!(table_not_found(from)));
		};
		if let Some(existing) = self.position(to) {
			if existing != idx {
				return Err(error!(table_already_exists(to)));
			}
		}
		for (table, shadow) in &mut self.shadows {
			if table.eq_ignore_ascii_case(from) {
				*table = to.to_string();
			} else if shadow.eq_ignore_ascii_case(from) {
				*shadow = to.to_string();
			}
		}
		self.names[idx] = to.to_string();
		Ok(())
	}

	fn position(&self, name: &str) -> Option<usize> {
		self.names.iter().position(|n| n.eq_ignore_ascii_case(name))
	}
}
