// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use super::Diagnostic;

pub fn io_error(err: std::io::Error) -> Diagnostic {
	let mut result = Diagnostic::new("IO_001", format!("I/O error: {err}"));
	result.label = Some(format!("{:?}", err.kind()));
	result
}
