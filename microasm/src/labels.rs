//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::collections::HashMap;

use crate::{
	error::{Error, ErrorKind},
	strip::SourceLine,
	syntax::parse_label,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label {
	pub address: usize,
	/// Line the label was defined on.
	pub line: usize,
}

/// Label addresses for a single assembly run.
#[derive(Debug, Clone, Default)]
pub struct LabelTable<'a> {
	labels: HashMap<&'a str, Label>,
}

impl<'a> LabelTable<'a> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn define(&mut self, name: &'a str, address: usize, line: usize) -> Result<(), ErrorKind> {
		if let Some(existing) = self.labels.get(name) {
			return Err(ErrorKind::DuplicateLabel {
				name: name.to_owned(),
				first_line: existing.line,
			});
		}

		self.labels.insert(name, Label { address, line });
		Ok(())
	}

	pub fn resolve(&self, name: &str) -> Option<usize> {
		self.labels.get(name).map(|label| label.address)
	}

	pub fn len(&self) -> usize {
		self.labels.len()
	}

	pub fn is_empty(&self) -> bool {
		self.labels.is_empty()
	}

	/// All labels, ordered by address and then by definition line.
	pub fn sorted(&self) -> Vec<(&'a str, Label)> {
		let mut labels: Vec<_> = self
			.labels
			.iter()
			.map(|(name, label)| (*name, *label))
			.collect();
		labels.sort_by_key(|(_, label)| (label.address, label.line));
		labels
	}
}

/// Pulls label definitions out of `lines`.
///
/// Every label gets the address of the next instruction line after it. The
/// returned instruction list is in address order, so an instruction's index
/// is its address.
pub fn resolve_labels<'a>(
	lines: Vec<SourceLine<'a>>,
) -> Result<(LabelTable<'a>, Vec<SourceLine<'a>>), Error> {
	let mut labels = LabelTable::new();
	let mut instructions = Vec::with_capacity(lines.len());
	let mut addr = 0usize;

	for line in lines {
		match parse_label(line.text) {
			Some(name) => labels
				.define(name, addr, line.number)
				.map_err(|kind| Error::new(line.number, kind))?,
			None => {
				instructions.push(line);
				addr += 1;
			},
		}
	}

	Ok((labels, instructions))
}
