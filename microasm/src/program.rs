//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::{fmt::Display, iter::FusedIterator};

use crate::{
	error::{Error, ErrorKind},
	labels::{resolve_labels, LabelTable},
	operation::Operation,
	strip::{strip, SourceLine},
	syntax::tokenize,
	word::MicroWord,
};

/// One assembled control store entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
	pub address: usize,
	pub word: MicroWord,
	pub source: SourceLine<'a>,
}

/// Formats as a ROM initializer entry: `0 => "0101...",`. The alternate form
/// (`{:#}`) appends the source code as a trailing `--` comment.
impl Display for Record<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} => \"{}\",", self.address, self.word)?;

		if f.alternate() {
			write!(f, " -- {}", self.source.text)?;
		}

		Ok(())
	}
}

/// A source file with its comments stripped and its labels resolved.
///
/// Each `Program` owns the labels of exactly one source, so assembling another
/// source means building another `Program`.
#[derive(Debug, Clone)]
pub struct Program<'a> {
	labels: LabelTable<'a>,
	instructions: Vec<SourceLine<'a>>,
}

impl<'a> Program<'a> {
	pub fn new(source: &'a str) -> Result<Self, Error> {
		Self::from_lines(source.lines())
	}

	pub fn from_lines<I>(lines: I) -> Result<Self, Error>
	where
		I: IntoIterator<Item = &'a str>,
	{
		let (labels, instructions) = resolve_labels(strip(lines))?;

		Ok(Self {
			labels,
			instructions,
		})
	}

	pub fn labels(&self) -> &LabelTable<'a> {
		&self.labels
	}

	/// Number of instructions, i.e. control store words.
	pub fn len(&self) -> usize {
		self.instructions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.instructions.is_empty()
	}

	/// Encodes instructions one at a time, in address order.
	pub fn records(&self) -> Records<'_, 'a> {
		Records {
			program: self,
			addr: 0,
			failed: false,
		}
	}

	/// Encodes every instruction, stopping at the first error.
	pub fn assemble(&self) -> Result<Vec<Record<'a>>, Error> {
		self.records().collect()
	}
}

/// Iterator over the records of a [`Program`]. Yields nothing after an error.
#[derive(Debug, Clone)]
pub struct Records<'p, 'a> {
	program: &'p Program<'a>,
	addr: usize,
	failed: bool,
}

impl<'p, 'a> Iterator for Records<'p, 'a> {
	type Item = Result<Record<'a>, Error>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.failed {
			return None;
		}

		let line = *self.program.instructions.get(self.addr)?;
		let address = self.addr;
		self.addr += 1;

		let result = encode_line(line.text, &self.program.labels)
			.map(|word| Record {
				address,
				word,
				source: line,
			})
			.map_err(|kind| Error::new(line.number, kind));

		self.failed = result.is_err();
		Some(result)
	}
}

impl FusedIterator for Records<'_, '_> {}

fn encode_line(text: &str, labels: &LabelTable) -> Result<MicroWord, ErrorKind> {
	let statement = tokenize(text)?;
	Operation::parse(&statement)?.encode(labels)
}

/// Assembles a whole source file, returning either every record or the first
/// error.
pub fn assemble(source: &str) -> Result<Vec<Record<'_>>, Error> {
	Program::new(source)?.assemble()
}
