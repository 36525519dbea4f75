//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use pest::Parser;

use crate::error::ErrorKind;

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct LineParser;

/// An instruction line split into its mnemonic and operand tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement<'a> {
	pub mnemonic: &'a str,
	pub first: Option<&'a str>,
	pub rest: Vec<&'a str>,
}

impl<'a> Statement<'a> {
	pub fn operand_count(&self) -> usize {
		self.first.iter().count() + self.rest.len()
	}

	pub fn operands(&self) -> impl Iterator<Item = &'a str> + '_ {
		self.first.into_iter().chain(self.rest.iter().copied())
	}
}

/// Returns the label name if `text` is a label definition.
pub fn parse_label(text: &str) -> Option<&str> {
	let label_line = LineParser::parse(Rule::label_line, text).ok()?.next()?;
	let label = label_line.into_inner().next()?;

	label.into_inner().next().map(|ident| ident.as_str())
}

pub fn tokenize(text: &str) -> Result<Statement<'_>, ErrorKind> {
	let line = LineParser::parse(Rule::instruction_line, text)
		.ok()
		.and_then(|mut pairs| pairs.next())
		.ok_or_else(|| ErrorKind::Parse(text.to_owned()))?;

	let mut pairs = line.into_inner();
	let mnemonic = pairs
		.next()
		.map(|pair| pair.as_str())
		.ok_or_else(|| ErrorKind::Parse(text.to_owned()))?;

	let mut operands = pairs
		.filter(|pair| pair.as_rule() == Rule::operand)
		.map(|pair| pair.as_str());

	Ok(Statement {
		mnemonic,
		first: operands.next(),
		rest: operands.collect(),
	})
}
