//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::fmt::Display;

use thiserror::Error;

use crate::registry::Category;

/// Number of operands an operation accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
	Exact(usize),
	Range(usize, usize),
	AtLeast(usize),
}

impl Arity {
	pub fn accepts(&self, count: usize) -> bool {
		match *self {
			Self::Exact(n) => count == n,
			Self::Range(min, max) => count >= min && count <= max,
			Self::AtLeast(min) => count >= min,
		}
	}
}

impl Display for Arity {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Exact(n) => write!(f, "{}", n),
			Self::Range(min, max) => write!(f, "{} to {}", min, max),
			Self::AtLeast(min) => write!(f, "at least {}", min),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
	#[error("cannot parse \"{0}\"")]
	Parse(String),

	#[error("unknown operation \"{0}\"")]
	UnknownOperation(String),

	#[error("\"{mnemonic}\" takes {expected} operand(s) but was given {given}")]
	OperandArity {
		mnemonic: &'static str,
		expected: Arity,
		given: usize,
	},

	#[error("invalid operand \"{operand}\" for \"{mnemonic}\": {reason}")]
	InvalidOperand {
		mnemonic: &'static str,
		operand: String,
		reason: &'static str,
	},

	#[error("unknown {category} \"{name}\"")]
	UnknownSymbol { category: Category, name: String },

	#[error("unresolved label \"{0}\"")]
	UnresolvedLabel(String),

	#[error("label \"{name}\" is already defined on line {first_line}")]
	DuplicateLabel { name: String, first_line: usize },
}

/// A fatal assembly error, tagged with the 1-based source line it came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}: {kind}")]
pub struct Error {
	pub line: usize,
	pub kind: ErrorKind,
}

impl Error {
	pub fn new(line: usize, kind: ErrorKind) -> Self {
		Self { line, kind }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_arity_accepts() {
		assert!(Arity::Exact(0).accepts(0));
		assert!(!Arity::Exact(1).accepts(2));
		assert!(Arity::Range(0, 1).accepts(1));
		assert!(!Arity::Range(1, 2).accepts(0));
		assert!(Arity::AtLeast(2).accepts(7));
		assert!(!Arity::AtLeast(2).accepts(1));
	}

	#[test]
	fn test_error_display() {
		let err = Error::new(
			4,
			ErrorKind::OperandArity {
				mnemonic: "jmp",
				expected: Arity::Range(1, 2),
				given: 3,
			},
		);
		assert_eq!(
			err.to_string(),
			"4: \"jmp\" takes 1 to 2 operand(s) but was given 3"
		);
	}
}
