//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::{collections::HashMap, fmt::Display, iter};

use lazy_static::lazy_static;

use crate::{
	error::{Arity, ErrorKind},
	labels::LabelTable,
	registry::{
		lookup, register_command_bit, Category, ACCUMULATOR, ALWAYS_FLAG, DESTINATION_FIELD,
		DIRECT_MEMORY, FLAG_FIELD, JUMP_SELECT, LOAD,
	},
	syntax::Statement,
	word::{Field, MicroWord},
};

/// ALU input an operation works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
	L,
	R,
}

impl Side {
	fn parse(mnemonic: Mnemonic, operand: &str) -> Result<Self, ErrorKind> {
		match operand {
			"L" => Ok(Self::L),
			"R" => Ok(Self::R),
			_ => Err(ErrorKind::InvalidOperand {
				mnemonic: mnemonic.name(),
				operand: operand.to_owned(),
				reason: "expected \"L\" or \"R\"",
			}),
		}
	}
}

impl Display for Side {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::L => write!(f, "L"),
			Self::R => write!(f, "R"),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftKind {
	LogicalLeft,
	LogicalRight,
	ArithmeticLeft,
	ArithmeticRight,
	RotateLeft,
	RotateRight,
}

impl ShiftKind {
	/// Name of the register command performing this shift.
	pub const fn register_command(&self) -> &'static str {
		match self {
			Self::LogicalLeft => "LL1",
			Self::LogicalRight => "LR1",
			Self::ArithmeticLeft => "AL1",
			Self::ArithmeticRight => "AR1",
			Self::RotateLeft => "CL1",
			Self::RotateRight => "CR1",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
	End,
	Add,
	Nop,
	Xor,
	Inc,
	Dec,
	Not,
	Mov,
	Jmp,
	Res,
	Shift(ShiftKind),
}

impl Mnemonic {
	pub const ALL: [Mnemonic; 16] = [
		Self::End,
		Self::Add,
		Self::Nop,
		Self::Xor,
		Self::Inc,
		Self::Dec,
		Self::Not,
		Self::Mov,
		Self::Jmp,
		Self::Res,
		Self::Shift(ShiftKind::LogicalLeft),
		Self::Shift(ShiftKind::LogicalRight),
		Self::Shift(ShiftKind::ArithmeticLeft),
		Self::Shift(ShiftKind::ArithmeticRight),
		Self::Shift(ShiftKind::RotateLeft),
		Self::Shift(ShiftKind::RotateRight),
	];

	pub const fn name(&self) -> &'static str {
		match self {
			Self::End => "end",
			Self::Add => "add",
			Self::Nop => "nop",
			Self::Xor => "xor",
			Self::Inc => "inc",
			Self::Dec => "dec",
			Self::Not => "not",
			Self::Mov => "mov",
			Self::Jmp => "jmp",
			Self::Res => "res",
			Self::Shift(ShiftKind::LogicalLeft) => "shl",
			Self::Shift(ShiftKind::LogicalRight) => "shr",
			Self::Shift(ShiftKind::ArithmeticLeft) => "sal",
			Self::Shift(ShiftKind::ArithmeticRight) => "sar",
			Self::Shift(ShiftKind::RotateLeft) => "rol",
			Self::Shift(ShiftKind::RotateRight) => "ror",
		}
	}

	pub const fn arity(&self) -> Arity {
		match self {
			Self::End | Self::Add | Self::Nop => Arity::Exact(0),
			Self::Xor | Self::Inc | Self::Not | Self::Shift(_) => Arity::Exact(1),
			Self::Dec => Arity::Range(0, 1),
			Self::Mov => Arity::AtLeast(2),
			Self::Jmp => Arity::Range(1, 2),
			Self::Res => Arity::AtLeast(0),
		}
	}
}

lazy_static! {
	static ref MNEMONICS: HashMap<&'static str, Mnemonic> = Mnemonic::ALL
		.iter()
		.map(|mnemonic| (mnemonic.name(), *mnemonic))
		.collect();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source<'a> {
	/// Memory/bus read that bypasses the mux.
	DirectMemory,
	Mux(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination<'a> {
	/// Feed the ALU input without writing any register.
	AluInput,
	Registers(Vec<&'a str>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
	Literal(u64),
	Symbol(&'a str),
}

impl<'a> Value<'a> {
	fn parse(mnemonic: Mnemonic, operand: &'a str) -> Result<Self, ErrorKind> {
		if !operand.bytes().all(|byte| byte.is_ascii_digit()) {
			return Ok(Self::Symbol(operand));
		}

		operand
			.parse()
			.map(Self::Literal)
			.map_err(|_| ErrorKind::InvalidOperand {
				mnemonic: mnemonic.name(),
				operand: operand.to_owned(),
				reason: "number is too large",
			})
	}
}

/// A validated instruction, ready to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation<'a> {
	End,
	Add,
	Nop,
	Xor(Side),
	Inc(Side),
	Dec(Option<Side>),
	Not(Side),
	Mov {
		source: Source<'a>,
		destination: Destination<'a>,
	},
	Jmp {
		target: Value<'a>,
		flag: Option<Value<'a>>,
	},
	Res(Vec<&'a str>),
	Shift {
		kind: ShiftKind,
		register: &'a str,
	},
}

impl<'a> Operation<'a> {
	pub fn parse(statement: &Statement<'a>) -> Result<Self, ErrorKind> {
		let mnemonic = MNEMONICS
			.get(statement.mnemonic)
			.copied()
			.ok_or_else(|| ErrorKind::UnknownOperation(statement.mnemonic.to_owned()))?;

		let operands: Vec<&'a str> = statement.operands().collect();
		let arity_error = || ErrorKind::OperandArity {
			mnemonic: mnemonic.name(),
			expected: mnemonic.arity(),
			given: operands.len(),
		};

		if !mnemonic.arity().accepts(operands.len()) {
			return Err(arity_error());
		}

		Ok(match (mnemonic, operands.as_slice()) {
			(Mnemonic::End, []) => Self::End,
			(Mnemonic::Add, []) => Self::Add,
			(Mnemonic::Nop, []) => Self::Nop,

			// the operand is checked but there's only one xor line to drive
			(Mnemonic::Xor, [side]) => Self::Xor(Side::parse(mnemonic, side)?),
			(Mnemonic::Inc, [side]) => Self::Inc(Side::parse(mnemonic, side)?),
			(Mnemonic::Not, [side]) => Self::Not(Side::parse(mnemonic, side)?),
			(Mnemonic::Dec, []) => Self::Dec(None),
			(Mnemonic::Dec, [side]) => Self::Dec(Some(Side::parse(mnemonic, side)?)),

			(Mnemonic::Mov, [source, destination @ ..]) => Self::Mov {
				source: if *source == DIRECT_MEMORY {
					Source::DirectMemory
				} else {
					Source::Mux(*source)
				},
				destination: match destination {
					["L"] => Destination::AluInput,
					["L", extra, ..] => {
						return Err(ErrorKind::InvalidOperand {
							mnemonic: mnemonic.name(),
							operand: (*extra).to_owned(),
							reason: "\"L\" must be the only destination",
						})
					},
					registers => Destination::Registers(registers.to_vec()),
				},
			},

			(Mnemonic::Jmp, [target, flag @ ..]) => Self::Jmp {
				target: Value::parse(mnemonic, *target)?,
				flag: match flag.first() {
					Some(flag) => Some(Value::parse(mnemonic, *flag)?),
					None => None,
				},
			},

			(Mnemonic::Res, targets) => Self::Res(targets.to_vec()),

			(Mnemonic::Shift(kind), [register]) => Self::Shift {
				kind,
				register: *register,
			},

			_ => return Err(arity_error()),
		})
	}

	pub fn encode(&self, labels: &LabelTable) -> Result<MicroWord, ErrorKind> {
		let command = |name: &str| lookup(Category::Command, name);
		let latch = || register_command_bit(ACCUMULATOR, LOAD);

		let bits: Vec<usize> = match self {
			Self::End => vec![command("end")?],
			Self::Add => vec![command("add")?, latch()?],
			Self::Nop => vec![],
			Self::Xor(_) => vec![command("xor")?, latch()?],
			Self::Inc(side) => vec![command(&format!("inc{}", side))?, latch()?],
			Self::Not(side) => vec![command(&format!("not{}", side))?, latch()?],
			Self::Dec(None) => vec![command("dec")?],
			Self::Dec(Some(side)) => vec![command(&format!("dec{}", side))?, latch()?],

			Self::Mov {
				source,
				destination,
			} => {
				let mut bits = Vec::new();

				if let Source::Mux(name) = source {
					bits.push(lookup(Category::Mux, name)?);
				}

				if let Destination::Registers(registers) = destination {
					for register in registers {
						bits.push(register_command_bit(register, LOAD)?);
					}
				}

				bits
			},

			Self::Jmp { target, flag } => {
				let destination = match target {
					Value::Literal(address) => *address,
					Value::Symbol(label) => labels
						.resolve(label)
						.ok_or_else(|| ErrorKind::UnresolvedLabel((*label).to_owned()))?
						as u64,
				};

				let flag = match flag {
					Some(Value::Literal(code)) => *code,
					Some(Value::Symbol(name)) => lookup(Category::Flag, name)? as u64,
					None => lookup(Category::Flag, ALWAYS_FLAG)? as u64,
				};

				check_field(DESTINATION_FIELD, destination, "does not fit in the destination field")?;
				check_field(FLAG_FIELD, flag, "does not fit in the flag field")?;

				iter::once(JUMP_SELECT)
					.chain(DESTINATION_FIELD.bits(destination))
					.chain(FLAG_FIELD.bits(flag))
					.collect()
			},

			Self::Res(targets) => targets
				.iter()
				.map(|target| lookup(Category::Reset, target))
				.collect::<Result<_, _>>()?,

			Self::Shift { kind, register } => {
				vec![register_command_bit(register, kind.register_command())?]
			},
		};

		Ok(MicroWord::from_bits(bits))
	}
}

fn check_field(field: Field, value: u64, reason: &'static str) -> Result<(), ErrorKind> {
	if field.fits(value) {
		Ok(())
	} else {
		Err(ErrorKind::InvalidOperand {
			mnemonic: Mnemonic::Jmp.name(),
			operand: value.to_string(),
			reason,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{registry::Category, syntax::tokenize};

	fn encode_with(text: &str, labels: &LabelTable) -> Result<Vec<usize>, ErrorKind> {
		let statement = tokenize(text)?;
		let word = Operation::parse(&statement)?.encode(labels)?;
		Ok(word.bits().collect())
	}

	fn encode(text: &str) -> Result<Vec<usize>, ErrorKind> {
		encode_with(text, &LabelTable::new())
	}

	fn invalid(text: &str) -> bool {
		matches!(encode(text), Err(ErrorKind::InvalidOperand { .. }))
	}

	fn wrong_arity(text: &str) -> bool {
		matches!(encode(text), Err(ErrorKind::OperandArity { .. }))
	}

	#[test]
	fn test_no_operand_operations() {
		assert_eq!(encode("end"), Ok(vec![67]));
		assert_eq!(encode("add"), Ok(vec![8, 50]));
		assert_eq!(encode("nop"), Ok(vec![]));
		assert!(wrong_arity("nop A"));
		assert!(wrong_arity("end 1"));
	}

	#[test]
	fn test_unknown_operation() {
		assert_eq!(
			encode("sub L"),
			Err(ErrorKind::UnknownOperation("sub".to_owned()))
		);
		// mnemonics are case sensitive
		assert!(matches!(encode("ADD"), Err(ErrorKind::UnknownOperation(_))));
	}

	#[test]
	fn test_alu_side_operations() {
		assert_eq!(encode("inc L"), Ok(vec![8, 53]));
		assert_eq!(encode("inc R"), Ok(vec![8, 55]));
		assert_eq!(encode("not L"), Ok(vec![8, 51]));
		assert_eq!(encode("not R"), Ok(vec![8, 52]));
		assert!(invalid("inc A"));
		assert!(invalid("not l"));
		assert!(wrong_arity("inc"));
		assert!(wrong_arity("not L R"));
	}

	#[test]
	fn test_xor_ignores_side() {
		assert_eq!(encode("xor L"), Ok(vec![8, 57]));
		assert_eq!(encode("xor L"), encode("xor R"));
		assert!(invalid("xor B"));
		assert!(wrong_arity("xor"));
	}

	#[test]
	fn test_dec_variants() {
		assert_eq!(encode("dec"), Ok(vec![68]));
		assert_eq!(encode("dec L"), Ok(vec![8, 54]));
		assert_eq!(encode("dec R"), Ok(vec![8, 56]));
		assert!(invalid("dec C"));
		assert!(wrong_arity("dec L R"));
	}

	#[test]
	fn test_mov() {
		assert_eq!(encode("mov A L"), Ok(vec![2]));
		assert_eq!(encode("mov A B"), Ok(vec![2, 15]));
		assert_eq!(encode("mov in A C F"), Ok(vec![1, 8, 22, 43]));
		assert_eq!(encode("mov M B"), Ok(vec![15]));
		assert_eq!(encode("mov M L"), Ok(vec![]));
		assert!(invalid("mov A L B"));
		assert!(wrong_arity("mov A"));
	}

	#[test]
	fn test_mov_unknown_symbols() {
		assert_eq!(
			encode("mov X B"),
			Err(ErrorKind::UnknownSymbol {
				category: Category::Mux,
				name: "X".to_owned(),
			})
		);
		assert_eq!(
			encode("mov A B G"),
			Err(ErrorKind::UnknownSymbol {
				category: Category::Register,
				name: "G".to_owned(),
			})
		);
	}

	#[test]
	fn test_jmp_literals() {
		// selector, flag 15 in bits 1-4, destination 3 in bits 5-6
		assert_eq!(encode("jmp 3"), Ok(vec![0, 1, 2, 3, 4, 5, 6]));
		assert_eq!(encode("jmp 0 AH"), Ok(vec![0, 1]));
		assert_eq!(encode("jmp 128 ALU"), Ok(vec![0, 2, 3, 4, 12]));
		assert_eq!(encode("jmp 255 0"), Ok(vec![0, 5, 6, 7, 8, 9, 10, 11, 12]));
		assert_eq!(encode("jmp 1 false"), encode("jmp 1"));
	}

	#[test]
	fn test_jmp_range() {
		assert!(invalid("jmp 256"));
		assert!(invalid("jmp 1 16"));
		assert!(invalid("jmp 99999999999999999999999"));
		assert!(wrong_arity("jmp"));
		assert!(wrong_arity("jmp 1 AH 2"));
		assert!(matches!(
			encode("jmp 1 XX"),
			Err(ErrorKind::UnknownSymbol {
				category: Category::Flag,
				..
			})
		));
	}

	#[test]
	fn test_jmp_labels() {
		let mut labels = LabelTable::new();
		labels.define("top", 0, 1).unwrap();
		labels.define("exit", 6, 9).unwrap();
		labels.define("far", 300, 12).unwrap();

		assert_eq!(encode_with("jmp top", &labels), encode("jmp 0"));
		assert_eq!(encode_with("jmp exit CNT", &labels), encode("jmp 6 13"));
		assert_eq!(
			encode_with("jmp nowhere", &labels),
			Err(ErrorKind::UnresolvedLabel("nowhere".to_owned()))
		);
		assert!(matches!(
			encode_with("jmp far", &labels),
			Err(ErrorKind::InvalidOperand { .. })
		));
	}

	#[test]
	fn test_res() {
		assert_eq!(encode("res"), Ok(vec![]));
		assert_eq!(encode("res A CNT FLAG"), Ok(vec![58, 64, 66]));
		assert_eq!(encode("res ROM ROM"), Ok(vec![65]));
		assert!(matches!(
			encode("res A Q"),
			Err(ErrorKind::UnknownSymbol {
				category: Category::Reset,
				..
			})
		));
	}

	#[test]
	fn test_shifts() {
		assert_eq!(encode("shl A"), Ok(vec![9]));
		assert_eq!(encode("shr B"), Ok(vec![17]));
		assert_eq!(encode("sal C"), Ok(vec![25]));
		assert_eq!(encode("sar D"), Ok(vec![33]));
		assert_eq!(encode("rol E"), Ok(vec![41]));
		assert_eq!(encode("ror F"), Ok(vec![49]));
		assert!(wrong_arity("shl"));
		assert!(wrong_arity("ror A B"));
		assert!(matches!(
			encode("shl L"),
			Err(ErrorKind::UnknownSymbol { .. })
		));
	}

	#[test]
	fn test_mnemonic_table() {
		assert_eq!(MNEMONICS.len(), Mnemonic::ALL.len());
		for mnemonic in Mnemonic::ALL {
			assert_eq!(MNEMONICS.get(mnemonic.name()), Some(&mnemonic));
		}
	}
}
