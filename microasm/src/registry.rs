//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

//! Symbol tables for the control word layout.

use std::{collections::HashMap, fmt::Display};

use lazy_static::lazy_static;

use crate::{error::ErrorKind, word::Field};

bit_fields! {
	word WORD_BITS = 69;

	/// Bit 0 turns the word into a jump; the address fields below overlay
	/// the mux and register A lines while it is set.
	JUMP_CONTROL: bits {
		select = 0,
	}

	/// ALU function lines.
	ALU_COMMANDS: bits {
		add = 50,
		notL = 51,
		notR = 52,
		incL = 53,
		decL = 54,
		incR = 55,
		decR = 56,
		xor = 57,
		end = 67,
		dec = 68,
	}

	/// Multiplexer inputs that can drive the ALU/bus.
	MUX_SELECTS: bits {
		in = 1,
		A = 2,
		B = 3,
		C = 4,
		D = 5,
		E = 6,
		F = 7,
	}

	/// First line of each register's command block.
	REGISTERS: bits[7] {
		A = 8,
		B = 15,
		C = 22,
		D = 29,
		E = 36,
		F = 43,
	}

	/// Offsets within a register block.
	REGISTER_COMMANDS: offsets[7] {
		in = 0,
		LL1 = 1,
		LR1 = 2,
		AL1 = 3,
		AR1 = 4,
		CL1 = 5,
		CR1 = 6,
	}

	/// Branch conditions, encoded into the flag field of a jump.
	FLAGS: values[4] {
		AH = 1,
		AL = 2,
		BH = 3,
		BL = 4,
		CH = 5,
		CL = 6,
		DH = 7,
		DL = 8,
		EH = 9,
		EL = 10,
		FH = 11,
		FL = 12,
		CNT = 13,
		ALU = 14,
		false = 15,
	}

	RESET_TARGETS: bits {
		A = 58,
		B = 59,
		C = 60,
		D = 61,
		E = 62,
		F = 63,
		CNT = 64,
		ROM = 65,
		FLAG = 66,
	}
}

pub const JUMP_SELECT: usize = JUMP_CONTROL[0].1 as usize;

pub const FLAG_FIELD: Field = Field {
	offset: 1,
	width: FLAGS_WIDTH as usize,
};

pub const DESTINATION_FIELD: Field = Field {
	offset: 5,
	width: 8,
};

/// Flag used by jumps that don't name one.
pub const ALWAYS_FLAG: &str = "false";

/// Register latched by ALU results.
pub const ACCUMULATOR: &str = "A";

/// Register command that loads the register from the bus.
pub const LOAD: &str = "in";

/// Mov source that reads memory/bus directly instead of going through the mux.
pub const DIRECT_MEMORY: &str = "M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
	Command,
	Mux,
	Register,
	RegisterCommand,
	Flag,
	Reset,
}

impl Category {
	pub const ALL: [Category; 6] = [
		Self::Command,
		Self::Mux,
		Self::Register,
		Self::RegisterCommand,
		Self::Flag,
		Self::Reset,
	];

	fn table(&self) -> &'static [(&'static str, u8)] {
		match self {
			Self::Command => ALU_COMMANDS,
			Self::Mux => MUX_SELECTS,
			Self::Register => REGISTERS,
			Self::RegisterCommand => REGISTER_COMMANDS,
			Self::Flag => FLAGS,
			Self::Reset => RESET_TARGETS,
		}
	}
}

impl Display for Category {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"{}",
			match self {
				Self::Command => "ALU command",
				Self::Mux => "mux select",
				Self::Register => "register",
				Self::RegisterCommand => "register command",
				Self::Flag => "flag",
				Self::Reset => "reset target",
			}
		)
	}
}

lazy_static! {
	static ref SYMBOLS: HashMap<Category, HashMap<&'static str, u8>> = Category::ALL
		.iter()
		.map(|category| (*category, category.table().iter().copied().collect()))
		.collect();
}

pub fn lookup(category: Category, name: &str) -> Result<usize, ErrorKind> {
	SYMBOLS
		.get(&category)
		.and_then(|table| table.get(name))
		.map(|&index| index as usize)
		.ok_or_else(|| ErrorKind::UnknownSymbol {
			category,
			name: name.to_owned(),
		})
}

/// The line that issues `command` to `register`.
pub fn register_command_bit(register: &str, command: &str) -> Result<usize, ErrorKind> {
	Ok(lookup(Category::Register, register)? + lookup(Category::RegisterCommand, command)?)
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;

	#[test]
	fn test_lookup() {
		assert_eq!(lookup(Category::Command, "add"), Ok(50));
		assert_eq!(lookup(Category::Mux, "in"), Ok(1));
		assert_eq!(lookup(Category::Flag, "false"), Ok(15));
		assert_eq!(lookup(Category::Reset, "ROM"), Ok(65));
	}

	#[test]
	fn test_lookup_unknown() {
		assert_eq!(
			lookup(Category::Register, "G"),
			Err(ErrorKind::UnknownSymbol {
				category: Category::Register,
				name: "G".to_owned(),
			})
		);
		// names are case sensitive
		assert!(lookup(Category::Reset, "rom").is_err());
	}

	#[test]
	fn test_register_command_bit() {
		assert_eq!(register_command_bit("A", "in"), Ok(8));
		assert_eq!(register_command_bit("B", "LL1"), Ok(16));
		assert_eq!(register_command_bit("F", "CR1"), Ok(49));
		assert!(register_command_bit("A", "XX").is_err());
	}

	#[test]
	fn test_categories_are_disjoint() {
		let block = REGISTERS_WIDTH as usize;
		let mut owned = Vec::new();

		owned.push(JUMP_SELECT);
		for table in [ALU_COMMANDS, MUX_SELECTS, RESET_TARGETS] {
			owned.extend(table.iter().map(|&(_, bit)| bit as usize));
		}
		for &(_, base) in REGISTERS {
			owned.extend((base as usize)..(base as usize + block));
		}

		let unique: HashSet<_> = owned.iter().copied().collect();
		assert_eq!(unique.len(), owned.len());
		assert!(owned.iter().all(|&bit| bit < WORD_BITS));
	}

	#[test]
	fn test_jump_fields() {
		assert_eq!(JUMP_SELECT, 0);
		assert!(FLAG_FIELD.offset + FLAG_FIELD.width <= DESTINATION_FIELD.offset);
		assert!(DESTINATION_FIELD.offset + DESTINATION_FIELD.width <= WORD_BITS);
		assert!(lookup(Category::Flag, ALWAYS_FLAG).is_ok());
	}
}
