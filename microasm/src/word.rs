//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::fmt::Display;

use crate::registry::WORD_BITS;

/// A run of bits inside the control word holding a binary number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
	pub offset: usize,
	pub width: usize,
}

impl Field {
	pub fn fits(&self, value: u64) -> bool {
		self.width >= u64::BITS as usize || (value >> self.width) == 0
	}

	/// Word indices of the bits set in `value`, least significant bit at `offset`.
	pub fn bits(self, value: u64) -> impl Iterator<Item = usize> {
		(0..self.width)
			.filter(move |&bit| (value >> bit) & 1 != 0)
			.map(move |bit| self.offset + bit)
	}
}

/// One control store word. Bit `i` drives control line `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MicroWord(u128);

impl MicroWord {
	/// The word with no control line asserted.
	pub const IDLE: Self = Self(0);

	/// Builds a word asserting every listed bit. Repeated bits are harmless.
	pub fn from_bits<I>(bits: I) -> Self
	where
		I: IntoIterator<Item = usize>,
	{
		let mut word = 0u128;

		for bit in bits {
			debug_assert!(bit < WORD_BITS, "bit {} is outside the control word", bit);
			word |= 1u128 << bit;
		}

		Self(word)
	}

	pub fn is_set(&self, bit: usize) -> bool {
		bit < WORD_BITS && (self.0 >> bit) & 1 != 0
	}

	/// Indices of the asserted bits, in ascending order.
	pub fn bits(self) -> impl Iterator<Item = usize> {
		(0..WORD_BITS).filter(move |&bit| self.is_set(bit))
	}

	/// Reads back the number stored in `field`.
	pub fn field(&self, field: Field) -> u64 {
		(0..field.width)
			.filter(|&bit| self.is_set(field.offset + bit))
			.fold(0u64, |acc, bit| acc | (1u64 << bit))
	}
}

impl Display for MicroWord {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let rendered: String = (0..WORD_BITS)
			.map(|bit| if self.is_set(bit) { '1' } else { '0' })
			.collect();

		f.write_str(&rendered)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_idle_word() {
		let rendered = MicroWord::IDLE.to_string();
		assert_eq!(rendered.len(), 69);
		assert!(rendered.chars().all(|c| c == '0'));
	}

	#[test]
	fn test_bit_positions() {
		let rendered = MicroWord::from_bits([0, 8, 68]).to_string();
		assert_eq!(rendered.len(), 69);
		assert_eq!(&rendered[0..1], "1");
		assert_eq!(&rendered[8..9], "1");
		assert_eq!(&rendered[68..69], "1");
		assert_eq!(rendered.matches('1').count(), 3);
	}

	#[test]
	fn test_repeated_bits_are_idempotent() {
		assert_eq!(
			MicroWord::from_bits([50, 8, 50, 8]),
			MicroWord::from_bits([8, 50])
		);
	}

	#[test]
	fn test_field_is_lsb_first() {
		let field = Field {
			offset: 5,
			width: 8,
		};
		assert_eq!(field.bits(0b110).collect::<Vec<_>>(), vec![6, 7]);

		let word = MicroWord::from_bits(field.bits(200));
		assert_eq!(word.field(field), 200);
		assert_eq!(word.bits().collect::<Vec<_>>(), vec![8, 11, 12]);
	}

	#[test]
	fn test_field_fits() {
		let field = Field {
			offset: 1,
			width: 4,
		};
		assert!(field.fits(15));
		assert!(!field.fits(16));
	}
}
