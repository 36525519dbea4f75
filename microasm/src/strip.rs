//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

pub const COMMENT_MARKER: char = ';';

/// A line of code with its comment removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
	/// 1-based line number in the original source.
	pub number: usize,
	pub text: &'a str,
}

/// Drops comments and lines with no code on them, keeping the line numbers of
/// everything that survives.
pub fn strip<'a, I>(lines: I) -> Vec<SourceLine<'a>>
where
	I: IntoIterator<Item = &'a str>,
{
	lines
		.into_iter()
		.enumerate()
		.filter_map(|(idx, line)| {
			let code = match line.split_once(COMMENT_MARKER) {
				Some((code, _comment)) => code,
				None => line,
			}
			.trim();

			if code.is_empty() {
				None
			} else {
				Some(SourceLine {
					number: idx + 1,
					text: code,
				})
			}
		})
		.collect()
}
