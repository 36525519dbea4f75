//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::collections::{HashMap, HashSet};

use proc_macro2::{Ident, Span, TokenStream};
use quote::{format_ident, quote};
use syn::{
	braced, bracketed,
	ext::IdentExt,
	parse::{Parse, ParseStream},
	parse_macro_input,
	punctuated::Punctuated,
	Attribute, LitInt, Token,
};

mod kw {
	use syn::custom_keyword;

	custom_keyword!(word);
	custom_keyword!(bits);
	custom_keyword!(offsets);
	custom_keyword!(values);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableKind {
	/// Every entry owns the single bit named by its value.
	Bits,
	/// Every entry owns a block of this many bits starting at its value.
	Blocks(u64),
	/// Entries are offsets into a block of this many bits and own nothing.
	Offsets(u64),
	/// Entries are values of a field this many bits wide and own nothing.
	Values(u64),
}

impl TableKind {
	fn width(&self) -> Option<u64> {
		match self {
			Self::Bits => None,
			Self::Blocks(width) | Self::Offsets(width) | Self::Values(width) => Some(*width),
		}
	}
}

#[derive(Debug, Clone)]
struct Entry {
	name: Ident,
	value: u64,
	value_span: Span,
}

struct Table {
	attrs: Vec<Attribute>,
	name: Ident,
	kind: TableKind,
	entries: Vec<Entry>,
}

struct Layout {
	word_name: Ident,
	word_bits: u64,
	word_span: Span,
	tables: Vec<Table>,
}

fn parse_width(input: ParseStream) -> syn::Result<Option<u64>> {
	if !input.peek(syn::token::Bracket) {
		return Ok(None);
	}

	let content;
	bracketed!(content in input);
	let lit: LitInt = content.parse()?;
	let width: u64 = lit.base10_parse()?;

	if width == 0 {
		return Err(syn::Error::new(lit.span(), "Width must be nonzero"));
	}

	Ok(Some(width))
}

fn require_width(input: ParseStream, span: Span) -> syn::Result<u64> {
	match parse_width(input)? {
		Some(width) => Ok(width),
		None => Err(syn::Error::new(
			span,
			"Expected a bracketed width (e.g. \"[4]\")",
		)),
	}
}

impl Parse for Entry {
	fn parse(input: ParseStream) -> syn::Result<Self> {
		// symbol names like `in` and `false` are keywords
		let name = input.call(Ident::parse_any)?;
		input.parse::<Token![=]>()?;
		let lit: LitInt = input.parse()?;

		Ok(Self {
			name: name.unraw(),
			value: lit.base10_parse()?,
			value_span: lit.span(),
		})
	}
}

impl Parse for Table {
	fn parse(input: ParseStream) -> syn::Result<Self> {
		let attrs = input.call(Attribute::parse_outer)?;
		let name: Ident = input.parse()?;
		input.parse::<Token![:]>()?;

		let kind_span = input.span();
		let kind = if input.peek(kw::bits) {
			input.parse::<kw::bits>()?;
			match parse_width(input)? {
				Some(width) => TableKind::Blocks(width),
				None => TableKind::Bits,
			}
		} else if input.peek(kw::offsets) {
			input.parse::<kw::offsets>()?;
			TableKind::Offsets(require_width(input, kind_span)?)
		} else if input.peek(kw::values) {
			input.parse::<kw::values>()?;
			TableKind::Values(require_width(input, kind_span)?)
		} else {
			return Err(input.error("Expected \"bits\", \"offsets\", or \"values\""));
		};

		let content;
		braced!(content in input);
		let entries = Punctuated::<Entry, Token![,]>::parse_terminated(&content)?
			.into_iter()
			.collect();

		Ok(Self {
			attrs,
			name,
			kind,
			entries,
		})
	}
}

impl Parse for Layout {
	fn parse(input: ParseStream) -> syn::Result<Self> {
		input.parse::<kw::word>()?;
		let word_name: Ident = input.parse()?;
		input.parse::<Token![=]>()?;
		let word_lit: LitInt = input.parse()?;
		input.parse::<Token![;]>()?;

		let mut tables = Vec::new();
		while !input.is_empty() {
			tables.push(input.parse()?);
		}

		Ok(Self {
			word_name,
			word_bits: word_lit.base10_parse()?,
			word_span: word_lit.span(),
			tables,
		})
	}
}

/// Rejects layouts where two entries own the same bit, an owned bit falls
/// outside the word, or an offset/value does not fit its declared width.
fn check(layout: &Layout) -> syn::Result<()> {
	if layout.word_bits == 0 || layout.word_bits > 128 {
		return Err(syn::Error::new(
			layout.word_span,
			"Word width must be within 1-128 bits",
		));
	}

	let mut owners: HashMap<u64, String> = HashMap::new();

	for table in &layout.tables {
		let mut names = HashSet::new();

		for entry in &table.entries {
			let qualified = format!("{}.{}", table.name, entry.name);

			if !names.insert(entry.name.to_string()) {
				return Err(syn::Error::new(
					entry.name.span(),
					format!("Duplicate entry \"{}\"", qualified),
				));
			}

			if entry.value > u8::MAX as u64 {
				return Err(syn::Error::new(
					entry.value_span,
					format!("Value of \"{}\" does not fit in a byte", qualified),
				));
			}

			let owned = match table.kind {
				TableKind::Bits => entry.value..(entry.value + 1),
				TableKind::Blocks(width) => entry.value..(entry.value + width),
				TableKind::Offsets(width) => {
					if entry.value >= width {
						return Err(syn::Error::new(
							entry.value_span,
							format!(
								"Offset of \"{}\" is outside its {}-bit block",
								qualified, width
							),
						));
					}
					continue;
				},
				TableKind::Values(width) => {
					if width < 64 && (entry.value >> width) != 0 {
						return Err(syn::Error::new(
							entry.value_span,
							format!(
								"Value of \"{}\" does not fit in {} bits",
								qualified, width
							),
						));
					}
					continue;
				},
			};

			for bit in owned {
				if bit >= layout.word_bits {
					return Err(syn::Error::new(
						entry.value_span,
						format!(
							"Bit {} of \"{}\" is outside the {}-bit word",
							bit, qualified, layout.word_bits
						),
					));
				}

				if let Some(owner) = owners.get(&bit) {
					return Err(syn::Error::new(
						entry.value_span,
						format!(
							"Bit {} of \"{}\" is already assigned to \"{}\"",
							bit, qualified, owner
						),
					));
				}

				owners.insert(bit, qualified.clone());
			}
		}
	}

	Ok(())
}

fn expand(layout: &Layout) -> TokenStream {
	let word_name = &layout.word_name;
	let word_bits = layout.word_bits as usize;

	let tables = layout.tables.iter().map(|table| {
		let attrs = &table.attrs;
		let name = &table.name;
		let names = table.entries.iter().map(|entry| entry.name.to_string());
		let values = table.entries.iter().map(|entry| entry.value as u8);

		let width = table.kind.width().map(|width| {
			let width_name = format_ident!("{}_WIDTH", name);
			let width = width as u8;
			quote! {
				#[allow(dead_code)]
				pub(crate) const #width_name: u8 = #width;
			}
		});

		quote! {
			#(#attrs)*
			pub(crate) const #name: &[(&str, u8)] = &[#((#names, #values)),*];
			#width
		}
	});

	quote! {
		pub(crate) const #word_name: usize = #word_bits;
		#(#tables)*
	}
}

/// Declares the layout of a control word.
///
/// ```ignore
/// bit_fields! {
/// 	word WORD_BITS = 69;
///
/// 	ALU_COMMANDS: bits { add = 50, xor = 57 }
/// 	REGISTERS: bits[7] { A = 8, B = 15 }
/// 	REGISTER_COMMANDS: offsets[7] { in = 0, LL1 = 1 }
/// 	FLAGS: values[4] { AH = 1, false = 15 }
/// }
/// ```
///
/// Each table becomes a `&[(&str, u8)]` constant; tables with a bracketed
/// width also get a `<NAME>_WIDTH` constant. `bits` tables own the bits they
/// name and may not overlap each other or leave the word.
#[proc_macro]
pub fn bit_fields(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
	let layout = parse_macro_input!(item as Layout);

	match check(&layout) {
		Ok(()) => expand(&layout).into(),
		Err(err) => err.to_compile_error().into(),
	}
}
