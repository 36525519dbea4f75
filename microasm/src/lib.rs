//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

//! Assembler for the 69-bit microcode control store.
//!
//! Source goes through three passes: [`strip`] drops comments and blank
//! lines, [`labels`] assigns addresses and pulls out label definitions, and
//! [`program`] encodes each remaining line into a [`MicroWord`].

extern crate pest;
#[macro_use]
extern crate pest_derive;
#[macro_use]
extern crate microasm_proc_macro;

pub mod error;
pub mod labels;
pub mod operation;
pub mod program;
pub mod registry;
pub mod strip;
pub mod syntax;
pub mod word;

pub use error::{Error, ErrorKind};
pub use program::{assemble, Program, Record};
pub use word::MicroWord;
