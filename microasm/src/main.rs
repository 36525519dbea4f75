//
// Copyright (C) 2022 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::{
	fs,
	io::{self, BufWriter, Write},
	path::PathBuf,
	process::exit,
};

use clap::Parser as ClapParser;

use microasm::{Program, Record};

#[derive(ClapParser)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Microcode source file
	source: PathBuf,

	/// Write the ROM table here instead of to stdout
	#[arg(short, long)]
	output: Option<PathBuf>,

	/// Append each instruction's source text as a trailing comment
	#[arg(long)]
	annotate: bool,

	/// Print the resolved labels to stderr
	#[arg(long)]
	print_labels: bool,
}

fn write_records<W: Write>(mut out: W, records: &[Record], annotate: bool) -> io::Result<()> {
	for record in records {
		if annotate {
			writeln!(out, "{:#}", record)?;
		} else {
			writeln!(out, "{}", record)?;
		}
	}

	out.flush()
}

fn main() {
	let cli = Args::parse();

	let input = match fs::read_to_string(&cli.source) {
		Ok(x) => x,
		Err(e) => {
			eprintln!("Failed to read \"{}\": {}", cli.source.display(), e);
			exit(1);
		},
	};

	let program = match Program::new(&input) {
		Ok(program) => program,
		Err(err) => {
			eprintln!("error: {}:{}", cli.source.display(), err);
			exit(1);
		},
	};

	if cli.print_labels {
		for (name, label) in program.labels().sorted() {
			eprintln!("{} => {}", name, label.address);
		}
	}

	// encode everything before writing so a failure leaves no partial table
	let records = match program.assemble() {
		Ok(records) => records,
		Err(err) => {
			eprintln!("error: {}:{}", cli.source.display(), err);
			exit(1);
		},
	};

	let result = match &cli.output {
		Some(path) => fs::File::create(path)
			.and_then(|file| write_records(BufWriter::new(file), &records, cli.annotate)),
		None => write_records(io::stdout().lock(), &records, cli.annotate),
	};

	if let Err(err) = result {
		eprintln!("Failed to write output: {}", err);
		exit(1);
	}
}
