// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

use std::{fs, path::PathBuf, process::ExitCode};
use clap::Parser as _;
use tracing_subscriber::EnvFilter;
use rs274::{DuplicatePolicy, LetterSet, ParseOptions, Parser, Recovery};

/// Parse an RS274 program and print it in normalized form.
#[derive(clap::Parser)]
#[command(name = "rs274-parse", version)]
struct Args {
    /// Program file to parse.
    file: PathBuf,

    /// Parser options file (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enabled argument letters, e.g. "XYZ" or "XYZABC".
    #[arg(long)]
    letters: Option<LetterSet>,

    /// Keep the first value of a repeated letter instead of rejecting the block.
    #[arg(long)]
    keep_first: bool,

    /// Stop at the first error instead of continuing with the next line.
    #[arg(long)]
    stop: bool,

    /// Print blocks and diagnostics as JSON.
    #[arg(long)]
    json: bool,
}

fn options(args: &Args) -> Result<ParseOptions, Box<dyn std::error::Error>> {
    let mut opts = match &args.config {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => ParseOptions::default(),
    };
    if let Some(letters) = &args.letters {
        opts.letters = letters.clone();
    }
    if args.keep_first {
        opts.duplicates = DuplicatePolicy::KeepFirst;
    }
    if args.stop {
        opts.recovery = Recovery::Stop;
    }
    Ok(opts)
}

fn run(args: &Args) -> Result<bool, Box<dyn std::error::Error>> {
    let opts = options(args)?;
    tracing::debug!(letters = %opts.letters, duplicates = ?opts.duplicates,
                    recovery = ?opts.recovery, "options");

    let filename = args.file.display().to_string();
    let input = fs::read_to_string(&args.file)?;
    let prog = Parser::new(opts).parse(&filename, &input);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&prog)?);
    } else {
        print!("{}", prog);
        for diag in &prog.diagnostics {
            eprintln!("{}", diag.render(&filename, &input));
        }
    }
    Ok(!prog.has_errors())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}
