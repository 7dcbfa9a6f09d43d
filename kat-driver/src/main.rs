/*++

Licensed under the Apache-2.0 license.

File Name:

    main.rs

Abstract:

    Runs the NIST AES known-answer vectors in a directory against an AES
    command-line implementation and prints per-file pass counts.

--*/

use aes_kat_driver::config::{default_jobs, DEFAULT_IMPLEMENTATION, DEFAULT_VECTOR_DIR};
use aes_kat_driver::{DriverConfig, Extraction, OutputFormat, Reporter, Runner};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::ffi::OsString;
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory containing the KAT vector files
    #[arg(long, value_name = "DIR", default_value = DEFAULT_VECTOR_DIR)]
    vectors: PathBuf,

    /// AES implementation under test
    #[arg(long, value_name = "PROGRAM", default_value = DEFAULT_IMPLEMENTATION)]
    implementation: PathBuf,

    /// Argument passed to the implementation ahead of the test arguments (repeatable)
    #[arg(long = "impl-arg", value_name = "ARG", allow_hyphen_values = true)]
    impl_args: Vec<OsString>,

    /// Maximum number of implementation processes running at once [default: number of CPUs]
    #[arg(short, long, value_name = "N")]
    jobs: Option<NonZeroUsize>,

    /// Characters the implementation prints per byte of hex output
    #[arg(long, value_name = "N", default_value_t = 3, value_parser = parse_chars_per_byte)]
    chars_per_byte: usize,

    /// Extra hex characters of ciphertext to read, for padding
    #[arg(long, value_name = "N", default_value_t = 32)]
    padding_hex_chars: usize,

    /// How results are read from the implementation's output
    #[arg(long, value_enum, default_value_t = Extraction::Window)]
    extraction: Extraction,

    /// Also write a JSON summary to this file
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Exit with status 1 if any vector fails
    #[arg(long)]
    strict: bool,

    /// More logging; repeat for more detail
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Args {
    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    fn into_config(self) -> DriverConfig {
        DriverConfig {
            vectors: self.vectors,
            implementation: self.implementation,
            implementation_args: self.impl_args,
            jobs: self.jobs.unwrap_or_else(default_jobs),
            format: OutputFormat {
                chars_per_byte: self.chars_per_byte,
                padding_hex_chars: self.padding_hex_chars,
                extraction: self.extraction,
            },
            summary: self.summary,
            strict: self.strict,
        }
    }
}

fn parse_chars_per_byte(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if n >= 2 => Ok(n),
        Ok(_) => Err("each byte takes at least two hex digits".into()),
        Err(err) => Err(err.to_string()),
    }
}

fn run(config: &DriverConfig) -> Result<i32> {
    let implementation = config.process_implementation();
    let runner = Runner::new(&implementation, config)?;
    let mut reporter = Reporter::new(std::io::stdout().lock());
    runner.run_suite(&config.vectors, &mut reporter)?;

    let summary = reporter.into_summary();
    if let Some(path) = &config.summary {
        summary
            .write_json(path)
            .with_context(|| format!("failed to write summary to {:?}", path))?;
    }
    Ok(summary.exit_code(config.strict))
}

fn main() {
    let args = Args::parse();
    let _ = SimpleLogger::new().with_level(args.log_level()).init();
    let config = args.into_config();
    let code = run(&config).unwrap_or_else(|e| {
        log::error!("Error: {:#}", e);
        2
    });
    std::process::exit(code);
}
