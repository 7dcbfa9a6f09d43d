/*++

Licensed under the Apache-2.0 license.

File Name:

    config.rs

Abstract:

    Settings for a KAT run.

--*/

use crate::adapter::{OutputFormat, ProcessImplementation};
use std::ffi::OsString;
use std::num::NonZeroUsize;
use std::path::PathBuf;

pub const DEFAULT_VECTOR_DIR: &str = "./KAT";
pub const DEFAULT_IMPLEMENTATION: &str = "./main";

#[derive(Clone, Debug)]
pub struct DriverConfig {
    /// Directory holding the vector files.
    pub vectors: PathBuf,
    /// Executable under test.
    pub implementation: PathBuf,
    /// Arguments placed before the protocol arguments.
    pub implementation_args: Vec<OsString>,
    /// Upper bound on concurrently running implementation processes.
    pub jobs: NonZeroUsize,
    pub format: OutputFormat,
    /// Where to write a JSON summary, if anywhere.
    pub summary: Option<PathBuf>,
    /// Exit non-zero when any vector fails.
    pub strict: bool,
}

impl DriverConfig {
    pub fn process_implementation(&self) -> ProcessImplementation {
        ProcessImplementation::new(&self.implementation)
            .with_leading_args(self.implementation_args.iter().cloned())
    }
}

/// One job per available CPU, or one if that can't be determined.
pub fn default_jobs() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            vectors: PathBuf::from(DEFAULT_VECTOR_DIR),
            implementation: PathBuf::from(DEFAULT_IMPLEMENTATION),
            implementation_args: vec![],
            jobs: default_jobs(),
            format: OutputFormat::default(),
            summary: None,
            strict: false,
        }
    }
}
