/*++

Licensed under the Apache-2.0 license.

File Name:

    runner.rs

Abstract:

    Runs every vector of a file through the implementation on a bounded
    worker pool and reduces the outcomes to a per-file result.

--*/

use crate::adapter::{Adapter, Implementation};
use crate::compare::{check_vector, TestOutcome};
use crate::config::DriverConfig;
use crate::error::{DriverError, ParseError};
use crate::fs;
use crate::parser::VectorReader;
use crate::report::Reporter;
use crate::vector::{base_name, TestVector};
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Counts for one vector file.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct FileResult {
    pub total_tests: usize,
    pub failed_tests: usize,
}

impl FileResult {
    pub fn passed(&self) -> usize {
        self.total_tests - self.failed_tests
    }

    pub fn record(self, passed: bool) -> Self {
        Self {
            total_tests: self.total_tests + 1,
            failed_tests: self.failed_tests + usize::from(!passed),
        }
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            total_tests: self.total_tests + other.total_tests,
            failed_tests: self.failed_tests + other.failed_tests,
        }
    }
}

impl FromIterator<bool> for FileResult {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        iter.into_iter()
            .fold(FileResult::default(), FileResult::record)
    }
}

#[derive(Debug)]
pub enum FileStatus {
    /// Excluded by the CFB width policy.
    Skipped,
    Completed(FileResult),
    /// The file could not be parsed; its partial counts are discarded.
    Aborted(ParseError),
}

pub struct Runner<'a> {
    adapter: Adapter<'a>,
    pool: rayon::ThreadPool,
}

impl<'a> Runner<'a> {
    pub fn new(
        implementation: &'a dyn Implementation,
        config: &DriverConfig,
    ) -> Result<Self, DriverError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.jobs.get())
            .thread_name(|i| format!("kat-worker-{i}"))
            .build()?;
        Ok(Self {
            adapter: Adapter::new(implementation, config.format),
            pool,
        })
    }

    /// Parses `path` and runs each of its vectors.
    pub fn run_file(&self, path: &Path) -> FileStatus {
        let name = base_name(path);
        let reader = match VectorReader::open(path) {
            Ok(Some(reader)) => reader,
            Ok(None) => {
                info!("Skipping {name}: only the 128-bit CFB width is exercised");
                return FileStatus::Skipped;
            }
            Err(err) => return FileStatus::Aborted(err),
        };
        let result = self.pool.install(|| {
            reader
                .par_bridge()
                .map(|vector| vector.map(|vector| self.score(&name, &vector)))
                .try_fold(FileResult::default, |acc, passed| {
                    Ok::<_, ParseError>(acc.record(passed?))
                })
                .try_reduce(FileResult::default, |a, b| Ok(a.merge(b)))
        });
        match result {
            Ok(result) => FileStatus::Completed(result),
            Err(err) => FileStatus::Aborted(err),
        }
    }

    /// Runs every file in `dir`, in name order, reporting each as it finishes.
    pub fn run_suite<W: Write>(
        &self,
        dir: &Path,
        reporter: &mut Reporter<W>,
    ) -> Result<(), DriverError> {
        for path in fs::list_files(dir).map_err(DriverError::ListVectors)? {
            reporter.begin_file(&path).map_err(DriverError::Report)?;
            let status = self.run_file(&path);
            reporter.finish_file(&path, status).map_err(DriverError::Report)?;
        }
        Ok(())
    }

    fn score(&self, file_name: &str, vector: &TestVector) -> bool {
        match check_vector(&self.adapter, vector) {
            TestOutcome::Pass => true,
            TestOutcome::Fail(failure) => {
                warn!("{file_name} COUNT = {}: {failure}", vector.count);
                false
            }
        }
    }
}
