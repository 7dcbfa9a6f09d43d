/*++

Licensed under the Apache-2.0 license.

File Name:

    report.rs

Abstract:

    Console reporting of per-file results and the optional JSON summary.

--*/

use crate::fs;
use crate::runner::{FileResult, FileStatus};
use crate::vector::base_name;
use log::error;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FileSummary {
    pub name: String,
    /// One of `skipped`, `completed` or `aborted`.
    pub status: &'static str,
    #[serde(flatten)]
    pub result: Option<FileResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Summary {
    pub files: Vec<FileSummary>,
}

impl Summary {
    /// Counts over every completed file.
    pub fn totals(&self) -> FileResult {
        self.files
            .iter()
            .filter_map(|file| file.result)
            .fold(FileResult::default(), FileResult::merge)
    }

    pub fn aborted_files(&self) -> usize {
        self.files.iter().filter(|file| file.error.is_some()).count()
    }

    /// 2 if any file could not be parsed; 1 if `strict` and any vector
    /// failed; 0 otherwise.
    pub fn exit_code(&self, strict: bool) -> i32 {
        if self.aborted_files() > 0 {
            2
        } else if strict && self.totals().failed_tests > 0 {
            1
        } else {
            0
        }
    }

    pub fn write_json(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        fs::write(path, json + "\n")
    }
}

/// Prints each file's base name, then `Passed {passed} out of {total}`.
pub struct Reporter<W> {
    out: W,
    summary: Summary,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            summary: Summary::default(),
        }
    }

    pub fn begin_file(&mut self, path: &Path) -> io::Result<()> {
        writeln!(self.out, "{}", base_name(path))?;
        self.out.flush()
    }

    pub fn finish_file(&mut self, path: &Path, status: FileStatus) -> io::Result<()> {
        let mut entry = FileSummary {
            name: base_name(path),
            status: "skipped",
            result: None,
            error: None,
        };
        match status {
            FileStatus::Skipped => {}
            FileStatus::Completed(result) => {
                writeln!(
                    self.out,
                    "Passed {} out of {}",
                    result.passed(),
                    result.total_tests
                )?;
                self.out.flush()?;
                entry.status = "completed";
                entry.result = Some(result);
            }
            FileStatus::Aborted(err) => {
                error!("Aborted {}: {}", entry.name, err);
                entry.status = "aborted";
                entry.error = Some(err.to_string());
            }
        }
        self.summary.files.push(entry);
        Ok(())
    }

    pub fn into_summary(self) -> Summary {
        self.summary
    }
}
