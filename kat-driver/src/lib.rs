/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    Known-answer test driver for command-line AES implementations. Vector
    files in the NIST KAT format are parsed, each vector is encrypted and then
    decrypted by the implementation under test, and the results are checked
    against the expected values.

--*/

pub mod adapter;
pub mod compare;
pub mod config;
pub mod error;
pub mod exec;
pub mod fs;
pub mod parser;
pub mod report;
pub mod runner;
pub mod vector;

#[cfg(test)]
mod testing;

pub use adapter::{Adapter, Direction, Extraction, Implementation, OutputFormat};
pub use config::DriverConfig;
pub use error::{DriverError, ParseError};
pub use report::{Reporter, Summary};
pub use runner::{FileResult, FileStatus, Runner};
pub use vector::{Mode, TestVector};
