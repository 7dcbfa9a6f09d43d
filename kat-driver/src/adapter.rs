/*++

Licensed under the Apache-2.0 license.

File Name:

    adapter.rs

Abstract:

    Drives the implementation under test: builds the argv/stdin protocol for
    one direction, runs it, and pulls the hex result out of its stdout.

--*/

use crate::error::ExtractError;
use crate::exec::{exec_with_input, ExecError};
use crate::vector::{Mode, TestVector};
use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

impl Direction {
    /// Text the implementation prints immediately before its result. The
    /// decrypt marker reproduces the implementation's spelling.
    pub const fn marker(self) -> &'static str {
        match self {
            Direction::Encrypt => "CIPHERTEXT: ",
            Direction::Decrypt => "DECRPYTED PLAINTEXT: ",
        }
    }
}

/// One request to the implementation under test.
#[derive(Clone, Copy, Debug)]
pub struct Invocation<'a> {
    pub direction: Direction,
    pub mode: &'a Mode,
    pub key_bits: usize,
    /// Plaintext when encrypting, ciphertext when decrypting.
    pub input: &'a str,
    pub key: &'a str,
    pub iv: &'a str,
}

impl Invocation<'_> {
    pub fn args(&self) -> Vec<String> {
        let mode = self.mode.to_string();
        let key_bits = self.key_bits.to_string();
        match self.direction {
            Direction::Encrypt => vec!["enc".into(), mode, "-k".into(), key_bits, "-iv".into()],
            Direction::Decrypt => vec!["dec".into(), mode, key_bits, "-iv".into()],
        }
    }

    /// Input, key and IV, one per line. The IV line is sent even when empty.
    pub fn stdin(&self) -> String {
        format!("{}\n{}\n{}\n", self.input, self.key, self.iv)
    }
}

/// The implementation under test, addressed only through argv, stdin and
/// stdout.
pub trait Implementation: Sync {
    /// Runs one invocation and returns the raw stdout text.
    fn invoke(&self, invocation: &Invocation<'_>) -> Result<String, ExecError>;
}

/// An implementation living in an external executable.
#[derive(Clone, Debug)]
pub struct ProcessImplementation {
    program: PathBuf,
    leading_args: Vec<OsString>,
}

impl ProcessImplementation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: vec![],
        }
    }

    /// Arguments placed before the protocol arguments, for running the
    /// implementation through an interpreter or wrapper.
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl Implementation for ProcessImplementation {
    fn invoke(&self, invocation: &Invocation<'_>) -> Result<String, ExecError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args).args(invocation.args());
        trace!("Running {:?}", cmd);
        let stdout = exec_with_input(&mut cmd, invocation.stdin().as_bytes())?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }
}

/// How the result is pulled out of the implementation's stdout.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum Extraction {
    /// Fixed-width window after the marker, falling back to `hex-runs` if the
    /// window holds anything other than hex and whitespace.
    #[default]
    Window,
    /// The run of hex byte pairs directly after the marker, on its line.
    HexRuns,
}

/// How the implementation renders hex output.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OutputFormat {
    /// Characters printed per byte: two hex digits plus separators.
    pub chars_per_byte: usize,
    /// Extra hex characters allowed in the encrypt window for padding.
    pub padding_hex_chars: usize,
    pub extraction: Extraction,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self {
            chars_per_byte: 3,
            padding_hex_chars: 32,
            extraction: Extraction::Window,
        }
    }
}

impl OutputFormat {
    /// Formatted width of `hex_len` hex characters.
    pub fn window(&self, hex_len: usize) -> usize {
        hex_len * self.chars_per_byte / 2
    }

    /// Window taken after the marker for a vector whose plaintext is
    /// `plaintext_len` hex characters long.
    pub fn window_for(&self, direction: Direction, plaintext_len: usize) -> usize {
        match direction {
            Direction::Encrypt => self.window(plaintext_len + self.padding_hex_chars),
            Direction::Decrypt => self.window(plaintext_len),
        }
    }
}

/// Strips all whitespace and lowercases.
pub fn canonicalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

static HEX_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[ \t]*[0-9A-Fa-f]{2})+").unwrap());

fn hex_run(text: &str) -> String {
    HEX_RUN
        .find(text)
        .map(|m| canonicalize(m.as_str()))
        .unwrap_or_default()
}

/// Finds `direction`'s marker in `stdout` and returns the canonical hex that
/// follows it.
pub fn extract_output(
    stdout: &str,
    direction: Direction,
    window: usize,
    extraction: Extraction,
) -> Result<String, ExtractError> {
    let marker = direction.marker();
    let start = stdout
        .find(marker)
        .ok_or(ExtractError::MissingMarker { marker })?
        + marker.len();
    let rest = &stdout[start..];
    if extraction == Extraction::Window {
        let windowed: String = rest.chars().take(window).collect();
        let result = canonicalize(&windowed);
        if result.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(result);
        }
        debug!(
            "Output window {:?} is not plain hex; using the hex run after {:?}",
            windowed, marker
        );
    }
    Ok(hex_run(rest))
}

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Exec(#[from] ExecError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Runs test vectors through an [`Implementation`] in either direction.
pub struct Adapter<'a> {
    implementation: &'a dyn Implementation,
    format: OutputFormat,
}

impl<'a> Adapter<'a> {
    pub fn new(implementation: &'a dyn Implementation, format: OutputFormat) -> Self {
        Self {
            implementation,
            format,
        }
    }

    /// Encrypts the vector's plaintext and returns the canonical ciphertext.
    pub fn encrypt(&self, vector: &TestVector) -> Result<String, AdapterError> {
        self.run(Direction::Encrypt, vector, &vector.plaintext)
    }

    /// Decrypts `ciphertext` with the vector's key and IV and returns the
    /// canonical recovered plaintext.
    pub fn decrypt(&self, vector: &TestVector, ciphertext: &str) -> Result<String, AdapterError> {
        self.run(Direction::Decrypt, vector, ciphertext)
    }

    fn run(
        &self,
        direction: Direction,
        vector: &TestVector,
        input: &str,
    ) -> Result<String, AdapterError> {
        let stdout = self.implementation.invoke(&Invocation {
            direction,
            mode: &vector.mode,
            key_bits: vector.key_bits(),
            input,
            key: &vector.key,
            iv: &vector.iv,
        })?;
        let window = self.format.window_for(direction, vector.plaintext.len());
        Ok(extract_output(
            &stdout,
            direction,
            window,
            self.format.extraction,
        )?)
    }
}
