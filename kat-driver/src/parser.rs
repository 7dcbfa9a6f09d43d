/*++

Licensed under the Apache-2.0 license.

File Name:

    parser.rs

Abstract:

    Streaming parser for NIST KAT vector files. Only the [ENCRYPT] section is
    consumed; the [DECRYPT] section lacks the padding metadata needed to
    rebuild the test inputs.

--*/

use crate::error::ParseError;
use crate::fs;
use crate::vector::{base_name, is_skipped_file_name, Mode, TestVector};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Labeled lines of a test block, each written as `LABEL = <hex>\r\n`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Label {
    Key,
    Iv,
    Plaintext,
    Ciphertext,
}

const ECB_LABELS: &[Label] = &[Label::Key, Label::Plaintext, Label::Ciphertext];
const LABELS: &[Label] = &[Label::Key, Label::Iv, Label::Plaintext, Label::Ciphertext];

impl Label {
    pub const fn prefix(self) -> &'static str {
        match self {
            Label::Key => "KEY = ",
            Label::Iv => "IV = ",
            Label::Plaintext => "PLAINTEXT = ",
            Label::Ciphertext => "CIPHERTEXT = ",
        }
    }

    /// Character offset of the hex payload within the line.
    pub const fn offset(self) -> usize {
        self.prefix().len()
    }

    /// The labels following a `COUNT` line, in file order.
    pub fn sequence(mode: &Mode) -> &'static [Label] {
        if mode.is_ecb() {
            ECB_LABELS
        } else {
            LABELS
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Label::Key => "KEY",
            Label::Iv => "IV",
            Label::Plaintext => "PLAINTEXT",
            Label::Ciphertext => "CIPHERTEXT",
        })
    }
}

/// Extracts the payload of a raw `LABEL = <payload>\r\n` line.
///
/// Returns [`None`] if the line does not start with the label's prefix. A
/// final line without a terminator (end of file) is accepted as is.
pub fn field_payload(label: Label, line: &str) -> Option<&str> {
    if line.get(..label.offset()) != Some(label.prefix()) {
        return None;
    }
    let rest = &line[label.offset()..];
    Some(
        rest.strip_suffix("\r\n")
            .or_else(|| rest.strip_suffix('\n'))
            .unwrap_or(rest),
    )
}

/// Removes whitespace from `payload` and checks the remainder is hex.
pub fn hex_payload(payload: &str) -> Option<String> {
    let result: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    result
        .chars()
        .all(|c| c.is_ascii_hexdigit())
        .then_some(result)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Section {
    Preamble,
    Encrypt,
    Done,
}

/// Lazy, single-pass sequence of the [`TestVector`]s in one file.
///
/// Parsing stops at the `[DECRYPT]` header or the end of the file. After an
/// error the reader yields nothing further; re-reading a file requires a new
/// reader.
pub struct VectorReader<R> {
    reader: R,
    path: PathBuf,
    mode: Mode,
    line: usize,
    section: Section,
}

impl VectorReader<BufReader<File>> {
    /// Opens the vector file at `path`, deriving the mode from its name.
    ///
    /// Returns `Ok(None)` for files excluded by the CFB width policy; these
    /// are not opened.
    pub fn open(path: &Path) -> Result<Option<Self>, ParseError> {
        let name = base_name(path);
        if is_skipped_file_name(&name) {
            return Ok(None);
        }
        let mode = Mode::from_file_name(&name).ok_or_else(|| ParseError::BadFileName {
            path: path.to_path_buf(),
        })?;
        let file = fs::open(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(Self::new(BufReader::new(file), path, mode)))
    }
}

impl<R: BufRead> VectorReader<R> {
    pub fn new(reader: R, path: impl Into<PathBuf>, mode: Mode) -> Self {
        Self {
            reader,
            path: path.into(),
            mode,
            line: 0,
            section: Section::Preamble,
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Reads one raw line, terminator included.
    fn read_line(&mut self) -> Result<Option<String>, ParseError> {
        let mut buf = vec![];
        let n = self
            .reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| ParseError::Io {
                path: self.path.clone(),
                source,
            })?;
        if n == 0 {
            return Ok(None);
        }
        self.line += 1;
        String::from_utf8(buf)
            .map(Some)
            .map_err(|_| ParseError::NotUtf8 {
                path: self.path.clone(),
                line: self.line,
            })
    }

    fn read_field(&mut self, label: Label) -> Result<String, ParseError> {
        let Some(line) = self.read_line()? else {
            return Err(ParseError::UnexpectedEof {
                path: self.path.clone(),
                line: self.line,
                expected: label,
            });
        };
        let Some(payload) = field_payload(label, &line) else {
            return Err(ParseError::WrongLabel {
                path: self.path.clone(),
                line: self.line,
                expected: label,
                found: line.trim_end().to_string(),
            });
        };
        hex_payload(payload).ok_or_else(|| ParseError::NotHex {
            path: self.path.clone(),
            line: self.line,
            label,
            value: payload.to_string(),
        })
    }

    fn read_block(&mut self, count: String) -> Result<TestVector, ParseError> {
        let mut vector = TestVector {
            mode: self.mode.clone(),
            count,
            key: String::new(),
            iv: String::new(),
            plaintext: String::new(),
            expected_ciphertext: String::new(),
        };
        for &label in Label::sequence(&self.mode) {
            let value = self.read_field(label)?;
            match label {
                Label::Key => vector.key = value,
                Label::Iv => vector.iv = value,
                Label::Plaintext => vector.plaintext = value,
                Label::Ciphertext => vector.expected_ciphertext = value,
            }
        }
        Ok(vector)
    }

    fn next_vector(&mut self) -> Result<Option<TestVector>, ParseError> {
        while let Some(line) = self.read_line()? {
            let line = line.trim();
            match self.section {
                Section::Preamble => {
                    if line.starts_with("[ENCRYPT]") {
                        self.section = Section::Encrypt;
                    }
                }
                Section::Encrypt => {
                    if line.starts_with("[DECRYPT]") {
                        break;
                    }
                    if let Some(rest) = line.strip_prefix("COUNT") {
                        let count = rest.trim_start().trim_start_matches('=').trim();
                        return self.read_block(count.to_string()).map(Some);
                    }
                }
                Section::Done => break,
            }
        }
        Ok(None)
    }
}

impl<R: BufRead> Iterator for VectorReader<R> {
    type Item = Result<TestVector, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.section == Section::Done {
            return None;
        }
        let result = self.next_vector().transpose();
        if !matches!(result, Some(Ok(_))) {
            self.section = Section::Done;
        }
        result
    }
}
