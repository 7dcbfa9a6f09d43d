/*++

Licensed under the Apache-2.0 license.

File Name:

    vector.rs

Abstract:

    Known-answer test vectors and the file-name based mode policy.

--*/

use std::fmt;
use std::path::Path;

/// Number of leading file-name characters that name the cipher mode.
pub const MODE_TAG_LEN: usize = 3;

/// Cipher mode tag taken from the first three characters of a vector file
/// name, e.g. `ECB`, `CBC`, `CFB`, `OFB`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Mode(String);

impl Mode {
    /// Derives the mode tag from a vector file name. Returns [`None`] if the
    /// name is shorter than [`MODE_TAG_LEN`] characters.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let tag: String = name.chars().take(MODE_TAG_LEN).collect();
        if tag.chars().count() < MODE_TAG_LEN {
            return None;
        }
        Some(Self(tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// ECB vectors have no `IV` line and are run with an empty IV.
    pub fn is_ecb(&self) -> bool {
        self.0.starts_with("ECB")
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Only the 128-bit feedback width of CFB is exercised; CFB1 and CFB8
/// files are skipped without being opened.
pub fn is_skipped_file_name(name: &str) -> bool {
    name.starts_with("CFB") && !name.starts_with("CFB128")
}

/// Returns the final component of `path` as a string, lossily converted.
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// One known-answer test case from the `[ENCRYPT]` section of a vector file.
///
/// All hex fields hold the payload exactly as it appeared after its label.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestVector {
    pub mode: Mode,
    /// Value of the `COUNT` line that opened the block, for diagnostics.
    pub count: String,
    pub key: String,
    /// Empty for ECB.
    pub iv: String,
    pub plaintext: String,
    pub expected_ciphertext: String,
}

impl TestVector {
    /// Key size in bits; each hex character carries four bits.
    pub fn key_bits(&self) -> usize {
        self.key.len() * 4
    }
}
