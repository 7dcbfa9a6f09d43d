/*++

Licensed under the Apache-2.0 license.

File Name:

    fs.rs

Abstract:

    Filesystem helpers for locating and opening KAT vector files, with error
    messages that include the offending path.

--*/

use std::fmt::Debug;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Same as [`std::fs::File::open`] but with more informative errors.
pub fn open<P: AsRef<Path> + Debug>(path: P) -> std::io::Result<File> {
    File::open(&path).map_err(|err| annotate_error(err, &format!("while opening file {:?}", path)))
}

/// Same as [`std::fs::write`] but with more informative errors.
pub fn write<P: AsRef<Path> + Debug, C: AsRef<[u8]>>(path: P, contents: C) -> std::io::Result<()> {
    std::fs::write(&path, contents)
        .map_err(|err| annotate_error(err, &format!("while writing to file {:?}", path)))
}

/// Same as [`std::fs::create_dir`] but with more informative errors.
pub fn create_dir<P: AsRef<Path> + Debug>(path: P) -> std::io::Result<()> {
    std::fs::create_dir(&path)
        .map_err(|err| annotate_error(err, &format!("while creating dir {:?}", path)))
}

/// Lists the regular files (or symlinks to them) directly inside `dir`,
/// sorted by path.
///
/// Subdirectories are not descended into.
pub fn list_files<P: AsRef<Path> + Debug>(dir: P) -> std::io::Result<Vec<PathBuf>> {
    let wrap_err = |err| annotate_error(err, &format!("while listing dir {:?}", dir));
    let mut result = vec![];
    for entry in std::fs::read_dir(&dir).map_err(wrap_err)? {
        let path = entry.map_err(wrap_err)?.path();
        // Follows symlinks; vector directories are often linked into place.
        if path.is_file() {
            result.push(path);
        }
    }
    result.sort();
    Ok(result)
}

/// A temporary directory that will be deleted (best-effort) when the
/// [`TempDir`] is dropped.
pub struct TempDir {
    path: PathBuf,
}
impl TempDir {
    /// Creates a new temporary directory in the system temp directory
    /// with a random name.
    pub fn new() -> std::io::Result<Self> {
        let path = Path::join(&std::env::temp_dir(), rand_str()?);
        create_dir(&path)?;
        Ok(Self { path })
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
}
impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(self.path());
    }
}
impl Debug for TempDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.path, f)
    }
}
impl AsRef<Path> for TempDir {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

pub fn annotate_error(err: std::io::Error, suffix: &str) -> std::io::Error {
    std::io::Error::new(err.kind(), err.to_string() + ": " + suffix)
}

fn rand_str() -> std::io::Result<String> {
    let chars = b"abcdefghijklmnopqrstuvwxyz123456";
    let mut result = vec![0u8; 24];
    if let Err(err) = getrandom::getrandom(&mut result) {
        return Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Unable to retrieve random data from OS: {}", err),
        ));
    }
    Ok(result
        .iter()
        .map(|ch| char::from(chars[usize::from(*ch & 0x1f)]))
        .collect())
}
