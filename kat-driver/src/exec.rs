/*++

Licensed under the Apache-2.0 license.

File Name:

    exec.rs

Abstract:

    Runs a subprocess with piped stdin/stdout, reporting failures with the
    exit code, the full argument list and captured stderr.

--*/

use std::ffi::OsString;
use std::fmt;
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

/// Executes `cmd`, feeds it `input` on stdin and returns its stdout.
///
/// A process that cannot be started or that exits with a non-zero status is
/// reported as an [`ExecError`].
pub fn exec_with_input(cmd: &mut Command, input: &[u8]) -> Result<Vec<u8>, ExecError> {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| ExecError {
            code: None,
            args: collect_args(cmd),
            stderr: format!("unable to start process: {}", err),
        })?;
    if let Some(mut stdin) = child.stdin.take() {
        // The child may exit without consuming all of its input.
        if let Err(err) = stdin.write_all(input) {
            if err.kind() != ErrorKind::BrokenPipe {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ExecError {
                    code: None,
                    args: collect_args(cmd),
                    stderr: format!("unable to write to process stdin: {}", err),
                });
            }
        }
    }
    let output = child.wait_with_output().map_err(|err| ExecError {
        code: None,
        args: collect_args(cmd),
        stderr: format!("unable to wait for process: {}", err),
    })?;
    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(ExecError {
            code: output.status.code(),
            args: collect_args(cmd),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[derive(Clone, Eq, PartialEq)]
pub struct ExecError {
    /// The exit code of the subprocess. If the subprocess could not be started
    /// or was killed by a signal, this will be [`None`].
    pub code: Option<i32>,
    /// The arguments passed to the subprocess. `args[0]` will be the executable.
    pub args: Vec<OsString>,
    /// The captured stderr from the process, lossily converted to UTF-8.
    pub stderr: String,
}
impl std::error::Error for ExecError {}
impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Subprocess exited with error {:?}: {:?}\n{}",
            self.code, self.args, self.stderr
        )
    }
}
impl fmt::Debug for ExecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

fn collect_args(cmd: &Command) -> Vec<OsString> {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(OsString::from)
        .collect()
}
