/*++

Licensed under the Apache-2.0 license.

File Name:

    testing.rs

Abstract:

    In-process stand-in for the implementation under test.

--*/

use crate::adapter::{Direction, Implementation, Invocation};
use crate::exec::ExecError;
use std::ffi::OsString;
use std::sync::Mutex;

/// Renders hex the way the implementation under test does: one byte per
/// group, each followed by a space.
pub fn spaced(hex: &str) -> String {
    hex.as_bytes()
        .chunks(2)
        .map(|pair| String::from_utf8_lossy(pair).into_owned() + " ")
        .collect()
}

/// Answers every encryption with `ciphertext` and every decryption with
/// `plaintext`, recording what it was asked.
pub struct FakeAes {
    pub ciphertext: String,
    pub plaintext: String,
    pub fail: Option<Direction>,
    pub calls: Mutex<Vec<(Direction, Vec<String>, String)>>,
}

impl FakeAes {
    pub fn new(ciphertext: &str, plaintext: &str) -> Self {
        Self {
            ciphertext: ciphertext.into(),
            plaintext: plaintext.into(),
            fail: None,
            calls: Mutex::new(vec![]),
        }
    }

    pub fn failing(mut self, direction: Direction) -> Self {
        self.fail = Some(direction);
        self
    }

    pub fn directions(&self) -> Vec<Direction> {
        self.calls.lock().unwrap().iter().map(|c| c.0).collect()
    }
}

impl Implementation for FakeAes {
    fn invoke(&self, invocation: &Invocation<'_>) -> Result<String, ExecError> {
        self.calls.lock().unwrap().push((
            invocation.direction,
            invocation.args(),
            invocation.stdin(),
        ));
        if self.fail == Some(invocation.direction) {
            return Err(ExecError {
                code: Some(3),
                args: vec![OsString::from("./main")],
                stderr: String::new(),
            });
        }
        Ok(match invocation.direction {
            Direction::Encrypt => format!(
                "Enter plaintext: Enter key: Enter IV: \nCIPHERTEXT: {}\nKEY: {}\n",
                spaced(&self.ciphertext),
                spaced(invocation.key)
            ),
            Direction::Decrypt => format!(
                "Enter ciphertext: Enter key: \nDECRPYTED PLAINTEXT: {}\n",
                spaced(&self.plaintext)
            ),
        })
    }
}
