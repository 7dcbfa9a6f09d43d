/*++

Licensed under the Apache-2.0 license.

File Name:

    compare.rs

Abstract:

    Scores one test vector: encrypt and compare against the known answer,
    then decrypt the produced ciphertext and compare against the plaintext.

--*/

use crate::adapter::{canonicalize, Adapter, AdapterError, Direction};
use crate::vector::TestVector;
use std::fmt;

/// Where an actual value first departs from the expected one.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Mismatch {
    pub expected: String,
    pub actual: String,
    /// Index of the first differing hex character; equal to `actual.len()`
    /// when the actual value is a strict prefix of the expected one.
    pub position: usize,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected {} but was {} (first difference at hex digit {})",
            self.expected, self.actual, self.position
        )
    }
}

/// Compares the first `expected.len()` characters of `actual` with
/// `expected`. Characters past that length are padding and are ignored.
pub fn compare_prefix(actual: &str, expected: &str) -> Result<(), Mismatch> {
    if actual.as_bytes().starts_with(expected.as_bytes()) {
        return Ok(());
    }
    let position = actual
        .bytes()
        .zip(expected.bytes())
        .take_while(|(a, e)| a == e)
        .count();
    Err(Mismatch {
        expected: expected.to_string(),
        actual: actual.to_string(),
        position,
    })
}

#[derive(Debug)]
pub enum Failure {
    /// The implementation failed to run or gave unusable output.
    Invocation {
        direction: Direction,
        error: AdapterError,
    },
    Mismatch {
        direction: Direction,
        mismatch: Mismatch,
    },
}

impl Failure {
    pub fn direction(&self) -> Direction {
        match self {
            Failure::Invocation { direction, .. } | Failure::Mismatch { direction, .. } => {
                *direction
            }
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Invocation { direction, error } => {
                write!(f, "{:?} invocation failed: {}", direction, error)
            }
            Failure::Mismatch {
                direction,
                mismatch,
            } => write!(f, "{:?} output mismatch: {}", direction, mismatch),
        }
    }
}

#[derive(Debug)]
pub enum TestOutcome {
    Pass,
    Fail(Failure),
}

impl TestOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, TestOutcome::Pass)
    }
}

/// Runs `vector` through `adapter` in both directions.
///
/// The decrypt stage is fed the ciphertext the implementation produced and
/// only runs if the encrypt stage passed.
pub fn check_vector(adapter: &Adapter<'_>, vector: &TestVector) -> TestOutcome {
    match round_trip(adapter, vector) {
        Ok(()) => TestOutcome::Pass,
        Err(failure) => TestOutcome::Fail(failure),
    }
}

fn round_trip(adapter: &Adapter<'_>, vector: &TestVector) -> Result<(), Failure> {
    let ciphertext = adapter
        .encrypt(vector)
        .map_err(|error| Failure::Invocation {
            direction: Direction::Encrypt,
            error,
        })?;
    compare_prefix(&ciphertext, &canonicalize(&vector.expected_ciphertext)).map_err(
        |mismatch| Failure::Mismatch {
            direction: Direction::Encrypt,
            mismatch,
        },
    )?;

    let plaintext = adapter
        .decrypt(vector, &ciphertext)
        .map_err(|error| Failure::Invocation {
            direction: Direction::Decrypt,
            error,
        })?;
    compare_prefix(&plaintext, &canonicalize(&vector.plaintext)).map_err(|mismatch| {
        Failure::Mismatch {
            direction: Direction::Decrypt,
            mismatch,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::OutputFormat;
    use crate::testing::FakeAes;
    use crate::vector::Mode;

    const KEY: &str = "000102030405060708090a0b0c0d0e0f";
    const PLAINTEXT: &str = "00112233445566778899aabbccddeeff";
    const CIPHERTEXT: &str = "69c4e0d86a7b0430d8cdb78070b4c55a";

    fn ecb_vector() -> TestVector {
        TestVector {
            mode: Mode::from_file_name("ECBGFSbox128.rsp").unwrap(),
            count: "0".into(),
            key: KEY.into(),
            iv: "".into(),
            plaintext: PLAINTEXT.into(),
            expected_ciphertext: CIPHERTEXT.into(),
        }
    }

    fn check(fake: &FakeAes, vector: &TestVector) -> TestOutcome {
        check_vector(&Adapter::new(fake, OutputFormat::default()), vector)
    }

    #[test]
    fn test_compare_prefix() {
        assert_eq!(compare_prefix("0011", "0011"), Ok(()));
        assert_eq!(compare_prefix("0011aabb", "0011"), Ok(()));
        assert_eq!(compare_prefix("anything", ""), Ok(()));
        assert_eq!(
            compare_prefix("0012aabb", "0011"),
            Err(Mismatch {
                expected: "0011".into(),
                actual: "0012aabb".into(),
                position: 3,
            })
        );
        assert_eq!(compare_prefix("00", "0011").unwrap_err().position, 2);
        assert_eq!(
            compare_prefix("10", "0011").unwrap_err().to_string(),
            "expected 0011 but was 10 (first difference at hex digit 0)"
        );
    }

    #[test]
    fn test_round_trip_pass() {
        let fake = FakeAes::new(CIPHERTEXT, PLAINTEXT);
        let outcome = check(&fake, &ecb_vector());
        assert!(outcome.passed(), "{:?}", outcome);

        let calls = fake.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, Direction::Encrypt);
        assert_eq!(calls[0].1, ["enc", "ECB", "-k", "128", "-iv"]);
        assert_eq!(calls[0].2, format!("{PLAINTEXT}\n{KEY}\n\n"));
        assert_eq!(calls[1].0, Direction::Decrypt);
        assert_eq!(calls[1].1, ["dec", "ECB", "128", "-iv"]);
        assert_eq!(calls[1].2, format!("{CIPHERTEXT}\n{KEY}\n\n"));
    }

    #[test]
    fn test_padding_block_is_tolerated() {
        let padded = CIPHERTEXT.to_string() + "954f64f2e4e86e9eee82d20216684899";
        let fake = FakeAes::new(&padded, PLAINTEXT);
        assert!(check(&fake, &ecb_vector()).passed());
        // The whole padded ciphertext goes back in for decryption.
        assert_eq!(
            fake.calls.lock().unwrap()[1].2,
            format!("{padded}\n{KEY}\n\n")
        );
    }

    #[test]
    fn test_trailing_garbage_after_plaintext_is_tolerated() {
        let fake = FakeAes::new(CIPHERTEXT, &(PLAINTEXT.to_string() + "10101010"));
        assert!(check(&fake, &ecb_vector()).passed());
    }

    #[test]
    fn test_encrypt_mismatch_skips_decrypt() {
        let fake = FakeAes::new("69c4e0d86a7b0430d8cdb78070b4c55b", PLAINTEXT);
        let outcome = check(&fake, &ecb_vector());
        let TestOutcome::Fail(Failure::Mismatch {
            direction: Direction::Encrypt,
            mismatch,
        }) = &outcome
        else {
            panic!("unexpected outcome {:?}", outcome);
        };
        assert_eq!(mismatch.position, 31);
        assert_eq!(fake.directions(), [Direction::Encrypt]);
    }

    #[test]
    fn test_short_ciphertext_is_a_mismatch() {
        let fake = FakeAes::new("69c4e0d8", PLAINTEXT);
        let outcome = check(&fake, &ecb_vector());
        assert!(!outcome.passed());
        assert_eq!(fake.directions(), [Direction::Encrypt]);
    }

    #[test]
    fn test_encrypt_process_failure_skips_decrypt() {
        let fake = FakeAes::new(CIPHERTEXT, PLAINTEXT).failing(Direction::Encrypt);
        let outcome = check(&fake, &ecb_vector());
        assert!(matches!(
            outcome,
            TestOutcome::Fail(Failure::Invocation {
                direction: Direction::Encrypt,
                error: AdapterError::Exec(_),
            })
        ));
        assert_eq!(fake.directions(), [Direction::Encrypt]);
    }

    #[test]
    fn test_decrypt_process_failure() {
        let fake = FakeAes::new(CIPHERTEXT, PLAINTEXT).failing(Direction::Decrypt);
        let TestOutcome::Fail(failure) = check(&fake, &ecb_vector()) else {
            panic!("expected failure");
        };
        assert_eq!(failure.direction(), Direction::Decrypt);
        assert_eq!(fake.directions(), [Direction::Encrypt, Direction::Decrypt]);
    }

    #[test]
    fn test_decrypt_mismatch() {
        let fake = FakeAes::new(CIPHERTEXT, "00112233445566778899aabbccddeefe");
        let TestOutcome::Fail(failure) = check(&fake, &ecb_vector()) else {
            panic!("expected failure");
        };
        assert!(matches!(
            failure,
            Failure::Mismatch {
                direction: Direction::Decrypt,
                ..
            }
        ));
        assert!(failure
            .to_string()
            .starts_with("Decrypt output mismatch: expected 00112233445566778899aabbccddeeff"));
    }

    #[test]
    fn test_expected_values_are_canonicalized() {
        let mut vector = ecb_vector();
        vector.expected_ciphertext = CIPHERTEXT.to_uppercase();
        vector.plaintext = PLAINTEXT.to_uppercase();
        let fake = FakeAes::new(CIPHERTEXT, PLAINTEXT);
        assert!(check(&fake, &vector).passed());
    }

    #[test]
    fn test_cbc_sends_iv() {
        let mut vector = ecb_vector();
        vector.mode = Mode::from_file_name("CBCGFSbox128.rsp").unwrap();
        vector.iv = "0f0e0d0c0b0a09080706050403020100".into();
        let fake = FakeAes::new(CIPHERTEXT, PLAINTEXT);
        assert!(check(&fake, &vector).passed());
        let calls = fake.calls.lock().unwrap();
        assert!(calls
            .iter()
            .all(|c| c.2.ends_with("\n0f0e0d0c0b0a09080706050403020100\n")));
    }
}
