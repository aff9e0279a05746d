//! # Domain Value Objects
//!
//! Immutable value types for the two identifiers the tool deals with:
//! the 8-digit Type Allocation Code (TAC) and the 15-digit IMEI.
//! Value objects are defined by their attributes rather than identity and
//! can only be constructed in a valid state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::checksum;

/// Number of digits in a Type Allocation Code
pub const TAC_LEN: usize = 8;

/// Number of random serial digits appended to the TAC
pub const SERIAL_LEN: usize = 6;

/// Number of digits in a complete IMEI (TAC + serial + check digit)
pub const IMEI_LEN: usize = TAC_LEN + SERIAL_LEN + 1;

/// Identifier contract violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    #[error("invalid input: expected {expected} decimal digits, got {actual}")]
    InvalidInput { expected: usize, actual: String },

    #[error("invalid prefix '{0}': the TAC must be exactly 8 decimal digits")]
    InvalidPrefix(String),

    #[error("checksum mismatch for '{imei}': expected {expected}, found {found}")]
    ChecksumMismatch { imei: String, expected: u8, found: u8 },
}

/// Validated Type Allocation Code (exactly 8 ASCII digits)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tac(String);

impl Tac {
    /// Parses and validates a TAC, trimming surrounding whitespace
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let trimmed = raw.trim();
        if trimmed.len() == TAC_LEN && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(IdentifierError::InvalidPrefix(raw.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digit values of the TAC, most significant first
    #[must_use]
    pub fn digits(&self) -> [u8; TAC_LEN] {
        let mut out = [0u8; TAC_LEN];
        for (slot, byte) in out.iter_mut().zip(self.0.bytes()) {
            *slot = byte - b'0';
        }
        out
    }
}

impl FromStr for Tac {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Tac {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Tac> for String {
    fn from(value: Tac) -> Self {
        value.0
    }
}

impl fmt::Display for Tac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A complete 15-digit IMEI whose last digit satisfies the check digit relation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Imei(String);

impl Imei {
    /// Parses a 15-digit IMEI and verifies its check digit
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let digits = checksum::parse_digits(raw.trim(), IMEI_LEN)?;
        let expected = checksum::compute_check_digit(&digits[..IMEI_LEN - 1])?;
        let found = digits[IMEI_LEN - 1];
        if expected != found {
            return Err(IdentifierError::ChecksumMismatch {
                imei: raw.to_string(),
                expected,
                found,
            });
        }
        Ok(Self(raw.trim().to_string()))
    }

    /// Builds an IMEI from a TAC and serial digits; the check digit is derived here
    pub(crate) fn assemble(tac: &Tac, serial: [u8; SERIAL_LEN]) -> Self {
        let mut payload = [0u8; IMEI_LEN - 1];
        payload[..TAC_LEN].copy_from_slice(&tac.digits());
        payload[TAC_LEN..].copy_from_slice(&serial);

        let check = checksum::check_digit_of(&payload);

        let mut text = String::with_capacity(IMEI_LEN);
        text.push_str(tac.as_str());
        text.extend(serial.iter().map(|d| char::from(b'0' + d)));
        text.push(char::from(b'0' + check));
        Self(text)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The leading 8 digits
    #[must_use]
    pub fn tac(&self) -> &str {
        &self.0[..TAC_LEN]
    }

    /// The 6 serial digits between TAC and check digit
    #[must_use]
    pub fn serial(&self) -> &str {
        &self.0[TAC_LEN..IMEI_LEN - 1]
    }

    /// The first 14 digits the check digit is computed over
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.0[..IMEI_LEN - 1]
    }

    #[must_use]
    pub fn check_digit(&self) -> u8 {
        self.0.as_bytes()[IMEI_LEN - 1] - b'0'
    }
}

impl FromStr for Imei {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Imei {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Imei> for String {
    fn from(value: Imei) -> Self {
        value.0
    }
}

impl fmt::Display for Imei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tac_accepts_eight_digits_and_trims() {
        let tac = Tac::parse(" 35191210 ").unwrap();
        assert_eq!(tac.as_str(), "35191210");
        assert_eq!(tac.digits(), [3, 5, 1, 9, 1, 2, 1, 0]);
    }

    #[test]
    fn tac_rejects_wrong_length_or_non_digits() {
        for raw in ["", "3519121", "351912100", "3519121a", "35 91210", "３５１９１２１０"] {
            assert!(
                matches!(Tac::parse(raw), Err(IdentifierError::InvalidPrefix(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn imei_parse_checks_the_check_digit() {
        let imei = Imei::parse("351912101234561").unwrap();
        assert_eq!(imei.tac(), "35191210");
        assert_eq!(imei.serial(), "123456");
        assert_eq!(imei.payload(), "35191210123456");
        assert_eq!(imei.check_digit(), 1);

        let err = Imei::parse("351912101234562").unwrap_err();
        assert_eq!(
            err,
            IdentifierError::ChecksumMismatch {
                imei: "351912101234562".to_string(),
                expected: 1,
                found: 2,
            }
        );
    }

    #[test]
    fn imei_parse_rejects_bad_length() {
        assert!(matches!(
            Imei::parse("35191210123456"),
            Err(IdentifierError::InvalidInput { expected: 15, .. })
        ));
    }

    #[test]
    fn assemble_matches_parse() {
        let tac = Tac::parse("35191210").unwrap();
        let imei = Imei::assemble(&tac, [1, 2, 3, 4, 5, 6]);
        assert_eq!(imei.as_str(), "351912101234561");
        assert_eq!(Imei::parse(imei.as_str()).unwrap(), imei);
    }

    #[test]
    fn serde_uses_plain_strings() {
        let tac = Tac::parse("01234567").unwrap();
        assert_eq!(serde_json::to_string(&tac).unwrap(), "\"01234567\"");
        assert!(serde_json::from_str::<Tac>("\"0123\"").is_err());
    }
}
