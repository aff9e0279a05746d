//! IMEI generator: TAC + 6 random serial digits + check digit.
//!
//! The serial digits come from a non-cryptographic RNG. Calls are
//! independent and may repeat values; uniqueness is not a goal here.

use super::value_objects::{IdentifierError, Imei, SERIAL_LEN, Tac};

/// Generates IMEIs for a given TAC
#[derive(Debug, Clone)]
pub struct ImeiGenerator {
    rng: fastrand::Rng,
}

impl ImeiGenerator {
    /// Creates a generator backed by a randomly seeded RNG
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    /// Reproducible sequence, for tests and benches
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Generates one IMEI for an already validated TAC
    pub fn generate(&mut self, tac: &Tac) -> Imei {
        let mut serial = [0u8; SERIAL_LEN];
        for digit in &mut serial {
            *digit = self.rng.u8(0..10);
        }
        Imei::assemble(tac, serial)
    }

    /// Validates `prefix` as a TAC, then generates one IMEI
    pub fn generate_from_prefix(&mut self, prefix: &str) -> Result<Imei, IdentifierError> {
        let tac = Tac::parse(prefix)?;
        Ok(self.generate(&tac))
    }

    /// Generates `count` independent IMEIs for the same TAC
    pub fn generate_many(&mut self, tac: &Tac, count: usize) -> Vec<Imei> {
        (0..count).map(|_| self.generate(tac)).collect()
    }

    /// Deterministic assembly from known serial digits (each 0..=9)
    pub fn assemble(tac: &Tac, serial: [u8; SERIAL_LEN]) -> Result<Imei, IdentifierError> {
        if serial.iter().any(|d| *d > 9) {
            return Err(IdentifierError::InvalidInput {
                expected: SERIAL_LEN,
                actual: format!("{serial:?}"),
            });
        }
        Ok(Imei::assemble(tac, serial))
    }
}

impl Default for ImeiGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::checksum;

    #[test]
    fn generated_imei_keeps_prefix_and_checksum() {
        let tac = Tac::parse("35191210").unwrap();
        let mut generator = ImeiGenerator::new();
        for _ in 0..200 {
            let imei = generator.generate(&tac);
            assert_eq!(imei.as_str().len(), 15);
            assert!(imei.as_str().starts_with("35191210"));
            assert_eq!(
                checksum::compute_check_digit_str(imei.payload()).unwrap(),
                imei.check_digit()
            );
        }
    }

    #[test]
    fn generate_from_prefix_revalidates() {
        let mut generator = ImeiGenerator::new();
        assert!(matches!(
            generator.generate_from_prefix("1234"),
            Err(IdentifierError::InvalidPrefix(_))
        ));
        assert!(generator.generate_from_prefix("35191210").is_ok());
    }

    #[test]
    fn assemble_literal_example() {
        let tac = Tac::parse("35191210").unwrap();
        let imei = ImeiGenerator::assemble(&tac, [1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(imei.as_str(), "351912101234561");
        assert!(ImeiGenerator::assemble(&tac, [1, 2, 3, 4, 5, 10]).is_err());
    }

    #[test]
    fn generate_many_returns_requested_count() {
        let tac = Tac::parse("86012345").unwrap();
        let imeis = ImeiGenerator::default().generate_many(&tac, 25);
        assert_eq!(imeis.len(), 25);
        assert!(imeis.iter().all(|i| i.tac() == "86012345"));
    }
}
