//! Human-readable record numbers (`QC-SAM-2026-0042`, `QA-REL-2026-0007`).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Prefix for QC sample numbers.
pub const SAMPLE_NUMBER_PREFIX: &str = "QC-SAM";

/// Prefix for QA release numbers.
pub const RELEASE_NUMBER_PREFIX: &str = "QA-REL";

/// `<prefix>-<year>-<seq>` with the sequence zero-padded to four digits.
///
/// Sequences restart every calendar year and are allocated by the owning
/// repository, which guarantees uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentNumber(String);

impl DocumentNumber {
    pub fn new(prefix: &str, year: i32, sequence: u32) -> Self {
        Self(format!("{}-{}-{:04}", prefix, year, sequence))
    }

    pub fn sample(year: i32, sequence: u32) -> Self {
        Self::new(SAMPLE_NUMBER_PREFIX, year, sequence)
    }

    pub fn release(year: i32, sequence: u32) -> Self {
        Self::new(RELEASE_NUMBER_PREFIX, year, sequence)
    }

    /// Parses a stored number, checking its shape.
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let mut parts = value.rsplitn(3, '-');
        let sequence = parts.next().unwrap_or_default();
        let year = parts.next().unwrap_or_default();
        let prefix = parts.next().unwrap_or_default();

        let well_formed = !prefix.is_empty()
            && year.len() == 4
            && year.chars().all(|c| c.is_ascii_digit())
            && sequence.len() >= 4
            && sequence.chars().all(|c| c.is_ascii_digit());
        if !well_formed {
            return Err(ValidationError::invalid_format(
                "number",
                format!("'{}' is not <PREFIX>-<YEAR>-<SEQ>", value),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_numbers_are_zero_padded() {
        assert_eq!(DocumentNumber::sample(2026, 7).as_str(), "QC-SAM-2026-0007");
    }

    #[test]
    fn sequences_past_four_digits_widen() {
        assert_eq!(DocumentNumber::release(2026, 12345).as_str(), "QA-REL-2026-12345");
    }

    #[test]
    fn parse_accepts_generated_numbers() {
        let number = DocumentNumber::sample(2025, 42);
        assert_eq!(DocumentNumber::parse(number.as_str()).unwrap(), number);
    }

    #[test]
    fn parse_rejects_malformed_numbers() {
        assert!(DocumentNumber::parse("QC-SAM-26-0001").is_err());
        assert!(DocumentNumber::parse("QC-SAM-2026-01").is_err());
        assert!(DocumentNumber::parse("2026-0001").is_err());
    }
}
