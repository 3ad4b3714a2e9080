//! Claim reference numbers
//!
//! Every claim carries a human-readable reference `CLM-YYYY-NNNNN`: a
//! year-scoped, zero-padded, strictly sequential number assigned exactly
//! once at first persistence. The reference appears on printed documents,
//! so the format is exact and immutable.
//!
//! Allocation itself is a store concern (it needs a critical section over
//! "read max, compute next, insert"); this module owns the format and the
//! successor computation the stores share.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const PREFIX: &str = "CLM";
const SEQUENCE_DIGITS: usize = 5;
const MAX_SEQUENCE: u32 = 99_999;

/// Errors raised by reference parsing and allocation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("malformed claim reference: {0}")]
    Malformed(String),

    #[error("claim reference year out of range: {0}")]
    YearOutOfRange(i32),

    #[error("claim reference sequence out of range: {0}")]
    SequenceOutOfRange(u32),

    #[error("claim reference sequence exhausted for year {0}")]
    SequenceExhausted(i32),
}

/// A validated `CLM-YYYY-NNNNN` claim reference
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimReference(String);

impl ClaimReference {
    /// Builds a reference from its parts
    pub fn new(year: i32, sequence: u32) -> Result<Self, ReferenceError> {
        if !(1000..=9999).contains(&year) {
            return Err(ReferenceError::YearOutOfRange(year));
        }
        if sequence == 0 || sequence > MAX_SEQUENCE {
            return Err(ReferenceError::SequenceOutOfRange(sequence));
        }
        Ok(Self(format!(
            "{PREFIX}-{year}-{sequence:0width$}",
            width = SEQUENCE_DIGITS
        )))
    }

    /// The first reference of a year (`CLM-<year>-00001`)
    pub fn first_of_year(year: i32) -> Result<Self, ReferenceError> {
        Self::new(year, 1)
    }

    /// Returns the year component
    pub fn year(&self) -> i32 {
        // Validated on construction, the slice cannot fail to parse.
        self.0[PREFIX.len() + 1..PREFIX.len() + 5]
            .parse()
            .unwrap_or(0)
    }

    /// Returns the sequence component
    pub fn sequence(&self) -> u32 {
        self.0[self.0.len() - SEQUENCE_DIGITS..].parse().unwrap_or(0)
    }

    /// Returns the successor within the same year
    pub fn next(&self) -> Result<Self, ReferenceError> {
        let seq = self.sequence();
        if seq >= MAX_SEQUENCE {
            return Err(ReferenceError::SequenceExhausted(self.year()));
        }
        Self::new(self.year(), seq + 1)
    }

    /// Computes the reference to assign given the greatest existing
    /// reference for `year` (or `None` when the year has no claims yet)
    ///
    /// Callers must hold the store's allocation lock across "read max,
    /// compute, insert"; this function is the pure middle step.
    pub fn next_in_year(last: Option<&ClaimReference>, year: i32) -> Result<Self, ReferenceError> {
        match last {
            Some(reference) if reference.year() == year => reference.next(),
            _ => Self::first_of_year(year),
        }
    }

    /// The `CLM-<year>-` prefix used to scope store queries to one year
    pub fn year_prefix(year: i32) -> String {
        format!("{PREFIX}-{year}-")
    }

    /// Returns the reference as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClaimReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ClaimReference {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ReferenceError::Malformed(s.to_string());

        let mut parts = s.split('-');
        let prefix = parts.next().ok_or_else(malformed)?;
        let year_part = parts.next().ok_or_else(malformed)?;
        let seq_part = parts.next().ok_or_else(malformed)?;
        if prefix != PREFIX || parts.next().is_some() {
            return Err(malformed());
        }
        if year_part.len() != 4 || !year_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        if seq_part.len() != SEQUENCE_DIGITS || !seq_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        let year: i32 = year_part.parse().map_err(|_| malformed())?;
        let sequence: u32 = seq_part.parse().map_err(|_| malformed())?;
        ClaimReference::new(year, sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let reference = ClaimReference::new(2025, 1).unwrap();
        assert_eq!(reference.as_str(), "CLM-2025-00001");
    }

    #[test]
    fn test_accessors() {
        let reference = ClaimReference::new(2025, 17).unwrap();
        assert_eq!(reference.year(), 2025);
        assert_eq!(reference.sequence(), 17);
    }

    #[test]
    fn test_next_in_year_starts_at_one() {
        let reference = ClaimReference::next_in_year(None, 2025).unwrap();
        assert_eq!(reference.as_str(), "CLM-2025-00001");
    }

    #[test]
    fn test_next_in_year_increments() {
        let last = ClaimReference::new(2025, 41).unwrap();
        let next = ClaimReference::next_in_year(Some(&last), 2025).unwrap();
        assert_eq!(next.as_str(), "CLM-2025-00042");
    }

    #[test]
    fn test_next_in_year_restarts_for_new_year() {
        let last = ClaimReference::new(2024, 99).unwrap();
        let next = ClaimReference::next_in_year(Some(&last), 2025).unwrap();
        assert_eq!(next.as_str(), "CLM-2025-00001");
    }

    #[test]
    fn test_sequence_exhaustion() {
        let last = ClaimReference::new(2025, 99_999).unwrap();
        assert_eq!(
            last.next(),
            Err(ReferenceError::SequenceExhausted(2025))
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "",
            "CLM-2025",
            "CLM-2025-001",
            "CLM-2025-000001",
            "XYZ-2025-00001",
            "CLM-25-00001",
            "CLM-2025-00001-x",
            "CLM-2025-0000a",
        ] {
            assert!(bad.parse::<ClaimReference>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_parse_rejects_zero_sequence() {
        assert!("CLM-2025-00000".parse::<ClaimReference>().is_err());
    }

    #[test]
    fn test_ordering_matches_sequence_order() {
        let a = ClaimReference::new(2025, 9).unwrap();
        let b = ClaimReference::new(2025, 10).unwrap();
        assert!(a < b);
    }
}
