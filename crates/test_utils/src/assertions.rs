//! Custom Test Assertions
//!
//! Assertion helpers for claims domain types that give more meaningful
//! failure messages than bare `assert_eq!`.

use domain_claims::{Claim, ClaimStatus, ClaimStatusLog};

/// Asserts that a claim is in the expected lifecycle status
pub fn assert_claim_status(claim: &Claim, expected: ClaimStatus) {
    assert_eq!(
        claim.status, expected,
        "claim {} is {}, expected {}",
        claim.claim_reference, claim.status, expected
    );
}

/// Asserts that a status log forms a contiguous chain from `start`
///
/// Every row must begin where the previous one ended, and the first row
/// must begin at `start`.
pub fn assert_log_chain(logs: &[ClaimStatusLog], start: ClaimStatus) {
    let Some(first) = logs.first() else {
        panic!("expected a non-empty status log");
    };
    assert_eq!(
        first.from_status, start,
        "log chain starts at {}, expected {}",
        first.from_status, start
    );
    for pair in logs.windows(2) {
        assert_eq!(
            pair[0].to_status, pair[1].from_status,
            "log chain broken between {} -> {} and {} -> {}",
            pair[0].from_status, pair[0].to_status, pair[1].from_status, pair[1].to_status
        );
        assert!(
            pair[0].created_at <= pair[1].created_at,
            "log rows out of chronological order"
        );
    }
}

/// Asserts that the claim references in `claims` are unique and strictly
/// sequential within each year
pub fn assert_references_gapless(claims: &[Claim]) {
    let mut by_year: std::collections::BTreeMap<i32, Vec<u32>> = std::collections::BTreeMap::new();
    for claim in claims {
        by_year
            .entry(claim.claim_reference.year())
            .or_default()
            .push(claim.claim_reference.sequence());
    }
    for (year, mut sequences) in by_year {
        sequences.sort_unstable();
        for (i, sequence) in sequences.iter().enumerate() {
            assert_eq!(
                *sequence,
                (i + 1) as u32,
                "references for {year} are not gapless: {sequences:?}"
            );
        }
    }
}
