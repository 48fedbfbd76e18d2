//! Transaction reference generation.
//!
//! References are the externally visible idempotency/display key of a
//! transaction. A reference is `TXN` + a monotonic millisecond timestamp
//! component + a 6-digit random suffix. The generator guarantees the
//! timestamp component never repeats within a process; cross-process
//! uniqueness is probabilistic and the processor collision-checks every
//! candidate against the transaction log before accepting it.

use rand::Rng;
use std::sync::atomic::{AtomicI64, Ordering};

/// Prefix tag for every generated reference.
pub const REFERENCE_PREFIX: &str = "TXN";

/// Number of random digits appended after the timestamp component.
pub const REFERENCE_SUFFIX_DIGITS: usize = 6;

/// Generates unique transaction references.
#[derive(Debug, Default)]
pub struct ReferenceGenerator {
    last_timestamp_ms: AtomicI64,
}

impl ReferenceGenerator {
    /// Creates a new generator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Produces a new reference.
    #[must_use]
    pub fn generate(&self) -> String {
        let timestamp = self.next_timestamp();
        let suffix: u32 = rand::rng().random_range(0..1_000_000);
        format!("{REFERENCE_PREFIX}{timestamp}{suffix:06}")
    }

    /// Returns a millisecond timestamp that is strictly greater than any
    /// previously returned by this generator.
    fn next_timestamp(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let previous = self
            .last_timestamp_ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            });
        match previous {
            Ok(last) => now.max(last + 1),
            // The closure never returns None; keep the compiler satisfied.
            Err(last) => last,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let reference = ReferenceGenerator::new().generate();
        assert!(reference.starts_with(REFERENCE_PREFIX));
        let digits = &reference[REFERENCE_PREFIX.len()..];
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
        assert!(digits.len() > REFERENCE_SUFFIX_DIGITS);
    }

    #[test]
    fn test_timestamp_component_is_strictly_monotonic() {
        let generator = ReferenceGenerator::new();
        let mut previous = 0;
        for _ in 0..1_000 {
            let timestamp = generator.next_timestamp();
            assert!(timestamp > previous);
            previous = timestamp;
        }
    }

    #[test]
    fn test_no_repeats_in_a_burst() {
        let generator = ReferenceGenerator::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1_000 {
            assert!(seen.insert(generator.generate()));
        }
    }
}
