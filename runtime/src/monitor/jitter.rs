// Copyright 2026 Slotwatch Contributors
// SPDX-License-Identifier: Apache-2.0

//! Randomized poll spacing.

use rand::Rng;

/// Half-width of the jitter window: a third of the base, at least one second.
pub fn jitter_span(base_secs: u64) -> u64 {
    let span = (base_secs as f64 * 20.0 / 60.0).round() as u64;
    span.max(1)
}

/// Inclusive bounds `[low, high]` that [`next_interval`] draws from.
pub fn interval_bounds(base_secs: u64) -> (u64, u64) {
    let base = base_secs.max(1);
    let span = jitter_span(base);
    (base.saturating_sub(span).max(1), base.saturating_add(span))
}

/// Seconds to wait before the next cycle, uniform over [`interval_bounds`].
pub fn next_interval(base_secs: u64) -> u64 {
    let (low, high) = interval_bounds(base_secs);
    rand::thread_rng().gen_range(low..=high)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span() {
        assert_eq!(jitter_span(60), 20);
        assert_eq!(jitter_span(30), 10);
        assert_eq!(jitter_span(45), 15);
        assert_eq!(jitter_span(3), 1);
        assert_eq!(jitter_span(1), 1);
        assert_eq!(jitter_span(0), 1);
    }

    #[test]
    fn test_bounds() {
        assert_eq!(interval_bounds(60), (40, 80));
        assert_eq!(interval_bounds(2), (1, 3));
        assert_eq!(interval_bounds(1), (1, 2));
        assert_eq!(interval_bounds(0), (1, 2));
    }

    #[test]
    fn test_draws_stay_in_range() {
        for _ in 0..500 {
            let n = next_interval(60);
            assert!((40..=80).contains(&n), "{n} out of range");
        }
    }

    #[test]
    fn test_degenerate_base() {
        for _ in 0..100 {
            assert!(next_interval(0) >= 1);
        }
    }

    #[test]
    fn test_huge_base_saturates() {
        assert_eq!(interval_bounds(u64::MAX).1, u64::MAX);
        let n = next_interval(u64::MAX);
        assert!(n >= interval_bounds(u64::MAX).0);
        let high = next_interval(u64::MAX / 4 * 3);
        assert!(high >= 1);
    }
}
