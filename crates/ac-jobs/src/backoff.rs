// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Agent Console contributors

//! Exponential backoff with jitter for job retry scheduling.

use std::time::Duration;

const BASE: Duration = Duration::from_secs(1);
const MAX: Duration = Duration::from_secs(30);

/// Delay before the `attempt`-th retry (1-indexed): `base * 2^(attempt-1)`,
/// capped at `MAX` and jittered by up to ±30% to avoid synchronized retries
/// from jobs that failed together.
pub fn next_retry_delay(attempt: u32) -> Duration {
    let exp = attempt.saturating_sub(1).min(16);
    let scaled = BASE.saturating_mul(1u32.checked_shl(exp).unwrap_or(u32::MAX));
    let capped = scaled.min(MAX);
    jitter(capped)
}

fn jitter(d: Duration) -> Duration {
    use rand::Rng;
    let jitter_frac: f64 = rand::thread_rng().gen_range(-0.3..0.3);
    Duration::from_secs_f64((d.as_secs_f64() * (1.0 + jitter_frac)).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_with_attempt_count() {
        let d1 = next_retry_delay(1).as_secs_f64();
        let d2 = next_retry_delay(4).as_secs_f64();
        assert!(d2 > d1);
    }

    #[test]
    fn delay_is_capped_at_max_plus_jitter() {
        let d = next_retry_delay(30);
        assert!(d <= MAX + MAX.mul_f64(0.3));
    }

    #[test]
    fn delay_stays_within_jitter_band_of_base() {
        let d = next_retry_delay(1);
        assert!(d >= BASE.mul_f64(0.7) && d <= BASE.mul_f64(1.3));
    }
}
