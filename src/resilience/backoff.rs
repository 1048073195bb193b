//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

/// Ceiling for a single backoff interval.
const MAX_BACKOFF_MS: u64 = 10_000;

/// Delay before the retry following `attempt` (0-based): `base * 2^attempt`
/// capped at 10s, plus up to 10% additive jitter so concurrent callers do
/// not retry in lockstep.
pub fn calculate_backoff(attempt: u32, base_ms: u64) -> Duration {
    let base = if base_ms == 0 { 100 } else { base_ms };
    let capped = base
        .saturating_mul(2u64.saturating_pow(attempt))
        .min(MAX_BACKOFF_MS);

    let jitter_range = capped / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..=jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped + jitter)
}
