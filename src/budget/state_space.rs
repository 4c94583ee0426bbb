//! Counts the output states of the flexible event-level mechanism.
//!
//! Let B be the trigger data cardinality. For every trigger data i there are
//! w_i windows and c_i summary buckets, and C is the global report cap:
//!
//! 1. A[C, w_1..w_B, c_1..c_B] = 1 if B = 0
//! 2. A[C, w_1..w_B, c_1..c_B] = A[C, w_1..w_{B-1}, c_1..c_{B-1}] if w_B = 0
//! 3. A[C, w_1..w_B, c_1..c_B] =
//!    sum(A[C - j, w_1..w_B - 1, c_1..c_B - j], j from 0 to min(c_B, C))
//!
//! Unrolling the window dimension, trigger data i contributes
//! binomial(k + w_i - 1, k) ways to spread exactly k <= c_i reports over its
//! windows. The count is evaluated one trigger data at a time as a
//! convolution of these per-trigger-data distributions truncated at C, so
//! neither many windows nor many trigger data deepen the stack.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::budget::config::PerTriggerDataConfig;

/// `ways[k]`: number of ways to spread exactly `k` reports over the windows
/// of one trigger data value, for `k` up to `max_reports`.
fn ways_per_report_count(
    config: &PerTriggerDataConfig,
    max_reports: usize,
) -> Vec<BigUint> {
    if config.num_windows == 0 {
        return vec![BigUint::one()];
    }
    let windows = u64::from(config.num_windows);
    let mut ways = Vec::with_capacity(max_reports + 1);
    let mut current = BigUint::one();
    ways.push(current.clone());
    for k in 1..=max_reports as u64 {
        // binomial(k + w - 1, k) from binomial(k + w - 2, k - 1).
        current = current * BigUint::from(windows - 1 + k) / BigUint::from(k);
        ways.push(current.clone());
    }
    ways
}

/// Returns the number of distinct outputs the mechanism can produce with a
/// global cap of `max_event_level_reports` reports, given one
/// `(windows, buckets)` configuration per trigger data value.
pub fn count_states(
    max_event_level_reports: u32,
    configs: &[PerTriggerDataConfig],
) -> BigUint {
    // No output can hold more reports than there are buckets in total.
    let total_buckets: u64 = configs
        .iter()
        .map(|c| u64::from(c.num_summary_buckets))
        .sum();
    let cap = u64::from(max_event_level_reports).min(total_buckets) as usize;

    // by_total[r]: outputs of the trigger data seen so far with exactly r
    // reports.
    let mut by_total = vec![BigUint::zero(); cap + 1];
    by_total[0] = BigUint::one();

    for config in configs {
        let max_reports = (config.num_summary_buckets as usize).min(cap);
        let ways = ways_per_report_count(config, max_reports);

        let mut next = vec![BigUint::zero(); cap + 1];
        for (reports, count) in by_total.iter().enumerate() {
            if count.is_zero() {
                continue;
            }
            for (k, w) in ways.iter().enumerate().take(cap - reports + 1) {
                next[reports + k] += count * w;
            }
        }
        by_total = next;
    }

    by_total.into_iter().sum()
}
