// SPDX-License-Identifier: AGPL-3.0-only

//! Acceptance thresholds with numerical justification.
//!
//! Every threshold printed by the probe is defined here with its origin.
//! No ad-hoc magic numbers at call sites.

/// Tolerance for operations that should be exact in f64 arithmetic.
///
/// f64 addition of two finite values is correctly rounded, so host and
/// device produce bit-identical sums; 1e-10 leaves room for accumulation
/// if a driver fuses operations differently.
pub const EXACT_F64: f64 = 1e-10;

/// Upper bound on the sum of squared host-vs-device differences.
///
/// Per-element disagreement for a single f64 add is at most one ulp of the
/// result (~1e-16 relative); squared and summed over the default 2^20
/// elements that stays far below 1e-9 for inputs of magnitude up to ~1e3.
/// A value above this bound indicates a broken f64 path (e.g. silent f32
/// demotion), not rounding.
pub const GPU_VS_CPU_SUM_SQ: f64 = 1e-9;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_positive_and_ordered() {
        assert!(EXACT_F64 > 0.0);
        assert!(GPU_VS_CPU_SUM_SQ > 0.0);
        assert!(EXACT_F64 < GPU_VS_CPU_SUM_SQ * 1e2);
    }

    #[test]
    fn sum_sq_bound_catches_f32_demotion() {
        // An f32-demoted add of values near 1e6 loses ~0.06 per element;
        // even one such element exceeds the bound by orders of magnitude.
        let per_element = 0.06_f64 * 0.06;
        assert!(per_element > GPU_VS_CPU_SUM_SQ);
    }
}
