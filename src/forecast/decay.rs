//! Exponential decay of the growth ratio toward 1.0.

/// The horizon is split into this many time constants.
pub const TIME_CONSTANTS_PER_HORIZON: f64 = 4.0;

/// Projection length, in time constants.
pub const PROJECTION_TIME_CONSTANTS: f64 = 6.0;

/// Future growth ratios `(initial - 1) * exp(-x / tau) + 1` for
/// `x = 0, 1, ...` while `x < 6 * tau`, with `tau = horizon / 4`.
///
/// `horizon` must be positive; callers validate it.
pub fn growth_rate_exp_decay(initial_ratio: f64, horizon: i64) -> Vec<f64> {
    let tau = horizon as f64 / TIME_CONSTANTS_PER_HORIZON;
    let steps = (tau * PROJECTION_TIME_CONSTANTS).ceil().max(0.0) as usize;
    (0..steps)
        .map(|x| (initial_ratio - 1.0) * (-(x as f64) / tau).exp() + 1.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_ratio_equals_initial() {
        let r = growth_rate_exp_decay(1.3, 20);
        assert!((r[0] - 1.3).abs() < 1e-12);
    }

    #[test]
    fn length_is_ceil_of_six_tau() {
        // tau = 2.75 → 16.5 → 17 steps
        assert_eq!(growth_rate_exp_decay(1.2, 11).len(), 17);
        // tau = 30 → exactly 180 steps
        assert_eq!(growth_rate_exp_decay(1.2, 120).len(), 180);
    }

    #[test]
    fn ratios_decrease_monotonically_toward_one() {
        let r = growth_rate_exp_decay(1.25, 40);
        assert!(r.windows(2).all(|w| w[1] < w[0]));
        assert!(r.iter().all(|x| *x > 1.0));
    }

    #[test]
    fn ratio_after_six_time_constants_is_near_one() {
        let initial = 1.4;
        let at_end = (initial - 1.0) * (-PROJECTION_TIME_CONSTANTS).exp() + 1.0;
        assert!((at_end - 1.0).abs() < 1e-2);
        let r = growth_rate_exp_decay(initial, 60);
        assert!((r[r.len() - 1] - 1.0).abs() < 2e-3);
    }

    #[test]
    fn unit_ratio_stays_flat() {
        assert!(growth_rate_exp_decay(1.0, 30).iter().all(|r| (*r - 1.0).abs() < 1e-15));
    }
}
