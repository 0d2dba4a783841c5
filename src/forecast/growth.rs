//! Day-over-day growth ratios and their exponentially weighted average.

/// `r[t] = value[t] / value[t-1]`, positional over the observed points.
///
/// The first entry is always `None`. A zero or non-finite denominator, or a
/// non-finite quotient, also yields `None`.
pub fn growth_ratios(values: &[f64]) -> Vec<Option<f64>> {
    let mut ratios = Vec::with_capacity(values.len());
    if values.is_empty() {
        return ratios;
    }
    ratios.push(None);
    for pair in values.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        let ratio = if prev == 0.0 || !prev.is_finite() {
            None
        } else {
            Some(curr / prev).filter(|r| r.is_finite())
        };
        ratios.push(ratio);
    }
    ratios
}

/// Smoothing factor for a span: `2 / (span + 1)`.
pub fn span_alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Adjusted exponentially weighted moving average.
///
/// The value at `t` is `Σ (1-α)^(t-i) x_i / Σ (1-α)^(t-i)` over the defined
/// samples `i <= t`. Undefined samples are skipped but still age the older
/// ones. Returns `None` at positions with no defined sample so far.
pub fn ewma(samples: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    let decay = 1.0 - span_alpha(span);
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    let mut out = Vec::with_capacity(samples.len());

    for sample in samples {
        numerator *= decay;
        denominator *= decay;
        if let Some(x) = sample {
            numerator += x;
            denominator += 1.0;
        }
        out.push((denominator > 0.0).then(|| numerator / denominator));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn first_ratio_is_undefined() {
        let r = growth_ratios(&[20.0, 25.0, 30.0]);
        assert_eq!(r[0], None);
        assert!((r[1].unwrap() - 1.25).abs() < EPS);
        assert!((r[2].unwrap() - 1.2).abs() < EPS);
    }

    #[test]
    fn zero_denominator_is_undefined_not_infinite() {
        let r = growth_ratios(&[0.0, 5.0, 10.0]);
        assert_eq!(r[1], None);
        assert!((r[2].unwrap() - 2.0).abs() < EPS);
    }

    #[test]
    fn empty_input_gives_no_ratios() {
        assert!(growth_ratios(&[]).is_empty());
    }

    #[test]
    fn alpha_for_span_four() {
        assert!((span_alpha(4) - 0.4).abs() < EPS);
    }

    #[test]
    fn ewma_matches_hand_computation() {
        // span 4 → decay 0.6
        let out = ewma(&[None, Some(1.0), Some(2.0)], 4);
        assert_eq!(out[0], None);
        assert!((out[1].unwrap() - 1.0).abs() < EPS);
        let expected = (2.0 + 0.6 * 1.0) / (1.0 + 0.6);
        assert!((out[2].unwrap() - expected).abs() < EPS);
    }

    #[test]
    fn ewma_skips_undefined_samples_but_ages_older_ones() {
        let out = ewma(&[Some(1.0), None, Some(3.0)], 4);
        assert!((out[1].unwrap() - 1.0).abs() < EPS);
        let expected = (3.0 + 0.36 * 1.0) / (1.0 + 0.36);
        assert!((out[2].unwrap() - expected).abs() < EPS);
    }

    #[test]
    fn ewma_of_constant_is_constant() {
        let samples = vec![Some(1.3); 10];
        for v in ewma(&samples, 4).into_iter().flatten() {
            assert!((v - 1.3).abs() < EPS);
        }
    }
}
