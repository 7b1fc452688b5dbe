use crate::domain::sector::Metric;

/// Linear 0..=100 score for `value` within `[min, max]`, clamped at both ends.
///
/// Missing or non-finite input scores 0. A degenerate range (`min == max`)
/// scores 100 at or above `max` and 0 below it.
pub fn normalize(value: Option<f64>, min: f64, max: f64) -> f64 {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return 0.0;
    };
    if min == max {
        return if v >= max { 100.0 } else { 0.0 };
    }
    (((v - min) * 100.0) / (max - min)).clamp(0.0, 100.0)
}

/// Scale for "lower is better" metrics: scored from `ceiling - value` over
/// `[0, ceiling]`.
pub fn normalize_inverted(value: Option<f64>, ceiling: f64) -> f64 {
    normalize(value.map(|v| ceiling - v), 0.0, ceiling)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    Linear { min: f64, max: f64 },
    Inverted { ceiling: f64 },
}

impl Scale {
    pub fn apply(self, value: Option<f64>) -> f64 {
        match self {
            Scale::Linear { min, max } => normalize(value, min, max),
            Scale::Inverted { ceiling } => normalize_inverted(value, ceiling),
        }
    }
}

pub fn scale_for(metric: Metric) -> Scale {
    match metric {
        Metric::EbitdaMargin => Scale::Linear { min: 0.0, max: 50.0 },
        Metric::DebtToEbitda => Scale::Inverted { ceiling: 10.0 },
        Metric::Growth => Scale::Linear { min: -20.0, max: 50.0 },
        Metric::Revenue => Scale::Linear { min: 0.0, max: 500.0 },
        Metric::Roe => Scale::Linear { min: 0.0, max: 20.0 },
        Metric::Trend => Scale::Linear { min: -50.0, max: 50.0 },
        Metric::EvToEbitda => Scale::Inverted { ceiling: 30.0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn interpolates_and_clamps() {
        assert_eq!(normalize(Some(25.0), 0.0, 50.0), 50.0);
        assert_eq!(normalize(Some(-10.0), 0.0, 50.0), 0.0);
        assert_eq!(normalize(Some(60.0), 0.0, 50.0), 100.0);
        assert_eq!(normalize(Some(0.0), 0.0, 50.0), 0.0);
        assert_eq!(normalize(Some(50.0), 0.0, 50.0), 100.0);
    }

    #[test]
    fn missing_or_nan_scores_zero() {
        assert_eq!(normalize(None, 0.0, 50.0), 0.0);
        assert_eq!(normalize(Some(f64::NAN), 0.0, 50.0), 0.0);
        assert_eq!(normalize(Some(f64::INFINITY), 0.0, 50.0), 0.0);
    }

    #[test]
    fn degenerate_range() {
        assert_eq!(normalize(Some(5.0), 5.0, 5.0), 100.0);
        assert_eq!(normalize(Some(6.0), 5.0, 5.0), 100.0);
        assert_eq!(normalize(Some(4.9), 5.0, 5.0), 0.0);
    }

    #[test]
    fn inverted_debt_to_ebitda() {
        let s = scale_for(Metric::DebtToEbitda).apply(Some(2.0));
        assert!((s - 80.0).abs() < 1e-9);
        assert_eq!(s, normalize(Some(8.0), 0.0, 10.0));
        assert_eq!(scale_for(Metric::DebtToEbitda).apply(Some(12.0)), 0.0);
        assert_eq!(scale_for(Metric::DebtToEbitda).apply(Some(-1.0)), 100.0);
    }

    proptest! {
        #[test]
        fn always_within_bounds(v in -1.0e12f64..1.0e12, min in -1.0e6f64..1.0e6, span in 0.0f64..1.0e6) {
            let s = normalize(Some(v), min, min + span);
            prop_assert!((0.0..=100.0).contains(&s));
        }

        #[test]
        fn monotonic_non_decreasing(a in -1.0e9f64..1.0e9, b in -1.0e9f64..1.0e9, min in -1.0e3f64..1.0e3, span in 0.0f64..1.0e3) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let max = min + span;
            prop_assert!(normalize(Some(lo), min, max) <= normalize(Some(hi), min, max));
        }
    }
}
