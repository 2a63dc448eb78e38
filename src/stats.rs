// BOREBENCH STATISTICS
// PURE FUNCTIONS OVER SMALL SAMPLE SETS. NO I/O.

// ARITHMETIC MEAN. NONE FOR AN EMPTY SET.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

// POPULATION STANDARD DEVIATION (DIVIDE BY N, NOT N-1).
// sqrt(sum(x^2)/N - mean^2), CLAMPED AT ZERO AGAINST FP CANCELLATION.
pub fn population_stddev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let n = values.len() as f64;
    let sumsq: f64 = values.iter().map(|v| v * v).sum();
    Some((sumsq / n - m * m).max(0.0).sqrt())
}

// COEFFICIENT OF VARIATION AS A PERCENTAGE
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    if m == 0.0 {
        return None;
    }
    Some(population_stddev(values)? / m * 100.0)
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// (v1 - v2) / v2 * 100, ROUNDED TO 2 DECIMALS. NONE WHEN THE DIVISOR IS ZERO.
pub fn percent_diff(v1: f64, v2: f64) -> Option<f64> {
    if v2 == 0.0 || !v1.is_finite() || !v2.is_finite() {
        return None;
    }
    Some(round2((v1 - v2) / v2 * 100.0))
}

// DISPERSION OF ONE FAN-OUT OF EQUAL WORKERS
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spread {
    pub mean: f64,
    pub stddev: f64,
    pub cv_pct: f64,
}

impl Spread {
    pub fn of(values: &[f64]) -> Option<Self> {
        let mean = mean(values)?;
        let stddev = population_stddev(values)?;
        let cv_pct = coefficient_of_variation(values).unwrap_or(0.0);
        Some(Self { mean, stddev, cv_pct })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(population_stddev(&[]), None);
    }

    #[test]
    fn stddev_divides_by_n() {
        // POPULATION: VAR([2,4,4,4,5,5,7,9]) = 4 -> STDDEV 2
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&v), Some(5.0));
        assert!((population_stddev(&v).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn stddev_of_constant_set_is_zero() {
        let v = [3.3; 8];
        assert!(population_stddev(&v).unwrap() < 1e-6);
    }

    #[test]
    fn spread_of_zero_mean_has_zero_cv() {
        let s = Spread::of(&[0.0, 0.0, 0.0]).unwrap();
        assert_eq!(s.cv_pct, 0.0);
        let s = Spread::of(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((s.cv_pct - 40.0).abs() < 1e-9);
    }

    #[test]
    fn percent_diff_rounds_half_away() {
        assert_eq!(percent_diff(10.0, 12.34), Some(-18.96));
        assert_eq!(percent_diff(12.34, 10.0), Some(23.4));
        assert_eq!(percent_diff(1.0, 0.0), None);
    }

    #[test]
    fn cv_of_zero_mean_is_none() {
        assert_eq!(coefficient_of_variation(&[0.0, 0.0]), None);
        let cv = coefficient_of_variation(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((cv - 40.0).abs() < 1e-9);
    }
}
