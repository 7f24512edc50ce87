//! Beta-distribution shape parameters: moment matching and maximum-likelihood fitting.
//!
//! Moment matching converts a target mean M and variance V into shape
//! parameters:
//!
//! ```text
//! a = (M²(1−M) − V·M) / V
//! b = a(1−M) / M
//! ```
//!
//! which is only valid while `V < M(1−M)`. [`moments_to_beta`] is the raw
//! closed form; [`BetaShape::from_moments`] rejects degenerate inputs.
//!
//! [`BetaShape::fit`] estimates (a, b) from samples on (0, 1) with location 0
//! and scale 1 fixed, solving the likelihood equations
//! `ψ(a) − ψ(a+b) = E[ln x]`, `ψ(b) − ψ(a+b) = E[ln(1−x)]` by Newton's method.

use serde::{Deserialize, Serialize};
use statrs::distribution::{Beta, Continuous};
use statrs::function::gamma::digamma;
use statrs::statistics::Statistics;

use crate::error::{AnalysisError, Result};

const FIT_MAX_ITERATIONS: usize = 200;
const FIT_TOLERANCE: f64 = 1e-10;

/// Closed-form moment matching. No bounds checking.
pub fn moments_to_beta(mean: f64, variance: f64) -> (f64, f64) {
    let a = (mean * mean * (1.0 - mean) - variance * mean) / variance;
    let b = a * (1.0 - mean) / mean;
    (a, b)
}

/// Shape parameters of a Beta(a, b) distribution on [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaShape {
    pub a: f64,
    pub b: f64,
}

impl BetaShape {
    pub fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }

    /// Checked moment matching.
    pub fn from_moments(mean: f64, variance: f64) -> Result<Self> {
        let valid = mean > 0.0
            && mean < 1.0
            && variance > 0.0
            && variance < mean * (1.0 - mean);
        if !valid {
            return Err(AnalysisError::InvalidMoments { mean, variance });
        }
        let (a, b) = moments_to_beta(mean, variance);
        Ok(Self { a, b })
    }

    pub fn mean(&self) -> f64 {
        self.a / (self.a + self.b)
    }

    pub fn variance(&self) -> f64 {
        let s = self.a + self.b;
        self.a * self.b / (s * s * (s + 1.0))
    }

    /// Analytic standard deviation `sqrt(ab / ((a+b)²(a+b+1)))`.
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Density at `x`. Non-finite at the boundaries when a or b is below 1.
    pub fn pdf(&self, x: f64) -> Result<f64> {
        let dist = Beta::new(self.a, self.b)
            .map_err(|e| AnalysisError::DegenerateSample(format!("Beta({}, {}): {e}", self.a, self.b)))?;
        Ok(dist.pdf(x))
    }

    /// Maximum-likelihood fit with loc = 0, scale = 1.
    ///
    /// Every sample must lie strictly inside (0, 1).
    pub fn fit(samples: &[f64]) -> Result<Self> {
        if samples.is_empty() {
            return Err(AnalysisError::DegenerateSample("an empty sample".to_string()));
        }
        if let Some(&x) = samples.iter().find(|&&x| !(x > 0.0 && x < 1.0)) {
            return Err(AnalysisError::SupportOutOfRange(x));
        }

        let mean = samples.iter().mean();
        let variance = samples.iter().population_variance();
        if !(variance > 0.0) {
            return Err(AnalysisError::DegenerateSample(format!(
                "a constant sample ({mean})"
            )));
        }

        let n = samples.len() as f64;
        let log_x = samples.iter().map(|x| x.ln()).sum::<f64>() / n;
        let log_1mx = samples.iter().map(|x| (1.0 - x).ln()).sum::<f64>() / n;

        // Method-of-moments start; always positive because the sample lies in (0, 1).
        let common = mean * (1.0 - mean) / variance - 1.0;
        let (mut a, mut b) = if common > 0.0 {
            (mean * common, (1.0 - mean) * common)
        } else {
            (1.0, 1.0)
        };

        for iteration in 0..FIT_MAX_ITERATIONS {
            let psi_ab = digamma(a + b);
            let g1 = digamma(a) - psi_ab - log_x;
            let g2 = digamma(b) - psi_ab - log_1mx;

            let t_ab = trigamma(a + b);
            let j11 = trigamma(a) - t_ab;
            let j22 = trigamma(b) - t_ab;
            let det = j11 * j22 - t_ab * t_ab;
            if det == 0.0 || !det.is_finite() {
                break;
            }
            let da = (j22 * g1 + t_ab * g2) / det;
            let db = (t_ab * g1 + j11 * g2) / det;

            // Halve the step until both shapes stay positive.
            let mut step = 1.0;
            while a - step * da <= 0.0 || b - step * db <= 0.0 {
                step *= 0.5;
            }
            a -= step * da;
            b -= step * db;

            if (step * da).abs() < FIT_TOLERANCE * a && (step * db).abs() < FIT_TOLERANCE * b {
                tracing::trace!(iteration, a, b, "beta fit converged");
                break;
            }
        }

        if !(a.is_finite() && b.is_finite()) {
            return Err(AnalysisError::DegenerateSample(format!(
                "a sample with mean {mean} and variance {variance}"
            )));
        }
        Ok(Self { a, b })
    }
}

/// Trigamma ψ₁(x) for x > 0: recurrence up to x ≥ 6, then the asymptotic series.
pub fn trigamma(mut x: f64) -> f64 {
    let mut acc = 0.0;
    while x < 6.0 {
        acc += 1.0 / (x * x);
        x += 1.0;
    }
    let inv = 1.0 / x;
    let inv2 = inv * inv;
    acc + inv
        + inv2 / 2.0
        + inv * inv2 * (1.0 / 6.0 - inv2 * (1.0 / 30.0 - inv2 * (1.0 / 42.0 - inv2 / 30.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use statrs::distribution::{Beta as BetaDist, ContinuousCDF};

    #[test]
    fn test_moments_to_beta_known_values() {
        // M = 0.5, V = 0.05: a = (0.125 - 0.025) / 0.05 = 2, b = 2
        let (a, b) = moments_to_beta(0.5, 0.05);
        assert!((a - 2.0).abs() < 1e-12);
        assert!((b - 2.0).abs() < 1e-12);

        // M = 0.2, V = 0.0025: a = (0.032 - 0.0005) / 0.0025 = 12.6, b = 50.4
        let (a, b) = moments_to_beta(0.2, 0.0025);
        assert!((a - 12.6).abs() < 1e-9, "a={a}");
        assert!((b - 50.4).abs() < 1e-9, "b={b}");
    }

    #[test]
    fn test_from_moments_rejects_degenerate() {
        assert!(BetaShape::from_moments(0.5, 0.25).is_err());
        assert!(BetaShape::from_moments(0.5, 0.3).is_err());
        assert!(BetaShape::from_moments(0.0, 0.01).is_err());
        assert!(BetaShape::from_moments(1.0, 0.01).is_err());
        assert!(BetaShape::from_moments(0.5, 0.0).is_err());
        assert!(BetaShape::from_moments(0.5, 0.2).is_ok());
    }

    #[test]
    fn test_std_dev_matches_formula() {
        let shape = BetaShape::new(2.0, 3.0);
        // ab / ((a+b)^2 (a+b+1)) = 6 / (25 * 6) = 0.04
        assert!((shape.variance() - 0.04).abs() < 1e-12);
        assert!((shape.std_dev() - 0.2).abs() < 1e-12);
        assert!((shape.mean() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_trigamma_reference_values() {
        // ψ₁(1) = π²/6, ψ₁(0.5) = π²/2
        let pi2 = std::f64::consts::PI * std::f64::consts::PI;
        assert!((trigamma(1.0) - pi2 / 6.0).abs() < 1e-9);
        assert!((trigamma(0.5) - pi2 / 2.0).abs() < 1e-9);
        assert!((trigamma(10.0) - 0.105_166_335_681_685_3).abs() < 1e-10);
    }

    #[test]
    fn test_fit_recovers_parameters() {
        let mut rng = SmallRng::seed_from_u64(7);
        let dist = BetaDist::new(2.5, 6.0).unwrap();
        let samples: Vec<f64> = (0..20_000)
            .map(|_| dist.inverse_cdf(rng.gen_range(1e-9..1.0 - 1e-9)))
            .collect();
        let fitted = BetaShape::fit(&samples).unwrap();
        assert!((fitted.a - 2.5).abs() < 0.15, "a={}", fitted.a);
        assert!((fitted.b - 6.0).abs() < 0.35, "b={}", fitted.b);
    }

    #[test]
    fn test_fit_two_point_sample() {
        let samples: Vec<f64> = (0..1000).map(|i| if i % 2 == 0 { 0.3 } else { 0.7 }).collect();
        let fitted = BetaShape::fit(&samples).unwrap();
        assert!(fitted.a > 0.0 && fitted.b > 0.0);
        // Symmetric sample -> symmetric fit.
        assert!((fitted.a - fitted.b).abs() < 1e-6, "{fitted:?}");
    }

    #[test]
    fn test_fit_rejects_bad_samples() {
        assert!(matches!(
            BetaShape::fit(&[]),
            Err(AnalysisError::DegenerateSample(_))
        ));
        assert!(matches!(
            BetaShape::fit(&[0.2, 1.0]),
            Err(AnalysisError::SupportOutOfRange(_))
        ));
        assert!(matches!(
            BetaShape::fit(&[0.4, 0.4, 0.4]),
            Err(AnalysisError::DegenerateSample(_))
        ));
    }

    #[test]
    fn test_pdf_uniform() {
        let shape = BetaShape::new(1.0, 1.0);
        assert!((shape.pdf(0.3).unwrap() - 1.0).abs() < 1e-12);
    }
}
