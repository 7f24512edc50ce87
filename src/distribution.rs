//! Discrete empirical distributions and moderator policies produced by the simulator.
//!
//! Both arrive as `{"support": [...], "probs": [...]}` JSON objects. Lengths
//! are checked at load time.

use std::collections::HashMap;
use std::path::Path;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::Deserialize;

use crate::error::{read_json, AnalysisError, Result};

#[derive(Deserialize)]
struct SupportProbs<T> {
    support: Vec<T>,
    probs: Vec<f64>,
}

impl<T> SupportProbs<T> {
    fn check(&self) -> Result<()> {
        if self.support.len() != self.probs.len() {
            return Err(AnalysisError::LengthMismatch {
                support: self.support.len(),
                probs: self.probs.len(),
            });
        }
        Ok(())
    }
}

/// Support values paired with their probabilities. Need not be sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct EmpiricalDistribution {
    support: Vec<f64>,
    probs: Vec<f64>,
}

impl EmpiricalDistribution {
    pub fn new(support: Vec<f64>, probs: Vec<f64>) -> Result<Self> {
        let raw = SupportProbs { support, probs };
        raw.check()?;
        if raw.support.is_empty() {
            return Err(AnalysisError::EmptyDistribution);
        }
        Ok(Self {
            support: raw.support,
            probs: raw.probs,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw: SupportProbs<f64> = read_json(path)?;
        Self::new(raw.support, raw.probs)
            .inspect_err(|_| tracing::error!(path = %path.display(), "malformed distribution file"))
    }

    pub fn support(&self) -> &[f64] {
        &self.support
    }

    pub fn probs(&self) -> &[f64] {
        &self.probs
    }

    /// `Σ support · prob`
    pub fn mean(&self) -> f64 {
        self.support
            .iter()
            .zip(&self.probs)
            .map(|(s, p)| s * p)
            .sum()
    }

    /// `Σ (support − mean)² · prob`
    pub fn variance(&self) -> f64 {
        let mean = self.mean();
        self.support
            .iter()
            .zip(&self.probs)
            .map(|(s, p)| (s - mean) * (s - mean) * p)
            .sum()
    }

    /// Standard deviation taken directly from the discrete distribution.
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn shifted(&self, offset: f64) -> Self {
        Self {
            support: self.support.iter().map(|s| s + offset).collect(),
            probs: self.probs.clone(),
        }
    }

    /// Drop support values exactly 0 or 1 and renormalise the rest.
    pub fn without_boundaries(&self) -> Result<Self> {
        let (support, probs): (Vec<f64>, Vec<f64>) = self
            .support
            .iter()
            .zip(&self.probs)
            .filter(|(s, _)| **s != 0.0 && **s != 1.0)
            .map(|(s, p)| (*s, *p))
            .unzip();
        let total: f64 = probs.iter().sum();
        if support.is_empty() || !(total > 0.0) {
            return Err(AnalysisError::EmptyDistribution);
        }
        Ok(Self {
            support,
            probs: probs.into_iter().map(|p| p / total).collect(),
        })
    }

    /// Weighted resampling with replacement.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<Vec<f64>> {
        let index = WeightedIndex::new(&self.probs).map_err(|_| AnalysisError::EmptyDistribution)?;
        Ok((0..n).map(|_| self.support[index.sample(rng)]).collect())
    }
}

/// Moderator action-selection probabilities, completed against the action catalog.
#[derive(Debug, Clone)]
pub struct ModeratorPolicy {
    probs: HashMap<String, f64>,
}

impl ModeratorPolicy {
    /// Actions in `catalog` missing from the pairs get probability 0.
    /// A repeated action keeps its first probability.
    pub fn from_pairs(
        support: Vec<String>,
        probs: Vec<f64>,
        catalog: &[String],
    ) -> Result<Self> {
        let raw = SupportProbs { support, probs };
        raw.check()?;
        let mut map = HashMap::with_capacity(raw.support.len() + catalog.len());
        for (action, p) in raw.support.into_iter().zip(raw.probs) {
            map.entry(action).or_insert(p);
        }
        for action in catalog {
            map.entry(action.clone()).or_insert(0.0);
        }
        Ok(Self { probs: map })
    }

    pub fn load(path: impl AsRef<Path>, catalog: &[String]) -> Result<Self> {
        let raw: SupportProbs<String> = read_json(path)?;
        Self::from_pairs(raw.support, raw.probs, catalog)
    }

    /// Selection probability; `None` only for actions outside file and catalog.
    pub fn prob(&self, action: &str) -> Option<f64> {
        self.probs.get(action).copied()
    }

    pub fn len(&self) -> usize {
        self.probs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }
}
