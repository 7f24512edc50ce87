//! Parameter grid: named conditions, Cartesian-product enumeration and the
//! (condition, ID) lookup used by the aggregator.
//!
//! IDs are a pure function of product position (1-based, content mean
//! outermost, gamma innermost), so downstream stages can join on
//! (condition, ID) without looking at the values.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::beta::BetaShape;
use crate::error::{read_json, write_json, AnalysisError, Result};
use crate::naming::{format_number, HyperParams};

/// Candidate means and variances for one belief variable.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentAxes {
    pub means: Vec<f64>,
    pub variances: Vec<f64>,
}

impl MomentAxes {
    /// Variances are given as standard deviations and squared.
    pub fn from_sds(means: &[f64], sds: &[f64]) -> Self {
        Self {
            means: means.to_vec(),
            variances: sds.iter().map(|sd| sd * sd).collect(),
        }
    }
}

/// Every axis of the grid explored for one condition.
#[derive(Debug, Clone, PartialEq)]
pub struct BeliefGrid {
    pub content: MomentAxes,
    pub accuracy: MomentAxes,
    pub target: MomentAxes,
    pub alpha0: Vec<f64>,
    pub beta: Vec<f64>,
    pub gamma: Vec<f64>,
}

/// Grid for a named condition. Returns None if the label is unknown.
pub fn resolve_condition(condition: &str) -> Option<BeliefGrid> {
    match condition {
        "Differing-content" => Some(BeliefGrid {
            content: MomentAxes::from_sds(&[0.2, 0.8], &[0.05, 0.1, 0.15]),
            accuracy: MomentAxes::from_sds(&[0.2, 0.5, 0.8], &[0.05, 0.15, 0.25]),
            // Shifted down by 0.5 inside the simulator: [-0.3, 0, 0.3].
            target: MomentAxes::from_sds(&[0.2, 0.5, 0.8], &[0.05, 0.15, 0.25]),
            alpha0: vec![1.0],
            beta: vec![10.0],
            gamma: vec![1.0],
        }),
        _ => None,
    }
}

/// One row of `ID_to_params.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamRecord {
    #[serde(rename = "ID")]
    pub id: String,
    pub simulation_condition: String,
    pub alpha0: f64,
    pub beta: f64,
    pub gamma: f64,
    pub mean_content: f64,
    pub variance_content: f64,
    pub mean_alpha_accuracy: f64,
    pub variance_alpha_accuracy: f64,
    pub mean_alpha_target: f64,
    pub variance_alpha_target: f64,
    pub beta_a_content: f64,
    pub beta_b_content: f64,
    pub beta_a_alpha_accuracy: f64,
    pub beta_b_alpha_accuracy: f64,
    pub beta_a_alpha_target: f64,
    pub beta_b_alpha_target: f64,
}

impl ParamRecord {
    pub fn hyper(&self) -> HyperParams {
        HyperParams::new(self.alpha0, self.beta, self.gamma)
    }

    /// Hyperparameters in display form (`1.0` → `1`).
    pub fn hyper_display(&self) -> [String; 3] {
        [
            format_number(self.alpha0),
            format_number(self.beta),
            format_number(self.gamma),
        ]
    }
}

/// Mixed-radix counter over `sizes`, last axis fastest.
struct ProductIndices {
    sizes: Vec<usize>,
    next: Option<Vec<usize>>,
}

impl ProductIndices {
    fn new(sizes: &[usize]) -> Self {
        let next = if sizes.iter().all(|&n| n > 0) {
            Some(vec![0; sizes.len()])
        } else {
            None
        };
        Self {
            sizes: sizes.to_vec(),
            next,
        }
    }
}

impl Iterator for ProductIndices {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.next.take()?;
        let mut advanced = current.clone();
        for axis in (0..advanced.len()).rev() {
            advanced[axis] += 1;
            if advanced[axis] < self.sizes[axis] {
                self.next = Some(advanced);
                break;
            }
            advanced[axis] = 0;
        }
        Some(current)
    }
}

impl BeliefGrid {
    fn axis_sizes(&self) -> [usize; 9] {
        [
            self.content.means.len(),
            self.content.variances.len(),
            self.accuracy.means.len(),
            self.accuracy.variances.len(),
            self.target.means.len(),
            self.target.variances.len(),
            self.alpha0.len(),
            self.beta.len(),
            self.gamma.len(),
        ]
    }

    /// Number of combinations.
    pub fn len(&self) -> usize {
        self.axis_sizes().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enumerate every combination in product order.
    ///
    /// Fails on the first mean/variance pair without a valid Beta shape.
    pub fn records(&self, condition: &str) -> Result<Vec<ParamRecord>> {
        let mut records = Vec::with_capacity(self.len());
        for (i, ix) in ProductIndices::new(&self.axis_sizes()).enumerate() {
            let (c_m, c_v) = (self.content.means[ix[0]], self.content.variances[ix[1]]);
            let (a_m, a_v) = (self.accuracy.means[ix[2]], self.accuracy.variances[ix[3]]);
            let (t_m, t_v) = (self.target.means[ix[4]], self.target.variances[ix[5]]);
            let content = BetaShape::from_moments(c_m, c_v)?;
            let accuracy = BetaShape::from_moments(a_m, a_v)?;
            let target = BetaShape::from_moments(t_m, t_v)?;

            records.push(ParamRecord {
                id: (i + 1).to_string(),
                simulation_condition: condition.to_string(),
                alpha0: self.alpha0[ix[6]],
                beta: self.beta[ix[7]],
                gamma: self.gamma[ix[8]],
                mean_content: c_m,
                variance_content: c_v,
                mean_alpha_accuracy: a_m,
                variance_alpha_accuracy: a_v,
                mean_alpha_target: t_m,
                variance_alpha_target: t_v,
                beta_a_content: content.a,
                beta_b_content: content.b,
                beta_a_alpha_accuracy: accuracy.a,
                beta_b_alpha_accuracy: accuracy.b,
                beta_a_alpha_target: target.a,
                beta_b_alpha_target: target.b,
            });
        }
        Ok(records)
    }
}

/// Resolve `condition` and enumerate its records.
pub fn generate(condition: &str) -> Result<Vec<ParamRecord>> {
    let grid = resolve_condition(condition)
        .ok_or_else(|| AnalysisError::UnknownCondition(condition.to_string()))?;
    grid.records(condition)
}

/// Overwrite `path` with the records as one JSON array.
pub fn write_records(path: impl AsRef<Path>, records: &[ParamRecord]) -> Result<()> {
    write_json(path, records)
}

/// Parameter records keyed by (condition, ID).
#[derive(Debug, Default)]
pub struct ParamIndex {
    by_key: HashMap<(String, String), ParamRecord>,
}

impl ParamIndex {
    /// First record wins when a (condition, ID) pair repeats.
    pub fn from_records(records: Vec<ParamRecord>) -> Self {
        let mut by_key = HashMap::with_capacity(records.len());
        for record in records {
            let key = (record.simulation_condition.clone(), record.id.clone());
            by_key.entry(key).or_insert(record);
        }
        Self { by_key }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let records: Vec<ParamRecord> = read_json(path)?;
        Ok(Self::from_records(records))
    }

    pub fn get(&self, condition: &str, id: &str) -> Result<&ParamRecord> {
        self.by_key
            .get(&(condition.to_string(), id.to_string()))
            .ok_or_else(|| AnalysisError::MissingParams {
                condition: condition.to_string(),
                id: id.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
