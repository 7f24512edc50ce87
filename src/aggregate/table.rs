//! Row types and CSV rendering for the two aggregated tables.
//!
//! - format0: one row per (run, action) plus a `Prior` row, one belief value
//!   and one standard deviation per variable.
//! - format1: one row per (run, action) with prior and posterior side by side.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::{AnalysisError, Result};
use crate::grid::ParamRecord;
use crate::naming::BeliefVariable;

const RUN_HEADER: &str = "scenario,condition,ID,content_mean,content_variance,\
alpha_accuracy_mean,alpha_accuracy_variance,alpha_target_mean,alpha_target_variance,\
alpha0,beta,gamma,epoch,action,action_prob";

pub const FORMAT0_COLUMNS: &str =
    "alpha_target,alpha_accuracy,content,alpha_target_sd,alpha_accuracy_sd,content_sd";

pub const FORMAT1_COLUMNS: &str = "alpha_target_prior,alpha_accuracy_prior,content_prior,\
alpha_target_posterior,alpha_accuracy_posterior,content_posterior,\
alpha_target_prior_sd,alpha_accuracy_prior_sd,content_prior_sd,\
alpha_target_posterior_sd,alpha_accuracy_posterior_sd,content_posterior_sd";

pub fn format0_header() -> String {
    format!("{RUN_HEADER},{FORMAT0_COLUMNS}")
}

pub fn format1_header() -> String {
    format!("{RUN_HEADER},{FORMAT1_COLUMNS}")
}

/// One value per belief variable.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BeliefTriple {
    pub content: f64,
    pub alpha_accuracy: f64,
    pub alpha_target: f64,
}

impl BeliefTriple {
    /// Build by evaluating `f` for every variable, stopping at the first error.
    pub fn try_from_fn(mut f: impl FnMut(BeliefVariable) -> Result<f64>) -> Result<Self> {
        Ok(Self {
            content: f(BeliefVariable::Content)?,
            alpha_accuracy: f(BeliefVariable::AlphaAccuracy)?,
            alpha_target: f(BeliefVariable::AlphaTarget)?,
        })
    }

    pub fn get(&self, variable: BeliefVariable) -> f64 {
        match variable {
            BeliefVariable::Content => self.content,
            BeliefVariable::AlphaAccuracy => self.alpha_accuracy,
            BeliefVariable::AlphaTarget => self.alpha_target,
        }
    }

    /// Table column order: target, accuracy, content.
    fn push_csv(&self, line: &mut String) {
        for v in [self.alpha_target, self.alpha_accuracy, self.content] {
            line.push(',');
            push_number(line, v);
        }
    }
}

/// Columns shared by every row of one (scenario, condition, ID, epoch) partition.
#[derive(Debug, Clone, PartialEq)]
pub struct RunColumns {
    pub scenario: String,
    pub condition: String,
    pub id: String,
    pub content_mean: f64,
    pub content_variance: f64,
    pub alpha_accuracy_mean: f64,
    pub alpha_accuracy_variance: f64,
    pub alpha_target_mean: f64,
    pub alpha_target_variance: f64,
    /// alpha0, beta, gamma in display form.
    pub hyper: [String; 3],
    pub epoch: String,
}

impl RunColumns {
    pub fn new(scenario: &str, epoch: &str, params: &ParamRecord) -> Self {
        Self {
            scenario: scenario.to_string(),
            condition: params.simulation_condition.clone(),
            id: params.id.clone(),
            content_mean: params.mean_content,
            content_variance: params.variance_content,
            alpha_accuracy_mean: params.mean_alpha_accuracy,
            alpha_accuracy_variance: params.variance_alpha_accuracy,
            alpha_target_mean: params.mean_alpha_target,
            alpha_target_variance: params.variance_alpha_target,
            hyper: params.hyper_display(),
            epoch: epoch.to_string(),
        }
    }

    fn push_csv(&self, line: &mut String, action: &str, action_prob: Option<f64>) {
        push_field(line, &self.scenario);
        line.push(',');
        push_field(line, &self.condition);
        line.push(',');
        push_field(line, &self.id);
        for v in [
            self.content_mean,
            self.content_variance,
            self.alpha_accuracy_mean,
            self.alpha_accuracy_variance,
            self.alpha_target_mean,
            self.alpha_target_variance,
        ] {
            line.push(',');
            push_number(line, v);
        }
        for h in &self.hyper {
            line.push(',');
            push_field(line, h);
        }
        line.push(',');
        push_field(line, &self.epoch);
        line.push(',');
        push_field(line, action);
        line.push(',');
        if let Some(p) = action_prob {
            push_number(line, p);
        }
    }
}

/// format0 row. `action_prob` is `None` for the `Prior` row.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    pub run: RunColumns,
    pub action: String,
    pub action_prob: Option<f64>,
    pub values: BeliefTriple,
    pub sds: BeliefTriple,
}

impl LongRow {
    pub fn to_csv(&self) -> String {
        let mut line = String::new();
        self.run.push_csv(&mut line, &self.action, self.action_prob);
        self.values.push_csv(&mut line);
        self.sds.push_csv(&mut line);
        line
    }
}

/// format1 row.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedRow {
    pub run: RunColumns,
    pub action: String,
    pub action_prob: f64,
    pub prior: BeliefTriple,
    pub posterior: BeliefTriple,
    pub prior_sd: BeliefTriple,
    pub posterior_sd: BeliefTriple,
}

impl PairedRow {
    pub fn to_csv(&self) -> String {
        let mut line = String::new();
        self.run.push_csv(&mut line, &self.action, Some(self.action_prob));
        self.prior.push_csv(&mut line);
        self.posterior.push_csv(&mut line);
        self.prior_sd.push_csv(&mut line);
        self.posterior_sd.push_csv(&mut line);
        line
    }
}

/// Both tables, fully materialised before anything is written.
#[derive(Debug, Default)]
pub struct Tables {
    pub format0: Vec<LongRow>,
    pub format1: Vec<PairedRow>,
}

impl Tables {
    pub fn format0_csv(&self) -> String {
        render(&format0_header(), self.format0.iter().map(LongRow::to_csv))
    }

    pub fn format1_csv(&self) -> String {
        render(&format1_header(), self.format1.iter().map(PairedRow::to_csv))
    }
}

fn render(header: &str, lines: impl Iterator<Item = String>) -> String {
    let mut out = String::with_capacity(header.len() + 1);
    out.push_str(header);
    out.push('\n');
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// NaN renders as an empty cell.
fn push_number(line: &mut String, v: f64) {
    if !v.is_nan() {
        let _ = write!(line, "{}", v);
    }
}

/// Quote fields containing a separator, quote or newline.
fn push_field(line: &mut String, s: &str) {
    if s.contains([',', '"', '\n', '\r']) {
        line.push('"');
        line.push_str(&s.replace('"', "\"\""));
        line.push('"');
    } else {
        line.push_str(s);
    }
}

pub fn write_csv(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| AnalysisError::io(path, e))?;
    tracing::info!(path = %path.display(), "wrote table");
    Ok(())
}
