//! Posterior-to-prior fitting for generalization runs.
//!
//! Reads the terminal posterior of a finished run, resamples each `alpha_*`
//! distribution, fits Beta shape parameters (loc 0, scale 1) and writes them
//! as the prior configuration of the `<condition>-generalization` run:
//!
//! ```text
//! <dir>/<scenario>/<condition>/ID_<job>/epoch_<last>/posteriors/<action>/alpha_*.json
//!   → <dir>/<scenario>/<condition>-generalization/ID_<job>/epoch_1/config/prior_params.json
//! ```
//!
//! A variable without a posterior file is simply absent from the output.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value};

use crate::beta::BetaShape;
use crate::constants::{
    FIT_VARIABLE_PREFIX, GENERALIZATION_EPOCH, GENERALIZATION_SUFFIX, NUM_FIT_SAMPLES,
};
use crate::distribution::EmpiricalDistribution;
use crate::env_config::DEFAULT_SEED;
use crate::error::{write_json, AnalysisError, Result};
use crate::naming::{epoch_dir, BeliefVariable, DistFile, RunDir};
use crate::plot;

/// Locates the source posterior and the destination config directory.
#[derive(Debug, Clone)]
pub struct FitJob {
    pub directory: PathBuf,
    pub scenario: String,
    pub condition: String,
    pub job_id: String,
    pub last_epoch: String,
    pub last_action: String,
}

impl FitJob {
    pub fn generalization_condition(&self) -> String {
        format!("{}{}", self.condition, GENERALIZATION_SUFFIX)
    }

    pub fn posterior_dir(&self) -> PathBuf {
        RunDir::new(
            &self.directory,
            &self.scenario,
            &self.condition,
            &self.job_id,
            &epoch_dir(&self.last_epoch),
        )
        .posteriors(&self.last_action)
    }

    pub fn config_dir(&self) -> PathBuf {
        RunDir::new(
            &self.directory,
            &self.scenario,
            &self.generalization_condition(),
            &self.job_id,
            &epoch_dir(GENERALIZATION_EPOCH),
        )
        .config()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FitOptions {
    pub samples: usize,
    pub seed: u64,
    pub plot: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            samples: NUM_FIT_SAMPLES,
            seed: DEFAULT_SEED,
            plot: true,
        }
    }
}

/// Fit result for one variable. `samples` and `shape` live on [0, 1];
/// `offset` maps them back to the variable's own domain.
#[derive(Debug, Clone)]
pub struct FittedVariable {
    pub variable: String,
    pub shape: BetaShape,
    pub offset: f64,
    pub samples: Vec<f64>,
}

impl FittedVariable {
    /// Mean of the fitted distribution in the variable's own domain.
    pub fn mean_in_domain(&self) -> f64 {
        self.shape.mean() - self.offset
    }
}

/// Shift onto [0, 1], drop the 0/1 boundary mass, resample and fit.
pub fn fit_distribution<R: Rng + ?Sized>(
    variable: &str,
    dist: &EmpiricalDistribution,
    n: usize,
    rng: &mut R,
) -> Result<FittedVariable> {
    let offset = BeliefVariable::support_offset(variable);
    let inner = dist.shifted(offset).without_boundaries()?;
    let samples = inner.sample(n, rng)?;
    let shape = BetaShape::fit(&samples)?;
    tracing::debug!(variable, a = shape.a, b = shape.b, "fitted");
    Ok(FittedVariable {
        variable: variable.to_string(),
        shape,
        offset,
        samples,
    })
}

/// Posterior files to fit, as (variable, path), sorted by file name.
pub fn discover_posteriors(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map_err(|e| AnalysisError::io(dir, e))?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with(FIT_VARIABLE_PREFIX))
        .collect();
    names.sort();

    let mut found: Vec<(String, PathBuf)> = Vec::with_capacity(names.len());
    for name in names {
        let variable = match DistFile::parse(&name) {
            Some(DistFile::Raw { variable, .. }) => variable,
            _ => {
                tracing::warn!(file = %name, "skipping posterior file with unexpected name");
                continue;
            }
        };
        if found.iter().any(|(v, _)| *v == variable) {
            return Err(AnalysisError::DuplicateVariable {
                variable,
                dir: dir.to_path_buf(),
            });
        }
        found.push((variable, dir.join(&name)));
    }
    Ok(found)
}

/// Pivot fits into the single-row prior table:
/// `[{scenario, simulation, beta_a_<v>..., beta_b_<v>...}]`, variables sorted.
pub fn prior_params_json(scenario: &str, simulation: &str, fits: &[FittedVariable]) -> Value {
    let by_variable: BTreeMap<&str, BetaShape> =
        fits.iter().map(|f| (f.variable.as_str(), f.shape)).collect();

    let mut row = Map::new();
    row.insert("scenario".to_string(), Value::from(scenario));
    row.insert("simulation".to_string(), Value::from(simulation));
    for (variable, shape) in &by_variable {
        row.insert(format!("beta_a_{variable}"), Value::from(shape.a));
    }
    for (variable, shape) in &by_variable {
        row.insert(format!("beta_b_{variable}"), Value::from(shape.b));
    }
    Value::Array(vec![Value::Object(row)])
}

/// Fit every posterior of `job`, write plots and `prior_params.json`.
/// Returns the path of the written prior file.
pub fn run(job: &FitJob, options: &FitOptions) -> Result<PathBuf> {
    let posterior_dir = job.posterior_dir();
    let config_dir = job.config_dir();
    std::fs::create_dir_all(&config_dir).map_err(|e| AnalysisError::io(&config_dir, e))?;

    let posteriors = discover_posteriors(&posterior_dir)?;
    tracing::info!(
        dir = %posterior_dir.display(),
        count = posteriors.len(),
        "fitting posteriors"
    );

    let mut rng = SmallRng::seed_from_u64(options.seed);
    let mut fits = Vec::with_capacity(posteriors.len());
    for (variable, path) in &posteriors {
        let dist = EmpiricalDistribution::load(path)?;
        let fitted = fit_distribution(variable, &dist, options.samples, &mut rng)?;
        tracing::info!(
            variable = %variable,
            a = fitted.shape.a,
            b = fitted.shape.b,
            "beta fit"
        );
        if options.plot {
            let png = config_dir.join(format!("{variable}.png"));
            plot::render_fit(&png, &fitted)?;
        }
        fits.push(fitted);
    }

    let out = config_dir.join("prior_params.json");
    let json = prior_params_json(&job.scenario, &job.generalization_condition(), &fits);
    write_json(&out, &json)?;
    tracing::info!(path = %out.display(), "wrote prior params");
    Ok(out)
}
