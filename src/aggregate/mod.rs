//! Results aggregation: joins parameter records, expected values, standard
//! deviations and moderator action probabilities for every
//! (scenario, condition, ID, epoch, action) into two flat tables.
//!
//! - [`tree`]: partition discovery and the uniformity check
//! - [`table`]: row types and CSV rendering
//!
//! Per partition, prior sds are analytic (from the Beta shapes in
//! `config/prior_params.json`); posterior sds come straight from the discrete
//! posterior, which is not assumed to be Beta.

pub mod table;
pub mod tree;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::beta::BetaShape;
use crate::constants::{results_root, FORMAT0_FILE, FORMAT1_FILE, PARAMS_FILE, PRIOR_ACTION};
use crate::distribution::{EmpiricalDistribution, ModeratorPolicy};
use crate::error::{read_json, AnalysisError, Result};
use crate::grid::ParamIndex;
use crate::naming::{BeliefVariable, DistFile, HyperParams, RunDir};

pub use table::{BeliefTriple, LongRow, PairedRow, RunColumns, Tables};
pub use tree::ResultsLayout;

fn required_file(dir: &Path, file: &DistFile) -> Result<PathBuf> {
    let path = dir.join(file.file_name());
    if !path.is_file() {
        return Err(AnalysisError::MissingVariable {
            variable: file.variable().unwrap_or("moderator").to_string(),
            dir: dir.to_path_buf(),
        });
    }
    Ok(path)
}

/// Expected values `expected_<v>_<hyper>.json` (one JSON number each) under `dir`.
pub fn read_expected(dir: &Path, hyper: HyperParams) -> Result<BeliefTriple> {
    BeliefTriple::try_from_fn(|variable| {
        let path = required_file(dir, &DistFile::expected(variable.as_str(), hyper))?;
        read_json::<f64>(&path)
    })
}

/// Posterior sds from the raw `<v>_<hyper>.json` distributions under `dir`.
pub fn read_posterior_sds(dir: &Path, hyper: HyperParams) -> Result<BeliefTriple> {
    BeliefTriple::try_from_fn(|variable| {
        let path = required_file(dir, &DistFile::raw(variable.as_str(), hyper))?;
        Ok(EmpiricalDistribution::load(&path)?.std_dev())
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriorParamsFile {
    Row(Map<String, Value>),
    Rows(Vec<Map<String, Value>>),
}

/// Analytic prior sds from `beta_a_<v>` / `beta_b_<v>` in a prior-params
/// file holding either a bare object or a list (first element used).
pub fn read_prior_sds(path: &Path) -> Result<BeliefTriple> {
    let row = match read_json::<PriorParamsFile>(path)? {
        PriorParamsFile::Row(row) => row,
        PriorParamsFile::Rows(rows) => rows.into_iter().next().ok_or_else(|| {
            AnalysisError::MissingField {
                field: "[0]".to_string(),
                path: path.to_path_buf(),
            }
        })?,
    };
    let field = |name: String| -> Result<f64> {
        row.get(&name)
            .and_then(Value::as_f64)
            .ok_or(AnalysisError::MissingField {
                field: name,
                path: path.to_path_buf(),
            })
    };
    BeliefTriple::try_from_fn(|variable| {
        let a = field(format!("beta_a_{variable}"))?;
        let b = field(format!("beta_b_{variable}"))?;
        Ok(BetaShape::new(a, b).std_dev())
    })
}

/// Aggregate one partition into `tables`.
fn aggregate_run(
    layout: &ResultsLayout,
    run: &RunDir,
    columns: RunColumns,
    hyper: HyperParams,
    tables: &mut Tables,
) -> Result<()> {
    tree::expect_listing(&run.posteriors_root(), &layout.actions)?;

    let prior = read_expected(&run.priors(), hyper)?;
    let prior_sd = read_prior_sds(&run.prior_params())?;
    let moderator = required_file(&run.moderator(), &DistFile::Moderator { hyper })?;
    let policy = ModeratorPolicy::load(&moderator, &layout.actions)?;

    tables.format0.push(LongRow {
        run: columns.clone(),
        action: PRIOR_ACTION.to_string(),
        action_prob: None,
        values: prior,
        sds: prior_sd,
    });

    for action in &layout.actions {
        let dir = run.posteriors(action);
        let posterior = read_expected(&dir, hyper)?;
        let posterior_sd = read_posterior_sds(&dir, hyper)?;
        // Catalog actions are always present after completion.
        let action_prob = policy.prob(action).unwrap_or(0.0);

        tables.format0.push(LongRow {
            run: columns.clone(),
            action: action.clone(),
            action_prob: Some(action_prob),
            values: posterior,
            sds: posterior_sd,
        });
        tables.format1.push(PairedRow {
            run: columns.clone(),
            action: action.clone(),
            action_prob,
            prior,
            posterior,
            prior_sd,
            posterior_sd,
        });
    }
    Ok(())
}

/// Walk every (scenario, condition, ID, epoch) under `layout.root`.
pub fn aggregate(layout: &ResultsLayout, params: &ParamIndex) -> Result<Tables> {
    let mut tables = Tables::default();
    let id_dirs = layout.id_dirs();

    for scenario in &layout.scenarios {
        let scenario_dir = layout.root.join(scenario);
        tree::expect_listing(&scenario_dir, &layout.conditions)?;
        for condition in &layout.conditions {
            let condition_dir = scenario_dir.join(condition);
            tree::expect_listing(&condition_dir, &id_dirs)?;
            for (id, id_dir) in layout.ids.iter().zip(&id_dirs) {
                tree::expect_listing(&condition_dir.join(id_dir), &layout.epochs)?;
                let record = params.get(condition, id)?;
                let hyper = record.hyper();
                for epoch in &layout.epochs {
                    tracing::info!(%scenario, %condition, %id, %epoch, "aggregating");
                    let run = RunDir::new(&layout.root, scenario, condition, id, epoch);
                    let columns = RunColumns::new(scenario, epoch, record);
                    aggregate_run(layout, &run, columns, hyper, &mut tables)?;
                }
            }
        }
    }
    Ok(tables)
}

/// Aggregate `results_<model>/<training_set>` and write both CSVs there.
/// Nothing is written unless the whole tree aggregates cleanly.
pub fn run(model: &str, training_set: &str) -> Result<(PathBuf, PathBuf)> {
    let root = PathBuf::from(results_root(model, training_set));
    let params = ParamIndex::load(PARAMS_FILE)?;
    tracing::info!(records = params.len(), path = PARAMS_FILE, "loaded parameter grid");

    let layout = ResultsLayout::discover(&root)?;
    let tables = aggregate(&layout, &params)?;
    write_tables(&root, &tables)
}

pub fn write_tables(root: &Path, tables: &Tables) -> Result<(PathBuf, PathBuf)> {
    let format0 = tables.format0_csv();
    let format1 = tables.format1_csv();
    let path0 = root.join(FORMAT0_FILE);
    let path1 = root.join(FORMAT1_FILE);
    table::write_csv(&path0, &format0)?;
    table::write_csv(&path1, &format1)?;
    tracing::info!(
        format0_rows = tables.format0.len(),
        format1_rows = tables.format1.len(),
        "aggregation complete"
    );
    Ok((path0, path1))
}
