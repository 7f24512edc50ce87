//! Shared environment configuration for the belief-analysis binaries.
//!
//! Consolidates `BELIEF_BASE_PATH`, `BELIEF_SEED` and `RUST_LOG` reads
//! shared by all three binaries.

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use crate::error::{AnalysisError, Result};

/// Default seed for posterior resampling when neither `--seed` nor
/// `BELIEF_SEED` is given.
pub const DEFAULT_SEED: u64 = 42;

/// Install the `tracing` subscriber. Filter comes from `RUST_LOG`
/// (default `info`). Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Read `BELIEF_BASE_PATH` (default `"."`) and chdir into it so the
/// simulator's relative layout (`general_config/`, `results_<model>/`) resolves.
pub fn init_base_path() -> Result<PathBuf> {
    let base_path = std::env::var("BELIEF_BASE_PATH").unwrap_or_else(|_| ".".to_string());
    let path = PathBuf::from(&base_path);
    std::env::set_current_dir(&path).map_err(|e| AnalysisError::io(&path, e))?;
    if let Ok(cwd) = std::env::current_dir() {
        tracing::info!(base_path = %base_path, cwd = %cwd.display(), "working directory");
    }
    Ok(path)
}

/// Read `BELIEF_SEED` (default [`DEFAULT_SEED`]).
pub fn sample_seed() -> u64 {
    std::env::var("BELIEF_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED)
}
