//! # belief-analysis — offline tools for moderator/observer belief simulations
//!
//! Three single-pass batch pipelines around an external probabilistic
//! simulator. None depends on another at the code level; they share only the
//! file-format conventions in [`naming`].
//!
//! | Binary | Module | Description |
//! |--------|--------|-------------|
//! | `belief-grid` | [`grid`] | Enumerate the parameter grid of a condition, moment-match every (mean, variance) pair to Beta shapes, write `general_config/ID_to_params.json` |
//! | `belief-fit-prior` | [`fit`] | Resample a run's terminal posteriors, fit Beta shapes (loc 0, scale 1), write the next stage's `prior_params.json` and diagnostic PNGs |
//! | `belief-aggregate` | [`aggregate`] | Walk `results_<model>/<training_set>` and write the long-form and prior/posterior-paired CSV tables |
//!
//! ## Belief variables
//!
//! Every run reports `content`, `alpha_accuracy` and `alpha_target`. The first
//! two live on [0, 1]; `alpha_target` lives on [-0.5, 0.5] and is shifted by
//! +0.5 whenever a Beta distribution is fitted to it.
//!
//! ## Failure model
//!
//! Every missing or malformed input is fatal. The aggregator materialises both
//! tables in memory and writes them only after the whole tree has been read.

pub mod aggregate;
pub mod beta;
pub mod constants;
pub mod distribution;
pub mod env_config;
pub mod error;
pub mod fit;
pub mod grid;
pub mod naming;
pub mod plot;

pub use error::{AnalysisError, Result};
