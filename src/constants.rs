//! File locations, labels and fixed sizes shared by the three pipelines.
//!
//! Paths are relative to the working directory chosen by
//! [`crate::env_config::init_base_path`].

/// Parameter grid written by `belief-grid` and read by `belief-aggregate`.
pub const PARAMS_FILE: &str = "general_config/ID_to_params.json";

/// Number of weighted resamples drawn per posterior before fitting.
pub const NUM_FIT_SAMPLES: usize = 10_000;

/// Posterior files fitted into next-stage priors start with this prefix.
pub const FIT_VARIABLE_PREFIX: &str = "alpha_";

/// Appended to the condition label of a generalization run.
pub const GENERALIZATION_SUFFIX: &str = "-generalization";

/// Epoch directory the fitted priors are written under.
pub const GENERALIZATION_EPOCH: &str = "1";

/// Histogram bins in the diagnostic fit plot.
pub const PLOT_BINS: usize = 30;

/// Points on the fitted-density curve.
pub const PLOT_POINTS: usize = 100;

/// Plot size in pixels.
pub const PLOT_SIZE: (u32, u32) = (640, 480);

/// `action` label of the prior row in the long-form table.
pub const PRIOR_ACTION: &str = "Prior";

pub const FORMAT0_FILE: &str = "simulated_results_format0.csv";
pub const FORMAT1_FILE: &str = "simulated_results_format1.csv";

/// Results root for a model/training-set pair: `results_<model>/<training_set>`.
pub fn results_root(model: &str, training_set: &str) -> String {
    format!("results_{}/{}", model, training_set)
}
