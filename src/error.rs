//! Error type shared by the grid, fit and aggregate pipelines.
//!
//! Every failure is fatal for the invocation: the binaries log the error and
//! exit non-zero without writing partial output.

use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no parameter grid defined for condition '{0}'")]
    UnknownCondition(String),

    #[error("mean {mean} / variance {variance} has no valid Beta shape (need 0 < mean < 1 and 0 < variance < mean*(1-mean))")]
    InvalidMoments { mean: f64, variance: f64 },

    #[error("no parameter record for condition '{condition}', ID '{id}'")]
    MissingParams { condition: String, id: String },

    #[error("variable '{variable}' missing under {dir}")]
    MissingVariable { variable: String, dir: PathBuf },

    #[error("variable '{variable}' appears more than once under {dir}")]
    DuplicateVariable { variable: String, dir: PathBuf },

    #[error("field '{field}' missing in {path}")]
    MissingField { field: String, path: PathBuf },

    #[error("support has {support} values but probs has {probs}")]
    LengthMismatch { support: usize, probs: usize },

    #[error("distribution has no probability mass left")]
    EmptyDistribution,

    #[error("sample {0} outside the open unit interval")]
    SupportOutOfRange(f64),

    #[error("cannot fit a Beta distribution to {0}")]
    DegenerateSample(String),

    #[error("results tree is not uniform at {path}: expected {expected:?}, found {found:?}")]
    NonUniformTree {
        path: PathBuf,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("no subdirectories under {0}")]
    EmptyDirectory(PathBuf),

    #[error("unexpected directory name {0}")]
    BadDirectoryName(PathBuf),

    #[error("plot error: {0}")]
    Plot(String),

    #[error("usage: {0}")]
    Usage(String),
}

impl AnalysisError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn json(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Read and deserialize a JSON file, tagging failures with the path.
pub fn read_json<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "reading");
    let text = std::fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| AnalysisError::json(path, e))
}

/// Serialize `value` as pretty JSON to `path`, creating parent directories.
pub fn write_json<T: serde::Serialize + ?Sized>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| AnalysisError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|e| AnalysisError::json(path, e))?;
    std::fs::write(path, json).map_err(|e| AnalysisError::io(path, e))
}
