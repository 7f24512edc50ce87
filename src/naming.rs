//! File-name grammar and results-tree layout shared with the simulator.
//!
//! Distribution files are keyed by the hyperparameter triple rendered without
//! a trailing `.0` for integral values:
//!
//! | File | Name |
//! |------|------|
//! | expected value | `expected_<variable>_<alpha0>_<beta>_<gamma>.json` |
//! | raw distribution | `<variable>_<alpha0>_<beta>_<gamma>.json` |
//! | moderator policy | `moderator_<alpha0>_<beta>_<gamma>.json` |
//!
//! [`DistFile::file_name`] and [`DistFile::parse`] are the only encoder and
//! decoder of this grammar.

use std::fmt;
use std::path::{Path, PathBuf};

const EXPECTED_PREFIX: &str = "expected_";
const MODERATOR_PREFIX: &str = "moderator_";
const JSON_SUFFIX: &str = ".json";
const ID_PREFIX: &str = "ID_";

/// The three belief variables every run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BeliefVariable {
    Content,
    AlphaAccuracy,
    AlphaTarget,
}

impl BeliefVariable {
    pub const ALL: [BeliefVariable; 3] = [
        BeliefVariable::Content,
        BeliefVariable::AlphaAccuracy,
        BeliefVariable::AlphaTarget,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BeliefVariable::Content => "content",
            BeliefVariable::AlphaAccuracy => "alpha_accuracy",
            BeliefVariable::AlphaTarget => "alpha_target",
        }
    }

    /// `alpha_target` is modelled on [-0.5, 0.5]; everything else on [0, 1].
    pub fn support_offset(name: &str) -> f64 {
        if name == BeliefVariable::AlphaTarget.as_str() {
            0.5
        } else {
            0.0
        }
    }
}

impl fmt::Display for BeliefVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Utility hyperparameters of one simulated run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HyperParams {
    pub alpha0: f64,
    pub beta: f64,
    pub gamma: f64,
}

/// Render a number the way the simulator names files: `1.0` → `1`, `0.5` → `0.5`.
pub fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

impl HyperParams {
    pub fn new(alpha0: f64, beta: f64, gamma: f64) -> Self {
        Self { alpha0, beta, gamma }
    }

    /// Parse `"<alpha0>_<beta>_<gamma>"`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split('_');
        let alpha0 = parts.next()?.parse().ok()?;
        let beta = parts.next()?.parse().ok()?;
        let gamma = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self { alpha0, beta, gamma })
    }
}

impl fmt::Display for HyperParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}",
            format_number(self.alpha0),
            format_number(self.beta),
            format_number(self.gamma)
        )
    }
}

/// One simulator output file, decoded from its name.
#[derive(Debug, Clone, PartialEq)]
pub enum DistFile {
    Expected { variable: String, hyper: HyperParams },
    Raw { variable: String, hyper: HyperParams },
    Moderator { hyper: HyperParams },
}

impl DistFile {
    pub fn expected(variable: impl Into<String>, hyper: HyperParams) -> Self {
        DistFile::Expected {
            variable: variable.into(),
            hyper,
        }
    }

    pub fn raw(variable: impl Into<String>, hyper: HyperParams) -> Self {
        DistFile::Raw {
            variable: variable.into(),
            hyper,
        }
    }

    pub fn hyper(&self) -> HyperParams {
        match self {
            DistFile::Expected { hyper, .. }
            | DistFile::Raw { hyper, .. }
            | DistFile::Moderator { hyper } => *hyper,
        }
    }

    /// Variable name, `None` for moderator files.
    pub fn variable(&self) -> Option<&str> {
        match self {
            DistFile::Expected { variable, .. } | DistFile::Raw { variable, .. } => Some(variable),
            DistFile::Moderator { .. } => None,
        }
    }

    pub fn file_name(&self) -> String {
        match self {
            DistFile::Expected { variable, hyper } => {
                format!("{EXPECTED_PREFIX}{variable}_{hyper}{JSON_SUFFIX}")
            }
            DistFile::Raw { variable, hyper } => format!("{variable}_{hyper}{JSON_SUFFIX}"),
            DistFile::Moderator { hyper } => format!("{MODERATOR_PREFIX}{hyper}{JSON_SUFFIX}"),
        }
    }

    /// Decode a file name. Returns `None` for names outside the grammar.
    pub fn parse(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(JSON_SUFFIX)?;
        // Variable names contain underscores, hyperparameters do not.
        let mut tail = stem.rsplitn(4, '_');
        let gamma = tail.next()?;
        let beta = tail.next()?;
        let alpha0 = tail.next()?;
        let head = tail.next()?;
        let hyper = HyperParams::parse(&format!("{alpha0}_{beta}_{gamma}"))?;

        if head == MODERATOR_PREFIX.trim_end_matches('_') {
            return Some(DistFile::Moderator { hyper });
        }
        if let Some(variable) = head.strip_prefix(EXPECTED_PREFIX) {
            if variable.is_empty() {
                return None;
            }
            return Some(DistFile::expected(variable, hyper));
        }
        Some(DistFile::raw(head, hyper))
    }
}

/// Extract `<n>` from an `ID_<n>` directory name.
pub fn parse_id_dir(name: &str) -> Option<&str> {
    name.strip_prefix(ID_PREFIX).filter(|id| !id.is_empty())
}

pub fn id_dir(id: &str) -> String {
    format!("{ID_PREFIX}{id}")
}

pub fn epoch_dir(epoch: &str) -> String {
    format!("epoch_{epoch}")
}

/// One `<root>/<scenario>/<condition>/ID_<id>/<epoch>` partition of a results tree.
#[derive(Debug, Clone)]
pub struct RunDir {
    path: PathBuf,
}

impl RunDir {
    /// `epoch` is the full directory name (e.g. `epoch_1`).
    pub fn new(root: &Path, scenario: &str, condition: &str, id: &str, epoch: &str) -> Self {
        Self {
            path: root
                .join(scenario)
                .join(condition)
                .join(id_dir(id))
                .join(epoch),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn priors(&self) -> PathBuf {
        self.path.join("priors")
    }

    pub fn posteriors_root(&self) -> PathBuf {
        self.path.join("posteriors")
    }

    pub fn posteriors(&self, action: &str) -> PathBuf {
        self.posteriors_root().join(action)
    }

    pub fn config(&self) -> PathBuf {
        self.path.join("config")
    }

    pub fn prior_params(&self) -> PathBuf {
        self.config().join("prior_params.json")
    }

    pub fn moderator(&self) -> PathBuf {
        self.path.join("moderator")
    }
}
