//! Results-tree discovery.
//!
//! The tree carries no manifest: scenarios, conditions, IDs, epochs and the
//! action catalog are read from sorted directory listings of the first
//! scenario/condition/ID/epoch. Every other partition must list the same
//! names; [`expect_listing`] enforces that during traversal.

use std::path::{Path, PathBuf};

use crate::error::{AnalysisError, Result};
use crate::naming::{parse_id_dir, RunDir};

/// Sorted names of the immediate subdirectories of `dir`.
pub fn list_subdirs(dir: &Path) -> Result<Vec<String>> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map_err(|e| AnalysisError::io(dir, e))?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|ft| ft.is_dir()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    Ok(names)
}

fn first_listing(dir: &Path) -> Result<Vec<String>> {
    let names = list_subdirs(dir)?;
    if names.is_empty() {
        return Err(AnalysisError::EmptyDirectory(dir.to_path_buf()));
    }
    Ok(names)
}

/// Fail unless `dir` lists exactly `expected`.
pub fn expect_listing(dir: &Path, expected: &[String]) -> Result<()> {
    let found = list_subdirs(dir)?;
    if found != expected {
        return Err(AnalysisError::NonUniformTree {
            path: dir.to_path_buf(),
            expected: expected.to_vec(),
            found,
        });
    }
    Ok(())
}

/// Partition names shared by every scenario of a results tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsLayout {
    pub root: PathBuf,
    pub scenarios: Vec<String>,
    pub conditions: Vec<String>,
    /// Bare IDs, without the `ID_` prefix.
    pub ids: Vec<String>,
    /// Full epoch directory names (`epoch_<k>`).
    pub epochs: Vec<String>,
    /// Canonical action catalog.
    pub actions: Vec<String>,
}

impl ResultsLayout {
    pub fn discover(root: &Path) -> Result<Self> {
        let scenarios = first_listing(root)?;
        let scenario_dir = root.join(&scenarios[0]);
        let conditions = first_listing(&scenario_dir)?;
        let condition_dir = scenario_dir.join(&conditions[0]);
        let id_dirs = first_listing(&condition_dir)?;
        let ids = parse_ids(&condition_dir, &id_dirs)?;
        let id_dir = condition_dir.join(&id_dirs[0]);
        let epochs = first_listing(&id_dir)?;
        let run = RunDir::new(root, &scenarios[0], &conditions[0], &ids[0], &epochs[0]);
        let actions = first_listing(&run.posteriors_root())?;

        tracing::info!(
            scenarios = scenarios.len(),
            conditions = conditions.len(),
            ids = ids.len(),
            epochs = epochs.len(),
            actions = actions.len(),
            "discovered results tree"
        );
        Ok(Self {
            root: root.to_path_buf(),
            scenarios,
            conditions,
            ids,
            epochs,
            actions,
        })
    }

    /// `ID_<n>` directory names in listing order.
    pub fn id_dirs(&self) -> Vec<String> {
        self.ids.iter().map(|id| crate::naming::id_dir(id)).collect()
    }
}

fn parse_ids(parent: &Path, id_dirs: &[String]) -> Result<Vec<String>> {
    id_dirs
        .iter()
        .map(|name| {
            parse_id_dir(name)
                .map(str::to_string)
                .ok_or_else(|| AnalysisError::BadDirectoryName(parent.join(name)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mkdirs(root: &Path, rel: &[&str]) {
        for r in rel {
            std::fs::create_dir_all(root.join(r)).unwrap();
        }
    }

    #[test]
    fn test_discover_sorted_listing() {
        let tmp = tempfile::tempdir().unwrap();
        mkdirs(
            tmp.path(),
            &[
                "s2/c/ID_1/epoch_1/posteriors/B",
                "s1/c/ID_1/epoch_1/posteriors/B",
                "s1/c/ID_1/epoch_1/posteriors/A",
            ],
        );
        std::fs::write(tmp.path().join("notes.txt"), "x").unwrap();
        let layout = ResultsLayout::discover(tmp.path()).unwrap();
        assert_eq!(layout.scenarios, vec!["s1", "s2"]);
        assert_eq!(layout.ids, vec!["1"]);
        assert_eq!(layout.epochs, vec!["epoch_1"]);
        assert_eq!(layout.actions, vec!["A", "B"]);
    }

    #[test]
    fn test_bad_id_dir() {
        let tmp = tempfile::tempdir().unwrap();
        mkdirs(tmp.path(), &["s1/c/run_1/epoch_1/posteriors/A"]);
        assert!(matches!(
            ResultsLayout::discover(tmp.path()),
            Err(AnalysisError::BadDirectoryName(_))
        ));
    }

    #[test]
    fn test_empty_root() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            ResultsLayout::discover(tmp.path()),
            Err(AnalysisError::EmptyDirectory(_))
        ));
    }

    #[test]
    fn test_expect_listing_mismatch() {
        let tmp = tempfile::tempdir().unwrap();
        mkdirs(tmp.path(), &["A", "C"]);
        let err = expect_listing(tmp.path(), &["A".to_string(), "B".to_string()]).unwrap_err();
        match err {
            AnalysisError::NonUniformTree { found, .. } => assert_eq!(found, vec!["A", "C"]),
            other => panic!("unexpected error {other}"),
        }
    }
}
