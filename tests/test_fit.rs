//! Integration tests for posterior-to-prior fitting.

use std::path::Path;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use belief_analysis::distribution::EmpiricalDistribution;
use belief_analysis::fit::{self, discover_posteriors, fit_distribution, FitJob, FitOptions};

fn write(path: &Path, body: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
}

fn job(root: &Path) -> FitJob {
    FitJob {
        directory: root.to_path_buf(),
        scenario: "s1".to_string(),
        condition: "Differing-content".to_string(),
        job_id: "5".to_string(),
        last_epoch: "2".to_string(),
        last_action: "Remove".to_string(),
    }
}

/// Discretised bump on [lo, hi] centred at `centre`.
fn bump(lo: f64, hi: f64, centre: f64, n: usize) -> (Vec<f64>, Vec<f64>) {
    let support: Vec<f64> = (0..n).map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64).collect();
    let weights: Vec<f64> = support
        .iter()
        .map(|x| (-(x - centre) * (x - centre) / 0.02).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    (support, weights.into_iter().map(|w| w / total).collect())
}

fn dist_json(support: &[f64], probs: &[f64]) -> String {
    serde_json::json!({ "support": support, "probs": probs }).to_string()
}

#[test]
fn target_shift_round_trips_the_mean() {
    let (support, probs) = bump(-0.5, 0.5, 0.1, 41);
    let dist = EmpiricalDistribution::new(support, probs).unwrap();
    let inner_mean = dist.shifted(0.5).without_boundaries().unwrap().mean() - 0.5;

    let mut rng = SmallRng::seed_from_u64(3);
    let fit = fit_distribution("alpha_target", &dist, 10_000, &mut rng).unwrap();
    assert!(
        (fit.mean_in_domain() - inner_mean).abs() < 0.02,
        "fitted {} vs empirical {}",
        fit.mean_in_domain(),
        inner_mean
    );
    assert!(fit.samples.iter().all(|&s| s > 0.0 && s < 1.0));

    // Fitting the same shape on [0, 1] directly gives the same mean shifted by 0.5.
    let direct = EmpiricalDistribution::new(
        dist.support().iter().map(|s| s + 0.5).collect(),
        dist.probs().to_vec(),
    )
    .unwrap();
    let mut rng = SmallRng::seed_from_u64(3);
    let unshifted = fit_distribution("alpha_accuracy", &direct, 10_000, &mut rng).unwrap();
    assert!((unshifted.shape.mean() - 0.5 - fit.mean_in_domain()).abs() < 1e-9);
}

#[test]
fn boundary_example_samples_only_interior_values() {
    let dist =
        EmpiricalDistribution::new(vec![0.0, 0.3, 0.7, 1.0], vec![0.1, 0.4, 0.4, 0.1]).unwrap();
    let mut rng = SmallRng::seed_from_u64(11);
    let fit = fit_distribution("alpha_accuracy", &dist, 10_000, &mut rng).unwrap();
    assert_eq!(fit.samples.len(), 10_000);
    assert!(fit.samples.iter().all(|&s| s == 0.3 || s == 0.7));
    assert!((fit.shape.mean() - 0.5).abs() < 0.02);
}

#[test]
fn discovery_only_takes_alpha_files() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let body = dist_json(&[0.2, 0.8], &[0.5, 0.5]);
    write(&dir.join("alpha_target_1_10_1.json"), &body);
    write(&dir.join("alpha_accuracy_1_10_1.json"), &body);
    write(&dir.join("content_1_10_1.json"), &body);
    write(&dir.join("expected_alpha_target_1_10_1.json"), "0.1");

    let found = discover_posteriors(dir).unwrap();
    let names: Vec<&str> = found.iter().map(|(v, _)| v.as_str()).collect();
    assert_eq!(names, vec!["alpha_accuracy", "alpha_target"]);
}

#[test]
fn run_writes_single_row_prior_params_and_plots() {
    let tmp = tempfile::tempdir().unwrap();
    let job = job(tmp.path());
    let posteriors = job.posterior_dir();

    let (s, p) = bump(0.0, 1.0, 0.6, 21);
    write(&posteriors.join("alpha_accuracy_1_10_1.json"), &dist_json(&s, &p));
    let (s, p) = bump(-0.5, 0.5, -0.1, 21);
    write(&posteriors.join("alpha_target_1_10_1.json"), &dist_json(&s, &p));
    write(&posteriors.join("expected_alpha_target_1_10_1.json"), "-0.1");

    let out = fit::run(&job, &FitOptions::default()).unwrap();
    assert_eq!(out, job.config_dir().join("prior_params.json"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let rows = json.as_array().expect("prior params must be a list");
    assert_eq!(rows.len(), 1);
    let row = rows[0].as_object().unwrap();
    let keys: Vec<&str> = row.keys().map(|k| k.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "scenario",
            "simulation",
            "beta_a_alpha_accuracy",
            "beta_a_alpha_target",
            "beta_b_alpha_accuracy",
            "beta_b_alpha_target",
        ]
    );
    assert_eq!(row["scenario"], "s1");
    assert_eq!(row["simulation"], "Differing-content-generalization");

    let a = row["beta_a_alpha_target"].as_f64().unwrap();
    let b = row["beta_b_alpha_target"].as_f64().unwrap();
    let fitted_mean = a / (a + b) - 0.5;
    assert!((fitted_mean + 0.1).abs() < 0.03, "fitted target mean {fitted_mean}");

    assert!(job.config_dir().join("alpha_accuracy.png").is_file());
    assert!(job.config_dir().join("alpha_target.png").is_file());
}

#[test]
fn run_is_reproducible_for_a_seed() {
    let tmp = tempfile::tempdir().unwrap();
    let job = job(tmp.path());
    let (s, p) = bump(0.0, 1.0, 0.3, 15);
    write(
        &job.posterior_dir().join("alpha_accuracy_1_10_1.json"),
        &dist_json(&s, &p),
    );
    let options = FitOptions {
        plot: false,
        ..FitOptions::default()
    };

    let out = fit::run(&job, &options).unwrap();
    let first = std::fs::read_to_string(&out).unwrap();
    fit::run(&job, &options).unwrap();
    let second = std::fs::read_to_string(&out).unwrap();
    assert_eq!(first, second);
    assert!(!job.config_dir().join("alpha_accuracy.png").exists());
}

#[test]
fn missing_posterior_dir_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(fit::run(&job(tmp.path()), &FitOptions::default()).is_err());
}
