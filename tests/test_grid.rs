//! Integration tests for parameter-grid generation and lookup.

use belief_analysis::beta::BetaShape;
use belief_analysis::grid::{generate, resolve_condition, write_records, ParamIndex, ParamRecord};

#[test]
fn differing_content_has_486_records_in_product_order() {
    let records = generate("Differing-content").unwrap();
    assert_eq!(records.len(), 2 * 3 * 3 * 3 * 3 * 3);

    let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
    let expected: Vec<String> = (1..=486).map(|i| i.to_string()).collect();
    assert_eq!(ids, expected);

    // Content mean is the outermost axis: first half 0.2, second half 0.8.
    assert!(records[..243].iter().all(|r| r.mean_content == 0.2));
    assert!(records[243..].iter().all(|r| r.mean_content == 0.8));

    // Target variance is the innermost varying axis.
    assert_eq!(records[0].variance_alpha_target, 0.05 * 0.05);
    assert_eq!(records[1].variance_alpha_target, 0.15 * 0.15);
    assert_eq!(records[2].variance_alpha_target, 0.25 * 0.25);
    assert_eq!(records[3].mean_alpha_target, 0.5);

    assert!(records
        .iter()
        .all(|r| r.simulation_condition == "Differing-content"
            && r.alpha0 == 1.0
            && r.beta == 10.0
            && r.gamma == 1.0));
}

#[test]
fn grid_generation_is_deterministic() {
    let a = generate("Differing-content").unwrap();
    let b = generate("Differing-content").unwrap();
    assert_eq!(a, b);
}

#[test]
fn every_record_moment_matches() {
    for r in generate("Differing-content").unwrap() {
        for (mean, variance, a, b) in [
            (r.mean_content, r.variance_content, r.beta_a_content, r.beta_b_content),
            (
                r.mean_alpha_accuracy,
                r.variance_alpha_accuracy,
                r.beta_a_alpha_accuracy,
                r.beta_b_alpha_accuracy,
            ),
            (
                r.mean_alpha_target,
                r.variance_alpha_target,
                r.beta_a_alpha_target,
                r.beta_b_alpha_target,
            ),
        ] {
            assert!(a > 0.0 && b > 0.0, "ID {} has a={a} b={b}", r.id);
            let shape = BetaShape::new(a, b);
            assert!((shape.mean() - mean).abs() < 1e-9);
            assert!((shape.variance() - variance).abs() < 1e-9);
        }
    }
}

#[test]
fn written_grid_loads_into_index() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("general_config").join("ID_to_params.json");
    let records = generate("Differing-content").unwrap();
    write_records(&path, &records).unwrap();

    // Field names follow the simulator's config keys.
    let raw: Vec<serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw[0]["ID"], "1");
    assert_eq!(raw[0]["simulation_condition"], "Differing-content");
    assert!(raw[0].get("beta_b_alpha_target").is_some());

    let index = ParamIndex::load(&path).unwrap();
    assert_eq!(index.len(), 486);
    let r: &ParamRecord = index.get("Differing-content", "486").unwrap();
    assert_eq!(r.mean_content, 0.8);
    assert_eq!(r.hyper_display(), ["1", "10", "1"]);
    assert!(index.get("Other", "1").is_err());
}

#[test]
fn loading_rejects_records_with_missing_fields() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("ID_to_params.json");
    std::fs::write(&path, r#"[{"ID": "1", "simulation_condition": "c"}]"#).unwrap();
    assert!(matches!(
        ParamIndex::load(&path),
        Err(belief_analysis::AnalysisError::Json { .. })
    ));
}

#[test]
fn grid_size_matches_axes() {
    let grid = resolve_condition("Differing-content").unwrap();
    assert_eq!(grid.len(), 486);
    assert!(!grid.is_empty());
}
