//! belief-fit-prior: fit Beta priors for a generalization run from the
//! terminal posterior of a finished run.

use std::path::PathBuf;

use belief_analysis::env_config;
use belief_analysis::fit::{self, FitJob, FitOptions};
use belief_analysis::AnalysisError;

fn parse_args(args: &[String]) -> Result<(FitJob, FitOptions), AnalysisError> {
    let mut positional: Vec<String> = Vec::new();
    let mut options = FitOptions {
        seed: env_config::sample_seed(),
        ..FitOptions::default()
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                options.seed = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .ok_or_else(|| AnalysisError::Usage("invalid --seed".to_string()))?;
            }
            "--samples" => {
                i += 1;
                options.samples = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .filter(|&n: &usize| n > 0)
                    .ok_or_else(|| AnalysisError::Usage("invalid --samples".to_string()))?;
            }
            "--no-plot" => {
                options.plot = false;
            }
            other if other.starts_with("--") => {
                return Err(AnalysisError::Usage(format!("unknown argument: {other}")));
            }
            other => positional.push(other.to_string()),
        }
        i += 1;
    }

    let [directory, scenario, condition, job_id, last_epoch, last_action]: [String; 6] = positional
        .try_into()
        .map_err(|p: Vec<String>| {
            AnalysisError::Usage(format!("expected 6 positional arguments, got {}", p.len()))
        })?;

    let job = FitJob {
        directory: PathBuf::from(directory),
        scenario,
        condition,
        job_id,
        last_epoch,
        last_action,
    };
    Ok((job, options))
}

fn main() {
    env_config::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }

    let (job, options) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{e}");
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = env_config::init_base_path() {
        tracing::error!("{e}");
        std::process::exit(1);
    }

    tracing::info!(
        scenario = %job.scenario,
        condition = %job.condition,
        job = %job.job_id,
        seed = options.seed,
        samples = options.samples,
        "fitting generalization priors"
    );
    if let Err(e) = fit::run(&job, &options) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        "belief-fit-prior: Fit Beta priors for a generalization run.

USAGE:
    belief-fit-prior <directory> <scenario> <simulation_condition> <job_ID> <last_epoch> <last_action> [OPTIONS]

OPTIONS:
    --seed <S>      Resampling seed [default: $BELIEF_SEED or 42]
    --samples <N>   Resamples per posterior [default: 10000]
    --no-plot       Skip the diagnostic PNGs
    -h, --help      Print this help

ENVIRONMENT:
    BELIEF_BASE_PATH   Working directory [default: .]
    BELIEF_SEED        Default resampling seed
    RUST_LOG           Log filter [default: info]"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("belief-fit-prior")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_positional_and_flags() {
        let (job, options) = parse_args(&args(&[
            "results", "s1", "Differing-content", "4", "3", "Remove", "--seed", "9", "--no-plot",
        ]))
        .unwrap();
        assert_eq!(job.job_id, "4");
        assert_eq!(job.last_action, "Remove");
        assert_eq!(options.seed, 9);
        assert!(!options.plot);
        assert_eq!(options.samples, 10_000);
    }

    #[test]
    fn test_wrong_arity() {
        assert!(matches!(
            parse_args(&args(&["results", "s1"])),
            Err(AnalysisError::Usage(_))
        ));
    }
}
