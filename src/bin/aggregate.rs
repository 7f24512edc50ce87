//! belief-aggregate: collect every simulated run under `results_<model>/<training_set>`
//! into `simulated_results_format0.csv` and `simulated_results_format1.csv`.

use belief_analysis::aggregate;
use belief_analysis::env_config;

fn main() {
    env_config::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }
    if args.len() != 3 {
        eprintln!("Expected 2 arguments, got {}", args.len() - 1);
        print_usage();
        std::process::exit(1);
    }
    let (model, training_set) = (&args[1], &args[2]);

    if let Err(e) = env_config::init_base_path() {
        tracing::error!("{e}");
        std::process::exit(1);
    }

    match aggregate::run(model, training_set) {
        Ok((path0, path1)) => {
            tracing::info!(format0 = %path0.display(), format1 = %path1.display(), "done");
        }
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!(
        "belief-aggregate: Aggregate simulated runs into CSV tables.

USAGE:
    belief-aggregate <model> <training_set>

    Reads general_config/ID_to_params.json and results_<model>/<training_set>/,
    writes simulated_results_format0.csv and simulated_results_format1.csv
    into the results directory.

ENVIRONMENT:
    BELIEF_BASE_PATH   Working directory [default: .]
    RUST_LOG           Log filter [default: info]"
    );
}
