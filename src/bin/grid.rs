//! belief-grid: enumerate the parameter grid of a simulation condition.
//!
//! Writes one record per combination of belief means/variances and
//! hyperparameters to `general_config/ID_to_params.json` (overwritten).

use belief_analysis::constants::PARAMS_FILE;
use belief_analysis::env_config;
use belief_analysis::grid;

fn main() {
    env_config::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        std::process::exit(if args.len() == 2 { 0 } else { 1 });
    }
    let condition = &args[1];

    if let Err(e) = env_config::init_base_path() {
        tracing::error!("{e}");
        std::process::exit(1);
    }

    let records = match grid::generate(condition) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = grid::write_records(PARAMS_FILE, &records) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
    tracing::info!(
        condition = %condition,
        records = records.len(),
        path = PARAMS_FILE,
        "wrote parameter grid"
    );
}

fn print_usage() {
    println!(
        "belief-grid: Enumerate the parameter grid for a simulation condition.

USAGE:
    belief-grid <simulation_condition>

CONDITIONS:
    Differing-content

ENVIRONMENT:
    BELIEF_BASE_PATH   Working directory [default: .]
    RUST_LOG           Log filter [default: info]"
    );
}
