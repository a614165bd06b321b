// metrics-cube - MLCube entry point for the evaluation metrics.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use medperf_cubes::EvaluateTask;

#[derive(Parser)]
#[command(name = "metrics-cube", about = "Metrics cube: score predictions against labels")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run metrics.py and write <output_path>/results.yaml
    Evaluate {
        #[arg(long = "labels_csv")]
        labels_csv: PathBuf,

        #[arg(long = "preds_csv")]
        preds_csv: PathBuf,

        #[arg(long = "parameters_file")]
        parameters_file: PathBuf,

        #[arg(long = "output_path")]
        output_path: PathBuf,
    },

    /// Reserved task; does nothing
    Test,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = match Cli::parse().command {
        Commands::Evaluate { labels_csv, preds_csv, parameters_file, output_path } => EvaluateTask {
            labels_csv,
            preds_csv,
            parameters_file,
            output_path,
        }
        .run(),
        Commands::Test => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
