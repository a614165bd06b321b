// xrv-model - MLCube entry point for the chest x-ray classifier.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use medperf_cubes::InferTask;

#[derive(Parser)]
#[command(name = "xrv-model", about = "Model cube: generate inferences on prepared data")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run model.py over the prepared data
    Infer {
        #[arg(long = "data_path")]
        data_path: PathBuf,

        #[arg(long = "parameters_file")]
        parameters_file: PathBuf,

        #[arg(long = "output_path")]
        output_path: PathBuf,
    },

    /// Reserved task; does nothing
    Hotfix,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = match Cli::parse().command {
        Commands::Infer { data_path, parameters_file, output_path } => InferTask {
            data_path,
            params_file: parameters_file,
            out_path: output_path,
        }
        .run(),
        Commands::Hotfix => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
