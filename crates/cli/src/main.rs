// medperf CLI - benchmark server client
// Talks to the server on behalf of benchmark participants: look up
// benchmarks and cubes, fetch cube artifacts, register datasets and results.

mod commands;
mod exit_codes;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use medperf_config::Settings;

use commands::Context;
use exit_codes::{EXIT_CONFIG, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "medperf")]
#[command(about = "Benchmark server client: benchmarks, cubes, dataset and result registration")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Server base URL (overrides settings.json)
    #[arg(long, global = true, env = "MEDPERF_SERVER")]
    server: Option<String>,

    /// Local storage root for downloaded cubes (overrides settings.json)
    #[arg(long, global = true, env = "MEDPERF_STORAGE")]
    storage: Option<PathBuf>,

    /// Settings file (default: <config dir>/medperf/settings.json)
    #[arg(long, global = true, env = "MEDPERF_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, short = 'u', global = true, env = "MEDPERF_USERNAME")]
    username: Option<String>,

    #[arg(long, short = 'p', global = true, env = "MEDPERF_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// More log output (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check credentials against the server
    Login,

    /// Benchmark lookups
    Benchmark {
        #[command(subcommand)]
        command: BenchmarkCommands,
    },

    /// Cube metadata and artifacts
    Cube {
        #[command(subcommand)]
        command: CubeCommands,
    },

    /// Dataset registration
    Dataset {
        #[command(subcommand)]
        command: UploadCommands,
    },

    /// Result registration
    Result {
        #[command(subcommand)]
        command: UploadCommands,
    },
}

#[derive(Subcommand)]
enum BenchmarkCommands {
    /// Print a benchmark specification
    Show {
        benchmark_uid: u64,

        #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Yaml)]
        output: OutputFormat,
    },

    /// List the UIDs of models associated with a benchmark (reference model excluded)
    Models {
        benchmark_uid: u64,

        #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },
}

#[derive(Subcommand)]
enum CubeCommands {
    /// Print cube metadata
    Show {
        cube_uid: u64,

        #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Yaml)]
        output: OutputFormat,
    },

    /// Download the cube file, parameters and additional files
    #[command(after_help = "\
Files land under <storage>/cubes/<uid>/. Existing files are overwritten.

Examples:
  medperf cube download 4
  medperf cube download 4 -o json")]
    Download {
        cube_uid: u64,

        #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },
}

#[derive(Subcommand)]
enum UploadCommands {
    /// Submit a YAML or JSON record; prints the assigned UID
    Upload {
        file: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
    )
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_settings(cli: &Cli) -> Result<Settings, CliError> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path).map_err(|e| CliError {
            code: EXIT_CONFIG,
            message: e.to_string(),
            hint: None,
        })?,
        None => Settings::load(),
    };

    if let Some(server) = &cli.server {
        settings.server = server.clone();
    }
    if let Some(storage) = &cli.storage {
        settings.storage = storage.clone();
    }
    Ok(settings)
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = load_settings(&cli)?;
    log::debug!("server: {}, storage: {}", settings.server, settings.storage.display());

    let ctx = Context {
        settings,
        username: cli.username,
        password: cli.password,
    };

    match cli.command {
        Commands::Login => commands::cmd_login(&ctx),
        Commands::Benchmark { command } => match command {
            BenchmarkCommands::Show { benchmark_uid, output } => {
                commands::cmd_benchmark_show(&ctx, benchmark_uid, output)
            }
            BenchmarkCommands::Models { benchmark_uid, output } => {
                commands::cmd_benchmark_models(&ctx, benchmark_uid, output)
            }
        },
        Commands::Cube { command } => match command {
            CubeCommands::Show { cube_uid, output } => commands::cmd_cube_show(&ctx, cube_uid, output),
            CubeCommands::Download { cube_uid, output } => {
                commands::cmd_cube_download(&ctx, cube_uid, output)
            }
        },
        Commands::Dataset { command: UploadCommands::Upload { file } } => {
            commands::cmd_dataset_upload(&ctx, &file)
        }
        Commands::Result { command: UploadCommands::Upload { file } } => {
            commands::cmd_result_upload(&ctx, &file)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
