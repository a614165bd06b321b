// Configuration loading

pub mod layout;
pub mod settings;

use std::path::PathBuf;

pub use layout::{CubeArtifact, CubeLayout};
pub use settings::Settings;

/// Errors reading or writing the settings file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid settings in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid settings in {}: {reason}", .path.display())]
    Invalid {
        path: PathBuf,
        reason: String,
    },
}
