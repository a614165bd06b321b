//! MLCube task runners.
//!
//! Each cube entry point hands its arguments to a Python script inside the
//! container and waits for it. Output goes straight to the inherited
//! stdout/stderr.

pub mod tasks;

use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::Command;

pub use tasks::{EvaluateTask, InferTask};

/// Interpreter used when `MLCUBE_PYTHON` is unset.
pub const DEFAULT_PYTHON: &str = "python3";

#[derive(Debug, thiserror::Error)]
pub enum CubeError {
    #[error("{name} not found on PATH")]
    InterpreterNotFound { name: String },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with {}", .code.map(|c| c.to_string()).unwrap_or_else(|| "a signal".into()))]
    Failed { program: String, code: Option<i32> },
}

impl CubeError {
    /// Process exit code to report for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CubeError::Failed { code: Some(c), .. } if (1..=255).contains(c) => *c as u8,
            _ => 1,
        }
    }
}

/// Locate the Python interpreter (`MLCUBE_PYTHON`, else `python3`).
pub fn python_interpreter() -> Result<PathBuf, CubeError> {
    let name = std::env::var("MLCUBE_PYTHON").unwrap_or_else(|_| DEFAULT_PYTHON.to_string());
    which::which(&name).map_err(|_| CubeError::InterpreterNotFound { name })
}

/// `--key=value`, the flag style the cube scripts parse.
pub(crate) fn flag(key: &str, value: impl AsRef<OsStr>) -> std::ffi::OsString {
    let mut arg = std::ffi::OsString::from(format!("--{}=", key));
    arg.push(value.as_ref());
    arg
}

/// Run to completion. A non-zero exit is an error.
pub fn exec(mut cmd: Command) -> Result<(), CubeError> {
    let program = cmd.get_program().to_string_lossy().to_string();
    log::info!(
        "running {} {}",
        program,
        cmd.get_args().map(|a| a.to_string_lossy()).collect::<Vec<_>>().join(" "),
    );

    let status = cmd.status().map_err(|source| CubeError::Spawn {
        program: program.clone(),
        source,
    })?;

    if !status.success() {
        return Err(CubeError::Failed { program, code: status.code() });
    }
    Ok(())
}
