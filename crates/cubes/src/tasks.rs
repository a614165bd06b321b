use std::path::{Path, PathBuf};
use std::process::Command;

use crate::{exec, flag, python_interpreter, CubeError};

/// Generate inferences on prepared data with `model.py`.
#[derive(Debug, Clone)]
pub struct InferTask {
    /// Location of prepared data
    pub data_path: PathBuf,
    /// Parameters for inference
    pub params_file: PathBuf,
    /// Where inferences are written
    pub out_path: PathBuf,
}

/// Score predictions against labels with `metrics.py`.
#[derive(Debug, Clone)]
pub struct EvaluateTask {
    pub labels_csv: PathBuf,
    pub preds_csv: PathBuf,
    pub parameters_file: PathBuf,
    /// Directory that receives `results.yaml`
    pub output_path: PathBuf,
}

impl InferTask {
    pub const SCRIPT: &'static str = "model.py";

    pub fn command(&self, python: &Path, workdir: &Path) -> Command {
        let mut cmd = Command::new(python);
        cmd.current_dir(workdir)
            .arg(Self::SCRIPT)
            .arg(flag("data_path", &self.data_path))
            .arg(flag("params_file", &self.params_file))
            .arg(flag("out_path", &self.out_path));
        cmd
    }

    pub fn run(&self) -> Result<(), CubeError> {
        self.run_with(&python_interpreter()?, Path::new("."))
    }

    pub fn run_with(&self, python: &Path, workdir: &Path) -> Result<(), CubeError> {
        exec(self.command(python, workdir))
    }
}

impl EvaluateTask {
    pub const SCRIPT: &'static str = "metrics.py";
    pub const RESULTS_FILE: &'static str = "results.yaml";

    pub fn output_file(&self) -> PathBuf {
        self.output_path.join(Self::RESULTS_FILE)
    }

    pub fn command(&self, python: &Path, workdir: &Path) -> Command {
        let mut cmd = Command::new(python);
        cmd.current_dir(workdir)
            .arg(Self::SCRIPT)
            .arg(flag("labels_csv", &self.labels_csv))
            .arg(flag("preds_csv", &self.preds_csv))
            .arg(flag("parameters_file", &self.parameters_file))
            .arg(flag("output_file", self.output_file()));
        cmd
    }

    pub fn run(&self) -> Result<(), CubeError> {
        self.run_with(&python_interpreter()?, Path::new("."))
    }

    pub fn run_with(&self, python: &Path, workdir: &Path) -> Result<(), CubeError> {
        exec(self.command(python, workdir))
    }
}
