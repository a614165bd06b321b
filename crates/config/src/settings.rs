// Client settings
// Loaded from ~/.config/medperf/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::layout::CubeLayout;
use crate::ConfigError;

pub const DEFAULT_SERVER: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the benchmark server
    pub server: String,

    /// Root of local storage (cubes, datasets, results)
    pub storage: PathBuf,

    /// Folder under `storage` that holds one directory per cube UID
    pub cubes_folder: String,

    /// Cube workspace, relative to the cube directory
    pub workspace_path: String,

    pub cube_filename: String,
    pub params_filename: String,

    /// Additional files folder, relative to the cube directory
    pub additional_path: String,
    pub tarball_filename: String,

    /// Per-request timeout for server calls
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let storage = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("medperf");

        Self {
            server: DEFAULT_SERVER.to_string(),
            storage,
            cubes_folder: "cubes".to_string(),
            workspace_path: "workspace".to_string(),
            cube_filename: "mlcube.yaml".to_string(),
            params_filename: "parameters.yaml".to_string(),
            additional_path: "workspace/additional_files".to_string(),
            tarball_filename: "tmp.tar.gz".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("medperf");
        config_dir.join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            log::debug!("no settings file at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{}", e);
                log::warn!("Using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from an explicit file. Lines starting with `//` are comments.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        let settings: Self = serde_json::from_str(&cleaned).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        settings.validate().map_err(|reason| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(settings)
    }

    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), String> {
        // reqwest treats a zero timeout as "expire immediately"
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be at least 1".to_string());
        }
        Ok(())
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        fs::write(path, json).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Directory that holds one subdirectory per cube UID.
    pub fn cubes_storage(&self) -> PathBuf {
        self.storage.join(&self.cubes_folder)
    }

    /// Local file layout for downloaded cube artifacts.
    pub fn cube_layout(&self) -> CubeLayout {
        CubeLayout {
            cubes_root: self.cubes_storage(),
            cube_filename: self.cube_filename.clone(),
            workspace_path: self.workspace_path.clone(),
            params_filename: self.params_filename.clone(),
            additional_path: self.additional_path.clone(),
            tarball_filename: self.tarball_filename.clone(),
        }
    }
}
