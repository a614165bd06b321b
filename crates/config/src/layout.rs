//! Local storage layout for downloaded cubes.
//!
//! ```text
//! <cubes_root>/<uid>/mlcube.yaml
//! <cubes_root>/<uid>/workspace/parameters.yaml
//! <cubes_root>/<uid>/workspace/additional_files/tmp.tar.gz
//! ```

use std::path::PathBuf;

/// One downloadable cube artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeArtifact {
    /// The cube definition file, at the cube root
    Cube,
    /// Parameters file, under the workspace
    Params,
    /// Additional files tarball
    Additional,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubeLayout {
    pub cubes_root: PathBuf,
    pub cube_filename: String,
    pub workspace_path: String,
    pub params_filename: String,
    pub additional_path: String,
    pub tarball_filename: String,
}

impl CubeLayout {
    /// Directory for a single cube.
    pub fn cube_path(&self, cube_uid: u64) -> PathBuf {
        self.cubes_root.join(cube_uid.to_string())
    }

    /// Subdirectory (relative to the cube path) and file name for an artifact.
    pub fn target(&self, artifact: CubeArtifact) -> (&str, &str) {
        match artifact {
            CubeArtifact::Cube => ("", self.cube_filename.as_str()),
            CubeArtifact::Params => (self.workspace_path.as_str(), self.params_filename.as_str()),
            CubeArtifact::Additional => (self.additional_path.as_str(), self.tarball_filename.as_str()),
        }
    }

    /// Directory an artifact is written into.
    pub fn artifact_dir(&self, cube_uid: u64, artifact: CubeArtifact) -> PathBuf {
        let (subdir, _) = self.target(artifact);
        let base = self.cube_path(cube_uid);
        if subdir.is_empty() {
            base
        } else {
            base.join(subdir)
        }
    }

    /// Full path of an artifact file.
    pub fn artifact_path(&self, cube_uid: u64, artifact: CubeArtifact) -> PathBuf {
        let (_, filename) = self.target(artifact);
        self.artifact_dir(cube_uid, artifact).join(filename)
    }
}
