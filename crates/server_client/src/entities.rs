//! Server-side records.
//!
//! The server schema is passed through untouched; these wrappers only add
//! accessors for the handful of fields the client itself reads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Benchmark specification as returned by `/benchmarks/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Benchmark(pub Map<String, Value>);

/// Cube metadata as returned by `/mlcubes/{id}/`: artifact locations and hashes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CubeMetadata(pub Map<String, Value>);

impl Benchmark {
    pub fn uid(&self) -> Option<u64> {
        self.0.get("id").and_then(Value::as_u64)
    }

    pub fn name(&self) -> Option<&str> {
        str_field(&self.0, "name")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl CubeMetadata {
    pub fn uid(&self) -> Option<u64> {
        self.0.get("id").and_then(Value::as_u64)
    }

    pub fn name(&self) -> Option<&str> {
        str_field(&self.0, "name")
    }

    /// URL of the cube definition file.
    pub fn cube_url(&self) -> Option<&str> {
        str_field(&self.0, "git_mlcube_url")
    }

    /// URL of the parameters file, if the cube has one.
    pub fn params_url(&self) -> Option<&str> {
        str_field(&self.0, "git_parameters_url")
    }

    /// URL of the additional files tarball, if the cube has one.
    pub fn additional_url(&self) -> Option<&str> {
        str_field(&self.0, "tarball_url")
    }

    pub fn tarball_hash(&self) -> Option<&str> {
        str_field(&self.0, "tarball_hash")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

/// Local paths of the artifacts fetched for one cube.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CubeFiles {
    pub cube: PathBuf,
    pub params: Option<PathBuf>,
    pub additional: Option<PathBuf>,
}

// Empty strings are how the server spells "not provided".
fn str_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
