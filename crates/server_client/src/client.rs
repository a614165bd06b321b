//! Benchmark server HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required).
//! One request per call: no retries, every failure is returned to the caller.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info};
use reqwest::blocking::Response;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

use medperf_config::settings::DEFAULT_TIMEOUT_SECS;
use medperf_config::{CubeArtifact, CubeLayout};

use crate::entities::{Benchmark, CubeFiles, CubeMetadata};
use crate::session::{auth_header, LoginRequest, Session};

/// Benchmark server API client (blocking).
pub struct ServerClient {
    http: reqwest::blocking::Client,
    session: Session,
    layout: CubeLayout,
}

/// Error type for server operations.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Login rejected
    #[error("Unable to authenticate user with provided credentials (HTTP {status})")]
    Authentication { status: u16 },

    /// Authenticated call attempted before login
    #[error("Must be authenticated")]
    NotAuthenticated,

    /// Entity GET answered with something other than 200
    #[error("the specified {what} doesn't exist (HTTP {status})")]
    NotFound { what: &'static str, status: u16 },

    /// Listing GET answered with something other than 200
    #[error("couldn't retrieve {what} (HTTP {status})")]
    Retrieval { what: &'static str, status: u16 },

    /// Artifact download answered with something other than 200
    #[error("There was a problem retrieving the specified file at {url} (HTTP {status})")]
    Download { url: String, status: u16 },

    /// Registration POST answered with something other than 201
    #[error("Could not upload the {what} (HTTP {status})")]
    Upload { what: &'static str, status: u16 },

    /// Connection, TLS or timeout failure
    #[error("Network error: {0}")]
    Network(String),

    /// Unexpected response body
    #[error("Parse error: {0}")]
    Parse(String),

    /// Local file write failed
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ServerError {
    /// HTTP status behind the error, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServerError::Authentication { status }
            | ServerError::NotFound { status, .. }
            | ServerError::Retrieval { status, .. }
            | ServerError::Download { status, .. }
            | ServerError::Upload { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ServerError {
    fn from(e: reqwest::Error) -> Self {
        ServerError::Network(e.to_string())
    }
}

impl ServerClient {
    /// Create an unauthenticated client with the default request timeout.
    pub fn new(server_url: impl Into<String>, layout: CubeLayout) -> Result<Self, ServerError> {
        Self::with_timeout(server_url, layout, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        server_url: impl Into<String>,
        layout: CubeLayout,
        timeout: Duration,
    ) -> Result<Self, ServerError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("medperf/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            session: Session::new(server_url),
            layout,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn layout(&self) -> &CubeLayout {
        &self.layout
    }

    /// Exchange username/password for a token and keep it for later calls.
    pub fn login(&mut self, username: &str, password: &str) -> Result<(), ServerError> {
        let url = self.session.endpoint("/auth-token/");
        debug!("POST {}", url);
        let resp = self.http.post(&url)
            .json(&LoginRequest { username, password })
            .send()?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(ServerError::Authentication { status: status.as_u16() });
        }

        let json: Value = resp.json().map_err(|e| ServerError::Parse(e.to_string()))?;
        let token = json["token"].as_str()
            .filter(|t| !t.is_empty())
            .ok_or(ServerError::Authentication { status: status.as_u16() })?;

        self.session.authenticate(token.to_string());
        info!("Authenticated against {} as {}", self.session.server_url(), username);
        Ok(())
    }

    /// Retrieve a benchmark specification.
    pub fn get_benchmark(&self, benchmark_uid: u64) -> Result<Benchmark, ServerError> {
        let url = self.session.endpoint(&format!("/benchmarks/{}", benchmark_uid));
        let resp = self.auth_get(&url)?;
        if resp.status() != StatusCode::OK {
            return Err(ServerError::NotFound { what: "benchmark", status: resp.status().as_u16() });
        }
        resp.json().map_err(|e| ServerError::Parse(e.to_string()))
    }

    /// UIDs of the models associated with a benchmark, in server order.
    /// The server leaves the reference model out of this list.
    pub fn get_benchmark_models(&self, benchmark_uid: u64) -> Result<Vec<u64>, ServerError> {
        let url = self.session.endpoint(&format!("/benchmarks/{}/models", benchmark_uid));
        let resp = self.auth_get(&url)?;
        if resp.status() != StatusCode::OK {
            return Err(ServerError::Retrieval {
                what: "models for the specified benchmark",
                status: resp.status().as_u16(),
            });
        }

        let models: Vec<Value> = resp.json().map_err(|e| ServerError::Parse(e.to_string()))?;
        models.iter()
            .map(|m| {
                m["id"].as_u64()
                    .ok_or_else(|| ServerError::Parse(format!("model entry without integer id: {}", m)))
            })
            .collect()
    }

    /// Retrieve cube metadata (artifact URLs and hashes).
    pub fn get_cube_metadata(&self, cube_uid: u64) -> Result<CubeMetadata, ServerError> {
        let url = self.session.endpoint(&format!("/mlcubes/{}/", cube_uid));
        let resp = self.auth_get(&url)?;
        if resp.status() != StatusCode::OK {
            return Err(ServerError::NotFound { what: "cube", status: resp.status().as_u16() });
        }
        resp.json().map_err(|e| ServerError::Parse(e.to_string()))
    }

    /// Download the cube definition file. Returns its local path.
    pub fn get_cube(&self, url: &str, cube_uid: u64) -> Result<PathBuf, ServerError> {
        self.get_cube_file(url, cube_uid, CubeArtifact::Cube)
    }

    /// Download the cube parameters file into the cube workspace.
    pub fn get_cube_params(&self, url: &str, cube_uid: u64) -> Result<PathBuf, ServerError> {
        self.get_cube_file(url, cube_uid, CubeArtifact::Params)
    }

    /// Download the additional files tarball.
    pub fn get_cube_additional(&self, url: &str, cube_uid: u64) -> Result<PathBuf, ServerError> {
        self.get_cube_file(url, cube_uid, CubeArtifact::Additional)
    }

    /// Fetch every artifact the metadata points at.
    pub fn download_cube_files(&self, cube_uid: u64, metadata: &CubeMetadata) -> Result<CubeFiles, ServerError> {
        let cube_url = metadata.cube_url()
            .ok_or_else(|| ServerError::Parse(format!("cube {} has no git_mlcube_url", cube_uid)))?;
        let cube = self.get_cube(cube_url, cube_uid)?;

        let params = metadata.params_url()
            .map(|url| self.get_cube_params(url, cube_uid))
            .transpose()?;
        let additional = metadata.additional_url()
            .map(|url| self.get_cube_additional(url, cube_uid))
            .transpose()?;

        Ok(CubeFiles { cube, params, additional })
    }

    /// Register a dataset. Returns the server-assigned UID.
    pub fn upload_dataset<T: Serialize>(&self, registration: &T) -> Result<u64, ServerError> {
        let url = self.session.endpoint("/datasets/");
        self.upload(&url, registration, "dataset")
    }

    /// Register benchmark results. Returns the server-assigned UID.
    pub fn upload_results<T: Serialize>(&self, results: &T) -> Result<u64, ServerError> {
        let url = self.session.endpoint("/results/");
        self.upload(&url, results, "results")
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn auth_get(&self, url: &str) -> Result<Response, ServerError> {
        self.auth_request(Method::GET, url, None)
    }

    fn auth_post(&self, url: &str, body: &Value) -> Result<Response, ServerError> {
        self.auth_request(Method::POST, url, Some(body))
    }

    fn auth_request(&self, method: Method, url: &str, body: Option<&Value>) -> Result<Response, ServerError> {
        let token = self.session.token().ok_or(ServerError::NotAuthenticated)?;

        debug!("{} {}", method, url);
        let mut req = self.http.request(method, url)
            .header(reqwest::header::AUTHORIZATION, auth_header(token));
        if let Some(body) = body {
            req = req.json(body);
        }

        Ok(req.send()?)
    }

    fn upload<T: Serialize>(&self, url: &str, record: &T, what: &'static str) -> Result<u64, ServerError> {
        let body = serde_json::to_value(record).map_err(|e| ServerError::Parse(e.to_string()))?;
        let resp = self.auth_post(url, &body)?;
        if resp.status() != StatusCode::CREATED {
            return Err(ServerError::Upload { what, status: resp.status().as_u16() });
        }

        let json: Value = resp.json().map_err(|e| ServerError::Parse(e.to_string()))?;
        let uid = json["id"].as_u64()
            .ok_or_else(|| ServerError::Parse(format!("Missing id in {} registration response", what)))?;
        info!("Registered {} with UID {}", what, uid);
        Ok(uid)
    }

    /// Unauthenticated GET of an artifact, written under the cube directory.
    /// Nothing touches the filesystem unless the server answered 200.
    fn get_cube_file(&self, url: &str, cube_uid: u64, artifact: CubeArtifact) -> Result<PathBuf, ServerError> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send()?;
        if resp.status() != StatusCode::OK {
            return Err(ServerError::Download { url: url.to_string(), status: resp.status().as_u16() });
        }
        let bytes = resp.bytes()?;

        let dir = self.layout.artifact_dir(cube_uid, artifact);
        fs::create_dir_all(&dir).map_err(|source| ServerError::Io { path: dir.clone(), source })?;

        let path = self.layout.artifact_path(cube_uid, artifact);
        fs::write(&path, &bytes).map_err(|source| ServerError::Io { path: path.clone(), source })?;

        info!("Downloaded {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}
