//! Session state: server URL and the bearer token obtained at login.
//!
//! Lives only in memory. The token is never written to disk.

use serde::Serialize;

#[derive(Debug, Clone)]
pub struct Session {
    server_url: String,
    token: Option<String>,
}

/// Body of `POST /auth-token/`.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

impl Session {
    pub fn new(server_url: impl Into<String>) -> Self {
        let server_url = server_url.into().trim_end_matches('/').to_string();
        Self { server_url, token: None }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub(crate) fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub(crate) fn authenticate(&mut self, token: String) {
        self.token = Some(token);
    }

    /// `{server}/{path}`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.server_url, path.trim_start_matches('/'))
    }
}

/// Value of the `Authorization` header for a token.
pub(crate) fn auth_header(token: &str) -> String {
    format!("Token {}", token)
}
