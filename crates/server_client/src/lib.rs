//! Benchmark server API client, shared between the CLI and automation.
//!
//! This crate is the single source of truth for the server wire contract:
//! login, benchmark and cube lookups, artifact downloads, dataset and
//! result registration.
//!
//! No retries. No progress bars. No persisted credentials.

mod client;
mod entities;
mod session;

pub use client::{ServerClient, ServerError};
pub use entities::{Benchmark, CubeFiles, CubeMetadata};
pub use session::Session;
