//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain     | Description                              |
//! |---------|------------|------------------------------------------|
//! | 0       | Universal  | Success                                  |
//! | 1       | Universal  | General error (unspecified)              |
//! | 2       | Universal  | CLI usage error (bad args, missing file) |
//! | 3-9     | local      | Settings and local file errors           |
//! | 10-19   | server     | Benchmark server codes                   |

use medperf_server_client::ServerError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Local (3-9)
// =============================================================================

/// Settings file unreadable or invalid.
pub const EXIT_CONFIG: u8 = 3;

/// Local file could not be read or written.
pub const EXIT_IO: u8 = 4;

/// Registration file is not valid YAML/JSON.
pub const EXIT_PARSE: u8 = 5;

// =============================================================================
// Server (10-19)
// =============================================================================

/// Login rejected by the server.
pub const EXIT_SERVER_AUTH: u8 = 10;

/// Authenticated operation attempted without a session.
pub const EXIT_SERVER_NOT_AUTH: u8 = 11;

/// Benchmark or cube does not exist.
pub const EXIT_SERVER_NOT_FOUND: u8 = 12;

/// Listing request failed.
pub const EXIT_SERVER_RETRIEVAL: u8 = 13;

/// Artifact download failed.
pub const EXIT_SERVER_DOWNLOAD: u8 = 14;

/// Dataset or result registration rejected.
pub const EXIT_SERVER_UPLOAD: u8 = 15;

/// Network failure or timeout talking to the server.
pub const EXIT_SERVER_NETWORK: u8 = 16;

/// Server answered with an unexpected body.
pub const EXIT_SERVER_PROTOCOL: u8 = 17;

/// Map a ServerError to its exit code.
pub fn server_exit_code(err: &ServerError) -> u8 {
    match err {
        ServerError::Authentication { .. } => EXIT_SERVER_AUTH,
        ServerError::NotAuthenticated => EXIT_SERVER_NOT_AUTH,
        ServerError::NotFound { .. } => EXIT_SERVER_NOT_FOUND,
        ServerError::Retrieval { .. } => EXIT_SERVER_RETRIEVAL,
        ServerError::Download { .. } => EXIT_SERVER_DOWNLOAD,
        ServerError::Upload { .. } => EXIT_SERVER_UPLOAD,
        ServerError::Network(_) => EXIT_SERVER_NETWORK,
        ServerError::Parse(_) => EXIT_SERVER_PROTOCOL,
        ServerError::Io { .. } => EXIT_IO,
    }
}
