// This module defines the error taxonomy for the asl2c driver using the thiserror crate.
// DriverError covers every way a session can fail: conflicting options detected before
// anything runs, backend resolution failures (an identifier missing from one of the two
// profile tables, or an environment variable a backend depends on), a subprocess that
// exits non-zero or cannot be launched, filesystem problems in the session workspace, a
// malformed project script and a configuration file that cannot be encoded. Every failure
// is fatal to the session; the only recovery is to run the whole driver again. The
// module also provides DriverResult<T> as a convenience alias.

//! Error types for the asl2c driver.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for script generation and build sessions.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Error: {reason}")]
    InvalidConfiguration {
        reason: String,
    },

    #[error("Backend '{name}' has no {table} profile")]
    UnknownBackend {
        name: String,
        table: &'static str,
    },

    #[error("{var} environment variable must be set for the {backend} backend")]
    MissingEnvironment {
        var: &'static str,
        backend: &'static str,
    },

    #[error("Command '{command}' returned non-zero exit status {code}.")]
    ExternalToolFailure {
        tool: String,
        command: String,
        code: i32,
    },

    #[error("Unable to run '{command}': {source}")]
    ToolUnavailable {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Workspace error at {}: {source}", path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed script line {line}: {reason}")]
    MalformedScript {
        line: usize,
        reason: String,
    },

    #[error("Unable to encode configuration file: {0}")]
    ConfigEncoding(#[from] serde_json::Error),
}

impl DriverError {
    /// Shorthand for an `InvalidConfiguration` error.
    pub fn invalid(reason: impl Into<String>) -> Self {
        DriverError::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Wrap an I/O failure on `path` as a workspace error.
    pub fn workspace(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DriverError::Workspace {
            path: path.into(),
            source,
        }
    }

    /// Exit status the driver process should terminate with.
    ///
    /// A failing subprocess has its own exit code forwarded; everything
    /// else exits with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            DriverError::ExternalToolFailure { code, .. } => {
                u8::try_from(*code).ok().filter(|c| *c != 0).unwrap_or(1)
            }
            _ => 1,
        }
    }
}

/// Result type alias for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;
