use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    /// Low-level I/O error.
    /// Maps to **HTTP 500 Internal Server Error**.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    /// Maps to **HTTP 500 Internal Server Error**.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum AuthError {
    /// No credentials were sent.
    /// Maps to **HTTP 403 Forbidden**.
    #[error("Forbidden: Credentials missing")]
    Missing,

    /// Credentials were sent but do not match the manager credential.
    /// Maps to **HTTP 403 Forbidden**.
    #[error("Forbidden: Credentials invalid")]
    Invalid,
}

#[derive(Error, Debug)]
pub enum RequestError {
    /// The request was malformed or referenced something unknown (e.g., a platform outside the allow-list).
    /// Maps to **HTTP 400 Bad Request**.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Nothing to deliver for the request.
    /// Maps to **HTTP 404 Not Found**.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Failures of the export pipeline that must be reported instead of silently skipped.
#[derive(Debug, Error)]
pub enum BuildError {
    /// An external tool could not be started at all.
    /// Maps to **HTTP 500 Internal Server Error**.
    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// An external tool exited unsuccessfully. `output` holds its combined stdout/stderr.
    /// Maps to **HTTP 500 Internal Server Error**.
    #[error("`{command}` exited with {status}\n{output}")]
    CommandFailed {
        command: String,
        status: String,
        output: String,
    },

    /// An external tool ran longer than allowed and was killed.
    /// Maps to **HTTP 503 Service Unavailable**, the submission can be retried.
    #[error("`{command}` timed out after {}s", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    /// The ephemeral workspace could not be prepared.
    /// Maps to **HTTP 500 Internal Server Error**.
    #[error("Failed to prepare workspace {}: {source}", .path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A produced package could not be moved into permanent storage.
    /// Maps to **HTTP 500 Internal Server Error**.
    #[error("Failed to store package {filename}: {source}")]
    Storage {
        filename: String,
        #[source]
        source: StorageError,
    },

    /// The build worker is gone.
    /// Maps to **HTTP 503 Service Unavailable**.
    #[error("Build queue unavailable: {0}")]
    Unavailable(String),
}

impl BuildError {
    /// Whether resubmitting the same repository may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Unavailable(_))
    }
}
