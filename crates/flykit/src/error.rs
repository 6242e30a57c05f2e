//! Error types for resource operations.
//!
//! Every failure in this crate is fatal to the invocation. Errors still carry a
//! category so the binary can print a hint that matches the kind of failure.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type alias for resource operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classes of failure, used for user-facing hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The JSON request on stdin could not be decoded.
    Input,
    /// Network-related errors (download, HTTP status).
    Network,
    /// A file, binary or external utility is missing.
    NotFound,
    /// Permission denied while writing or chmod-ing.
    Permission,
    /// Archive could not be unpacked.
    Format,
    /// An external command ran and exited unsuccessfully.
    Command,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Input => "Invalid resource request",
            Self::Network => "Network connectivity issue",
            Self::NotFound => "File or executable not found",
            Self::Permission => "Permission denied",
            Self::Format => "Invalid archive format",
            Self::Command => "External command failed",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Input => "Check the source and version blocks of the resource definition",
            Self::Network => "Check that source.url is reachable from the worker",
            Self::NotFound => "Check source.path and that the required tools are on PATH",
            Self::Permission => "Check permissions on the destination directory",
            Self::Format => "Check that source.url points to a fly .tgz or .zip archive",
            Self::Command => "Inspect the command output above for details",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while installing or querying fly.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request document could not be decoded.
    #[error("invalid resource request: {0}")]
    InvalidDescriptor(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {message}")]
    Http {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// Failed to download the archive.
    #[error("download failed for {url}: {message}")]
    DownloadFailed {
        /// Source URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// Failed to unpack the archive.
    #[error("extraction failed for {archive}: {message}")]
    ExtractionFailed {
        /// Archive being unpacked.
        archive: PathBuf,
        /// Error message.
        message: String,
    },

    /// IO error during file operations.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path involved in the error.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// An external command exited with a failure status.
    #[error("command `{command}` failed{}: {stderr}", exit_suffix(.status))]
    CommandFailed {
        /// Rendered command line.
        command: String,
        /// Exit code, if the process was not killed by a signal.
        status: Option<i32>,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// An external utility is not installed.
    #[error("required tool not found on PATH: {0}")]
    ToolMissing(String),

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an IO error with path context.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an HTTP error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Http {
            message: message.into(),
            status,
        }
    }

    /// Create an extraction error for an archive.
    pub fn extraction(archive: impl Into<PathBuf>, message: impl fmt::Display) -> Self {
        Self::ExtractionFailed {
            archive: archive.into(),
            message: message.to_string(),
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidDescriptor(_) => ErrorCategory::Input,
            Error::Http { .. } | Error::DownloadFailed { .. } => ErrorCategory::Network,
            Error::ExtractionFailed { .. } => ErrorCategory::Format,
            Error::Io { source, .. } => match source.kind() {
                io::ErrorKind::PermissionDenied => ErrorCategory::Permission,
                io::ErrorKind::NotFound => ErrorCategory::NotFound,
                _ => ErrorCategory::Other,
            },
            Error::CommandFailed { .. } => ErrorCategory::Command,
            Error::ToolMissing(_) => ErrorCategory::NotFound,
            Error::Other(_) => ErrorCategory::Other,
        }
    }
}

fn exit_suffix(status: &Option<i32>) -> String {
    status
        .map(|code| format!(" with exit code {code}"))
        .unwrap_or_default()
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Http {
                message: format!("HTTP {code}"),
                status: Some(code),
            },
            other => Self::Http {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidDescriptor(err.to_string())
    }
}
