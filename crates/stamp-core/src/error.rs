use std::path::PathBuf;
use std::time::Duration;

use placement_core::PlacementError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("{program} timed out after {}s", .timeout.as_secs_f64())]
    TimedOut { program: String, timeout: Duration },

    #[error("Failed to start {program}: {message}")]
    Spawn { program: String, message: String },

    #[error("I/O error while running {program}: {message}")]
    Io { program: String, message: String },

    #[error("Cannot start async runtime: {0}")]
    Runtime(String),
}

#[derive(Error, Debug)]
pub enum SignError {
    #[error("{what} file not found: {}", .path.display())]
    FileNotFound { what: &'static str, path: PathBuf },

    #[error("Certificate file is empty: {}", .0.display())]
    EmptyCertificateFile(PathBuf),

    #[error("Cannot load certificate: {0}")]
    CertificateLoadFailure(String),

    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error("Cannot open PDF: {0}")]
    DocumentOpenFailure(String),

    #[error("{program} timed out after {}s", .timeout.as_secs_f64())]
    ExternalToolTimeout { program: String, timeout: Duration },

    #[error("{program} failed (exit status {status:?}): {stderr}")]
    ExternalToolFailure {
        program: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Unexpected failure: {0}")]
    UnexpectedFailure(String),
}

impl From<ToolError> for SignError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::TimedOut { program, timeout } => {
                SignError::ExternalToolTimeout { program, timeout }
            }
            ToolError::Spawn { program, message } | ToolError::Io { program, message } => {
                SignError::ExternalToolFailure {
                    program,
                    status: None,
                    stderr: message,
                }
            }
            ToolError::Runtime(message) => SignError::UnexpectedFailure(message),
        }
    }
}

impl SignError {
    /// Stable name of the error kind, for logs and machine consumers
    pub fn kind(&self) -> &'static str {
        match self {
            SignError::FileNotFound { .. } => "FileNotFound",
            SignError::EmptyCertificateFile(_) => "EmptyCertificateFile",
            SignError::CertificateLoadFailure(_) => "CertificateLoadFailure",
            SignError::Placement(PlacementError::InvalidPageIndex(_)) => "InvalidPageIndex",
            SignError::Placement(PlacementError::PageOutOfRange { .. }) => "PageOutOfRange",
            SignError::Placement(PlacementError::InvalidCoordinate { .. }) => "InvalidCoordinate",
            SignError::DocumentOpenFailure(_) => "DocumentOpenFailure",
            SignError::ExternalToolTimeout { .. } => "ExternalToolTimeout",
            SignError::ExternalToolFailure { .. } => "ExternalToolFailure",
            SignError::UnexpectedFailure(_) => "UnexpectedFailure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_maps_to_timeout_kind() {
        let err: SignError = ToolError::TimedOut {
            program: "pyhanko".to_string(),
            timeout: Duration::from_secs(30),
        }
        .into();
        assert_eq!(err.kind(), "ExternalToolTimeout");
        assert_eq!(err.to_string(), "pyhanko timed out after 30s");
    }

    #[test]
    fn test_spawn_failure_is_tool_failure() {
        let err: SignError = ToolError::Spawn {
            program: "openssl".to_string(),
            message: "No such file or directory".to_string(),
        }
        .into();
        assert_eq!(err.kind(), "ExternalToolFailure");
    }

    #[test]
    fn test_placement_kinds() {
        let err = SignError::from(PlacementError::PageOutOfRange {
            requested: 9,
            page_count: 5,
            max_accepted: 6,
        });
        assert_eq!(err.kind(), "PageOutOfRange");
        assert!(err.to_string().contains("Page 9 out of range"));
    }
}
