use thiserror::Error;

use crate::export::ExportError;
use crate::snapshot::SnapshotError;
use crate::validation::ValidationErrors;

/// Application-level error type.
/// Every variant is recoverable: the session reports it and keeps running.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Unknown field path: {0}")]
    InvalidPath(String),

    #[error("Index {index} is out of range for {list} (length {len})")]
    IndexOutOfRange {
        list: String,
        index: usize,
        len: usize,
    },

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Short machine-readable code, printed alongside the message in the session.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidPath(_) => "INVALID_PATH",
            AppError::IndexOutOfRange { .. } => "INDEX_OUT_OF_RANGE",
            AppError::Snapshot(_) => "SNAPSHOT_ERROR",
            AppError::Export(_) => "EXPORT_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The message shown to the user. Export and internal failures are reported
    /// generically; the detail goes to the log.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Export(e) => {
                tracing::error!("Export error: {e}");
                "Failed to generate PDF. Please try again.".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_errors_are_reported_generically() {
        let err = AppError::Export(ExportError::Capture("font missing".to_string()));
        assert_eq!(err.code(), "EXPORT_ERROR");
        assert_eq!(
            err.user_message(),
            "Failed to generate PDF. Please try again."
        );
    }

    #[test]
    fn test_path_errors_keep_their_detail() {
        let err = AppError::InvalidPath("personalInfo.age".to_string());
        assert_eq!(err.code(), "INVALID_PATH");
        assert!(err.user_message().contains("personalInfo.age"));
    }

    #[test]
    fn test_index_out_of_range_message() {
        let err = AppError::IndexOutOfRange {
            list: "skills".to_string(),
            index: 4,
            len: 2,
        };
        assert_eq!(
            err.to_string(),
            "Index 4 is out of range for skills (length 2)"
        );
    }
}
