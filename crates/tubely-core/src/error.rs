//! Error types module
//!
//! All request-terminal failures are unified under [`AppError`]. Each variant belongs to
//! one class of the upload pipeline's taxonomy (validation, auth, io, external tool,
//! storage, persistence) and describes its own HTTP presentation through [`ErrorMetadata`].
//! Nothing is retried internally; the underlying cause is kept for logs only.

use std::io;
use std::time::Duration;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for failures caused by client input reaching an external tool
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "STORAGE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[source] io::Error),

    #[error("{tool} failed: {diagnostic}")]
    ExternalTool { tool: String, diagnostic: String },

    #[error("{tool} timed out after {}s", timeout.as_secs())]
    ExternalToolTimedOut { tool: String, timeout: Duration },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Storage {operation} timed out after {}s", timeout.as_secs())]
    StorageTimedOut {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<uuid::Error> for AppError {
    fn from(_: uuid::Error) -> Self {
        AppError::InvalidInput("Invalid ID".to_string())
    }
}

/// Static metadata for each variant: (http_status, error_code, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, LogLevel::Debug),
        AppError::UnsupportedMediaType(_) => {
            (400, "UNSUPPORTED_MEDIA_TYPE", false, LogLevel::Debug)
        }
        AppError::PayloadTooLarge(_) => (400, "PAYLOAD_TOO_LARGE", false, LogLevel::Debug),
        AppError::Unauthorized(_) => (401, "UNAUTHORIZED", false, LogLevel::Debug),
        AppError::Forbidden(_) => (401, "FORBIDDEN", false, LogLevel::Debug),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, LogLevel::Debug),
        AppError::Io(_) => (400, "IO_ERROR", true, LogLevel::Error),
        AppError::ExternalTool { .. } => (400, "EXTERNAL_TOOL_ERROR", true, LogLevel::Warn),
        AppError::ExternalToolTimedOut { .. } => {
            (400, "EXTERNAL_TOOL_TIMEOUT", true, LogLevel::Warn)
        }
        AppError::Storage(_) => (400, "STORAGE_ERROR", true, LogLevel::Error),
        AppError::StorageTimedOut { .. } => (400, "STORAGE_TIMEOUT", true, LogLevel::Error),
        AppError::Persistence(_) => (400, "PERSISTENCE_ERROR", true, LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for logs
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "ValidationError",
            AppError::UnsupportedMediaType(_) => "ValidationError",
            AppError::PayloadTooLarge(_) => "ValidationError",
            AppError::Unauthorized(_) => "AuthError",
            AppError::Forbidden(_) => "AuthError",
            AppError::NotFound(_) => "NotFound",
            AppError::Io(_) => "IOError",
            AppError::ExternalTool { .. } => "ExternalToolError",
            AppError::ExternalToolTimedOut { .. } => "ExternalToolError",
            AppError::Storage(_) => "StorageError",
            AppError::StorageTimedOut { .. } => "StorageError",
            AppError::Persistence(_) => "PersistenceError",
            AppError::Internal(_) => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::UnsupportedMediaType(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::Forbidden(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Io(_) => "Unable to stage uploaded file".to_string(),
            AppError::ExternalTool { tool, .. } => format!("Unable to process video ({})", tool),
            AppError::ExternalToolTimedOut { tool, .. } => {
                format!("Video processing timed out ({})", tool)
            }
            AppError::Storage(_) => "Unable to access object storage".to_string(),
            AppError::StorageTimedOut { .. } => "Object storage timed out".to_string(),
            AppError::Persistence(_) => "Unable to save video data".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_and_processing_failures_map_to_400() {
        let errors = [
            AppError::InvalidInput("bad".into()),
            AppError::UnsupportedMediaType("text/plain".into()),
            AppError::PayloadTooLarge("too big".into()),
            AppError::Io(io::Error::other("disk")),
            AppError::ExternalTool {
                tool: "ffprobe".into(),
                diagnostic: "moov atom not found".into(),
            },
            AppError::ExternalToolTimedOut {
                tool: "ffmpeg".into(),
                timeout: Duration::from_secs(5),
            },
            AppError::Storage("denied".into()),
            AppError::StorageTimedOut {
                operation: "put",
                timeout: Duration::from_secs(5),
            },
            AppError::Persistence("db down".into()),
        ];
        for err in errors {
            assert_eq!(err.http_status_code(), 400, "{}", err);
        }
    }

    #[test]
    fn auth_failures_map_to_401() {
        assert_eq!(AppError::Unauthorized("x".into()).http_status_code(), 401);
        assert_eq!(AppError::Forbidden("x".into()).http_status_code(), 401);
    }

    #[test]
    fn sensitive_errors_hide_cause_from_client() {
        let err = AppError::ExternalTool {
            tool: "ffprobe".into(),
            diagnostic: "/tmp/tubely-upload-abc/upload.mp4: Invalid data".into(),
        };
        assert!(err.is_sensitive());
        assert!(!err.client_message().contains("/tmp"));
        assert!(err.detailed_message().contains("Invalid data"));
    }

    #[test]
    fn timeouts_are_distinguishable() {
        let err = AppError::ExternalToolTimedOut {
            tool: "ffmpeg".into(),
            timeout: Duration::from_secs(300),
        };
        assert_eq!(err.error_code(), "EXTERNAL_TOOL_TIMEOUT");
        assert_eq!(err.to_string(), "ffmpeg timed out after 300s");
    }
}
