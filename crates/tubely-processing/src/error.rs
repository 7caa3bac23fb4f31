use std::io;
use std::time::Duration;
use tubely_core::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("{tool} failed: {diagnostic}")]
    ToolFailed { tool: String, diagnostic: String },

    #[error("{tool} timed out after {}s", timeout.as_secs())]
    TimedOut { tool: String, timeout: Duration },

    #[error("Failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} produced malformed output: {reason}")]
    MalformedOutput { tool: String, reason: String },

    #[error("No video stream found")]
    NoVideoStream,

    #[error("File exceeds maximum size of {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("Failed to read upload body: {0}")]
    BodyRead(String),

    #[error("Invalid tool path: {0}")]
    InvalidToolPath(String),

    #[error("Staging IO error: {0}")]
    Io(#[from] io::Error),
}

pub type ProcessingResult<T> = Result<T, ProcessingError>;

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::ToolFailed { tool, diagnostic } => {
                AppError::ExternalTool { tool, diagnostic }
            }
            ProcessingError::TimedOut { tool, timeout } => {
                AppError::ExternalToolTimedOut { tool, timeout }
            }
            ProcessingError::Spawn { tool, source } => AppError::ExternalTool {
                tool,
                diagnostic: source.to_string(),
            },
            ProcessingError::MalformedOutput { tool, reason } => AppError::ExternalTool {
                tool,
                diagnostic: reason,
            },
            ProcessingError::NoVideoStream => {
                AppError::InvalidInput("No video stream found".to_string())
            }
            ProcessingError::PayloadTooLarge { limit } => AppError::PayloadTooLarge(format!(
                "File exceeds maximum size of {} bytes",
                limit
            )),
            ProcessingError::BodyRead(msg) => AppError::InvalidInput(msg),
            ProcessingError::InvalidToolPath(path) => {
                AppError::Internal(format!("Invalid tool path: {}", path))
            }
            ProcessingError::Io(e) => AppError::Io(e),
        }
    }
}
