//! Error types for the submission workflow

use thiserror::Error;

/// Local input problems. These never reach the network.
///
/// Messages are written for the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Enter a repository URL to scan")]
    EmptyUrl,

    #[error("That does not look like a valid URL")]
    MalformedUrl,

    #[error("Only http and https repository URLs are supported")]
    UnsupportedScheme,

    #[error("Choose a .zip file to upload")]
    MissingArchive,

    #[error("The selected file is empty")]
    EmptyArchive,

    #[error("The file is {size} bytes; the limit is {limit} bytes")]
    ArchiveTooLarge { size: u64, limit: u64 },

    #[error("Only {allowed} files can be uploaded (got {file_name})")]
    UnsupportedExtension { file_name: String, allowed: String },

    #[error("The value does not match the selected input mode")]
    ModeMismatch,
}

/// Submission errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// Rejected locally before any request was made
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The request could not be sent or no response arrived
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service answered with a non-2xx status
    #[error("Service error {status}: {body}")]
    Service { status: u16, body: String },

    /// The service answered 2xx with a body we could not read
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Client could not be configured
    #[error("Configuration error: {0}")]
    Config(String),

    /// A submission is already validating or in flight
    #[error("A submission is already in progress")]
    Busy,

    /// The controller was disposed
    #[error("Controller disposed")]
    Disposed,

    /// The response was dropped: it arrived after disposal, or the submit
    /// future was dropped before it arrived
    #[error("Submission abandoned before the response arrived")]
    Abandoned,
}

impl SubmitError {
    /// Text safe to show the user. Raw transport and service details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Validation(e) => e.to_string(),
            SubmitError::Transport(_) => {
                "Could not reach the scan service. Check your connection and try again.".to_string()
            }
            SubmitError::Service { status, .. } if (400..500).contains(status) => format!(
                "The scan service rejected the submission (HTTP {}).",
                status
            ),
            SubmitError::Service { status, .. } => format!(
                "The scan service failed to start the scan (HTTP {}). Try again later.",
                status
            ),
            SubmitError::InvalidResponse(_) => {
                "The scan service returned an unexpected response.".to_string()
            }
            SubmitError::Config(_) => "The scanner client is misconfigured.".to_string(),
            SubmitError::Busy => "A scan is already being submitted.".to_string(),
            SubmitError::Disposed | SubmitError::Abandoned => {
                "The submission was cancelled.".to_string()
            }
        }
    }

    /// Whether the error was produced without contacting the service.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            SubmitError::Validation(_) | SubmitError::Busy | SubmitError::Disposed
        )
    }
}

/// Result type for submission operations
pub type Result<T> = std::result::Result<T, SubmitError>;
