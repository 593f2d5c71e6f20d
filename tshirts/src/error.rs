//! Crate-level error type

use thiserror::Error;

use crate::ai::AiError;
use crate::github::GitHubError;

/// Every failure a command can surface
#[derive(Error, Debug)]
pub enum Error {
    /// Repository unresolved, bad flag value, missing credentials
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error("AI invocation failed: {0}")]
    Ai(#[from] AiError),

    /// The AI answered, but the answer breaks the task's rules
    #[error("invalid AI response: {0}")]
    Validation(String),

    /// The user declined to continue or stdin closed mid-prompt
    #[error("aborted: {0}")]
    Aborted(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for errors that mean "fix your setup" rather than "try again"
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::GitHub(GitHubError::MissingToken)
                | Error::GitHub(GitHubError::Unauthorized)
        )
    }

    /// Errors that stop a batch at once instead of failing one item
    pub fn is_fatal(&self) -> bool {
        self.is_config()
            || matches!(
                self,
                Error::Ai(AiError::NotFound(_)) | Error::GitHub(GitHubError::Forbidden(_))
            )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::GitHub(GitHubError::NotFound(_)))
    }
}

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
