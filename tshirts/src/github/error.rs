//! Error types for GitHub API calls
//!
//! Each failure kind the caller may want to react to differently gets its
//! own variant; everything else is carried as an HTTP status plus message.

use thiserror::Error;

/// Errors that can occur when talking to the GitHub REST API
#[derive(Error, Debug)]
pub enum GitHubError {
    /// No token was configured
    #[error("GITHUB_TOKEN environment variable is required")]
    MissingToken,

    /// Token is invalid or expired (401)
    #[error("GitHub rejected the token (401 Unauthorized)")]
    Unauthorized,

    /// Token lacks permission for the resource (403)
    #[error("GitHub denied access (403 Forbidden): {0}")]
    Forbidden(String),

    /// Primary or secondary rate limit hit
    #[error("GitHub rate limit exceeded: {0}")]
    RateLimited(String),

    /// Repository, issue or endpoint does not exist (404)
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success status
    #[error("GitHub API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// `message` field from GitHub's error body, or the raw body
        message: String,
    },

    /// Connection, TLS or timeout failure
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A URL could not be built from the configured base
    #[error("invalid GitHub API URL: {0}")]
    InvalidUrl(String),
}

/// Result type alias for GitHub operations
pub type GitHubResult<T> = Result<T, GitHubError>;
