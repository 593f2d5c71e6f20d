//! Error types for LLM invocations

use thiserror::Error;

/// Errors that make an AI call fail as a whole
///
/// No partial output is ever accepted: any of these aborts the task that
/// made the call.
#[derive(Error, Debug)]
pub enum AiError {
    /// The configured command is not on PATH
    #[error("'{0}' CLI not found - install it with: npm install -g @anthropic-ai/claude-code")]
    NotFound(String),

    /// Failed to spawn or talk to the process
    #[error("failed to run AI process: {0}")]
    Io(#[from] std::io::Error),

    /// The process exited non-zero
    #[error("AI process failed (exit code {code}): {stderr}")]
    CommandFailed {
        /// Exit code, -1 when killed by a signal
        code: i32,
        /// Captured standard error
        stderr: String,
    },

    /// The process did not finish in time
    #[error("AI process timed out after {0}s")]
    Timeout(u64),

    /// Output was not JSON, reported an error, or did not match the schema
    #[error("malformed AI response: {0}")]
    Malformed(String),
}

/// Result type alias for AI operations
pub type AiResult<T> = Result<T, AiError>;
