//! Mapping of library errors onto MCP error codes

use mcp_common::{internal_error, invalid_params, McpError};
use tshirts::Error;

/// `invalid_params` for what the caller can fix (bad repository or size,
/// missing token, unknown issue, an answer the model got wrong), otherwise
/// `internal_error`
pub fn tool_error(e: Error) -> McpError {
    let caller_fixable = e.is_config() || e.is_not_found() || matches!(e, Error::Validation(_));
    if caller_fixable {
        invalid_params(e.to_string())
    } else {
        internal_error(e.to_string())
    }
}

/// Same as [`tool_error`] for errors still at the GitHub layer
pub fn github_error(e: tshirts::github::GitHubError) -> McpError {
    tool_error(e.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;
    use tshirts::ai::AiError;
    use tshirts::github::GitHubError;

    #[test]
    fn test_caller_errors_are_invalid_params() {
        for e in [
            Error::Config("bad repo".into()),
            Error::Validation("size XXL".into()),
            Error::GitHub(GitHubError::NotFound("issue 9".into())),
            Error::GitHub(GitHubError::MissingToken),
        ] {
            assert_eq!(tool_error(e).code, ErrorCode::INVALID_PARAMS);
        }
    }

    #[test]
    fn test_failures_are_internal() {
        let err = tool_error(Error::Ai(AiError::Timeout(300)));
        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
        let err = github_error(GitHubError::Api {
            status: 502,
            message: "bad gateway".into(),
        });
        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
        assert!(err.message.contains("bad gateway"));
    }
}
