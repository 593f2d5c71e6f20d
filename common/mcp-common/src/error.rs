//! Error helpers for MCP servers
//!
//! Tool failures are reported with one of three codes: `invalid_params`
//! when the caller can fix the request, `resource_not_found` for unknown
//! resource URIs, and `internal_error` for everything else.

use rmcp::ErrorData as McpError;
use serde_json::json;

/// Type alias for MCP tool results
pub type McpResult<T> = Result<T, McpError>;

/// Conversion of a foreign error into an MCP error
///
/// The default mapping is `internal_error`; implement it for a server's
/// own error type to pick the code per variant.
pub trait IntoMcpError {
    fn into_mcp_error(self) -> McpError;
}

impl IntoMcpError for serde_json::Error {
    fn into_mcp_error(self) -> McpError {
        internal_error(format!("JSON error: {self}"))
    }
}

impl IntoMcpError for anyhow::Error {
    fn into_mcp_error(self) -> McpError {
        internal_error(format!("{self:#}"))
    }
}

/// `.to_mcp_err()` on any `Result` whose error implements [`IntoMcpError`]
///
/// ```rust,ignore
/// let text = serde_json::to_string(&value).to_mcp_err()?;
/// ```
pub trait ResultExt<T> {
    fn to_mcp_err(self) -> McpResult<T>;
}

impl<T, E: IntoMcpError> ResultExt<T> for Result<T, E> {
    fn to_mcp_err(self) -> McpResult<T> {
        self.map_err(IntoMcpError::into_mcp_error)
    }
}

pub fn internal_error(message: impl Into<String>) -> McpError {
    McpError::internal_error(message.into(), None)
}

/// The request itself is wrong: bad repository, unknown issue, bad size
pub fn invalid_params(message: impl Into<String>) -> McpError {
    McpError::invalid_params(message.into(), None)
}

/// No resource behind `uri`; the URI is echoed back as error data
pub fn resource_not_found(uri: &str) -> McpError {
    McpError::resource_not_found(format!("unknown resource: {uri}"), Some(json!({ "uri": uri })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;

    #[test]
    fn test_invalid_params_code() {
        let err = invalid_params("size must be one of XS, S, M, L, XL");
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("XS, S, M, L, XL"));
    }

    #[test]
    fn test_resource_not_found_echoes_uri() {
        let err = resource_not_found("github://nope");
        assert_eq!(err.code, ErrorCode::RESOURCE_NOT_FOUND);
        assert_eq!(err.data, Some(json!({"uri": "github://nope"})));
    }

    #[test]
    fn test_json_error_is_internal() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{");
        let err = parse.to_mcp_err().unwrap_err();
        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
        assert!(err.message.starts_with("JSON error"));
    }

    #[test]
    fn test_anyhow_keeps_context() {
        let err = anyhow::anyhow!("root cause").context("loading config");
        let mcp = err.into_mcp_error();
        assert!(mcp.message.contains("loading config"));
        assert!(mcp.message.contains("root cause"));
    }
}
