//! MCP Common - startup and response helpers for stdio MCP servers
//!
//! - **Initialization**: [`init_tracing`] and the `serve_stdio!` macro
//! - **Results**: [`json_success`] for `CallToolResult`s
//! - **Errors**: constructors for the MCP error codes a server reports
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_common::serve_stdio;
//!
//! serve_stdio!("my_mcp", MyServer::from_env()?);
//! ```

pub mod error;
pub mod init;
pub mod result;

pub use error::{internal_error, invalid_params, resource_not_found, IntoMcpError, McpResult, ResultExt};
pub use init::init_tracing;
pub use result::json_success;

pub use rmcp::{model::CallToolResult, ErrorData as McpError};
