//! tshirts MCP Server
//!
//! Exposes issue sizing, breakdown, drafting, refinement and closing as MCP
//! tools, and open issues as read-only resources.
//!
//! # Environment
//!
//! - `GITHUB_TOKEN`: required by every tool and resource (checked per call)
//! - `TSHIRTS_REPO`: default repository advertised in the resource list
//! - `GITHUB_API_URL`, `TSHIRTS_AI_COMMAND`, `TSHIRTS_MODEL`: as for the CLI
//! - `RUST_LOG`, `LOG_FORMAT=json`: logging on stderr
//!
//! Configure in `.mcp.json`:
//! ```json
//! {
//!   "mcpServers": {
//!     "tshirts": { "command": "tshirts-mcp" }
//!   }
//! }
//! ```

use tshirts_mcp::TshirtsMcpServer;

mcp_common::serve_stdio!("tshirts_mcp", TshirtsMcpServer::from_env()?);
