//! tshirts MCP Library
//!
//! ```rust,ignore
//! use tshirts_mcp::TshirtsMcpServer;
//!
//! let server = TshirtsMcpServer::new(host, ai, None);
//! ```

pub mod error;
pub mod params;
pub mod resources;
pub mod server;

pub use server::TshirtsMcpServer;

pub use params::*;
