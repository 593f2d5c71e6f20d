//! Parameter types for tshirts MCP tools
//!
//! Split by effect: `analysis` tools only read GitHub and ask the model,
//! `actions` tools write to GitHub.

mod actions;
mod analysis;

pub use actions::*;
pub use analysis::*;
