//! T-shirt sizing, breakdown and drafting of GitHub issues with an LLM

pub mod ai;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod github;
pub mod repo;
pub mod size;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{Error, Result};
pub use repo::RepoRef;
pub use size::Size;
