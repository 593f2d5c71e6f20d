//! LLM abstraction layer

mod claude;
mod conversation;
mod error;
pub mod prompts;
pub mod schema;
mod tasks;

pub use claude::{extract_payload, ClaudeCli};
pub use conversation::{Conversation, Exchange};
pub use error::{AiError, AiResult};
pub use tasks::{
    breakdown, closing_comment, draft, estimate, find_similar, refine, DraftIssue, DraftReply, Estimate,
    RefineReply, Relationship, SimilarIssue, Subtask,
};

use async_trait::async_trait;
use serde_json::Value;

/// Trait for LLM backends
#[async_trait]
pub trait AiBackend: Send + Sync {
    /// Send `prompt` and get back a JSON object shaped by `schema`
    async fn structured(&self, prompt: &str, schema: &Value) -> AiResult<Value>;

    /// Get the model name
    fn model(&self) -> &str;
}
