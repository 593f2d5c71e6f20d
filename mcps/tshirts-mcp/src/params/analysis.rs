//! Parameters for the read-only AI tools

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct IssueRefParams {
    #[schemars(description = "Repository in OWNER/REPO format")]
    pub repo: String,
    #[schemars(description = "Issue number")]
    pub issue_number: u64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DraftIssueParams {
    #[schemars(description = "Natural language description of what to build or fix")]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RefineIssueParams {
    #[schemars(description = "Repository in OWNER/REPO format")]
    pub repo: String,
    #[schemars(description = "Issue to refine")]
    pub issue_number: u64,
    #[schemars(description = "Additional context, or answers to a previous clarifying question")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct FindSimilarParams {
    #[schemars(description = "Repository in OWNER/REPO format")]
    pub repo: String,
    #[schemars(description = "Proposed issue title")]
    pub title: String,
    #[schemars(description = "Proposed issue description")]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ClosingCommentParams {
    #[schemars(description = "Repository in OWNER/REPO format")]
    pub repo: String,
    #[schemars(description = "Issue to generate a closing comment for")]
    pub issue_number: u64,
    #[schemars(description = "Reason for closing, used when the issue has no sub-issues")]
    pub reason: Option<String>,
}
