//! Parameters for the tools that write to GitHub

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApplySizeLabelParams {
    #[schemars(description = "Repository in OWNER/REPO format")]
    pub repo: String,
    #[schemars(description = "Issue number to label")]
    pub issue_number: u64,
    #[schemars(description = "T-shirt size: XS, S, M, L or XL")]
    pub size: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateIssueParams {
    #[schemars(description = "Repository in OWNER/REPO format")]
    pub repo: String,
    #[schemars(description = "Issue title")]
    pub title: String,
    #[schemars(description = "Issue body in markdown")]
    pub body: String,
    #[schemars(description = "Optional t-shirt size (XS, S, M, L, XL) added as a size label")]
    pub size: Option<String>,
    #[schemars(description = "Additional labels to apply")]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SubtaskParams {
    #[schemars(description = "Subtask title")]
    pub title: String,
    #[schemars(description = "Subtask description in markdown")]
    #[serde(default, alias = "body")]
    pub description: Option<String>,
    #[schemars(description = "Optional t-shirt size (XS, S, M, L, XL)")]
    pub size: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateSubtasksParams {
    #[schemars(description = "Repository in OWNER/REPO format")]
    pub repo: String,
    #[schemars(description = "Parent issue number the subtasks are linked under")]
    pub parent_issue: u64,
    #[schemars(description = "Subtasks to create, in order")]
    pub subtasks: Vec<SubtaskParams>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateIssueBodyParams {
    #[schemars(description = "Repository in OWNER/REPO format")]
    pub repo: String,
    #[schemars(description = "Issue to update")]
    pub issue_number: u64,
    #[schemars(description = "New issue body in markdown")]
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CloseIssueParams {
    #[schemars(description = "Repository in OWNER/REPO format")]
    pub repo: String,
    #[schemars(description = "Issue to close")]
    pub issue_number: u64,
    #[schemars(description = "Optional closing comment posted before closing")]
    pub comment: Option<String>,
}
