//! Typed AI tasks
//!
//! Each task builds its prompt, makes exactly one [`AiBackend`] call and
//! decodes the answer into a result type. Shape mismatches are
//! [`AiError::Malformed`]; answers that decode but break the task's rules
//! (a size outside the enumeration, an empty subtask list) are
//! [`Error::Validation`].

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use super::conversation::Conversation;
use super::error::{AiError, AiResult};
use super::{prompts, schema, AiBackend};
use crate::error::{Error, Result};
use crate::github::Issue;
use crate::size::Size;

fn decode<T: DeserializeOwned>(value: Value) -> AiResult<T> {
    serde_json::from_value(value).map_err(|e| AiError::Malformed(e.to_string()))
}

fn parse_size(raw: &str) -> Result<Size> {
    raw.parse().map_err(|e: crate::size::InvalidSize| Error::Validation(e.to_string()))
}

fn parse_optional_size(raw: Option<String>) -> Result<Option<Size>> {
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| parse_size(&s))
        .transpose()
}

fn non_empty(text: String, what: &str) -> Result<String> {
    if text.trim().is_empty() {
        Err(Error::Validation(format!("{what} is empty")))
    } else {
        Ok(text)
    }
}

// ============================================================================
// Estimate
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub size: Size,
    pub rationale: String,
}

#[derive(Deserialize)]
struct RawEstimate {
    size: String,
    #[serde(default)]
    rationale: String,
}

#[instrument(skip_all, fields(issue = issue.number))]
pub async fn estimate(ai: &dyn AiBackend, issue: &Issue) -> Result<Estimate> {
    let value = ai.structured(&prompts::estimate(issue), &schema::estimate()).await?;
    let raw: RawEstimate = decode(value)?;
    let size = parse_size(&raw.size)?;
    debug!(%size, "estimated");
    Ok(Estimate {
        size,
        rationale: raw.rationale,
    })
}

// ============================================================================
// Breakdown
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub title: String,
    #[serde(default, alias = "description")]
    pub body: String,
    #[serde(default)]
    pub size: Option<Size>,
}

impl Subtask {
    /// Body of the issue created for this subtask under `parent`
    pub fn issue_body(&self, parent: u64) -> String {
        if self.body.trim().is_empty() {
            format!("Parent issue: #{parent}")
        } else {
            format!("Parent issue: #{parent}\n\n{}", self.body)
        }
    }
}

#[derive(Deserialize)]
struct RawBreakdown {
    #[serde(alias = "tasks")]
    subtasks: Vec<RawSubtask>,
}

#[derive(Deserialize)]
struct RawSubtask {
    title: String,
    #[serde(default, alias = "description")]
    body: String,
    #[serde(default)]
    size: Option<String>,
}

/// Subtasks in the order the model returned them
#[instrument(skip_all, fields(issue = issue.number))]
pub async fn breakdown(ai: &dyn AiBackend, issue: &Issue) -> Result<Vec<Subtask>> {
    let value = ai.structured(&prompts::breakdown(issue), &schema::breakdown()).await?;
    let raw: RawBreakdown = decode(value)?;
    if raw.subtasks.is_empty() {
        return Err(Error::Validation("no subtasks returned".to_string()));
    }
    raw.subtasks
        .into_iter()
        .map(|t| -> Result<Subtask> {
            Ok(Subtask {
                title: non_empty(t.title, "subtask title")?,
                body: t.body,
                size: parse_optional_size(t.size)?,
            })
        })
        .collect()
}

// ============================================================================
// Draft new issues
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftIssue {
    pub title: String,
    pub description: String,
    pub size: Option<Size>,
    pub tasks: Vec<String>,
}

impl DraftIssue {
    /// Issue body: the description followed by a `## Tasks` checklist
    pub fn issue_body(&self) -> String {
        if self.tasks.is_empty() {
            return self.description.clone();
        }
        let checklist = self
            .tasks
            .iter()
            .map(|t| format!("- [ ] {t}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!("{}\n\n## Tasks\n{}", self.description, checklist)
    }
}

/// The model's answer to one drafting turn
#[derive(Debug, Clone, PartialEq)]
pub enum DraftReply {
    /// More information needed
    Question(String),
    /// One draft per distinct feature, never empty
    Ready(Vec<DraftIssue>),
}

#[derive(Deserialize)]
struct RawDraftReply {
    ready: bool,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    issues: Vec<RawDraft>,
}

#[derive(Deserialize)]
struct RawDraft {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    tasks: Vec<String>,
}

#[instrument(skip_all, fields(turns = conversation.exchanges().len()))]
pub async fn draft(ai: &dyn AiBackend, conversation: &Conversation) -> Result<DraftReply> {
    let value = ai.structured(&prompts::draft(conversation), &schema::draft()).await?;
    let raw: RawDraftReply = decode(value)?;

    if !raw.ready {
        let question = raw
            .question
            .ok_or_else(|| Error::Validation("not ready but no question asked".to_string()))?;
        return Ok(DraftReply::Question(non_empty(question, "question")?));
    }
    if raw.issues.is_empty() {
        return Err(Error::Validation("ready but no issues drafted".to_string()));
    }

    let drafts = raw
        .issues
        .into_iter()
        .map(|d| -> Result<DraftIssue> {
            Ok(DraftIssue {
                title: non_empty(d.title, "draft title")?,
                description: d.description,
                size: parse_optional_size(d.size)?,
                tasks: d.tasks,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(DraftReply::Ready(drafts))
}

// ============================================================================
// Refine an existing issue
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefineReply {
    /// More information needed before the issue can be rewritten
    Question { question: String, suggestions: Vec<String> },
    /// A replacement body
    Refined { description: String, suggestions: Vec<String> },
}

impl RefineReply {
    pub fn suggestions(&self) -> &[String] {
        match self {
            RefineReply::Question { suggestions, .. } | RefineReply::Refined { suggestions, .. } => suggestions,
        }
    }
}

#[derive(Deserialize)]
struct RawRefineReply {
    ready: bool,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    refined_description: Option<String>,
    #[serde(default)]
    suggestions: Vec<String>,
}

#[instrument(skip_all, fields(issue = issue.number, turns = conversation.exchanges().len()))]
pub async fn refine(ai: &dyn AiBackend, issue: &Issue, conversation: &Conversation) -> Result<RefineReply> {
    let value = ai
        .structured(&prompts::refine(issue, conversation), &schema::refine())
        .await?;
    let raw: RawRefineReply = decode(value)?;

    if raw.ready {
        let description = raw
            .refined_description
            .ok_or_else(|| Error::Validation("ready but no refined description".to_string()))?;
        Ok(RefineReply::Refined {
            description: non_empty(description, "refined description")?,
            suggestions: raw.suggestions,
        })
    } else {
        let question = raw
            .question
            .ok_or_else(|| Error::Validation("not ready but no question asked".to_string()))?;
        Ok(RefineReply::Question {
            question: non_empty(question, "question")?,
            suggestions: raw.suggestions,
        })
    }
}

// ============================================================================
// Similar issues
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    Duplicate,
    Parent,
    Related,
    Distinct,
}

impl Relationship {
    pub fn as_str(self) -> &'static str {
        match self {
            Relationship::Duplicate => "duplicate",
            Relationship::Parent => "parent",
            Relationship::Related => "related",
            Relationship::Distinct => "distinct",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarIssue {
    pub issue_number: u64,
    pub title: String,
    pub relationship: Relationship,
    pub reasoning: String,
}

#[derive(Deserialize)]
struct RawSimilar {
    similar_issues: Vec<RawSimilarIssue>,
}

#[derive(Deserialize)]
struct RawSimilarIssue {
    issue_number: u64,
    relationship: Relationship,
    #[serde(default)]
    reasoning: String,
}

/// Existing issues that duplicate, contain or overlap a proposed one
///
/// Makes no AI call when there is nothing to compare against. Numbers the
/// model invents and `distinct` verdicts are dropped.
#[instrument(skip_all, fields(candidates = existing.len()))]
pub async fn find_similar(
    ai: &dyn AiBackend,
    title: &str,
    description: &str,
    existing: &[Issue],
) -> Result<Vec<SimilarIssue>> {
    let candidates = prompts::similarity_candidates(existing);
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let value = ai
        .structured(&prompts::similarity(title, description, existing), &schema::similar())
        .await?;
    let raw: RawSimilar = decode(value)?;

    let titles: HashMap<u64, &str> = candidates.iter().map(|i| (i.number, i.title.as_str())).collect();
    Ok(raw
        .similar_issues
        .into_iter()
        .filter(|s| s.relationship != Relationship::Distinct)
        .filter_map(|s| {
            let title = titles.get(&s.issue_number)?;
            Some(SimilarIssue {
                issue_number: s.issue_number,
                title: title.to_string(),
                relationship: s.relationship,
                reasoning: s.reasoning,
            })
        })
        .collect())
}

// ============================================================================
// Closing comment
// ============================================================================

#[derive(Deserialize)]
struct RawClosing {
    comment: String,
}

#[instrument(skip_all, fields(issue = issue.number))]
pub async fn closing_comment(
    ai: &dyn AiBackend,
    issue: &Issue,
    closed_sub_issues: &[Issue],
    reason: Option<&str>,
) -> Result<String> {
    let value = ai
        .structured(
            &prompts::closing_comment(issue, closed_sub_issues, reason),
            &schema::closing_comment(),
        )
        .await?;
    let raw: RawClosing = decode(value)?;
    non_empty(raw.comment, "closing comment")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::IssueState;
    use crate::testing::ScriptedBackend;
    use serde_json::json;

    fn issue(number: u64, title: &str, body: &str) -> Issue {
        Issue {
            number,
            id: number + 1000,
            title: title.to_string(),
            body: body.to_string(),
            labels: Vec::new(),
            state: IssueState::Open,
            url: String::new(),
        }
    }

    #[tokio::test]
    async fn test_estimate_valid_size() {
        let ai = ScriptedBackend::new().respond(json!({"size": "M", "rationale": "A few files"}));
        let est = estimate(&ai, &issue(42, "Dark mode", "Add dark mode toggle to settings"))
            .await
            .unwrap();
        assert_eq!(est.size, Size::M);
        assert_eq!(est.rationale, "A few files");
        assert_eq!(ai.calls(), 1);
        assert!(ai.prompts()[0].contains("Issue #42"));
    }

    #[tokio::test]
    async fn test_estimate_invalid_size_is_validation_error() {
        let ai = ScriptedBackend::new().respond(json!({"size": "XXL", "rationale": "huge"}));
        let err = estimate(&ai, &issue(1, "T", "B")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_estimate_wrong_shape_is_ai_error() {
        let ai = ScriptedBackend::new().respond(json!({"sizes": ["M"]}));
        let err = estimate(&ai, &issue(1, "T", "B")).await.unwrap_err();
        assert!(matches!(err, Error::Ai(AiError::Malformed(_))), "got {err:?}");
    }

    #[tokio::test]
    async fn test_breakdown_keeps_order_and_accepts_title_only() {
        let ai = ScriptedBackend::new().respond(json!({"subtasks": [
            {"title": "Add toggle UI"},
            {"title": "Persist preference", "body": "Store it", "size": "s"},
            {"title": "Apply theme on load"}
        ]}));
        let tasks = breakdown(&ai, &issue(42, "Dark mode", "")).await.unwrap();
        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Add toggle UI", "Persist preference", "Apply theme on load"]);
        assert_eq!(tasks[1].size, Some(Size::S));
        assert_eq!(tasks[0].size, None);
    }

    #[tokio::test]
    async fn test_breakdown_accepts_tasks_alias() {
        let ai = ScriptedBackend::new().respond(json!({"tasks": [
            {"title": "One", "description": "First", "size": "XS"}
        ]}));
        let tasks = breakdown(&ai, &issue(1, "T", "")).await.unwrap();
        assert_eq!(tasks[0].body, "First");
    }

    #[tokio::test]
    async fn test_breakdown_rejects_empty_and_bad_size() {
        let ai = ScriptedBackend::new()
            .respond(json!({"subtasks": []}))
            .respond(json!({"subtasks": [{"title": "A", "size": "huge"}]}));
        assert!(matches!(breakdown(&ai, &issue(1, "T", "")).await, Err(Error::Validation(_))));
        assert!(matches!(breakdown(&ai, &issue(1, "T", "")).await, Err(Error::Validation(_))));
    }

    #[test]
    fn test_subtask_issue_body_references_parent() {
        let task = Subtask {
            title: "A".into(),
            body: "Do it".into(),
            size: None,
        };
        assert_eq!(task.issue_body(42), "Parent issue: #42\n\nDo it");
    }

    #[tokio::test]
    async fn test_draft_question_then_ready() {
        let ai = ScriptedBackend::new()
            .respond(json!({"ready": false, "question": "Which screens?"}))
            .respond(json!({"ready": true, "issues": [
                {"title": "Dark mode", "description": "Toggle", "size": "M", "tasks": ["UI", "Persist"]}
            ]}));

        let conv = Conversation::starting_with("dark mode");
        let reply = draft(&ai, &conv).await.unwrap();
        assert_eq!(reply, DraftReply::Question("Which screens?".into()));

        let conv = conv.answer("Which screens?", "Settings");
        let DraftReply::Ready(drafts) = draft(&ai, &conv).await.unwrap() else {
            panic!("expected drafts");
        };
        assert_eq!(drafts[0].size, Some(Size::M));
        assert_eq!(drafts[0].issue_body(), "Toggle\n\n## Tasks\n- [ ] UI\n- [ ] Persist");
        assert!(ai.prompts()[1].contains("Assistant: Which screens?"));
    }

    #[tokio::test]
    async fn test_draft_ready_without_issues_is_invalid() {
        let ai = ScriptedBackend::new().respond(json!({"ready": true, "issues": []}));
        let err = draft(&ai, &Conversation::starting_with("x")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_refine_reply_variants() {
        let ai = ScriptedBackend::new()
            .respond(json!({"ready": false, "question": "What is done?", "suggestions": ["Add criteria"]}))
            .respond(json!({"ready": true, "refined_description": "Better", "suggestions": []}));
        let target = issue(5, "Vague", "fix it");

        let first = refine(&ai, &target, &Conversation::new()).await.unwrap();
        assert_eq!(first.suggestions(), ["Add criteria".to_string()]);
        assert!(matches!(first, RefineReply::Question { .. }));

        let second = refine(&ai, &target, &Conversation::new().answer("What is done?", "Login works"))
            .await
            .unwrap();
        assert_eq!(
            second,
            RefineReply::Refined {
                description: "Better".into(),
                suggestions: vec![]
            }
        );
    }

    #[tokio::test]
    async fn test_find_similar_without_candidates_skips_ai() {
        let ai = ScriptedBackend::new();
        let found = find_similar(&ai, "T", "D", &[]).await.unwrap();
        assert!(found.is_empty());
        assert_eq!(ai.calls(), 0);
    }

    #[tokio::test]
    async fn test_find_similar_filters_distinct_and_unknown() {
        let ai = ScriptedBackend::new().respond(json!({"similar_issues": [
            {"issue_number": 1, "relationship": "duplicate", "reasoning": "Same"},
            {"issue_number": 2, "relationship": "distinct", "reasoning": "No"},
            {"issue_number": 99, "relationship": "related", "reasoning": "Made up"}
        ]}));
        let existing = vec![issue(1, "Dark mode", ""), issue(2, "Billing", "")];
        let found = find_similar(&ai, "Night theme", "", &existing).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].issue_number, 1);
        assert_eq!(found[0].title, "Dark mode");
        assert_eq!(found[0].relationship, Relationship::Duplicate);
    }

    #[tokio::test]
    async fn test_closing_comment() {
        let ai = ScriptedBackend::new()
            .respond(json!({"comment": "Issue resolved."}))
            .respond(json!({"comment": "  "}));
        let target = issue(1, "T", "");
        assert_eq!(
            closing_comment(&ai, &target, &[], Some("Fixed")).await.unwrap(),
            "Issue resolved."
        );
        assert!(matches!(
            closing_comment(&ai, &target, &[], None).await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let ai = ScriptedBackend::new().fail(AiError::Timeout(300));
        let err = estimate(&ai, &issue(1, "T", "B")).await.unwrap_err();
        assert!(matches!(err, Error::Ai(AiError::Timeout(300))));
    }
}
