//! Issue and label types
//!
//! `Issue` is the shape the rest of the crate works with. The `Raw*` structs
//! mirror the JSON returned by the REST API and are converted at the edge.

use serde::{Deserialize, Serialize};

use crate::size::{is_size_label, Size};

/// Issue state as reported by GitHub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

/// A GitHub issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Issue number (unique within repository)
    pub number: u64,

    /// Database id, required when linking sub-issues
    pub id: u64,

    pub title: String,

    /// Markdown body; GitHub's `null` becomes an empty string
    pub body: String,

    /// Label names
    pub labels: Vec<String>,

    pub state: IssueState,

    /// Web URL of the issue
    pub url: String,
}

impl Issue {
    /// The size label on this issue, if any valid one is present
    pub fn size(&self) -> Option<Size> {
        self.labels.iter().find_map(|l| Size::from_label(l))
    }

    /// Whether any `size:` label is present, valid or not
    pub fn has_size_label(&self) -> bool {
        self.labels.iter().any(|l| is_size_label(l))
    }

    pub fn is_open(&self) -> bool {
        self.state == IssueState::Open
    }
}

/// Fields for creating an issue
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

impl NewIssue {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            labels: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Add `size: X` when a size is known
    pub fn with_size(self, size: Option<Size>) -> Self {
        match size {
            Some(size) => self.with_label(size.label()),
            None => self,
        }
    }
}

/// A repository label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,

    /// Hex colour without `#`
    #[serde(default)]
    pub color: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct RawIssue {
    pub number: u64,
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub labels: Vec<RawLabel>,
    pub state: IssueState,
    #[serde(default)]
    pub html_url: String,
    /// Present only when the "issue" is actually a pull request
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLabel {
    pub name: String,
}

impl RawIssue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

impl From<RawIssue> for Issue {
    fn from(raw: RawIssue) -> Self {
        Issue {
            number: raw.number,
            id: raw.id,
            title: raw.title,
            body: raw.body.unwrap_or_default(),
            labels: raw.labels.into_iter().map(|l| l.name).collect(),
            state: raw.state,
            url: raw.html_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRepo {
    pub full_name: String,
}
