//! GitHub access
//!
//! [`IssueTracker`] is everything the commands need from one repository,
//! [`IssueHost`] is the account-level entry point that hands out trackers.
//! [`GitHub`] implements both against the REST API; tests use the in-memory
//! implementations in [`crate::testing`].

pub mod client;
pub mod error;
pub mod types;

pub use client::{GitHub, RepoIssues};
pub use error::{GitHubError, GitHubResult};
pub use types::{Issue, IssueState, Label, NewIssue};

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::repo::RepoRef;
use crate::size::Size;

/// Bodies shorter than this are considered too thin to estimate from
pub const GROOMABLE_BODY_CHARS: usize = 40;

/// Issue operations on a single repository
///
/// Every mutating call is visible on GitHub as soon as it returns; nothing
/// is batched or rolled back.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// The repository this tracker operates on
    fn repo(&self) -> &RepoRef;

    /// All open issues, pull requests excluded
    async fn open_issues(&self) -> GitHubResult<Vec<Issue>>;

    /// A single issue by number
    async fn issue(&self, number: u64) -> GitHubResult<Issue>;

    /// Every label defined in the repository
    async fn labels(&self) -> GitHubResult<Vec<Label>>;

    /// Create a label; an existing label with the same name is not an error
    async fn create_label(&self, name: &str, color: &str, description: &str) -> GitHubResult<()>;

    /// Replace any `size:` label on the issue with `size`, keeping other labels
    async fn set_size_label(&self, number: u64, size: Size) -> GitHubResult<()>;

    async fn create_issue(&self, issue: NewIssue) -> GitHubResult<Issue>;

    /// Link an existing issue (by database id) as a sub-issue of `parent`
    async fn add_sub_issue(&self, parent: u64, child_id: u64) -> GitHubResult<()>;

    /// Children of `parent`, open and closed
    async fn sub_issues(&self, parent: u64) -> GitHubResult<Vec<Issue>>;

    async fn update_body(&self, number: u64, body: &str) -> GitHubResult<()>;

    async fn add_comment(&self, number: u64, body: &str) -> GitHubResult<()>;

    /// Close an issue, posting `comment` first when given
    async fn close_issue(&self, number: u64, comment: Option<&str>) -> GitHubResult<()>;
}

/// Account-level GitHub access
#[async_trait]
pub trait IssueHost: Send + Sync {
    /// `owner/name` of repositories the caller can access, most recent first
    async fn user_repos(&self) -> GitHubResult<Vec<String>>;

    /// A tracker bound to `repo`
    fn tracker(&self, repo: &RepoRef) -> Arc<dyn IssueTracker>;
}

/// Open issues without any `size:` label
pub async fn unestimated_issues(tracker: &dyn IssueTracker) -> GitHubResult<Vec<Issue>> {
    let issues = tracker.open_issues().await?;
    Ok(issues.into_iter().filter(|i| !i.has_size_label()).collect())
}

/// Whether an issue should be refined before (re-)estimation
///
/// XS issues are never groomable. Otherwise an issue qualifies when it is
/// sized S or larger, or when its body is too short to act on.
pub fn is_groomable(issue: &Issue) -> bool {
    match issue.size() {
        Some(Size::XS) => false,
        Some(_) => true,
        None => issue.body.trim().chars().count() < GROOMABLE_BODY_CHARS,
    }
}

/// Open issues that look like they need refinement
pub async fn groomable_issues(tracker: &dyn IssueTracker) -> GitHubResult<Vec<Issue>> {
    let issues = tracker.open_issues().await?;
    Ok(issues.into_iter().filter(is_groomable).collect())
}

/// Create whichever size labels the repository is missing
///
/// A failure to create one label is logged and skipped: applying the label
/// later will surface the real problem if it persists.
pub async fn ensure_size_labels(tracker: &dyn IssueTracker) -> GitHubResult<()> {
    let existing: Vec<String> = tracker.labels().await?.into_iter().map(|l| l.name).collect();

    for size in Size::ALL {
        let name = size.label();
        if existing.iter().any(|l| l == &name) {
            continue;
        }
        debug!(label = %name, "creating missing size label");
        let description = format!("T-shirt size {}: {}", size, size.guide());
        if let Err(e) = tracker.create_label(&name, size.color(), &description).await {
            warn!(label = %name, error = %e, "could not create size label");
        }
    }
    Ok(())
}

/// Split issues into (open, closed)
pub fn partition_by_state(issues: Vec<Issue>) -> (Vec<Issue>, Vec<Issue>) {
    issues.into_iter().partition(Issue::is_open)
}
