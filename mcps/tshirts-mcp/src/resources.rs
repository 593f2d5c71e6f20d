//! Read-only `github://` resources
//!
//! URIs:
//! - `github://repos`
//! - `github://{owner}/{repo}/issues`
//! - `github://{owner}/{repo}/issues/{number}`
//! - `github://{owner}/{repo}/issues/unestimated`
//! - `github://{owner}/{repo}/issues/groomable`

use std::fmt;

use tshirts::github::Issue;
use tshirts::RepoRef;

const SCHEME: &str = "github://";

/// At most this many repositories are listed by `github://repos`
pub const MAX_LISTED_REPOS: usize = 50;

/// A parsed resource URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueResource {
    Repos,
    OpenIssues(RepoRef),
    Issue(RepoRef, u64),
    Unestimated(RepoRef),
    Groomable(RepoRef),
}

impl IssueResource {
    /// `None` for anything that is not one of the URIs above
    pub fn parse(uri: &str) -> Option<Self> {
        let path = uri.strip_prefix(SCHEME)?;
        let parts: Vec<&str> = path.split('/').collect();
        match parts.as_slice() {
            ["repos"] => Some(IssueResource::Repos),
            [owner, name, "issues"] => Some(IssueResource::OpenIssues(RepoRef::new(*owner, *name).ok()?)),
            [owner, name, "issues", "unestimated"] => {
                Some(IssueResource::Unestimated(RepoRef::new(*owner, *name).ok()?))
            }
            [owner, name, "issues", "groomable"] => Some(IssueResource::Groomable(RepoRef::new(*owner, *name).ok()?)),
            [owner, name, "issues", number] => {
                let number = number.parse().ok()?;
                Some(IssueResource::Issue(RepoRef::new(*owner, *name).ok()?, number))
            }
            _ => None,
        }
    }

    /// The repository this resource reads from, if any
    pub fn repo(&self) -> Option<&RepoRef> {
        match self {
            IssueResource::Repos => None,
            IssueResource::OpenIssues(r)
            | IssueResource::Issue(r, _)
            | IssueResource::Unestimated(r)
            | IssueResource::Groomable(r) => Some(r),
        }
    }
}

impl fmt::Display for IssueResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueResource::Repos => write!(f, "{SCHEME}repos"),
            IssueResource::OpenIssues(r) => write!(f, "{SCHEME}{r}/issues"),
            IssueResource::Issue(r, n) => write!(f, "{SCHEME}{r}/issues/{n}"),
            IssueResource::Unestimated(r) => write!(f, "{SCHEME}{r}/issues/unestimated"),
            IssueResource::Groomable(r) => write!(f, "{SCHEME}{r}/issues/groomable"),
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

pub fn render_repos(repos: &[String]) -> String {
    if repos.is_empty() {
        return "No repositories found".to_string();
    }
    let listed: Vec<&str> = repos.iter().take(MAX_LISTED_REPOS).map(String::as_str).collect();
    format!("Your repositories:\n{}", listed.join("\n"))
}

pub fn render_open_issues(repo: &RepoRef, issues: &[Issue]) -> String {
    if issues.is_empty() {
        return format!("No open issues in {repo}");
    }
    let mut lines = vec![format!("Open issues in {repo}:\n")];
    for issue in issues {
        let labels = if issue.labels.is_empty() {
            "no labels".to_string()
        } else {
            issue.labels.join(", ")
        };
        lines.push(format!("#{}: {} [{}]", issue.number, issue.title, labels));
    }
    lines.join("\n")
}

pub fn render_issue(issue: &Issue) -> String {
    let labels = if issue.labels.is_empty() {
        "none".to_string()
    } else {
        issue.labels.join(", ")
    };
    let body = if issue.body.trim().is_empty() {
        "(no description)"
    } else {
        issue.body.as_str()
    };
    format!("Issue #{}: {}\nLabels: {}\n\n{}", issue.number, issue.title, labels, body)
}

pub fn render_unestimated(repo: &RepoRef, issues: &[Issue]) -> String {
    if issues.is_empty() {
        return format!("All issues in {repo} have size labels");
    }
    let mut lines = vec![format!("Issues without size labels in {repo}:\n")];
    lines.extend(issues.iter().map(|i| format!("#{}: {}", i.number, i.title)));
    lines.join("\n")
}

pub fn render_groomable(repo: &RepoRef, issues: &[Issue]) -> String {
    if issues.is_empty() {
        return format!("No issues need grooming in {repo}");
    }
    let mut lines = vec![format!("Issues that may need refinement in {repo}:\n")];
    for issue in issues {
        let size = issue.size().map(|s| s.as_str()).unwrap_or("?");
        lines.push(format!("#{} [{}]: {}", issue.number, size, issue.title));
    }
    lines.join("\n")
}
