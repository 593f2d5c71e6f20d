//! In-memory stand-ins for GitHub and the LLM
//!
//! Compiled for this crate's tests and, with the `testing` feature, for
//! downstream crates' tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use crate::ai::{AiBackend, AiError, AiResult};
use crate::github::{
    GitHubError, GitHubResult, Issue, IssueHost, IssueState, IssueTracker, Label, NewIssue,
};
use crate::repo::RepoRef;
use crate::size::{is_size_label, Size};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// MemoryTracker
// ============================================================================

#[derive(Default)]
struct TrackerState {
    issues: Vec<Issue>,
    labels: Vec<Label>,
    created_labels: usize,
    sub_issues: HashMap<u64, Vec<u64>>,
    comments: Vec<(u64, String)>,
    mutations: usize,
    creates_left: Option<usize>,
    failing_label_writes: Vec<u64>,
    forbidden_label_writes: Vec<u64>,
}

impl TrackerState {
    fn find(&self, number: u64) -> GitHubResult<&Issue> {
        self.issues
            .iter()
            .find(|i| i.number == number)
            .ok_or_else(|| GitHubError::NotFound(format!("issue #{number}")))
    }

    fn find_mut(&mut self, number: u64) -> GitHubResult<&mut Issue> {
        self.issues
            .iter_mut()
            .find(|i| i.number == number)
            .ok_or_else(|| GitHubError::NotFound(format!("issue #{number}")))
    }
}

/// An [`IssueTracker`] over a vector of issues
///
/// Issues keep insertion order. Every successful write bumps a counter
/// checked by [`MemoryTracker::mutations`].
pub struct MemoryTracker {
    repo: RepoRef,
    state: Mutex<TrackerState>,
}

impl MemoryTracker {
    pub fn new(repo: RepoRef) -> Self {
        Self {
            repo,
            state: Mutex::new(TrackerState::default()),
        }
    }

    /// Add an open issue without counting it as a mutation
    pub fn seed(&self, number: u64, title: &str, body: &str, labels: &[&str]) {
        let issue = Issue {
            number,
            id: 1000 + number,
            title: title.to_string(),
            body: body.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            state: IssueState::Open,
            url: self.repo.issue_url(number),
        };
        lock(&self.state).issues.push(issue);
    }

    /// Seed an issue in `state`, linked as a child of `parent`
    pub fn seed_sub_issue(&self, parent: u64, number: u64, title: &str, state: IssueState) {
        self.seed(number, title, "", &[]);
        let mut state_guard = lock(&self.state);
        if let Ok(issue) = state_guard.find_mut(number) {
            issue.state = state;
        }
        state_guard.sub_issues.entry(parent).or_default().push(number);
    }

    /// Define a repository label without counting it as created
    pub fn add_label(&self, name: &str) {
        lock(&self.state).labels.push(Label {
            name: name.to_string(),
            color: None,
            description: None,
        });
    }

    /// Let `n` more issue creations succeed, then fail every one after
    pub fn fail_creates_after(&self, n: usize) {
        lock(&self.state).creates_left = Some(n);
    }

    /// Make label writes on `number` fail
    pub fn fail_label_writes_on(&self, number: u64) {
        lock(&self.state).failing_label_writes.push(number);
    }

    /// Make label writes on `number` fail with 403 Forbidden
    pub fn forbid_label_writes_on(&self, number: u64) {
        lock(&self.state).forbidden_label_writes.push(number);
    }

    pub fn get(&self, number: u64) -> Option<Issue> {
        lock(&self.state).find(number).ok().cloned()
    }

    pub fn issues(&self) -> Vec<Issue> {
        lock(&self.state).issues.clone()
    }

    /// Numbers of the sub-issues linked under `parent`, in link order
    pub fn children(&self, parent: u64) -> Vec<u64> {
        lock(&self.state).sub_issues.get(&parent).cloned().unwrap_or_default()
    }

    pub fn comments(&self, number: u64) -> Vec<String> {
        lock(&self.state)
            .comments
            .iter()
            .filter(|(n, _)| *n == number)
            .map(|(_, c)| c.clone())
            .collect()
    }

    /// Labels created through [`IssueTracker::create_label`]
    pub fn created_labels(&self) -> usize {
        lock(&self.state).created_labels
    }

    /// Successful write calls so far
    pub fn mutations(&self) -> usize {
        lock(&self.state).mutations
    }
}

#[async_trait]
impl IssueTracker for MemoryTracker {
    fn repo(&self) -> &RepoRef {
        &self.repo
    }

    async fn open_issues(&self) -> GitHubResult<Vec<Issue>> {
        Ok(lock(&self.state)
            .issues
            .iter()
            .filter(|i| i.is_open())
            .cloned()
            .collect())
    }

    async fn issue(&self, number: u64) -> GitHubResult<Issue> {
        lock(&self.state).find(number).cloned()
    }

    async fn labels(&self) -> GitHubResult<Vec<Label>> {
        Ok(lock(&self.state).labels.clone())
    }

    async fn create_label(&self, name: &str, color: &str, description: &str) -> GitHubResult<()> {
        let mut state = lock(&self.state);
        if state.labels.iter().any(|l| l.name == name) {
            return Ok(());
        }
        state.labels.push(Label {
            name: name.to_string(),
            color: Some(color.to_string()),
            description: Some(description.to_string()),
        });
        state.created_labels += 1;
        state.mutations += 1;
        Ok(())
    }

    async fn set_size_label(&self, number: u64, size: Size) -> GitHubResult<()> {
        let mut state = lock(&self.state);
        if state.forbidden_label_writes.contains(&number) {
            return Err(GitHubError::Forbidden("Resource not accessible by integration".to_string()));
        }
        if state.failing_label_writes.contains(&number) {
            return Err(GitHubError::Api {
                status: 500,
                message: "label write failed".to_string(),
            });
        }
        let target = size.label();
        let issue = state.find_mut(number)?;
        issue.labels.retain(|l| !is_size_label(l) || *l == target);
        if !issue.labels.contains(&target) {
            issue.labels.push(target);
        }
        state.mutations += 1;
        Ok(())
    }

    async fn create_issue(&self, new: NewIssue) -> GitHubResult<Issue> {
        let mut state = lock(&self.state);
        if let Some(left) = state.creates_left {
            if left == 0 {
                return Err(GitHubError::Api {
                    status: 502,
                    message: "create failed".to_string(),
                });
            }
            state.creates_left = Some(left - 1);
        }

        let number = state.issues.iter().map(|i| i.number).max().unwrap_or(0) + 1;
        let issue = Issue {
            number,
            id: 1000 + number,
            title: new.title,
            body: new.body,
            labels: new.labels,
            state: IssueState::Open,
            url: self.repo.issue_url(number),
        };
        state.issues.push(issue.clone());
        state.mutations += 1;
        Ok(issue)
    }

    async fn add_sub_issue(&self, parent: u64, child_id: u64) -> GitHubResult<()> {
        let mut state = lock(&self.state);
        state.find(parent)?;
        let child = state
            .issues
            .iter()
            .find(|i| i.id == child_id)
            .map(|i| i.number)
            .ok_or_else(|| GitHubError::NotFound(format!("issue id {child_id}")))?;
        state.sub_issues.entry(parent).or_default().push(child);
        state.mutations += 1;
        Ok(())
    }

    async fn sub_issues(&self, parent: u64) -> GitHubResult<Vec<Issue>> {
        let state = lock(&self.state);
        state.find(parent)?;
        let children = state.sub_issues.get(&parent).cloned().unwrap_or_default();
        children
            .into_iter()
            .map(|n| state.find(n).cloned())
            .collect()
    }

    async fn update_body(&self, number: u64, body: &str) -> GitHubResult<()> {
        let mut state = lock(&self.state);
        state.find_mut(number)?.body = body.to_string();
        state.mutations += 1;
        Ok(())
    }

    async fn add_comment(&self, number: u64, body: &str) -> GitHubResult<()> {
        let mut state = lock(&self.state);
        state.find(number)?;
        state.comments.push((number, body.to_string()));
        state.mutations += 1;
        Ok(())
    }

    async fn close_issue(&self, number: u64, comment: Option<&str>) -> GitHubResult<()> {
        if let Some(comment) = comment {
            self.add_comment(number, comment).await?;
        }
        let mut state = lock(&self.state);
        state.find_mut(number)?.state = IssueState::Closed;
        state.mutations += 1;
        Ok(())
    }
}

// ============================================================================
// MemoryHost
// ============================================================================

/// An [`IssueHost`] handing out [`MemoryTracker`]s
#[derive(Default)]
pub struct MemoryHost {
    trackers: Mutex<Vec<Arc<MemoryTracker>>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tracker for `repo`, created empty on first use
    pub fn tracker_for(&self, repo: &RepoRef) -> Arc<MemoryTracker> {
        let mut trackers = lock(&self.trackers);
        if let Some(existing) = trackers.iter().find(|t| t.repo() == repo) {
            return Arc::clone(existing);
        }
        let tracker = Arc::new(MemoryTracker::new(repo.clone()));
        trackers.push(Arc::clone(&tracker));
        tracker
    }
}

#[async_trait]
impl IssueHost for MemoryHost {
    async fn user_repos(&self) -> GitHubResult<Vec<String>> {
        Ok(lock(&self.trackers).iter().map(|t| t.repo().to_string()).collect())
    }

    fn tracker(&self, repo: &RepoRef) -> Arc<dyn IssueTracker> {
        self.tracker_for(repo)
    }
}

// ============================================================================
// ScriptedBackend
// ============================================================================

/// An [`AiBackend`] that replays queued responses in order
///
/// Running out of responses is an [`AiError::Malformed`].
#[derive(Default)]
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<AiResult<Value>>>,
    prompts: Mutex<Vec<String>>,
    schemas: Mutex<Vec<Value>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, value: Value) -> Self {
        lock(&self.responses).push_back(Ok(value));
        self
    }

    pub fn fail(self, error: AiError) -> Self {
        lock(&self.responses).push_back(Err(error));
        self
    }

    /// Number of calls made
    pub fn calls(&self) -> usize {
        lock(&self.prompts).len()
    }

    /// Prompts received, in order
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    /// Schemas received, in order
    pub fn schemas(&self) -> Vec<Value> {
        lock(&self.schemas).clone()
    }
}

#[async_trait]
impl AiBackend for ScriptedBackend {
    async fn structured(&self, prompt: &str, schema: &Value) -> AiResult<Value> {
        lock(&self.prompts).push(prompt.to_string());
        lock(&self.schemas).push(schema.clone());
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| Err(AiError::Malformed("no scripted response left".to_string())))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
