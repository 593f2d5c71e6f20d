//! `tshirts breakdown`

use std::io::{BufRead, Write};

use tracing::{info, warn};

use crate::ai::{self, prompts::truncate, AiBackend, Subtask};
use crate::cli::Console;
use crate::error::{Error, Result};
use crate::github::{ensure_size_labels, Issue, IssueTracker, NewIssue};

/// Issues created by [`create_subtasks`], and the error that stopped it early
#[derive(Debug)]
pub struct CreatedSubtasks {
    pub created: Vec<Issue>,
    pub failure: Option<Error>,
}

impl CreatedSubtasks {
    /// The created issues, or the failure if there was one
    pub fn into_result(self) -> Result<Vec<Issue>> {
        match self.failure {
            Some(e) => Err(e),
            None => Ok(self.created),
        }
    }
}

/// Markdown comment listing created subtasks, posted on the parent
pub fn subtasks_comment(created: &[Issue]) -> String {
    let lines: Vec<String> = created
        .iter()
        .map(|i| format!("- #{}: {}", i.number, i.title))
        .collect();
    format!("## Subtasks created\n\n{}", lines.join("\n"))
}

/// Create each subtask as an issue linked under `parent`, in order
///
/// Each body starts with `Parent issue: #N`. After the last one is linked a
/// summary comment is posted on the parent. The first failure stops the
/// loop; issues created before it stay on GitHub.
pub async fn create_subtasks(tracker: &dyn IssueTracker, parent: &Issue, tasks: &[Subtask]) -> CreatedSubtasks {
    let mut created = Vec::with_capacity(tasks.len());

    if tasks.iter().any(|t| t.size.is_some()) {
        if let Err(e) = ensure_size_labels(tracker).await {
            return CreatedSubtasks {
                created,
                failure: Some(e.into()),
            };
        }
    }

    for task in tasks {
        let new = NewIssue::new(&task.title, task.issue_body(parent.number)).with_size(task.size);
        let issue = match tracker.create_issue(new).await {
            Ok(issue) => issue,
            Err(e) => {
                warn!(parent = parent.number, title = %task.title, error = %e, "creating subtask failed");
                return CreatedSubtasks {
                    created,
                    failure: Some(e.into()),
                };
            }
        };
        info!(parent = parent.number, child = issue.number, "created subtask");

        let linked = tracker.add_sub_issue(parent.number, issue.id).await;
        created.push(issue);
        if let Err(e) = linked {
            return CreatedSubtasks {
                created,
                failure: Some(e.into()),
            };
        }
    }

    let failure = match tracker.add_comment(parent.number, &subtasks_comment(&created)).await {
        Ok(()) => None,
        Err(e) => Some(e.into()),
    };
    CreatedSubtasks { created, failure }
}

/// Ask the model for subtasks of `number`, print them, and with `create`
/// turn them into sub-issues
pub async fn run<R: BufRead, W: Write>(
    tracker: &dyn IssueTracker,
    ai: &dyn AiBackend,
    console: &mut Console<R, W>,
    number: u64,
    create: bool,
) -> Result<Vec<Subtask>> {
    let issue = tracker.issue(number).await?;
    console.say(format!("\nBreaking down #{}: {}\n", issue.number, issue.title))?;

    let tasks = ai::breakdown(ai, &issue).await?;
    for (i, task) in tasks.iter().enumerate() {
        console.say(format!("{}. {}", i + 1, task.title))?;
        if let Some(size) = task.size {
            console.say(format!("   Size: {size}"))?;
        }
        if !task.body.trim().is_empty() {
            console.say(format!("   {}", truncate(task.body.trim(), 100)))?;
        }
        console.say("")?;
    }

    if !create {
        console.say("Run again with --create to create these as sub-issues.")?;
        return Ok(tasks);
    }

    console.say("Creating sub-issues...")?;
    let outcome = create_subtasks(tracker, &issue, &tasks).await;
    for child in &outcome.created {
        console.say(format!("  Created #{}: {}", child.number, child.title))?;
    }
    if outcome.failure.is_some() && !outcome.created.is_empty() {
        console.say(format!(
            "Stopped after {} of {} sub-issues; created issues were kept.",
            outcome.created.len(),
            tasks.len()
        ))?;
    }
    outcome.into_result()?;
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{console, printed, repo};
    use crate::size::Size;
    use crate::testing::{MemoryTracker, ScriptedBackend};
    use serde_json::json;

    fn dark_mode_tasks() -> serde_json::Value {
        json!({"subtasks": [
            {"title": "Add toggle UI"},
            {"title": "Persist preference"},
            {"title": "Apply theme on load"}
        ]})
    }

    #[tokio::test]
    async fn test_create_links_subtasks_in_order() {
        let tracker = MemoryTracker::new(repo());
        tracker.seed(42, "Dark mode", "Add dark mode toggle to settings", &[]);
        let ai = ScriptedBackend::new().respond(dark_mode_tasks());
        let mut console = console("");

        run(&tracker, &ai, &mut console, 42, true).await.unwrap();

        let children = tracker.children(42);
        assert_eq!(children.len(), 3);
        let titles: Vec<String> = children.iter().map(|n| tracker.get(*n).unwrap().title).collect();
        assert_eq!(titles, vec!["Add toggle UI", "Persist preference", "Apply theme on load"]);
        for n in &children {
            assert!(tracker.get(*n).unwrap().body.starts_with("Parent issue: #42"));
        }

        let comments = tracker.comments(42);
        assert_eq!(comments.len(), 1);
        assert!(comments[0].starts_with("## Subtasks created"));
        assert!(comments[0].contains("Persist preference"));
    }

    #[tokio::test]
    async fn test_without_create_is_read_only() {
        let tracker = MemoryTracker::new(repo());
        tracker.seed(42, "Dark mode", "Add dark mode toggle to settings", &[]);
        let ai = ScriptedBackend::new().respond(dark_mode_tasks());
        let mut console = console("");

        let tasks = run(&tracker, &ai, &mut console, 42, false).await.unwrap();

        assert_eq!(tasks.len(), 3);
        assert_eq!(ai.schemas(), vec![crate::ai::schema::breakdown()]);
        assert_eq!(tracker.mutations(), 0);
        let out = printed(&console);
        assert!(out.contains("1. Add toggle UI"));
        assert!(out.contains("3. Apply theme on load"));
    }

    #[tokio::test]
    async fn test_sized_subtasks_get_labels() {
        let tracker = MemoryTracker::new(repo());
        tracker.seed(1, "Parent", "", &[]);
        let ai = ScriptedBackend::new().respond(json!({"subtasks": [
            {"title": "Small", "body": "do it", "size": "S"}
        ]}));
        let mut console = console("");

        run(&tracker, &ai, &mut console, 1, true).await.unwrap();

        let child = tracker.get(tracker.children(1)[0]).unwrap();
        assert_eq!(child.size(), Some(Size::S));
        assert_eq!(child.body, "Parent issue: #1\n\ndo it");
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_created_issues() {
        let tracker = MemoryTracker::new(repo());
        tracker.seed(42, "Dark mode", "", &[]);
        tracker.fail_creates_after(2);
        let ai = ScriptedBackend::new().respond(dark_mode_tasks());
        let mut console = console("");

        let err = run(&tracker, &ai, &mut console, 42, true).await.unwrap_err();

        assert!(matches!(err, Error::GitHub(_)));
        assert_eq!(tracker.children(42).len(), 2);
        assert!(tracker.comments(42).is_empty());
        assert!(printed(&console).contains("Stopped after 2 of 3 sub-issues"));
    }

    #[tokio::test]
    async fn test_missing_issue_is_not_found() {
        let tracker = MemoryTracker::new(repo());
        let ai = ScriptedBackend::new();
        let mut console = console("");

        let err = run(&tracker, &ai, &mut console, 999, false).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(ai.calls(), 0);
    }
}
