//! `tshirts groom` (alias `refine`)

use std::io::{BufRead, Write};

use crate::ai::{self, AiBackend, Conversation, RefineReply};
use crate::cli::Console;
use crate::error::Result;
use crate::github::{groomable_issues, Issue, IssueTracker};

/// Print the issues that look like they need refinement
pub async fn list<R: BufRead, W: Write>(tracker: &dyn IssueTracker, console: &mut Console<R, W>) -> Result<Vec<Issue>> {
    let issues = groomable_issues(tracker).await?;
    let repo = tracker.repo();

    if issues.is_empty() {
        console.say(format!("No issues need grooming in {repo}"))?;
        return Ok(issues);
    }

    console.say(format!("Issues that may need refinement in {repo}:\n"))?;
    for issue in &issues {
        let size = issue.size().map(|s| s.as_str()).unwrap_or("?");
        console.say(format!("#{} [{}]: {}", issue.number, size, issue.title))?;
    }
    console.say("\nRun `tshirts groom <number>` to refine one.")?;
    Ok(issues)
}

fn show_suggestions<R: BufRead, W: Write>(console: &mut Console<R, W>, suggestions: &[String]) -> Result<()> {
    if suggestions.is_empty() {
        return Ok(());
    }
    console.say("\nSuggestions:")?;
    for s in suggestions {
        console.say(format!("  - {s}"))?;
    }
    Ok(())
}

/// Refine one issue through a conversation
///
/// Returns whether the body was updated. An empty answer to a question
/// ends the conversation without changes.
pub async fn refine<R: BufRead, W: Write>(
    tracker: &dyn IssueTracker,
    ai: &dyn AiBackend,
    console: &mut Console<R, W>,
    number: u64,
) -> Result<bool> {
    let issue = tracker.issue(number).await?;
    console.say(format!("\nRefining #{}: {}", issue.number, issue.title))?;

    let mut conversation = Conversation::new();
    let description = loop {
        match ai::refine(ai, &issue, &conversation).await? {
            RefineReply::Question { question, suggestions } => {
                show_suggestions(console, &suggestions)?;
                console.say(format!("\n{question}"))?;
                let answer = console.ask("> ")?;
                if answer.is_empty() {
                    console.say("Issue not updated.")?;
                    return Ok(false);
                }
                conversation = conversation.answer(question, answer);
            }
            RefineReply::Refined { description, suggestions } => {
                show_suggestions(console, &suggestions)?;
                break description;
            }
        }
    };

    console.say("\n--- Refined description ---")?;
    console.say(&description)?;
    console.say("---------------------------")?;

    if !console.confirm(&format!("Update issue #{number} with this description?"), false)? {
        console.say("Issue not updated.")?;
        return Ok(false);
    }
    tracker.update_body(number, &description).await?;
    console.say(format!("Issue #{number} updated."))?;
    Ok(true)
}
