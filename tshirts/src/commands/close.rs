//! `tshirts close`

use std::io::{BufRead, Write};

use tracing::info;

use crate::ai::{self, AiBackend};
use crate::cli::Console;
use crate::error::{Error, Result};
use crate::github::{partition_by_state, IssueTracker};

/// Close an issue with a generated comment
///
/// Refuses while any sub-issue is open. Returns whether the issue was
/// closed.
pub async fn run<R: BufRead, W: Write>(
    tracker: &dyn IssueTracker,
    ai: &dyn AiBackend,
    console: &mut Console<R, W>,
    number: u64,
) -> Result<bool> {
    let issue = tracker.issue(number).await?;
    if !issue.is_open() {
        console.say(format!("Issue #{number} is already closed."))?;
        return Ok(false);
    }
    console.say(format!("\nClosing #{}: {}", issue.number, issue.title))?;

    let (open, closed) = partition_by_state(tracker.sub_issues(number).await?);
    if !open.is_empty() {
        console.say(format!("Cannot close #{number}: it has open sub-issues"))?;
        for sub in &open {
            console.say(format!("  #{}: {}", sub.number, sub.title))?;
        }
        return Err(Error::Aborted(format!("#{number} has {} open sub-issues", open.len())));
    }

    let reason = if closed.is_empty() {
        Some(console.ask("Why is this issue being closed? ")?)
    } else {
        console.say("All sub-issues are closed:")?;
        for sub in &closed {
            console.say(format!("  #{}: {}", sub.number, sub.title))?;
        }
        if !console.confirm("Is the work complete?", true)? {
            console.say("Issue not closed.")?;
            return Ok(false);
        }
        None
    };

    let generated = ai::closing_comment(ai, &issue, &closed, reason.as_deref()).await?;
    console.say("\n--- Closing comment ---")?;
    console.say(&generated)?;
    console.say("-----------------------")?;

    let comment = match console.choose("Use this comment? [a]ccept, [e]dit, [s]kip", &['a', 'e', 's'])? {
        'a' => Some(generated),
        'e' => {
            let edited = console.ask("Comment: ")?;
            Some(if edited.is_empty() { generated } else { edited })
        }
        _ => None,
    };

    if !console.confirm(&format!("Close issue #{number}?"), true)? {
        console.say("Issue not closed.")?;
        return Ok(false);
    }
    tracker.close_issue(number, comment.as_deref()).await?;
    info!(issue = number, commented = comment.is_some(), "closed");
    console.say(format!("Issue #{number} closed."))?;
    Ok(true)
}
