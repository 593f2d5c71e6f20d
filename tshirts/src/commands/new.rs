//! `tshirts new`

use std::io::{BufRead, Write};

use tracing::{debug, info, warn};

use crate::ai::{self, AiBackend, Conversation, DraftIssue, DraftReply, SimilarIssue};
use crate::cli::Console;
use crate::error::{Error, Result};
use crate::github::{ensure_size_labels, Issue, IssueTracker, NewIssue};

/// Drafts plus the existing issues they might collide with
struct Proposal {
    drafts: Vec<DraftIssue>,
    similar: Vec<Vec<SimilarIssue>>,
}

/// One-line-per-draft summary, used as the assistant's turn when the user
/// asks for changes
fn summarize(drafts: &[DraftIssue]) -> String {
    let lines: Vec<String> = drafts
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let size = d.size.map(|s| s.to_string()).unwrap_or_else(|| "?".to_string());
            format!("{}. {} [{}]", i + 1, d.title, size)
        })
        .collect();
    format!("Proposed issues:\n{}", lines.join("\n"))
}

async fn check_similar(
    tracker: &dyn IssueTracker,
    ai: &dyn AiBackend,
    drafts: Vec<DraftIssue>,
) -> Result<Proposal> {
    let existing = tracker.open_issues().await?;
    let mut similar = Vec::with_capacity(drafts.len());
    for draft in &drafts {
        match ai::find_similar(ai, &draft.title, &draft.description, &existing).await {
            Ok(found) => similar.push(found),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(title = %draft.title, error = %e, "similarity check failed");
                similar.push(Vec::new());
            }
        }
    }
    Ok(Proposal { drafts, similar })
}

fn show<R: BufRead, W: Write>(console: &mut Console<R, W>, proposal: &Proposal) -> Result<()> {
    for (i, (draft, similar)) in proposal.drafts.iter().zip(&proposal.similar).enumerate() {
        let size = draft.size.map(|s| s.to_string()).unwrap_or_else(|| "unsized".to_string());
        console.say(format!("\n--- Issue {} of {} [{}] ---", i + 1, proposal.drafts.len(), size))?;
        console.say(format!("Title: {}", draft.title))?;
        console.say("")?;
        console.say(draft.issue_body())?;
        for s in similar {
            console.say(format!(
                "  ! Possible {} of #{}: {} ({})",
                s.relationship.as_str(),
                s.issue_number,
                s.title,
                s.reasoning
            ))?;
        }
    }
    Ok(())
}

/// Create every draft in order, stopping at the first failure
///
/// Issues created before the failure are returned alongside it.
async fn create_all(tracker: &dyn IssueTracker, drafts: &[DraftIssue]) -> (Vec<Issue>, Option<Error>) {
    let mut created = Vec::with_capacity(drafts.len());
    if drafts.iter().any(|d| d.size.is_some()) {
        if let Err(e) = ensure_size_labels(tracker).await {
            return (created, Some(e.into()));
        }
    }
    for draft in drafts {
        let new = NewIssue::new(&draft.title, draft.issue_body()).with_size(draft.size);
        match tracker.create_issue(new).await {
            Ok(issue) => {
                info!(issue = issue.number, "created issue");
                created.push(issue);
            }
            Err(e) => {
                warn!(title = %draft.title, error = %e, "creating issue failed");
                return (created, Some(e.into()));
            }
        }
    }
    (created, None)
}

/// Draft issues through a conversation and create them on acceptance
///
/// Returns the created issues; empty when the user quits.
pub async fn run<R: BufRead, W: Write>(
    tracker: &dyn IssueTracker,
    ai: &dyn AiBackend,
    console: &mut Console<R, W>,
) -> Result<Vec<Issue>> {
    console.say("What would you like to build?")?;
    let first = console.ask("> ")?;
    if first.is_empty() {
        console.say("Nothing to draft.")?;
        return Ok(Vec::new());
    }

    let mut conversation = Conversation::starting_with(first);
    loop {
        let drafts = match ai::draft(ai, &conversation).await? {
            DraftReply::Question(question) => {
                console.say(format!("\n{question}"))?;
                let answer = console.ask("> ")?;
                conversation = conversation.answer(question, answer);
                continue;
            }
            DraftReply::Ready(drafts) => drafts,
        };

        debug!(drafts = drafts.len(), "drafts ready");
        let proposal = check_similar(tracker, ai, drafts).await?;
        show(console, &proposal)?;

        match console.choose("\nCreate these issues? [a]ccept, [r]efine, [q]uit", &['a', 'y', 'r', 'q', 'n'])? {
            'a' | 'y' => {
                let (created, failure) = create_all(tracker, &proposal.drafts).await;
                for issue in &created {
                    console.say(format!("Created issue #{}: {}", issue.number, issue.url))?;
                }
                return match failure {
                    None => Ok(created),
                    Some(e) if created.is_empty() => Err(e),
                    Some(e) => {
                        let numbers: Vec<String> = created.iter().map(|i| format!("#{}", i.number)).collect();
                        console.say(format!(
                            "Stopped after {} of {} issues; already created: {}",
                            created.len(),
                            proposal.drafts.len(),
                            numbers.join(", ")
                        ))?;
                        Err(e)
                    }
                };
            }
            'r' => {
                let feedback = console.ask("What should change? ")?;
                conversation = conversation.answer(summarize(&proposal.drafts), feedback);
            }
            _ => {
                console.say("Issues not created.")?;
                return Ok(Vec::new());
            }
        }
    }
}
