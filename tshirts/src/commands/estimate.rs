//! `tshirts estimate`

use std::io::{BufRead, Write};

use tracing::{info, warn};

use crate::ai::{self, AiBackend};
use crate::cli::Console;
use crate::error::{Error, Result};
use crate::github::{ensure_size_labels, unestimated_issues, IssueTracker};
use crate::size::Size;

/// Outcome counts of one `estimate` run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EstimateSummary {
    pub labelled: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Label every open issue that has no `size:` label
///
/// One issue at a time. AI, validation and GitHub failures on a single
/// issue are reported and the batch moves on; [`Error::is_fatal`] ones
/// stop it.
pub async fn run<R: BufRead, W: Write>(
    tracker: &dyn IssueTracker,
    ai: &dyn AiBackend,
    console: &mut Console<R, W>,
    interactive: bool,
) -> Result<EstimateSummary> {
    let issues = unestimated_issues(tracker).await?;
    let mut summary = EstimateSummary::default();

    if issues.is_empty() {
        console.say("All issues already have size labels!")?;
        return Ok(summary);
    }

    console.say(format!("Found {} issues without size labels", issues.len()))?;
    ensure_size_labels(tracker).await?;

    for issue in &issues {
        console.say(format!("\n#{}: {}", issue.number, issue.title))?;

        let estimate = match ai::estimate(ai, issue).await {
            Ok(estimate) => estimate,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(issue = issue.number, error = %e, "estimate failed");
                console.say(format!("  Failed: {e}"))?;
                summary.failed += 1;
                continue;
            }
        };
        console.say(format!("  Estimated size: {}", estimate.size))?;
        if !estimate.rationale.is_empty() {
            console.say(format!("  {}", estimate.rationale))?;
        }

        let size = if interactive {
            match review(console, estimate.size)? {
                Some(size) => size,
                None => {
                    console.say("  Skipped")?;
                    summary.skipped += 1;
                    continue;
                }
            }
        } else {
            estimate.size
        };

        match tracker.set_size_label(issue.number, size).await {
            Ok(()) => {
                info!(issue = issue.number, %size, "labelled");
                console.say(format!("  Label added: {}", size.label()))?;
                summary.labelled += 1;
            }
            Err(e) => {
                let e = Error::from(e);
                if e.is_fatal() {
                    return Err(e);
                }
                warn!(issue = issue.number, error = %e, "labelling failed");
                console.say(format!("  Failed: {e}"))?;
                summary.failed += 1;
            }
        }
    }

    console.say(format!(
        "\nDone: {} labelled, {} skipped, {} failed",
        summary.labelled, summary.skipped, summary.failed
    ))?;
    Ok(summary)
}

/// Accept, skip or override a proposed size
fn review<R: BufRead, W: Write>(console: &mut Console<R, W>, proposed: Size) -> Result<Option<Size>> {
    match console.choose(&format!("  Apply size: {proposed}? [a]ccept, [s]kip, [c]hange"), &['a', 's', 'c'])? {
        'a' => Ok(Some(proposed)),
        's' => Ok(None),
        _ => loop {
            let answer = console.ask("  New size (XS, S, M, L, XL): ")?;
            match answer.parse::<Size>() {
                Ok(size) => return Ok(Some(size)),
                Err(e) => console.say(format!("  {e}"))?,
            }
        },
    }
}
