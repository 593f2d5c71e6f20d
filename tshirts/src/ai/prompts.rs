//! Prompt builders, one per AI task
//!
//! Every builder is a pure function of its inputs.

use crate::github::Issue;
use crate::size::Size;

use super::conversation::Conversation;

/// Existing issues shown to the similarity check
pub const MAX_SIMILAR_CANDIDATES: usize = 50;

/// Characters of each candidate's body shown to the similarity check
pub const SIMILAR_DESCRIPTION_CHARS: usize = 200;

/// Characters of the body shown when writing a closing comment
pub const CLOSING_BODY_CHARS: usize = 500;

const NO_DESCRIPTION: &str = "(no description)";

/// First `max` characters of `text`, with `...` appended when cut
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn body_or_placeholder(body: &str) -> &str {
    if body.trim().is_empty() {
        NO_DESCRIPTION
    } else {
        body
    }
}

fn size_guide() -> String {
    Size::ALL
        .iter()
        .map(|s| format!("- {}: {}", s, s.guide()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn estimate(issue: &Issue) -> String {
    format!(
        "Analyze this GitHub issue and estimate its size using t-shirt sizing.

Issue #{number}: {title}

Description:
{body}

Size guide:
{guide}

Return the estimated size and a one or two sentence rationale.",
        number = issue.number,
        title = issue.title,
        body = body_or_placeholder(&issue.body),
        guide = size_guide(),
    )
}

pub fn breakdown(issue: &Issue) -> String {
    format!(
        "Break down this GitHub issue into smaller, actionable sub-tasks.

Issue #{number}: {title}

Description:
{body}

Create 3-7 sub-tasks that together complete this issue. Each sub-task should be:
- Independently implementable
- Small enough to complete in 1-2 days max
- Clear and specific

For each sub-task, estimate its size:
- XS: <30 min
- S: 1-2 hours
- M: half day to 1 day
- L: 2-3 days

Return the sub-tasks in the order they should be done, each with a title, a body and a size.",
        number = issue.number,
        title = issue.title,
        body = body_or_placeholder(&issue.body),
    )
}

pub fn draft(conversation: &Conversation) -> String {
    format!(
        "You are helping draft GitHub issues. Have a conversation to understand what the user wants to build.

Ask clarifying questions to understand:
- What problem this solves or what feature it adds
- Key requirements or acceptance criteria
- Any technical constraints or preferences

IMPORTANT: If the user describes multiple distinct features or capabilities, create SEPARATE issues for each one.
Each issue should be independently implementable. Never combine unrelated features into a single issue.

Conversation so far:
{history}

If you need more information, set ready=false and ask ONE focused question.
If you have enough information, set ready=true and provide the issues array (one issue per distinct feature), \
each with a title, a description, a size and a list of tasks.",
        history = conversation.transcript(),
    )
}

pub fn refine(issue: &Issue, conversation: &Conversation) -> String {
    let size = issue.size().map(|s| s.as_str()).unwrap_or("Unknown");
    let history = if conversation.is_empty() {
        "(none yet)".to_string()
    } else {
        conversation.transcript()
    };
    format!(
        "You are helping refine an existing GitHub issue so that it is clear, complete and actionable.

Issue #{number}: {title}
Current size: {size}

Current description:
{body}

Conversation so far:
{history}

Review the issue for missing requirements, unclear scope and absent acceptance criteria.
If you need more information, set ready=false and ask ONE focused question.
If you have enough information, set ready=true and provide refined_description: a complete replacement \
body in Markdown.
In both cases, list concrete suggestions for improving the issue.",
        number = issue.number,
        title = issue.title,
        body = body_or_placeholder(&issue.body),
    )
}

/// Candidates actually shown to the similarity check
pub fn similarity_candidates(existing: &[Issue]) -> &[Issue] {
    &existing[..existing.len().min(MAX_SIMILAR_CANDIDATES)]
}

pub fn similarity(title: &str, description: &str, existing: &[Issue]) -> String {
    let candidates = similarity_candidates(existing)
        .iter()
        .map(|issue| {
            format!(
                "#{}: {}\n  {}",
                issue.number,
                issue.title,
                truncate(body_or_placeholder(&issue.body), SIMILAR_DESCRIPTION_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Compare a proposed GitHub issue with the existing open issues and find related ones.

Proposed issue:
Title: {title}
Description: {description}

Existing issues:
{candidates}

For each existing issue that is related, classify the relationship:
- duplicate: describes the same work as the proposed issue
- parent: a larger issue the proposed issue would be part of
- related: overlaps or touches the same area, but is separate work
- distinct: not meaningfully related

Only include issues that are duplicate, parent or related. Return an empty list if none are.",
        description = body_or_placeholder(description),
    )
}

pub fn closing_comment(issue: &Issue, closed_sub_issues: &[Issue], reason: Option<&str>) -> String {
    let mut prompt = format!(
        "Write a short closing comment for this GitHub issue.

Issue #{number}: {title}

Description:
{body}
",
        number = issue.number,
        title = issue.title,
        body = truncate(body_or_placeholder(&issue.body), CLOSING_BODY_CHARS),
    );

    if !closed_sub_issues.is_empty() {
        prompt.push_str("\nCompleted sub-issues:\n");
        for sub in closed_sub_issues {
            prompt.push_str(&format!("- #{}: {}\n", sub.number, sub.title));
        }
    }
    if let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) {
        prompt.push_str(&format!("\nReason for closing: {reason}\n"));
    }

    prompt.push_str(
        "\nSummarize what was done in two or three sentences of Markdown. Do not invent work \
that is not mentioned above.",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::IssueState;

    fn issue(number: u64, title: &str, body: &str, labels: &[&str]) -> Issue {
        Issue {
            number,
            id: number * 100,
            title: title.to_string(),
            body: body.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            state: IssueState::Open,
            url: String::new(),
        }
    }

    #[test]
    fn test_estimate_prompt_includes_issue_and_guide() {
        let prompt = estimate(&issue(42, "Dark mode", "Add dark mode toggle to settings", &[]));
        assert!(prompt.contains("Issue #42: Dark mode"));
        assert!(prompt.contains("Add dark mode toggle to settings"));
        assert!(prompt.contains("- XL: Very large"));
    }

    #[test]
    fn test_empty_body_renders_placeholder() {
        let prompt = breakdown(&issue(1, "T", "  ", &[]));
        assert!(prompt.contains("(no description)"));
        assert!(prompt.contains("3-7 sub-tasks"));
    }

    #[test]
    fn test_draft_prompt_renders_history() {
        let conv = Conversation::starting_with("Add login").answer("Which provider?", "GitHub OAuth");
        let prompt = draft(&conv);
        assert!(prompt.contains("User: Add login\nAssistant: Which provider?\nUser: GitHub OAuth"));
        assert!(prompt.contains("SEPARATE issues"));
    }

    #[test]
    fn test_refine_prompt_shows_size() {
        let conv = Conversation::new();
        assert!(refine(&issue(1, "T", "b", &[]), &conv).contains("Current size: Unknown"));
        assert!(refine(&issue(1, "T", "b", &["size: L"]), &conv).contains("Current size: L"));
    }

    #[test]
    fn test_similarity_limits_candidates_and_truncates() {
        let long_body = "x".repeat(300);
        let existing: Vec<Issue> = (1..=60).map(|n| issue(n, "Existing", &long_body, &[])).collect();
        let prompt = similarity("New", "desc", &existing);

        assert!(prompt.contains("#50: Existing"));
        assert!(!prompt.contains("#51: Existing"));
        assert!(prompt.contains(&format!("{}...", "x".repeat(200))));
        assert!(!prompt.contains(&"x".repeat(201)));
    }

    #[test]
    fn test_closing_prompt() {
        let body = "y".repeat(600);
        let subs = vec![issue(7, "Sub one", "", &[])];
        let prompt = closing_comment(&issue(3, "Parent", &body, &[]), &subs, Some("Shipped"));
        assert!(prompt.contains(&"y".repeat(500)));
        assert!(!prompt.contains(&"y".repeat(501)));
        assert!(prompt.contains("- #7: Sub one"));
        assert!(prompt.contains("Reason for closing: Shipped"));
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("héllo", 2), "hé...");
        assert_eq!(truncate("hi", 5), "hi");
    }
}
