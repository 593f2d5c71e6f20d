//! Multi-turn conversation state for `new` and `groom`
//!
//! Each turn consumes the [`Conversation`] and returns the extended one.

/// One question from the assistant and the user's answer to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// What the user said before the assistant replied; empty when the
    /// assistant opened the conversation
    pub user: String,
    pub assistant: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    exchanges: Vec<Exchange>,
    pending: Option<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A conversation whose first message is `input`
    pub fn starting_with(input: impl Into<String>) -> Self {
        Self {
            exchanges: Vec::new(),
            pending: Some(input.into()),
        }
    }

    /// Record the assistant's `reply` to the pending input and the user's
    /// `answer` to it
    pub fn answer(mut self, reply: impl Into<String>, answer: impl Into<String>) -> Self {
        self.exchanges.push(Exchange {
            user: self.pending.take().unwrap_or_default(),
            assistant: reply.into(),
        });
        self.pending = Some(answer.into());
        self
    }

    /// Append more user input without an assistant reply in between
    pub fn follow_up(mut self, input: impl Into<String>) -> Self {
        let input = input.into();
        self.pending = Some(match self.pending.take() {
            Some(prev) => format!("{prev}\n{input}"),
            None => input,
        });
        self
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty() && self.pending.is_none()
    }

    /// `User:` / `Assistant:` lines, oldest first
    pub fn transcript(&self) -> String {
        let mut lines = Vec::new();
        for exchange in &self.exchanges {
            if !exchange.user.is_empty() {
                lines.push(format!("User: {}", exchange.user));
            }
            lines.push(format!("Assistant: {}", exchange.assistant));
        }
        if let Some(pending) = &self.pending {
            lines.push(format!("User: {pending}"));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_orders_turns() {
        let conv = Conversation::starting_with("Add dark mode")
            .answer("Which screens?", "Settings only");
        assert_eq!(
            conv.transcript(),
            "User: Add dark mode\nAssistant: Which screens?\nUser: Settings only"
        );
        assert_eq!(conv.exchanges().len(), 1);
        assert_eq!(conv.pending(), Some("Settings only"));
    }

    #[test]
    fn test_assistant_may_open() {
        let conv = Conversation::new().answer("What is unclear?", "The scope");
        assert_eq!(conv.transcript(), "Assistant: What is unclear?\nUser: The scope");
    }

    #[test]
    fn test_follow_up_joins_pending_input() {
        let conv = Conversation::starting_with("first").follow_up("second");
        assert_eq!(conv.pending(), Some("first\nsecond"));
        assert!(!conv.is_empty());
        assert!(Conversation::new().is_empty());
    }
}
