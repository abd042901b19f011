//! Append-only session transcript.
//!
//! The transcript is the sole source of conversational context: the judge
//! classifies over a rendered tail of it and the prompt builders quote it.
//! Entries carry an explicit role discriminant and are never removed or
//! reordered.

use std::fmt;

/// Speaker of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    Human,
    Agent,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::Human => write!(f, "you"),
            Role::Agent => write!(f, "vesper"),
        }
    }
}

/// One speaker-tagged message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

/// Ordered, append-only record of the session conversation.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message. There is no removal operation by design.
    pub fn push(&mut self, role: Role, text: impl Into<String>) {
        self.entries.push(Message {
            role,
            text: text.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter()
    }

    /// The most recent human message, if any.
    pub fn last_human(&self) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|m| m.role == Role::Human)
            .map(|m| m.text.as_str())
    }

    /// Up to the last `n` entries, oldest first.
    pub fn tail(&self, n: usize) -> &[Message] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    /// Render entries as speaker-tagged lines for prompt assembly.
    pub fn render(entries: &[Message]) -> String {
        let mut out = String::new();
        for message in entries {
            out.push_str(&format!("[{}] {}\n", message.role, message.text));
        }
        out
    }
}
