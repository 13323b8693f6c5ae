use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Label used when rendering the transcript as prompt text.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// One recorded message. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// The append-only sequence of exchanged turns for one run-session.
///
/// Owned exclusively by the controller and never persisted; it is the sole
/// piece of state distinguishing a session and is cleared only by tearing the
/// whole widget down.
#[derive(Debug, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a user turn.
    pub fn push_user(&mut self, content: String) {
        self.turns.push(Turn {
            role: Role::User,
            content,
        });
    }

    /// Record a finalized assistant turn.
    pub fn push_assistant(&mut self, content: String) {
        self.turns.push(Turn {
            role: Role::Assistant,
            content,
        });
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Content of the most recent user turn, if any.
    pub fn latest_user_content(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == Role::User)
            .map(|t| t.content.as_str())
    }

    /// Render the whole history as alternating role-labeled lines, the prompt
    /// payload for full-history mode.
    pub fn render_transcript(&self) -> String {
        self.turns
            .iter()
            .map(|t| format!("{}: {}", t.role.label(), t.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
