//! Chat transcript

use uuid::Uuid;

use crate::formatter::FormattedMessage;

pub const THINKING_TEXT: &str = "Thinking...";
pub const WORKFLOW_STARTING_TEXT: &str = "Starting workflow analysis...";
pub const NO_RESPONSE_TEXT: &str = "No response";
pub const UNKNOWN_ERROR_TEXT: &str = "Unknown error";
pub const CONNECTION_ERROR_TEXT: &str =
    "Error connecting to backend. Please check if the server is running.";
pub const RUN_IN_PROGRESS_TEXT: &str =
    "A workflow run is already in progress. Wait for it to finish before starting another.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Agent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatBubble {
    pub id: Uuid,
    pub role: ChatRole,
    pub text: String,
    /// Placeholder shown while a request is in flight.
    pub loading: bool,
    /// Agent replies are formatted; user text and placeholders are shown raw.
    pub formatted: Option<FormattedMessage>,
}

impl ChatBubble {
    fn new(role: ChatRole, text: &str, loading: bool) -> Self {
        let formatted =
            (role == ChatRole::Agent && !loading).then(|| FormattedMessage::parse(text));
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.to_string(),
            loading,
            formatted,
        }
    }

    pub fn speaker(&self) -> &'static str {
        match self.role {
            ChatRole::User => "You",
            ChatRole::Agent => "Agent",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatTranscript {
    bubbles: Vec<ChatBubble>,
    /// Lines scrolled up from the bottom; 0 follows new messages.
    pub scroll_back: u16,
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, bubble: ChatBubble) -> Uuid {
        let id = bubble.id;
        self.bubbles.push(bubble);
        self.scroll_back = 0;
        id
    }

    pub fn push_user(&mut self, text: &str) -> Uuid {
        self.push(ChatBubble::new(ChatRole::User, text, false))
    }

    pub fn push_agent(&mut self, text: &str) -> Uuid {
        self.push(ChatBubble::new(ChatRole::Agent, text, false))
    }

    pub fn push_loading(&mut self) -> Uuid {
        self.push(ChatBubble::new(ChatRole::Agent, THINKING_TEXT, true))
    }

    /// Remove a bubble by id. Removing an unknown id is a no-op.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.bubbles.len();
        self.bubbles.retain(|b| b.id != id);
        self.bubbles.len() != before
    }

    pub fn bubbles(&self) -> &[ChatBubble] {
        &self.bubbles
    }

    pub fn last(&self) -> Option<&ChatBubble> {
        self.bubbles.last()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    pub fn is_waiting(&self) -> bool {
        self.bubbles.iter().any(|b| b.loading)
    }

    /// `You: ...` / `Agent: ...` lines for plain-text output.
    pub fn transcript_lines(&self) -> Vec<String> {
        self.bubbles
            .iter()
            .map(|b| format!("{}: {}", b.speaker(), b.text))
            .collect()
    }
}
