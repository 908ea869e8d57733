// ABOUTME: Defines the chat transcript types shown in the reisedesk UI.
// ABOUTME: Each exchange pairs one user message with the squad's reply.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed turn of the conversation: what the user sent and what the
/// squad answered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    pub user: String,
    pub reply: String,
    pub at: DateTime<Utc>,
}

impl Exchange {
    /// Create a new exchange stamped with the current time.
    pub fn new(user: String, reply: String) -> Self {
        Self {
            user,
            reply,
            at: Utc::now(),
        }
    }
}

/// The chat transcript held for the active session. Exactly one entry is
/// appended per send, whether the run succeeded or failed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatHistory {
    pub exchanges: Vec<Exchange>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one exchange to the transcript.
    pub fn record(&mut self, user: String, reply: String) {
        self.exchanges.push(Exchange::new(user, reply));
    }

    pub fn clear(&mut self) {
        self.exchanges.clear();
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    pub fn latest(&self) -> Option<&Exchange> {
        self.exchanges.last()
    }
}
