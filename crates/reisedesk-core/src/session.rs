// ABOUTME: Defines ChatSession, the single active conversation with the squad.
// ABOUTME: A session owns its thread id and local transcript; reset swaps both.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::conversation::ChatHistory;
use crate::ids::ThreadId;

/// The active chat session. The server holds exactly one of these; the
/// session id exists for log correlation, the thread id addresses the remote
/// conversation on the agents service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub session_id: Ulid,
    pub thread_id: ThreadId,
    pub history: ChatHistory,
    pub started_at: DateTime<Utc>,
}

impl ChatSession {
    /// Create a fresh session bound to the given remote thread.
    pub fn new(thread_id: ThreadId) -> Self {
        Self {
            session_id: Ulid::new(),
            thread_id,
            history: ChatHistory::new(),
            started_at: Utc::now(),
        }
    }

    /// Point the session at a new remote thread and drop the local
    /// transcript. The old thread is not touched; it simply becomes
    /// unreachable from here.
    pub fn reset(&mut self, thread_id: ThreadId) {
        self.thread_id = thread_id;
        self.history.clear();
        self.started_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_empty() {
        let session = ChatSession::new(ThreadId::from("thread_1"));
        assert_eq!(session.thread_id, ThreadId::from("thread_1"));
        assert!(session.history.is_empty());
        assert!(session.started_at <= Utc::now());
    }

    #[test]
    fn reset_swaps_thread_and_clears_history() {
        let mut session = ChatSession::new(ThreadId::from("thread_old"));
        session
            .history
            .record("Hallo".to_string(), "Guten Tag!".to_string());
        assert_eq!(session.history.len(), 1);

        session.reset(ThreadId::from("thread_new"));
        assert_eq!(session.thread_id, ThreadId::from("thread_new"));
        assert!(session.history.is_empty());
    }

    #[test]
    fn session_ids_are_distinct() {
        let a = ChatSession::new(ThreadId::from("t1"));
        let b = ChatSession::new(ThreadId::from("t2"));
        assert_ne!(a.session_id, b.session_id);
    }
}
