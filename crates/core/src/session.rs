//! Conversation session value objects.
//!
//! A [`ConversationSession`] is the persisted multi-turn record: one entry
//! per completed query, with the responder that answered it. The store that
//! serializes access per id lives in `wardline-session`.

use crate::query::ResponderKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One completed exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub query: String,
    pub answer: String,
    pub responder: ResponderKind,
    pub at: DateTime<Utc>,
}

/// An ordered multi-turn conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSession {
    pub id: SessionId,

    /// Turns in completion order.
    pub turns: Vec<Turn>,

    pub created_at: DateTime<Utc>,

    pub last_touched: DateTime<Utc>,
}

impl ConversationSession {
    pub fn new(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            turns: Vec::new(),
            created_at: now,
            last_touched: now,
        }
    }

    /// Append a completed turn.
    pub fn push_turn(
        &mut self,
        query: impl Into<String>,
        answer: impl Into<String>,
        responder: ResponderKind,
    ) {
        self.last_touched = Utc::now();
        self.turns.push(Turn {
            query: query.into(),
            answer: answer.into(),
            responder,
            at: self.last_touched,
        });
    }

    /// Whether this session has been idle longer than `ttl_secs`.
    pub fn idle_for_more_than(&self, ttl_secs: i64, now: DateTime<Utc>) -> bool {
        (now - self.last_touched).num_seconds() > ttl_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_tracks_turn_order() {
        let mut session = ConversationSession::new(SessionId::new());
        session.push_turn("q1", "a1", ResponderKind::Nursing);
        session.push_turn("q2", "a2", ResponderKind::Pharmacy);

        assert_eq!(session.turns.len(), 2);
        assert_eq!(session.turns[0].query, "q1");
        assert_eq!(session.turns[1].responder, ResponderKind::Pharmacy);
        assert!(session.last_touched >= session.created_at);
    }

    #[test]
    fn idle_detection() {
        let mut session = ConversationSession::new(SessionId::new());
        session.last_touched = Utc::now() - chrono::Duration::seconds(120);

        assert!(session.idle_for_more_than(60, Utc::now()));
        assert!(!session.idle_for_more_than(600, Utc::now()));
    }
}
