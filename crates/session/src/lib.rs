//! In-memory conversation session store.
//!
//! The map is guarded by an `RwLock`; each session sits behind its own
//! `Mutex`. Writes to different conversations proceed concurrently, writes
//! to the same conversation serialize, so concurrent appends interleave as
//! whole turns and never corrupt turn order.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use wardline_core::{ConversationSession, ResponderKind, SessionError, SessionId, Turn};

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<ConversationSession>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the session for `id`, creating it if absent.
    pub async fn create_or_fetch(&self, id: &SessionId) -> Arc<Mutex<ConversationSession>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(id) {
                return Arc::clone(session);
            }
        }

        let mut sessions = self.sessions.write().await;
        // Re-check: another writer may have created it between the locks.
        Arc::clone(sessions.entry(id.clone()).or_insert_with(|| {
            debug!(session = %id, "Creating conversation session");
            Arc::new(Mutex::new(ConversationSession::new(id.clone())))
        }))
    }

    /// Append a completed turn, creating the session if needed.
    pub async fn append_turn(
        &self,
        id: &SessionId,
        query: impl Into<String>,
        answer: impl Into<String>,
        responder: ResponderKind,
    ) {
        let session = self.create_or_fetch(id).await;
        let mut session = session.lock().await;
        session.push_turn(query, answer, responder);
    }

    /// A snapshot of the turns for `id`.
    pub async fn history(&self, id: &SessionId) -> Result<Vec<Turn>, SessionError> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        let session = session.lock().await;
        Ok(session.turns.clone())
    }

    /// Delete a conversation. Returns whether it existed.
    pub async fn delete(&self, id: &SessionId) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle longer than `ttl_secs`. Returns how many were
    /// removed. Callers own the schedule; the store never spawns its own
    /// sweeper.
    pub async fn sweep_idle(&self, ttl_secs: i64) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        let mut keep = HashMap::new();
        for (id, session) in sessions.drain() {
            let idle = session.lock().await.idle_for_more_than(ttl_secs, now);
            if !idle {
                keep.insert(id, session);
            }
        }
        *sessions = keep;

        let removed = before - sessions.len();
        if removed > 0 {
            debug!(removed, "Swept idle sessions");
        }
        removed
    }
}
