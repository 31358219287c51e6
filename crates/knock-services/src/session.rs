//! Session store with one live session token per client identity.
//!
//! The whole table sits behind a single async mutex. Every operation holds
//! it for O(1) work, except `sweep`, which walks the table once.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use knock_core::token::{session_token, TokenError};

#[derive(Debug)]
struct SessionEntry {
    token: String,
    last_active: Instant,
}

/// Shared session table. Clones refer to the same table.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, SessionEntry>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new token for `identity`, replacing any existing session.
    pub async fn create(&self, identity: &str) -> Result<String, TokenError> {
        let token = session_token()?;
        let entry = SessionEntry {
            token: token.clone(),
            last_active: Instant::now(),
        };
        self.sessions.lock().await.insert(identity.to_string(), entry);
        Ok(token)
    }

    /// Current token for `identity`, if any. A hit counts as activity.
    pub async fn lookup(&self, identity: &str) -> Option<String> {
        let mut sessions = self.sessions.lock().await;
        let entry = sessions.get_mut(identity)?;
        entry.last_active = Instant::now();
        Some(entry.token.clone())
    }

    /// Drop sessions idle for longer than `max_idle`. Returns how many went.
    pub async fn sweep(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, entry| now.duration_since(entry.last_active) <= max_idle);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}
