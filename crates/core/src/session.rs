use crate::types::{Session, SessionId};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

/// In-memory table of negotiated sessions, keyed by local id.
///
/// Entries are only ever inserted or evicted, never modified. With a TTL set,
/// sessions older than the TTL are invisible to `get`/`len` and are dropped
/// lazily on lookup or in bulk by `sweep_expired`.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Session>>,
    ttl: Option<Duration>,
}

impl SessionRegistry {
    /// Create a registry whose sessions never expire
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: None,
        }
    }

    /// Create a registry with a session time-to-live. A zero TTL disables expiry.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: (!ttl.is_zero()).then_some(ttl),
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Register a session for an already negotiated upstream handle and return its new local id
    pub fn create(
        &self,
        upstream_handle: Option<String>,
        capabilities: serde_json::Value,
    ) -> SessionId {
        self.register(upstream_handle, capabilities).id
    }

    /// Same as `create`, but hands back the stored session
    pub fn register(
        &self,
        upstream_handle: Option<String>,
        capabilities: serde_json::Value,
    ) -> Session {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);

        let mut id = SessionId::new();
        while sessions.contains_key(&id) {
            id = SessionId::new();
        }

        let session = Session {
            id: id.clone(),
            upstream_handle,
            capabilities,
            created_at: Utc::now(),
        };
        sessions.insert(id.clone(), session.clone());

        tracing::debug!(session_id = %id, total = sessions.len(), "Registered session");
        session
    }

    /// Look up a live session
    pub fn get(&self, id: &SessionId) -> Option<Session> {
        let session = {
            let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
            sessions.get(id).cloned()?
        };

        if self.is_expired(&session) {
            self.sessions
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(id);
            tracing::debug!(session_id = %id, "Evicted expired session on lookup");
            return None;
        }

        Some(session)
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions.values().filter(|s| !self.is_expired(s)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of stored entries, including expired ones not yet swept
    pub fn stored(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Drop every expired session, returning how many were removed
    pub fn sweep_expired(&self) -> usize {
        if self.ttl.is_none() {
            return 0;
        }

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, s| !self.is_expired(s));
        let removed = before - sessions.len();

        if removed > 0 {
            tracing::info!(removed, remaining = sessions.len(), "Swept expired sessions");
        }
        removed
    }

    fn is_expired(&self, session: &Session) -> bool {
        let Some(ttl) = self.ttl else {
            return false;
        };
        match session.age(Utc::now()).to_std() {
            Ok(age) => age >= ttl,
            // Negative age: clock moved backwards, treat as fresh
            Err(_) => false,
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
