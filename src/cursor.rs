use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, SystemTime};
use uuid::Uuid;

use crate::roster::{Roster, StudentRecord};

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "portal_session";

/// Default lifetime of a session: 24 hours.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default upper bound on live sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Per-browser state: the roll number last viewed.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub current_roll: String,
    pub expires_at: SystemTime,
}

/// Session cursors keyed by session id.
///
/// Owned by the application state and handed to handlers explicitly.
/// Holds at most `max_sessions` entries; when full, a new session evicts the
/// one closest to expiry.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionState>>,
    ttl: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        SessionStore {
            sessions: RwLock::new(HashMap::new()),
            ttl,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    /// Generate a fresh, unguessable session id.
    pub fn new_session_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// The roll number this session is positioned at, if any.
    pub fn get(&self, session_id: &str) -> Option<String> {
        let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
        sessions
            .get(session_id)
            .filter(|s| s.expires_at > SystemTime::now())
            .map(|s| s.current_roll.clone())
    }

    /// Point the session at `roll_number`, creating the session if needed.
    pub fn set(&self, session_id: &str, roll_number: &str) {
        let now = SystemTime::now();
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.retain(|_, s| s.expires_at > now);

        if !sessions.contains_key(session_id) && sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, s)| s.expires_at)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                log::debug!("session store full, evicting {}", oldest);
                sessions.remove(&oldest);
            }
        }

        sessions.insert(
            session_id.to_string(),
            SessionState {
                current_roll: roll_number.to_string(),
                expires_at: now + self.ttl,
            },
        );
    }

    /// Advance the session to the record after its current one.
    ///
    /// Returns `None` without touching the cursor when the session has no
    /// cursor, the cursor names an unknown roll number, or it already sits on
    /// the last record.
    pub fn next<'r>(&self, session_id: &str, roster: &'r Roster) -> Option<&'r StudentRecord> {
        let current = self.get(session_id)?;
        let index = roster.position(&current)?;
        let next = roster.at(index + 1)?;
        self.set(session_id, &next.roll_number);
        Some(next)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        let now = SystemTime::now();
        let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
        sessions.values().filter(|s| s.expires_at > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
