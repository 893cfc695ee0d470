use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use rand::RngCore;

/// Result of resolving a session id on a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    LoggedIn { email: String },
    LoggedOut,
}

struct Session {
    email: String,
    remember: bool,
    created: Instant,
    last_seen: Instant,
}

/// Server-side admin sessions. A session ends on logout, after
/// `idle_timeout` without a request, or, when remembered, `remember_for`
/// after it was created.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    idle_timeout: Duration,
    remember_for: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration, remember_for: Duration) -> Self {
        SessionStore {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout,
            remember_for,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start a session and return its id (64 hex chars).
    pub fn create(&self, email: &str, remember: bool) -> String {
        self.create_at(email, remember, Instant::now())
    }

    fn create_at(&self, email: &str, remember: bool, now: Instant) -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let id = hex::encode(bytes);
        self.lock().insert(
            id.clone(),
            Session {
                email: email.to_string(),
                remember,
                created: now,
                last_seen: now,
            },
        );
        id
    }

    /// Resolve `id` and refresh its idle timer.
    pub fn touch(&self, id: &str) -> SessionState {
        self.touch_at(id, Instant::now())
    }

    pub fn touch_at(&self, id: &str, now: Instant) -> SessionState {
        let mut sessions = self.lock();
        let Some(session) = sessions.get_mut(id) else {
            return SessionState::LoggedOut;
        };
        if self.expired(session, now) {
            sessions.remove(id);
            return SessionState::LoggedOut;
        }
        session.last_seen = now;
        SessionState::LoggedIn {
            email: session.email.clone(),
        }
    }

    pub fn destroy(&self, id: &str) {
        self.lock().remove(id);
    }

    /// Drop expired sessions; returns how many were removed.
    pub fn purge_idle(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, s| !self.expired(s, now));
        before - sessions.len()
    }

    fn expired(&self, session: &Session, now: Instant) -> bool {
        if session.remember {
            now.duration_since(session.created) >= self.remember_for
        } else {
            now.duration_since(session.last_seen) >= self.idle_timeout
        }
    }
}
