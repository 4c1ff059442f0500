//! In-memory session store and the cookie that points into it.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::Identity;

pub const SESSION_COOKIE: &str = "sid";

/// An authenticated session
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub user_id: String,
    pub nombre: Option<String>,
    /// Role string as issued; unknown values are rejected by the role gates
    pub role: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn create(&self, identity: Identity) -> Session {
        let session = Session {
            id: Uuid::new_v4(),
            user_id: identity.user_id,
            nombre: identity.nombre,
            role: identity.role,
            expires_at: Utc::now() + self.ttl,
        };

        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session.id, session.clone());
        session
    }

    /// Fetch a live session; expired ones are evicted on sight
    pub fn get(&self, id: &Uuid) -> Option<Session> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
            match sessions.get(id) {
                Some(session) if !session.is_expired(now) => return Some(session.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        self.remove(id);
        None
    }

    pub fn remove(&self, id: &Uuid) -> Option<Session> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    /// Drop every expired session, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Find the session id in a `Cookie` request header
pub fn session_id_from_cookie_header(header: &str) -> Option<Uuid> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// `Set-Cookie` value for a new session
pub fn session_cookie(session: &Session, ttl: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        session.id,
        ttl.num_seconds()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}
