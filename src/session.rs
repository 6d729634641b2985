//! Session management for authenticated forum users.
//!
//! Sessions are issued by the login flow; this crate only needs to look
//! them up to identify the caller of a sync or admin action.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::database::{Database, Session};
use crate::error::Result;

/// Default session lifetime.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 7;

pub struct SessionManager {
    db: Arc<Database>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(db: Arc<Database>) -> Self {
        Self::with_ttl(db, Duration::hours(DEFAULT_SESSION_TTL_HOURS))
    }

    pub fn with_ttl(db: Arc<Database>, ttl: Duration) -> Self {
        Self { db, ttl }
    }

    /// Create a new session for an authenticated user.
    pub async fn create_session(&self, user_id: i64) -> Result<Session> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id,
            created_at: now,
            expires_at: now + self.ttl,
        };

        self.db.create_session(&session).await?;
        tracing::debug!(user_id, "Session created");
        Ok(session)
    }

    /// Get a live session by ID.
    ///
    /// Expired sessions are deleted and reported as missing.
    pub async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        let Some(session) = self.db.get_session(session_id).await? else {
            return Ok(None);
        };

        if Self::is_expired(&session) {
            self.db.delete_session(session_id).await?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.db.delete_session(session_id).await
    }

    pub async fn cleanup_expired(&self) -> Result<u64> {
        self.db.cleanup_expired_sessions().await
    }

    pub fn is_expired(session: &Session) -> bool {
        Utc::now() >= session.expires_at
    }
}
