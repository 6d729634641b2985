//! SQLite database for persistent storage.
//!
//! Holds forum users (role, department, linked Discord account), login
//! sessions, and the audit log of role/department changes.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use crate::error::{Result, RoleSyncError};
use crate::roles::{Department, Role};

/// A forum user as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: i64,
    pub discord_id: Option<String>,
    pub username: String,
    pub role: Role,
    pub department: Department,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Session data for an authenticated forum user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Which user field an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditField {
    Role,
    Department,
}

impl AuditField {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditField::Role => "role",
            AuditField::Department => "department",
        }
    }

    fn parse(s: &str) -> Result<Self> {
        match s {
            "role" => Ok(AuditField::Role),
            "department" => Ok(AuditField::Department),
            other => Err(RoleSyncError::Database(format!(
                "Invalid audit field: {}",
                other
            ))),
        }
    }
}

/// What caused a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeSource {
    Sync,
    Admin,
}

impl ChangeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeSource::Sync => "sync",
            ChangeSource::Admin => "admin",
        }
    }

    fn parse(s: &str) -> Result<Self> {
        match s {
            "sync" => Ok(ChangeSource::Sync),
            "admin" => Ok(ChangeSource::Admin),
            other => Err(RoleSyncError::Database(format!(
                "Invalid change source: {}",
                other
            ))),
        }
    }
}

/// Audit log entry for a role or department change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: i64,
    pub user_id: i64,
    pub actor_id: Option<i64>,
    pub field: AuditField,
    pub previous_value: String,
    pub new_value: String,
    pub source: ChangeSource,
    pub timestamp: DateTime<Utc>,
}

/// A change to apply together with its audit row.
#[derive(Debug, Clone)]
pub struct FieldChange<'a> {
    pub user_id: i64,
    pub actor_id: Option<i64>,
    pub field: AuditField,
    pub previous_value: &'a str,
    pub new_value: &'a str,
    pub source: ChangeSource,
}

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection.
    ///
    /// Creates the database file and initializes schema if needed.
    pub async fn new(path: &str) -> Result<Self> {
        let db_path = Path::new(path);

        // Create parent directories if needed
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    RoleSyncError::Database(format!("Failed to create database directory: {}", e))
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| RoleSyncError::Database(format!("Failed to connect to database: {}", e)))?;

        let db = Self { pool };
        db.initialize_schema().await?;

        Ok(db)
    }

    /// Create an in-memory database for testing.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(":memory:")
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| RoleSyncError::Database(format!("Failed to create in-memory db: {}", e)))?;

        let db = Self { pool };
        db.initialize_schema().await?;

        Ok(db)
    }

    async fn initialize_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| RoleSyncError::Database(format!("Failed to initialize schema: {}", e)))?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check if the database is healthy.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RoleSyncError::Database(format!("Health check failed: {}", e)))?;

        Ok(())
    }

    // ========== Users ==========

    /// Create a user with the default role and no department.
    pub async fn create_user(&self, username: &str, discord_id: Option<&str>) -> Result<UserRecord> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO users (discord_id, username, role, department, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(discord_id)
        .bind(username)
        .bind(Role::default().as_str())
        .bind(Department::default().as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| RoleSyncError::Database(format!("Failed to create user: {}", e)))?;

        self.get_user(result.last_insert_rowid())
            .await?
            .ok_or(RoleSyncError::UserNotFound(result.last_insert_rowid()))
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<UserRecord>> {
        let row = sqlx::query(
            "SELECT id, discord_id, username, role, department, created_at, updated_at
             FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RoleSyncError::Database(format!("Failed to get user: {}", e)))?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Write a role or department change and its audit row atomically.
    pub async fn apply_change(&self, change: &FieldChange<'_>) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let persist_err = |e: sqlx::Error| RoleSyncError::PersistFailed(e.to_string());

        let mut tx = self.pool.begin().await.map_err(persist_err)?;

        let update = match change.field {
            AuditField::Role => "UPDATE users SET role = ?, updated_at = ? WHERE id = ?",
            AuditField::Department => "UPDATE users SET department = ?, updated_at = ? WHERE id = ?",
        };
        let result = sqlx::query(update)
            .bind(change.new_value)
            .bind(&now)
            .bind(change.user_id)
            .execute(&mut *tx)
            .await
            .map_err(persist_err)?;
        if result.rows_affected() == 0 {
            return Err(RoleSyncError::UserNotFound(change.user_id));
        }

        sqlx::query(
            "INSERT INTO role_audit_log (user_id, actor_id, field, previous_value, new_value, source, timestamp)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(change.user_id)
        .bind(change.actor_id)
        .bind(change.field.as_str())
        .bind(change.previous_value)
        .bind(change.new_value)
        .bind(change.source.as_str())
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(persist_err)?;

        tx.commit().await.map_err(persist_err)?;
        Ok(())
    }

    pub async fn update_role(
        &self,
        user_id: i64,
        previous: Role,
        role: Role,
        actor_id: Option<i64>,
        source: ChangeSource,
    ) -> Result<()> {
        self.apply_change(&FieldChange {
            user_id,
            actor_id,
            field: AuditField::Role,
            previous_value: previous.as_str(),
            new_value: role.as_str(),
            source,
        })
        .await
    }

    pub async fn update_department(
        &self,
        user_id: i64,
        previous: Department,
        department: Department,
        actor_id: Option<i64>,
        source: ChangeSource,
    ) -> Result<()> {
        self.apply_change(&FieldChange {
            user_id,
            actor_id,
            field: AuditField::Department,
            previous_value: previous.as_str(),
            new_value: department.as_str(),
            source,
        })
        .await
    }

    /// Audit entries for a user, newest first.
    pub async fn get_audit_log(&self, user_id: i64, limit: u32) -> Result<Vec<AuditEntry>> {
        let rows = sqlx::query(
            "SELECT id, user_id, actor_id, field, previous_value, new_value, source, timestamp
             FROM role_audit_log WHERE user_id = ?
             ORDER BY id DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RoleSyncError::Database(format!("Failed to get audit log: {}", e)))?;

        rows.iter()
            .map(|row| {
                Ok(AuditEntry {
                    id: row.get("id"),
                    user_id: row.get("user_id"),
                    actor_id: row.get("actor_id"),
                    field: AuditField::parse(row.get("field"))?,
                    previous_value: row.get("previous_value"),
                    new_value: row.get("new_value"),
                    source: ChangeSource::parse(row.get("source"))?,
                    timestamp: parse_timestamp(row.get("timestamp"))?,
                })
            })
            .collect()
    }

    // ========== Sessions ==========

    pub async fn create_session(&self, session: &Session) -> Result<()> {
        sqlx::query(
            "INSERT INTO sessions (id, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&session.id)
        .bind(session.user_id)
        .bind(session.created_at.to_rfc3339())
        .bind(session.expires_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RoleSyncError::Database(format!("Failed to create session: {}", e)))?;

        Ok(())
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        let row =
            sqlx::query("SELECT id, user_id, created_at, expires_at FROM sessions WHERE id = ?")
                .bind(session_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RoleSyncError::Database(format!("Failed to get session: {}", e)))?;

        match row {
            Some(row) => Ok(Some(Session {
                id: row.get("id"),
                user_id: row.get("user_id"),
                created_at: parse_timestamp(row.get("created_at"))?,
                expires_at: parse_timestamp(row.get("expires_at"))?,
            })),
            None => Ok(None),
        }
    }

    /// Delete a session (logout).
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| RoleSyncError::Database(format!("Failed to delete session: {}", e)))?;

        Ok(())
    }

    /// Delete expired sessions, returning how many were removed.
    pub async fn cleanup_expired_sessions(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| RoleSyncError::Database(format!("Failed to cleanup sessions: {}", e)))?;

        Ok(result.rows_affected())
    }
}

fn user_from_row(row: &SqliteRow) -> Result<UserRecord> {
    // Role and department columns are converted to closed types here; a
    // stray value is an error, not a silent default.
    let role: String = row.get("role");
    let department: String = row.get("department");

    Ok(UserRecord {
        id: row.get("id"),
        discord_id: row.get("discord_id"),
        username: row.get("username"),
        role: role.parse()?,
        department: department.parse()?,
        created_at: parse_timestamp(row.get("created_at"))?,
        updated_at: parse_timestamp(row.get("updated_at"))?,
    })
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RoleSyncError::Database(format!("Invalid timestamp: {}", e)))
}

const SCHEMA: &str = r#"
-- Forum users
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    discord_id TEXT UNIQUE,
    username TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'APPLICANT',
    department TEXT NOT NULL DEFAULT 'N_A',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Login sessions
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

-- Role and department change history
CREATE TABLE IF NOT EXISTS role_audit_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    actor_id INTEGER,
    field TEXT NOT NULL CHECK(field IN ('role', 'department')),
    previous_value TEXT NOT NULL,
    new_value TEXT NOT NULL,
    source TEXT NOT NULL CHECK(source IN ('sync', 'admin')),
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions(expires_at);
CREATE INDEX IF NOT EXISTS idx_role_audit_user ON role_audit_log(user_id, id DESC);
"#;
