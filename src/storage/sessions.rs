// src/storage/sessions.rs

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{error::AppError, models::session::SessionState};

/// Key-value store for per-participant session state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: Uuid) -> Result<Option<SessionState>, AppError>;

    /// Creates or replaces the state stored under `id`.
    async fn save(&self, id: Uuid, state: &SessionState) -> Result<(), AppError>;

    async fn clear(&self, id: Uuid) -> Result<(), AppError>;

    /// Removes sessions last written before `cutoff` (unix seconds).
    /// Returns how many were removed.
    async fn purge_older_than(&self, cutoff: i64) -> Result<u64, AppError>;
}

/// Session state persisted as JSON rows in SQLite.
#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<SessionState>, AppError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT state FROM sessions WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load session {}: {:?}", id, e);
                AppError::from(e)
            })?;

        match row {
            Some((json,)) => {
                let state = serde_json::from_str(&json)
                    .map_err(|e| AppError::InternalServerError(e.to_string()))?;
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, id: Uuid, state: &SessionState) -> Result<(), AppError> {
        let json = serde_json::to_string(state)
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO sessions (id, state, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                state = excluded.state,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(id.to_string())
        .bind(json)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save session {}: {:?}", id, e);
            AppError::from(e)
        })?;

        Ok(())
    }

    async fn clear(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn purge_older_than(&self, cutoff: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE updated_at < ?1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// In-process store, used by tests and single-instance dev runs.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<Uuid, (SessionState, i64)>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<SessionState>, AppError> {
        Ok(self.sessions.read().await.get(&id).map(|(s, _)| s.clone()))
    }

    async fn save(&self, id: Uuid, state: &SessionState) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .insert(id, (state.clone(), chrono::Utc::now().timestamp()));
        Ok(())
    }

    async fn clear(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions.write().await.remove(&id);
        Ok(())
    }

    async fn purge_older_than(&self, cutoff: i64) -> Result<u64, AppError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, (_, updated_at)| *updated_at >= cutoff);
        Ok((before - sessions.len()) as u64)
    }
}
