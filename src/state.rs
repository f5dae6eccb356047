use std::sync::Arc;

use axum::extract::FromRef;
use uuid::Uuid;

use crate::{
    config::Config,
    error::AppError,
    models::{forum::ForumConfig, session::SessionState},
    storage::{results::ResultSink, sessions::SessionStore},
    survey::inventory::AudioInventory,
    utils::jwt::Claims,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub forum: Arc<ForumConfig>,
    /// Scanned once at startup; read-only afterwards.
    pub inventory: Arc<AudioInventory>,
    pub sessions: Arc<dyn SessionStore>,
    pub results: Arc<dyn ResultSink>,
}

impl AppState {
    /// Loads the session named by the token, requiring an established participant.
    pub async fn participant_session(&self, claims: &Claims) -> Result<(Uuid, SessionState), AppError> {
        let id = claims.session_id()?;
        let state = self
            .sessions
            .load(id)
            .await?
            .filter(|s| s.participant.is_some())
            .ok_or_else(|| AppError::AuthError("No participant session found".to_string()))?;
        Ok((id, state))
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
