// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{answers, forum, participant, session},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Public routes: forum metadata, participant registration, heartbeat.
/// * Session routes require a participant bearer token.
/// * Audio files are served straight from the audio root.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let public_routes = Router::new()
        .route("/forum", get(forum::forum_info))
        .route("/participant", post(participant::register_participant))
        .route("/heartbeat", get(forum::heartbeat));

    let session_routes = Router::new()
        .route("/session", get(session::status))
        .route("/session/begin", post(session::begin))
        .route("/questions/{index}", get(session::show_question))
        .route("/save", post(answers::save_answer))
        .route("/finish", post(answers::finish))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let audio = ServeDir::new(&state.forum.audio_root);

    Router::new()
        .nest("/api", public_routes.merge(session_routes))
        .nest_service("/audio", audio)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
