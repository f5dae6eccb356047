// src/main.rs

use std::{str::FromStr, sync::Arc, time::Duration};

use forum::config::{Config, DEV_JWT_SECRET};
use forum::models::forum::ForumConfig;
use forum::routes;
use forum::state::AppState;
use forum::storage::{
    results::JsonDirSink,
    sessions::{SessionStore, SqliteSessionStore},
};
use forum::survey::{inventory::AudioInventory, validation::validate_templates};
use dotenvy::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "forum.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    if config.jwt_secret == DEV_JWT_SECRET {
        tracing::warn!("JWT_SECRET is not set, using the development secret");
    }

    // Forum definition; a broken file leaves the service up with no questions
    let forum = match ForumConfig::load(&config.forum_config) {
        Ok(forum) => {
            tracing::info!(
                "Forum config loaded: {} template(s), audio root {}",
                forum.questions.len(),
                forum.audio_root.display()
            );
            forum
        }
        Err(e) => {
            tracing::error!("Error loading forum configuration: {}", e);
            ForumConfig::default()
        }
    };

    // Scan audio and check every template against it
    let inventory = AudioInventory::scan(&forum.audio_root);
    let errors = validate_templates(&forum.questions, &inventory);
    if !errors.is_empty() {
        tracing::error!("Forum configuration validation errors:");
        for error in &errors {
            tracing::error!("- {}", error);
        }
    }

    // Session store
    let connect_options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(connect_options)
        .await?;

    tracing::info!("Session store connected...");

    let store = SqliteSessionStore::new(pool);
    tracing::info!("Running migrations...");
    store.migrate().await?;
    tracing::info!("Migrations applied successfully.");

    let sessions: Arc<dyn SessionStore> = Arc::new(store);
    spawn_session_purge(sessions.clone(), config.session_ttl);

    std::fs::create_dir_all(&config.results_dir)?;

    // Create AppState
    let state = AppState {
        config: config.clone(),
        forum: Arc::new(forum),
        inventory: Arc::new(inventory),
        sessions,
        results: Arc::new(JsonDirSink::new(&config.results_dir)),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    // Start the server
    axum::serve(listener, app).await?;

    Ok(())
}

/// Drops sessions idle for longer than `ttl_secs`, checked every ten minutes.
fn spawn_session_purge(sessions: Arc<dyn SessionStore>, ttl_secs: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(600));
        loop {
            interval.tick().await;
            let cutoff = chrono::Utc::now().timestamp() - ttl_secs as i64;
            match sessions.purge_older_than(cutoff).await {
                Ok(0) => {}
                Ok(n) => tracing::info!("Purged {} expired session(s)", n),
                Err(e) => tracing::warn!("Session purge failed: {}", e),
            }
        }
    });
}
