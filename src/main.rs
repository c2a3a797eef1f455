use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use heymanitas::config::AppConfig;
use heymanitas::handlers;
use heymanitas::services::store::firestore::FirestoreStore;
use heymanitas::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    anyhow::ensure!(
        !config.firestore_project_id.is_empty(),
        "FIRESTORE_PROJECT_ID must be set"
    );

    tracing::info!(
        project = %config.firestore_project_id,
        database = %config.firestore_database,
        "using Firestore document store"
    );
    let store = Arc::new(FirestoreStore::new(
        config.firestore_base_url.clone(),
        config.firestore_project_id.clone(),
        config.firestore_database.clone(),
        config.firestore_api_key.clone(),
    ));

    let state = Arc::new(AppState::new(config.clone(), store));

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/session", post(handlers::session::login))
        .route("/api/session", get(handlers::session::current_session))
        .route("/api/session", delete(handlers::session::logout))
        .route(
            "/api/bookings/requests",
            get(handlers::bookings::booking_requests),
        )
        .route(
            "/api/bookings/recent",
            get(handlers::bookings::recent_bookings),
        )
        .route(
            "/api/bookings/validate",
            post(handlers::validate::validate_booking),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
