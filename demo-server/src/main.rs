use axum::{http::StatusCode, routing::get, Router};
use axum_pg_explorer::ExplorerLayer;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // The explorer opens a connection per request from the string the
    // browser supplies, so the demo server needs no database of its own.
    let app = Router::new()
        .route("/", get(root_handler))
        .route("/api/health", get(health_handler))
        .merge(ExplorerLayer::postgres("/explorer").into_router())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000")
        .await
        .expect("Failed to bind to port 3000");

    tracing::info!("Server running at http://127.0.0.1:3000");
    tracing::info!("Health check at http://127.0.0.1:3000/api/health");
    tracing::info!("Explorer available at http://127.0.0.1:3000/explorer");

    axum::serve(listener, app).await.expect("Server error");
}

async fn root_handler() -> &'static str {
    "Welcome to the axum-pg-explorer demo server"
}

async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "Server is healthy")
}
