//! ExplorerLayer - Main Axum integration layer
//!
//! The entry point for mounting the explorer into an Axum application.

use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::api::create_api_router;
use crate::database::postgres::PostgresSource;
use crate::database::traits::TableSource;
use crate::frontend::create_frontend_router;

/// Mounts the browser client and the REST API under a base path
///
/// # Example
///
/// ```rust,no_run
/// use axum::Router;
/// use axum_pg_explorer::ExplorerLayer;
///
/// let app: Router = Router::new().merge(ExplorerLayer::postgres("/explorer").into_router());
/// ```
pub struct ExplorerLayer<S: TableSource> {
    base_path: String,
    source: Arc<S>,
}

impl<S: TableSource> ExplorerLayer<S> {
    /// Create a new explorer at the given base path over any table source
    pub fn new(base_path: impl Into<String>, source: S) -> Self {
        Self {
            base_path: base_path.into(),
            source: Arc::new(source),
        }
    }

    /// Convert into an Axum Router that can be merged
    ///
    /// The returned router serves the browser client at `{base_path}/` and
    /// the API at `{base_path}/api/*`, with permissive CORS for
    /// development.
    pub fn into_router(self) -> Router {
        let api_router = create_api_router(self.source.clone());
        let frontend_router = create_frontend_router(self.base_path.clone());

        Router::new()
            .nest(&format!("{}/api", self.base_path), api_router)
            .nest(&self.base_path, frontend_router)
            .layer(CorsLayer::permissive())
    }
}

impl ExplorerLayer<PostgresSource> {
    /// Create a new explorer backed by PostgreSQL
    ///
    /// Connections are opened per request from the connection string the
    /// browser supplies; the layer itself holds no database state.
    pub fn postgres(base_path: impl Into<String>) -> Self {
        Self::new(base_path, PostgresSource::new())
    }
}
