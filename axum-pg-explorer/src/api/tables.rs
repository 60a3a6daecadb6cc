//! Table listing endpoint

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use std::sync::Arc;

use crate::api::error_response;
use crate::database::traits::TableSource;
use crate::schema::{TableInfo, TablesRequest, TablesResponse};
use crate::Error;

/// Handler for POST /api/tables
///
/// Lists the base tables reachable through the supplied connection string.
pub async fn list_tables_handler<S: TableSource>(
    State(source): State<Arc<S>>,
    Json(request): Json<TablesRequest>,
) -> Response {
    if request.postgres_url.trim().is_empty() {
        return error_response(&Error::Validation(
            "PostgreSQL URL is required".to_string(),
        ));
    }

    match source.list_tables(&request.postgres_url).await {
        Ok(tables) => {
            let tables = tables
                .into_iter()
                .map(|table_name| TableInfo { table_name })
                .collect();
            (StatusCode::OK, Json(TablesResponse { tables })).into_response()
        }
        Err(error) => {
            tracing::error!(%error, "failed to list tables");
            error_response(&error)
        }
    }
}
