//! REST API endpoints
//!
//! POST handlers speaking the browser client's JSON protocol. Every
//! request carries the connection string; every failure body is
//! `{ "error": "<message>" }` with the boundary message verbatim.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use axum::Router;
use std::sync::Arc;

use crate::database::traits::TableSource;
use crate::schema::ErrorResponse;
use crate::Error;

pub mod rows;
pub mod tables;
pub mod update;

pub use rows::table_data_handler;
pub use tables::list_tables_handler;
pub use update::update_cell_handler;

/// Create the API router with all endpoints
pub fn create_api_router<S: TableSource>(source: Arc<S>) -> Router {
    Router::new()
        .route("/tables", post(tables::list_tables_handler::<S>))
        .route("/table-data", post(rows::table_data_handler::<S>))
        .route("/update-cell", post(update::update_cell_handler::<S>))
        .with_state(source)
}

/// Map an error to its HTTP response
///
/// Client mistakes (missing fields, stale row index, malformed typed
/// values) are 400; connection and query failures are 500.
pub(crate) fn error_response(error: &Error) -> Response {
    let status = match error {
        Error::Validation(_) | Error::StaleRow { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}
