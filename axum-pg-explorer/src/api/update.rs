//! Single-cell update endpoint

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use std::sync::Arc;

use crate::api::error_response;
use crate::database::traits::{CellUpdate, TableSource};
use crate::schema::{UpdateCellRequest, UpdateCellResponse};
use crate::Error;

/// Handler for POST /api/update-cell
///
/// Re-derives the page the client was looking at and updates the cell in
/// the row matched by whole-row value equality. A `null` new value writes
/// SQL NULL. A row index outside the re-derived page is a stale edit and
/// answers 400.
pub async fn update_cell_handler<S: TableSource>(
    State(source): State<Arc<S>>,
    Json(request): Json<UpdateCellRequest>,
) -> Response {
    if request.postgres_url.trim().is_empty()
        || request.table_name.trim().is_empty()
        || request.column_name.trim().is_empty()
    {
        return error_response(&Error::Validation("All fields are required".to_string()));
    }

    let update = CellUpdate {
        table: request.table_name.clone(),
        column: request.column_name.clone(),
        row_index: request.row_index,
        page: request.page.max(1),
        limit: request.limit,
        new_value: request.new_value,
    };

    match source.update_cell(&request.postgres_url, &update).await {
        Ok(()) => (StatusCode::OK, Json(UpdateCellResponse { success: true })).into_response(),
        Err(error) => {
            tracing::error!(
                %error,
                table = %request.table_name,
                column = %request.column_name,
                "failed to update cell"
            );
            error_response(&error)
        }
    }
}
