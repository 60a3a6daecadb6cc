//! Paged row fetching endpoint

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use std::sync::Arc;

use crate::api::error_response;
use crate::database::traits::{PageRequest, TableSource};
use crate::schema::TableDataRequest;
use crate::sql::compile::{SortDirection, SortSpec};
use crate::Error;

/// Handler for POST /api/table-data
///
/// Returns one page of rows plus the total row count under the same
/// predicate, and the literal display form of the statement that produced
/// the page.
///
/// The optional `where_clause` is the compiled filter text and is passed
/// through as trusted raw SQL; `sort_direction` values other than exactly
/// `desc` sort ascending.
pub async fn table_data_handler<S: TableSource>(
    State(source): State<Arc<S>>,
    Json(request): Json<TableDataRequest>,
) -> Response {
    if request.postgres_url.trim().is_empty() || request.table_name.trim().is_empty() {
        return error_response(&Error::Validation(
            "PostgreSQL URL and table name are required".to_string(),
        ));
    }

    let page_request = PageRequest {
        table: request.table_name.clone(),
        page: request.page.max(1),
        limit: request.limit,
        sort: SortSpec {
            column: request.sort_column.clone(),
            direction: SortDirection::from_param(request.sort_direction.as_deref()),
        },
        where_clause: request.where_clause.unwrap_or_default(),
    };

    match source.fetch_page(&request.postgres_url, &page_request).await {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(error) => {
            tracing::error!(%error, table = %request.table_name, "failed to fetch table data");
            error_response(&error)
        }
    }
}
