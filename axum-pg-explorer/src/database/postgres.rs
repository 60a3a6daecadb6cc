//! PostgreSQL table source implementation
//!
//! Every call opens a fresh connection from the caller-supplied connection
//! string and releases it on every exit path. Connection failures and
//! query failures are classified separately so the client can tell them
//! apart; both surface the driver message verbatim.

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Connection, Executor, PgConnection, Postgres, Row, TypeInfo};

use crate::database::traits::{CellUpdate, PageRequest, TableSource};
use crate::schema::TableData;
use crate::sql::compile::{compile, count_query, Pagination, SqlParam};
use crate::sql::escape::quote_identifier;
use crate::{Error, Result};

/// Stateless PostgreSQL fetch boundary
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresSource;

impl PostgresSource {
    pub fn new() -> Self {
        Self
    }

    async fn connect(postgres_url: &str) -> Result<PgConnection> {
        PgConnection::connect(postgres_url)
            .await
            .map_err(|error| Error::Connection(error.to_string()))
    }

    /// Best-effort close; a failure to release an already-used connection
    /// is logged, not re-raised.
    async fn close(connection: PgConnection) {
        if let Err(error) = connection.close().await {
            tracing::warn!(%error, "failed to close connection");
        }
    }

    async fn list_tables_with(connection: &mut PgConnection) -> Result<Vec<String>> {
        let query = r#"
            SELECT table_name
            FROM information_schema.tables
            WHERE table_schema = 'public'
              AND table_type = 'BASE TABLE'
            ORDER BY table_name
        "#;

        let rows = sqlx::query(query)
            .fetch_all(&mut *connection)
            .await
            .map_err(query_error)?;

        rows.iter()
            .map(|row| row.try_get("table_name").map_err(query_error))
            .collect()
    }

    async fn fetch_page_with(
        connection: &mut PgConnection,
        request: &PageRequest,
    ) -> Result<TableData> {
        let pagination = Pagination::new(request.page, request.limit);
        let compiled = compile(
            &request.table,
            &request.where_clause,
            &request.sort,
            &pagination,
        );

        // Count and data always run together against the same predicate;
        // if either fails the whole fetch fails.
        let count_sql = count_query(&request.table, &request.where_clause);
        let total_rows: i64 = sqlx::query_scalar(&count_sql)
            .fetch_one(&mut *connection)
            .await
            .map_err(query_error)?;

        let mut query = sqlx::query(&compiled.sql);
        for param in &compiled.params {
            query = match param {
                SqlParam::Int(value) => query.bind(*value),
                SqlParam::Text(value) => query.bind(value.clone()),
            };
        }
        let rows = query
            .fetch_all(&mut *connection)
            .await
            .map_err(query_error)?;

        // An empty page past the end still needs its column headers.
        let columns: Vec<String> = match rows.first() {
            Some(row) => row.columns().iter().map(|c| c.name().to_string()).collect(),
            None => connection
                .describe(&compiled.sql)
                .await
                .map_err(query_error)?
                .columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
        };

        let mut data_rows = Vec::with_capacity(rows.len());
        for row in &rows {
            data_rows.push(Self::row_values(row)?);
        }

        tracing::debug!(
            table = %request.table,
            page = request.page,
            rows = data_rows.len(),
            total = total_rows,
            "fetched page"
        );

        Ok(TableData {
            columns,
            rows: data_rows,
            total_rows: total_rows as u64,
            query: compiled.display_sql,
        })
    }

    async fn update_cell_with(connection: &mut PgConnection, update: &CellUpdate) -> Result<()> {
        // Re-derive the page the client was looking at and match the whole
        // row by value. No primary key is required; duplicate rows make
        // the update hit every duplicate.
        let pagination = Pagination::new(update.page, update.limit);
        let select = format!(
            "SELECT * FROM {} LIMIT $1 OFFSET $2",
            quote_identifier(&update.table)
        );
        let rows = sqlx::query(&select)
            .bind(pagination.limit() as i64)
            .bind(pagination.offset() as i64)
            .fetch_all(&mut *connection)
            .await
            .map_err(query_error)?;

        if update.row_index >= rows.len() {
            return Err(Error::StaleRow {
                row_index: update.row_index,
                rows_on_page: rows.len(),
            });
        }
        let row = &rows[update.row_index];

        let target = row
            .columns()
            .iter()
            .find(|column| column.name() == update.column)
            .ok_or_else(|| {
                Error::Query(format!("column \"{}\" does not exist", update.column))
            })?;
        let target_type = target.type_info().name().to_string();

        // Equality conjunction over every column. NULL cells match with IS
        // NULL; non-null cells compare on their text rendering so a single
        // text parameter type covers every column type.
        let mut clauses = Vec::with_capacity(row.columns().len());
        let mut matches: Vec<String> = Vec::new();
        for (index, column) in row.columns().iter().enumerate() {
            let quoted = quote_identifier(column.name());
            let value = Self::extract_value(row, index)?;
            if value.is_null() {
                clauses.push(format!("{quoted} IS NULL"));
            } else {
                matches.push(value_text(&value));
                clauses.push(format!("{quoted}::text = ${}", matches.len()));
            }
        }

        let set_clause = match &update.new_value {
            None => format!("{} = NULL", quote_identifier(&update.column)),
            Some(_) => format!(
                "{} = ${}",
                quote_identifier(&update.column),
                matches.len() + 1
            ),
        };

        let statement = format!(
            "UPDATE {} SET {} WHERE {}",
            quote_identifier(&update.table),
            set_clause,
            clauses.join(" AND ")
        );

        let mut query = sqlx::query(&statement);
        for text in &matches {
            query = query.bind(text.clone());
        }
        if let Some(text) = &update.new_value {
            query = bind_typed(query, &target_type, text)?;
        }

        let result = query
            .execute(&mut *connection)
            .await
            .map_err(query_error)?;
        tracing::debug!(
            table = %update.table,
            column = %update.column,
            rows_affected = result.rows_affected(),
            "cell update executed"
        );
        Ok(())
    }

    /// Decode one row into position-aligned JSON values
    fn row_values(row: &PgRow) -> Result<Vec<serde_json::Value>> {
        (0..row.columns().len())
            .map(|index| Self::extract_value(row, index))
            .collect()
    }

    /// Decode a single column by its reported type name
    fn extract_value(row: &PgRow, index: usize) -> Result<serde_json::Value> {
        use serde_json::Value;

        let type_name = row.columns()[index].type_info().name();

        let value = match type_name {
            "BOOL" => {
                let value: Option<bool> = row.try_get(index).map_err(query_error)?;
                value.map(Value::Bool).unwrap_or(Value::Null)
            }
            "INT2" => {
                let value: Option<i16> = row.try_get(index).map_err(query_error)?;
                value.map(|v| Value::Number(v.into())).unwrap_or(Value::Null)
            }
            "INT4" => {
                let value: Option<i32> = row.try_get(index).map_err(query_error)?;
                value.map(|v| Value::Number(v.into())).unwrap_or(Value::Null)
            }
            "INT8" => {
                let value: Option<i64> = row.try_get(index).map_err(query_error)?;
                value.map(|v| Value::Number(v.into())).unwrap_or(Value::Null)
            }
            "FLOAT4" => {
                let value: Option<f32> = row.try_get(index).map_err(query_error)?;
                value
                    .and_then(|v| serde_json::Number::from_f64(v as f64))
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
            "FLOAT8" => {
                let value: Option<f64> = row.try_get(index).map_err(query_error)?;
                value
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
            "TEXT" | "VARCHAR" | "CHAR" | "NAME" | "BPCHAR" => {
                let value: Option<String> = row.try_get(index).map_err(query_error)?;
                value.map(Value::String).unwrap_or(Value::Null)
            }
            "BYTEA" => {
                let value: Option<Vec<u8>> = row.try_get(index).map_err(query_error)?;
                value
                    .map(|bytes| Value::String(format!("[bytea: {} bytes]", bytes.len())))
                    .unwrap_or(Value::Null)
            }
            "TIMESTAMP" => {
                let value: Option<chrono::NaiveDateTime> =
                    row.try_get(index).map_err(query_error)?;
                value
                    .map(|v| Value::String(v.format("%Y-%m-%d %H:%M:%S%.f").to_string()))
                    .unwrap_or(Value::Null)
            }
            "TIMESTAMPTZ" => {
                let value: Option<chrono::DateTime<chrono::Utc>> =
                    row.try_get(index).map_err(query_error)?;
                value
                    .map(|v| Value::String(v.format("%Y-%m-%d %H:%M:%S%.f+00").to_string()))
                    .unwrap_or(Value::Null)
            }
            "DATE" => {
                let value: Option<chrono::NaiveDate> = row.try_get(index).map_err(query_error)?;
                value.map(|v| Value::String(v.to_string())).unwrap_or(Value::Null)
            }
            "TIME" => {
                let value: Option<chrono::NaiveTime> = row.try_get(index).map_err(query_error)?;
                value.map(|v| Value::String(v.to_string())).unwrap_or(Value::Null)
            }
            "JSON" | "JSONB" => {
                let value: Option<Value> = row.try_get(index).map_err(query_error)?;
                value.unwrap_or(Value::Null)
            }
            "UUID" => {
                let value: Option<uuid::Uuid> = row.try_get(index).map_err(query_error)?;
                value.map(|v| Value::String(v.to_string())).unwrap_or(Value::Null)
            }
            _ => {
                // NUMERIC and exotic types: a text decode when the driver
                // allows it, NULL otherwise.
                let value: Option<String> = row.try_get(index).ok().flatten();
                value.map(Value::String).unwrap_or(Value::Null)
            }
        };

        Ok(value)
    }
}

#[async_trait]
impl TableSource for PostgresSource {
    async fn list_tables(&self, postgres_url: &str) -> Result<Vec<String>> {
        let mut connection = Self::connect(postgres_url).await?;
        let result = Self::list_tables_with(&mut connection).await;
        Self::close(connection).await;
        result
    }

    async fn fetch_page(&self, postgres_url: &str, request: &PageRequest) -> Result<TableData> {
        let mut connection = Self::connect(postgres_url).await?;
        let result = Self::fetch_page_with(&mut connection, request).await;
        Self::close(connection).await;
        result
    }

    async fn update_cell(&self, postgres_url: &str, update: &CellUpdate) -> Result<()> {
        let mut connection = Self::connect(postgres_url).await?;
        let result = Self::update_cell_with(&mut connection, update).await;
        Self::close(connection).await;
        result
    }
}

fn query_error(error: sqlx::Error) -> Error {
    Error::Query(error.to_string())
}

/// Text rendering of a decoded cell, mirroring `::text` output for the
/// types the grid edits
fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Bind the typed form of the user's text to the update's SET placeholder
///
/// The target column's reported type decides the parse; a failed parse is
/// a validation error caught before the statement runs.
fn bind_typed<'q>(
    query: Query<'q, Postgres, PgArguments>,
    type_name: &str,
    text: &str,
) -> Result<Query<'q, Postgres, PgArguments>> {
    let query = match type_name {
        "BOOL" => query.bind(parse_value::<bool>(text, "boolean")?),
        "INT2" | "INT4" | "INT8" => query.bind(parse_value::<i64>(text, "integer")?),
        "FLOAT4" | "FLOAT8" | "NUMERIC" => query.bind(parse_value::<f64>(text, "numeric")?),
        "UUID" => query.bind(parse_value::<uuid::Uuid>(text, "uuid")?),
        "TIMESTAMP" => query.bind(parse_timestamp(text)?),
        "TIMESTAMPTZ" => query.bind(parse_timestamptz(text)?),
        "DATE" => query.bind(parse_value::<chrono::NaiveDate>(text, "date")?),
        "TIME" => query.bind(parse_value::<chrono::NaiveTime>(text, "time")?),
        "JSON" | "JSONB" => {
            let value: serde_json::Value = serde_json::from_str(text)
                .map_err(|_| Error::Validation(format!("invalid json value: {text}")))?;
            query.bind(value)
        }
        _ => query.bind(text.to_string()),
    };
    Ok(query)
}

fn parse_value<T: std::str::FromStr>(text: &str, kind: &str) -> Result<T> {
    text.parse()
        .map_err(|_| Error::Validation(format!("invalid {kind} value: {text}")))
}

fn parse_timestamp(text: &str) -> Result<chrono::NaiveDateTime> {
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(value) = chrono::NaiveDateTime::parse_from_str(text, format) {
            return Ok(value);
        }
    }
    Err(Error::Validation(format!("invalid timestamp value: {text}")))
}

fn parse_timestamptz(text: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    if let Ok(value) = text.parse::<chrono::DateTime<chrono::Utc>>() {
        return Ok(value);
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
        if let Ok(value) = chrono::DateTime::parse_from_str(text, format) {
            return Ok(value.with_timezone(&chrono::Utc));
        }
    }
    Err(Error::Validation(format!(
        "invalid timestamptz value: {text}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_text_rendering() {
        assert_eq!(value_text(&serde_json::json!("ann")), "ann");
        assert_eq!(value_text(&serde_json::json!(42)), "42");
        assert_eq!(value_text(&serde_json::json!(true)), "true");
        assert_eq!(value_text(&serde_json::json!(1.5)), "1.5");
    }

    #[test]
    fn test_bind_typed_rejects_malformed_values() {
        let error = bind_typed(sqlx::query("SELECT 1"), "INT4", "not-a-number")
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(error, Error::Validation(_)));

        let error = bind_typed(sqlx::query("SELECT 1"), "BOOL", "maybe")
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(error, Error::Validation(_)));

        let error = bind_typed(sqlx::query("SELECT 1"), "UUID", "1234")
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(error, Error::Validation(_)));
    }

    #[test]
    fn test_bind_typed_accepts_wellformed_values() {
        assert!(bind_typed(sqlx::query("SELECT 1"), "INT8", "42").is_ok());
        assert!(bind_typed(sqlx::query("SELECT 1"), "BOOL", "true").is_ok());
        assert!(bind_typed(sqlx::query("SELECT 1"), "TEXT", "anything at all").is_ok());
        assert!(bind_typed(sqlx::query("SELECT 1"), "JSONB", "{\"a\": 1}").is_ok());
        assert!(bind_typed(
            sqlx::query("SELECT 1"),
            "UUID",
            "67e55044-10b1-426f-9247-bb680e5fe0c8"
        )
        .is_ok());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-06-01 12:30:00").is_ok());
        assert!(parse_timestamp("2024-06-01T12:30:00.25").is_ok());
        assert!(parse_timestamp("yesterday").is_err());

        assert!(parse_timestamptz("2024-06-01 12:30:00+00").is_ok());
        assert!(parse_timestamptz("2024-06-01T12:30:00Z").is_ok());
        assert!(parse_timestamptz("2024-06-01").is_err());
    }
}
