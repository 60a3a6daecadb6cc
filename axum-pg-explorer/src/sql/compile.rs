//! Query compiler
//!
//! Combines table name, filter fragment, sort spec, and pagination into a
//! single parameterized statement, together with the literal-interpolated
//! display form shown in the client and recorded in query history.

use serde::{Deserialize, Serialize};

use crate::sql::escape::{quote_identifier, quote_literal};

/// Sort order for the ORDER BY clause
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Wire values other than exactly `desc` fall back to ascending;
    /// this is policy, not an error.
    pub fn from_param(direction: Option<&str>) -> Self {
        match direction {
            Some("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Sort request; an absent column means no ORDER BY
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: Option<String>,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn by(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: Some(column.into()),
            direction,
        }
    }

    /// Flip the direction, keeping the column
    pub fn flipped(&self) -> Self {
        Self {
            column: self.column.clone(),
            direction: match self.direction {
                SortDirection::Asc => SortDirection::Desc,
                SortDirection::Desc => SortDirection::Asc,
            },
        }
    }
}

/// 1-based page window over a row set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u64,
    limit: u64,
}

impl Pagination {
    /// Clamps page to at least 1 and limit to at least 1.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }

    /// 1-based index of the first row shown on this page
    pub fn start_row(&self) -> u64 {
        self.offset() + 1
    }

    /// 1-based index of the last row shown, clamped to the total
    pub fn end_row(&self, total_rows: u64) -> u64 {
        (self.page * self.limit).min(total_rows)
    }

    /// Number of pages needed for `total_rows`
    pub fn total_pages(&self, total_rows: u64) -> u64 {
        total_rows.div_ceil(self.limit)
    }
}

/// A bound parameter of a compiled statement
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
}

impl SqlParam {
    /// Literal rendering used by the display reconstruction
    fn to_literal(&self) -> String {
        match self {
            SqlParam::Int(value) => value.to_string(),
            SqlParam::Text(value) => quote_literal(value),
        }
    }
}

/// The pair of an executable parameterized statement and its literal,
/// human-readable reconstruction
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// Statement with `$k` placeholders, for the executor
    pub sql: String,

    /// Bound parameters, in placeholder order
    pub params: Vec<SqlParam>,

    /// `$k` placeholders substituted with literal values; display and
    /// history only, never re-executed
    pub display_sql: String,
}

/// Compile the page query for a table
///
/// `where_clause` is the fragment produced by
/// [`compile_where`](crate::sql::filter::compile_where); when empty, the
/// WHERE keyword is omitted. Limit and offset are always bound parameters.
pub fn compile(
    table: &str,
    where_clause: &str,
    sort: &SortSpec,
    pagination: &Pagination,
) -> CompiledQuery {
    let mut sql = format!("SELECT * FROM {}", quote_identifier(table));

    if !where_clause.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(where_clause);
    }

    if let Some(column) = &sort.column {
        sql.push_str(" ORDER BY ");
        sql.push_str(&quote_identifier(column));
        sql.push(' ');
        sql.push_str(sort.direction.as_sql());
    }

    let mut params = Vec::new();
    sql.push_str(&format!(
        " LIMIT ${} OFFSET ${}",
        params.len() + 1,
        params.len() + 2
    ));
    params.push(SqlParam::Int(pagination.limit() as i64));
    params.push(SqlParam::Int(pagination.offset() as i64));

    let display_sql = substitute_placeholders(&sql, &params);

    CompiledQuery {
        sql,
        params,
        display_sql,
    }
}

/// The row-count twin of [`compile`]
///
/// Shares the data query's filter clause so that count and page always
/// reflect the same predicate; callers recompute both together.
pub fn count_query(table: &str, where_clause: &str) -> String {
    let mut sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
    if !where_clause.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(where_clause);
    }
    sql
}

/// Replace every `$<digits>` token with the literal form of the matching
/// parameter
///
/// Purely textual; out-of-range placeholders are left untouched.
fn substitute_placeholders(sql: &str, params: &[SqlParam]) -> String {
    let mut output = String::with_capacity(sql.len());
    let mut chars = sql.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        if ch != '$' {
            output.push(ch);
            continue;
        }

        let mut end = start + 1;
        while let Some(&(position, digit)) = chars.peek() {
            if digit.is_ascii_digit() {
                end = position + digit.len_utf8();
                chars.next();
            } else {
                break;
            }
        }

        if end == start + 1 {
            // A bare `$` with no digits is not a placeholder.
            output.push(ch);
            continue;
        }

        match sql[start + 1..end].parse::<usize>() {
            Ok(index) if index >= 1 && index <= params.len() => {
                output.push_str(&params[index - 1].to_literal());
            }
            _ => output.push_str(&sql[start..end]),
        }
    }

    output
}
