//! Filter condition model
//!
//! An ordered chain of column/operator/value conditions joined by AND/OR.
//! The chain compiles to a WHERE clause fragment that doubles as the
//! human-readable filter text; it is sent to the fetch boundary as trusted
//! raw SQL (the values inside it are literal-quoted, not bound).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sql::escape::{quote_identifier, quote_literal};

/// Connective joining a condition to the one before it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOp {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

impl LogicalOp {
    fn as_sql(self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        }
    }
}

/// Comparison operator of a filter condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOperator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    GtEq,
    #[serde(rename = "<=")]
    LtEq,
    #[serde(rename = "CONTAINS")]
    Contains,
    #[serde(rename = "CONTAINS-ci")]
    ContainsCi,
    #[serde(rename = "LIKE")]
    Like,
    #[serde(rename = "ILIKE")]
    Ilike,
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "NOT-IN")]
    NotIn,
    #[serde(rename = "IS-NULL")]
    IsNull,
    #[serde(rename = "IS-NOT-NULL")]
    IsNotNull,
}

impl FilterOperator {
    /// The operator keyword as it appears in the emitted SQL
    fn as_sql(self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::NotEq => "!=",
            FilterOperator::Gt => ">",
            FilterOperator::Lt => "<",
            FilterOperator::GtEq => ">=",
            FilterOperator::LtEq => "<=",
            FilterOperator::Contains | FilterOperator::Like => "LIKE",
            FilterOperator::ContainsCi | FilterOperator::Ilike => "ILIKE",
            FilterOperator::In => "IN",
            FilterOperator::NotIn => "NOT IN",
            FilterOperator::IsNull => "IS NULL",
            FilterOperator::IsNotNull => "IS NOT NULL",
        }
    }

    /// NULL tests carry no value
    pub fn is_null_test(self) -> bool {
        matches!(self, FilterOperator::IsNull | FilterOperator::IsNotNull)
    }
}

/// One column/operator/value/connective tuple in a WHERE chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    /// Opaque identity, used by the client to address conditions in the chain
    pub id: String,

    /// Column the condition applies to
    pub column: String,

    /// Comparison operator
    pub operator: FilterOperator,

    /// Free-text comparison value; ignored for NULL tests
    #[serde(default)]
    pub value: String,

    /// Connective to the previous condition; absent on the first condition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_op: Option<LogicalOp>,
}

impl FilterCondition {
    /// Create a condition with a fresh id and no connective
    pub fn new(
        column: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            column: column.into(),
            operator,
            value: value.into(),
            logical_op: None,
        }
    }

    /// Attach the connective to the previous condition
    pub fn with_logical_op(mut self, logical_op: LogicalOp) -> Self {
        self.logical_op = Some(logical_op);
        self
    }

    /// Emit this condition's SQL fragment, without any leading connective
    fn to_sql(&self) -> String {
        let column = quote_identifier(&self.column);
        let operator = self.operator.as_sql();

        match self.operator {
            FilterOperator::IsNull | FilterOperator::IsNotNull => {
                format!("{column} {operator}")
            }
            FilterOperator::In | FilterOperator::NotIn => {
                // Comma-split, trimmed, empty tokens dropped. When every
                // token drops, the degenerate empty list is emitted as-is.
                let list = self
                    .value
                    .split(',')
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(quote_literal)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{column} {operator} ({list})")
            }
            FilterOperator::Contains | FilterOperator::ContainsCi => {
                // `%` and `_` inside the value stay unescaped and act as
                // wildcards; documented limitation.
                format!(
                    "{column} {operator} {}",
                    quote_literal(&format!("%{}%", self.value))
                )
            }
            _ => format!("{column} {operator} {}", quote_literal(&self.value)),
        }
    }
}

/// Compile an ordered condition chain into a WHERE clause fragment
///
/// Empty input produces an empty string and the caller omits WHERE
/// entirely. Each condition after the first is prefixed with its own
/// connective, defaulting to AND.
pub fn compile_where(conditions: &[FilterCondition]) -> String {
    let mut clause = String::new();

    for (position, condition) in conditions.iter().enumerate() {
        if position > 0 {
            let connective = condition.logical_op.unwrap_or(LogicalOp::And);
            clause.push(' ');
            clause.push_str(connective.as_sql());
            clause.push(' ');
        }
        clause.push_str(&condition.to_sql());
    }

    clause
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_chain_is_empty_clause() {
        assert_eq!(compile_where(&[]), "");
    }

    #[test]
    fn test_first_condition_has_no_connective() {
        let conditions = vec![
            FilterCondition::new("status", FilterOperator::Eq, "active"),
            FilterCondition::new("age", FilterOperator::Gt, "30"),
        ];
        let clause = compile_where(&conditions);
        assert_eq!(clause, "\"status\" = 'active' AND \"age\" > '30'");
        assert!(!clause.starts_with(" AND"));
    }

    #[test]
    fn test_explicit_or_connective() {
        let conditions = vec![
            FilterCondition::new("role", FilterOperator::Eq, "admin"),
            FilterCondition::new("role", FilterOperator::Eq, "owner")
                .with_logical_op(LogicalOp::Or),
        ];
        assert_eq!(
            compile_where(&conditions),
            "\"role\" = 'admin' OR \"role\" = 'owner'"
        );
    }

    #[test]
    fn test_null_tests_carry_no_value() {
        let conditions = vec![
            FilterCondition::new("deleted_at", FilterOperator::IsNull, "ignored"),
            FilterCondition::new("email", FilterOperator::IsNotNull, ""),
        ];
        assert_eq!(
            compile_where(&conditions),
            "\"deleted_at\" IS NULL AND \"email\" IS NOT NULL"
        );
    }

    #[test]
    fn test_in_splits_and_trims_tokens() {
        let conditions = vec![FilterCondition::new("name", FilterOperator::In, "a, b ,c")];
        assert_eq!(compile_where(&conditions), "\"name\" IN ('a', 'b', 'c')");
    }

    #[test]
    fn test_not_in_drops_empty_tokens() {
        let conditions = vec![FilterCondition::new("id", FilterOperator::NotIn, "1,, 2 ,")];
        assert_eq!(compile_where(&conditions), "\"id\" NOT IN ('1', '2')");
    }

    #[test]
    fn test_in_with_no_tokens_emits_empty_list() {
        // Deliberately inert; preserved rather than patched.
        let conditions = vec![FilterCondition::new("id", FilterOperator::In, " , ,")];
        assert_eq!(compile_where(&conditions), "\"id\" IN ()");
    }

    #[test]
    fn test_contains_wraps_with_wildcards_and_doubles_quotes() {
        let conditions = vec![FilterCondition::new(
            "name",
            FilterOperator::Contains,
            "o'Brien",
        )];
        assert_eq!(compile_where(&conditions), "\"name\" LIKE '%o''Brien%'");
    }

    #[test]
    fn test_contains_ci_uses_ilike() {
        let conditions = vec![FilterCondition::new("email", FilterOperator::ContainsCi, "ann")];
        assert_eq!(compile_where(&conditions), "\"email\" ILIKE '%ann%'");
    }

    #[test]
    fn test_operator_wire_tokens_round_trip() {
        let operators = [
            ("\"=\"", FilterOperator::Eq),
            ("\"CONTAINS-ci\"", FilterOperator::ContainsCi),
            ("\"NOT-IN\"", FilterOperator::NotIn),
            ("\"IS-NULL\"", FilterOperator::IsNull),
        ];
        for (token, operator) in operators {
            assert_eq!(serde_json::to_string(&operator).unwrap(), token);
            assert_eq!(
                serde_json::from_str::<FilterOperator>(token).unwrap(),
                operator
            );
        }
    }
}
