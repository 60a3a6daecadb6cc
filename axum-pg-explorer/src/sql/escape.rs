//! Identifier and literal quoting for SQL text

/// Quote an identifier (table or column name) to prevent SQL injection
///
/// PostgreSQL uses double quotes for identifiers. Any embedded double quote
/// is escaped by doubling it. Every identifier interpolated into SQL text
/// must pass through here.
pub fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Quote a literal value for interpolation into SQL text
///
/// Wraps the value in single quotes, doubling any embedded single quote.
/// Only used for the human-readable display reconstruction and the filter
/// clause; values sent to the executor use parameter binding instead.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("users"), "\"users\"");
        assert_eq!(quote_identifier("table\"name"), "\"table\"\"name\"");
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("ann"), "'ann'");
        assert_eq!(quote_literal("o'Brien"), "'o''Brien'");
        assert_eq!(quote_literal(""), "''");
    }
}
