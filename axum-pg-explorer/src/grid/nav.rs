//! URL navigation state
//!
//! The selected table and current page are reflected in the address query
//! string so a reload or shared link restores the same view. Sort and
//! filters are deliberately not part of the durable address.

/// Table and page as carried in the address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavState {
    pub table: Option<String>,
    pub page: u64,
}

impl Default for NavState {
    fn default() -> Self {
        Self {
            table: None,
            page: 1,
        }
    }
}

impl NavState {
    pub fn new(table: Option<String>, page: u64) -> Self {
        Self {
            table,
            page: page.max(1),
        }
    }

    /// Render as a query string without the leading `?`
    ///
    /// No table means no durable state; the string is empty. Page 1 is the
    /// default and is omitted.
    pub fn to_query_string(&self) -> String {
        let Some(table) = &self.table else {
            return String::new();
        };

        let mut query = format!("table={}", percent_encode(table));
        if self.page > 1 {
            query.push_str(&format!("&page={}", self.page));
        }
        query
    }

    /// Parse a query string, with or without the leading `?`
    ///
    /// Unknown keys are ignored; a malformed or sub-1 page falls back to 1.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut state = Self::default();

        for pair in query.split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            match key {
                "table" => {
                    let table = percent_decode(value);
                    if !table.is_empty() {
                        state.table = Some(table);
                    }
                }
                "page" => {
                    state.page = value.parse::<u64>().unwrap_or(1).max(1);
                }
                _ => {}
            }
        }

        state
    }
}

const RESERVED: &[u8] = b"%&=+#?/ ";

fn percent_encode(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    for byte in text.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            encoded.push(byte as char);
        } else if RESERVED.contains(&byte) || !byte.is_ascii() || byte.is_ascii_control() {
            encoded.push_str(&format!("%{byte:02X}"));
        } else {
            encoded.push(byte as char);
        }
    }
    encoded
}

fn percent_decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let Some(byte) = text
                .get(i + 1..i + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            {
                decoded.push(byte);
                i += 3;
                continue;
            }
            decoded.push(b'%');
            i += 1;
        } else if bytes[i] == b'+' {
            decoded.push(b' ');
            i += 1;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8_lossy(&decoded).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let state = NavState::new(Some("users".to_string()), 3);
        let query = state.to_query_string();
        assert_eq!(query, "table=users&page=3");
        assert_eq!(NavState::parse(&query), state);
    }

    #[test]
    fn test_page_one_is_omitted() {
        let state = NavState::new(Some("users".to_string()), 1);
        assert_eq!(state.to_query_string(), "table=users");
    }

    #[test]
    fn test_no_table_means_empty_query() {
        assert_eq!(NavState::default().to_query_string(), "");
    }

    #[test]
    fn test_parse_tolerates_noise() {
        let state = NavState::parse("?theme=dark&table=users&page=oops&x");
        assert_eq!(state.table.as_deref(), Some("users"));
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_table_name_with_reserved_characters() {
        let state = NavState::new(Some("order items & totals".to_string()), 2);
        let query = state.to_query_string();
        assert!(!query.contains(' '));
        assert_eq!(NavState::parse(&query), state);
    }

    #[test]
    fn test_page_clamped_to_one() {
        assert_eq!(NavState::parse("table=users&page=0").page, 1);
        assert_eq!(NavState::new(Some("t".to_string()), 0).page, 1);
    }
}
