//! Display-only SQL token highlighting
//!
//! A pure, stateless tokenizer over SQL display text, used by the client to
//! color the query panel and history entries. It is entirely separate from
//! query compilation and has no correctness obligations beyond producing
//! tokens that concatenate back to the input.

/// Classification of one display token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Identifier,
    StringLiteral,
    Number,
    Symbol,
    Whitespace,
}

/// One token of the highlighted text, borrowing from the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

const KEYWORDS: &[&str] = &[
    "SELECT", "FROM", "WHERE", "ORDER", "BY", "LIMIT", "OFFSET", "AND", "OR", "NOT", "IN",
    "IS", "NULL", "LIKE", "ILIKE", "ASC", "DESC", "COUNT", "UPDATE", "SET", "AS",
];

/// Split SQL display text into classified tokens
pub fn tokenize(sql: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let bytes = sql.as_bytes();
    let mut start = 0;

    while start < bytes.len() {
        let rest = &sql[start..];
        let first = rest.chars().next().unwrap_or('\0');

        let (kind, length) = if first.is_whitespace() {
            (TokenKind::Whitespace, run_length(rest, char::is_whitespace))
        } else if first == '\'' {
            (TokenKind::StringLiteral, quoted_length(rest, '\''))
        } else if first == '"' {
            (TokenKind::Identifier, quoted_length(rest, '"'))
        } else if first.is_ascii_digit() {
            (
                TokenKind::Number,
                run_length(rest, |c| c.is_ascii_digit() || c == '.'),
            )
        } else if first.is_alphabetic() || first == '_' {
            let length = run_length(rest, |c| c.is_alphanumeric() || c == '_');
            let word = &rest[..length];
            let kind = if KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word)) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            };
            (kind, length)
        } else {
            (TokenKind::Symbol, first.len_utf8())
        };

        tokens.push(Token {
            kind,
            text: &sql[start..start + length],
        });
        start += length;
    }

    tokens
}

fn run_length(text: &str, matches: impl Fn(char) -> bool) -> usize {
    text.char_indices()
        .find(|&(_, c)| !matches(c))
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Length of a quoted token starting at a quote character, honoring the
/// doubled-quote escape. An unterminated quote runs to the end of input.
fn quoted_length(text: &str, quote: char) -> usize {
    let mut chars = text.char_indices().skip(1).peekable();

    while let Some((position, c)) = chars.next() {
        if c == quote {
            match chars.peek() {
                Some(&(_, next)) if next == quote => {
                    chars.next();
                }
                _ => return position + quote.len_utf8(),
            }
        }
    }

    text.len()
}
