//! Literal escaping for generated SQL.
//!
//! Every string literal the renderers embed in SQL text goes through
//! [`quote_literal`]. Callers must never format user input into SQL
//! without it.

/// The SQL null literal.
pub const NULL_LITERAL: &str = "null";

/// Escape a string for use inside a single-quoted literal.
pub fn escape_string(s: &str) -> String {
    s.replace('\'', "''")
}

/// Quote a string as a single-quoted literal.
pub fn quote_literal(s: &str) -> String {
    format!("'{}'", escape_string(s))
}

/// Escape the LIKE wildcards `_` and `%`, and the backslash escape
/// character itself, with a backslash.
pub fn escape_like_wildcards(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('_', "\\_")
        .replace('%', "\\%")
}

/// Render a parenthesised, comma-joined list of quoted literals.
pub fn quote_list<'a, I>(items: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let quoted: Vec<String> = items.into_iter().map(quote_literal).collect();
    format!("({})", quoted.join(","))
}
