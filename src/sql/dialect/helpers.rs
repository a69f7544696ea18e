//! Shared helper functions for SQL dialect implementations.

use crate::sql::escape;

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: Postgres, DuckDB
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

// =============================================================================
// String Quoting
// =============================================================================

/// Quote string with single quotes (standard SQL).
/// Used by: All dialects
pub fn quote_string_single(s: &str) -> String {
    escape::quote_literal(s)
}

// =============================================================================
// Casts
// =============================================================================

/// Postgres shorthand cast (`expr::numeric`).
pub fn numeric_cast_postgres(expr: &str) -> String {
    format!("{}::numeric", expr)
}

/// DuckDB cast to a double.
pub fn numeric_cast_duckdb(expr: &str) -> String {
    format!("cast({} as double)", expr)
}
