//! PostgreSQL SQL dialect.
//!
//! The dialect of the analytics store:
//! - ANSI identifier quoting (`"`)
//! - `::` shorthand casts
//! - `ilike` for case-insensitive matching

use super::helpers;
use super::SqlDialect;

/// PostgreSQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn numeric_cast(&self, expr: &str) -> String {
        helpers::numeric_cast_postgres(expr)
    }
}
