//! DuckDB SQL dialect.
//!
//! DuckDB is PostgreSQL-compatible for the SQL this crate emits:
//! - ANSI identifier quoting (`"`)
//! - `ilike` support
//! - Values are cast to `double` rather than arbitrary precision numerics

use super::helpers;
use super::SqlDialect;

/// DuckDB SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct DuckDb;

impl SqlDialect for DuckDb {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn numeric_cast(&self, expr: &str) -> String {
        helpers::numeric_cast_duckdb(expr)
    }
}
