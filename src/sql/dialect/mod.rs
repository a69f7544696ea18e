//! SQL dialect definitions and formatting rules.
//!
//! The analytics store is PostgreSQL; DuckDB is supported for local
//! analysis of exported analytics tables. Both quote identifiers with `"`
//! and strings with `'`; they differ in how a value is cast to a number.
//!
//! # Usage
//!
//! ```ignore
//! use cubeplan::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::Postgres;
//! let quoted = dialect.quote_identifier("monthly");      // "monthly"
//! let cast = dialect.numeric_cast("ax.\"value\"");       // ax."value"::numeric
//! ```

mod duckdb;
pub mod helpers;
mod postgres;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use duckdb::DuckDb;
pub use postgres::Postgres;

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier and Literal Quoting
    // =========================================================================

    /// Quote an identifier (table, column, alias).
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote a string literal.
    ///
    /// All dialects use single quotes with `''` for escaping.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Format a date literal.
    fn format_date_literal(&self, date: &str) -> String {
        self.quote_string(date)
    }

    // =========================================================================
    // Casts
    // =========================================================================

    /// Cast an expression to an exact numeric type.
    fn numeric_cast(&self, expr: &str) -> String {
        format!("cast({} as numeric)", expr)
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    DuckDb,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Postgres => &Postgres,
            Dialect::DuckDb => &DuckDb,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_date_literal(&self, date: &str) -> String {
        self.dialect().format_date_literal(date)
    }

    fn numeric_cast(&self, expr: &str) -> String {
        self.dialect().numeric_cast(expr)
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "duckdb" => Ok(Dialect::DuckDb),
            other => Err(format!("Unsupported dialect: {}", other)),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}
