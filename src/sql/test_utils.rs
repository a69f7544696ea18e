//! Test utilities for SQL emission validation.
//!
//! Provides helpers for validating that emitted SQL is syntactically correct
//! using sqlparser-rs.

use sqlparser::dialect::{DuckDbDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;

use super::dialect::Dialect;

/// Validates that a SQL string is syntactically valid for the given dialect.
///
/// ```ignore
/// use crate::sql::test_utils::validate_sql;
/// use crate::sql::dialect::Dialect;
///
/// validate_sql("select 1", Dialect::Postgres).unwrap();
/// ```
pub fn validate_sql(sql: &str, dialect: Dialect) -> Result<(), String> {
    let parser_dialect: Box<dyn sqlparser::dialect::Dialect> = match dialect {
        Dialect::Postgres => Box::new(PostgreSqlDialect {}),
        Dialect::DuckDb => Box::new(DuckDbDialect {}),
    };

    Parser::parse_sql(&*parser_dialect, sql)
        .map(|_| ())
        .map_err(|e| format!("Invalid SQL for {:?}: {}\nSQL: {}", dialect, e, sql))
}

/// Validates a predicate by wrapping it in a select against the analytics
/// table alias.
pub fn validate_predicate(predicate: &str, dialect: Dialect) -> Result<(), String> {
    validate_sql(
        &format!("select * from \"analytics\" as ax where {}", predicate),
        dialect,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_sql() {
        validate_sql("SELECT * FROM analytics", Dialect::Postgres).unwrap();
        validate_sql("SELECT * FROM analytics", Dialect::DuckDb).unwrap();
    }

    #[test]
    fn test_validate_invalid_sql() {
        let result = validate_sql("SELEC * FORM analytics", Dialect::Postgres);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_predicate() {
        validate_predicate("ax.\"pe\" = '202305'", Dialect::Postgres).unwrap();
    }
}
