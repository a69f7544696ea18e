//! SQL text generation.
//!
//! - [`escape`] - literal quoting, the one place user values are escaped
//! - [`dialect`] - SQL dialect implementations
//! - [`time_field`] - period and period-boundary predicates
//! - [`subexpression`] - pivot/shift statements for subexpressions

pub mod dialect;
pub mod escape;
pub mod subexpression;
pub mod time_field;

#[cfg(test)]
pub mod test_utils;

use crate::model::PeriodError;

// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, SqlDialect};
pub use subexpression::{Subexpression, SubexpressionItem, SubexpressionSqlGenerator};
pub use time_field::{EnrollmentTimeFieldSqlRenderer, EventTimeFieldSqlRenderer, TimeFieldSqlRenderer};

/// Alias of the analytics table in generated statements.
pub const ANALYTICS_TBL_ALIAS: &str = "ax";

/// Errors raised while rendering SQL.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("Unsupported boundary target '{0}'")]
    UnsupportedBoundary(String),

    #[error("Cannot compute boundary date of '{target}': {source}")]
    BoundaryDate {
        target: String,
        #[source]
        source: PeriodError,
    },

    #[error("Query for program indicator '{0}' has neither periods nor a date range")]
    MissingReportingRange(String),

    #[error("Subexpression '{0}' has no items")]
    EmptySubexpression(String),

    #[error("Subexpression '{0}' shifts periods but the query has none")]
    MissingPeriods(String),

    #[error("Period shift failed: {0}")]
    Period(#[from] PeriodError),
}

pub type RenderResult<T> = Result<T, RenderError>;
