//! # cubeplan
//!
//! A query planner and SQL generator for dimensional analytics over
//! pre-aggregated, year-partitioned tables.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        AnalyticsCriteria (request parameters)            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [query builder]
//! ┌─────────────────────────────────────────────────────────┐
//! │     AnalyticsQuery (dimensions, filters, options)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [planner: items, ou level, period type, period]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Sub-queries stamped with table name and partitions     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql: time fields, subexpressions, filters]
//! ┌─────────────────────────────────────────────────────────┐
//! │                  SQL fragments                           │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod filter;
pub mod idscheme;
pub mod model;
pub mod partition;
pub mod planner;
pub mod query;
pub mod sql;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::filter::{QueryFilter, QueryOperator};
    pub use crate::idscheme::IdScheme;
    pub use crate::model::{
        AggregationType, AnalyticsPeriodBoundary, AnalyticsPeriodBoundaryType, AnalyticsTableType,
        AnalyticsType, DimensionalItem, OrgUnit, OrgUnitField, Period, PeriodType, Program,
        ProgramIndicator, QueryItem, QueryModifiers, TimeField,
    };
    pub use crate::partition::{PartitionProbe, PartitionResolver};
    pub use crate::planner::QueryPlanner;
    pub use crate::query::{AnalyticsQuery, AnalyticsQueryBuilder, Dimension};
    pub use crate::sql::{
        Dialect, EnrollmentTimeFieldSqlRenderer, EventTimeFieldSqlRenderer, Subexpression,
        SubexpressionSqlGenerator, TimeFieldSqlRenderer,
    };
}

pub use planner::QueryPlanner;
pub use query::{AnalyticsQuery, AnalyticsQueryBuilder};
pub use sql::Dialect;
