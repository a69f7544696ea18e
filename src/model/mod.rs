//! Metadata value types consumed by the planner and the SQL renderers.
//!
//! These are already-resolved metadata objects: the crate never loads or
//! persists them, it only reads them.

pub mod category;
pub mod identifiable;
pub mod item;
pub mod org_unit;
pub mod period;
pub mod program;
pub mod types;

pub use category::{CategoryCombo, CategoryError, CategoryOptionCombo, CategoryResult};
pub use identifiable::{BaseObject, Identifiable};
pub use item::{DimensionalItem, ItemSource, QueryItem, QueryModifiers, ReportingRateMetric};
pub use org_unit::{OrgUnit, OrgUnitField};
pub use period::{Period, PeriodError, PeriodType};
pub use program::{
    AnalyticsPeriodBoundary, AnalyticsPeriodBoundaryType, BoundaryTarget, Program,
    ProgramIndicator,
};
pub use types::{
    AggregationType, AnalyticsTableType, AnalyticsType, DimensionItemType, DimensionType,
    DisplayProperty, MeasureFilter, SortOrder, TimeField, TotalAggregationType, UserOrgUnitType,
    ValueType,
};
