//! Period and period-boundary predicates for event and enrollment tables.
//!
//! A query is constrained in time in one of three ways, tried in order:
//!
//! 1. Its program indicator declares non-default analytics period
//!    boundaries: each boundary becomes a comparison against a boundary date
//!    computed from the reporting range.
//! 2. It has an explicit start and end date: one half-open range.
//! 3. Otherwise one half-open range per period, OR-joined.
//!
//! Ranges are always half-open, `(col >= 'start' AND col < 'end + 1 day')`,
//! so rows timestamped during the last day of a period are included once.

use chrono::NaiveDate;

use super::dialect::{Dialect, SqlDialect};
use super::{RenderError, RenderResult, ANALYTICS_TBL_ALIAS};
use crate::model::{AnalyticsPeriodBoundary, AnalyticsTableType, BoundaryTarget, ProgramIndicator, TimeField};
use crate::query::AnalyticsQuery;

/// Alias of the event table in `exists` sub-selects.
const EVENT_TBL_ALIAS: &str = "ev";

/// Renders the time predicate of event and enrollment queries.
pub trait TimeFieldSqlRenderer {
    fn dialect(&self) -> Dialect;

    /// Column used when the query selects no (allowed) time field.
    fn default_column(&self) -> &'static str;

    /// Time fields a query may select.
    fn allowed_time_fields(&self) -> &'static [TimeField];

    /// Column compared against a boundary date.
    fn boundary_column(&self, target: &BoundaryTarget) -> RenderResult<String>;

    /// Predicate for non-default program indicator boundaries.
    fn boundary_condition(&self, query: &AnalyticsQuery, indicator: &ProgramIndicator) -> RenderResult<String>;

    /// The column holding the query's time field.
    fn time_column(&self, query: &AnalyticsQuery) -> &'static str {
        query
            .time_field()
            .filter(|field| self.allowed_time_fields().contains(field))
            .map(|field| field.column())
            .unwrap_or_else(|| self.default_column())
    }

    /// `ax."<column>"`.
    fn qualified(&self, column: &str) -> String {
        format!("{}.{}", ANALYTICS_TBL_ALIAS, self.dialect().quote_identifier(column))
    }

    /// `(col >= 'start' AND col < 'end')`, with `end` exclusive.
    fn date_range(&self, column: &str, start: NaiveDate, end_exclusive: NaiveDate) -> String {
        let dialect = self.dialect();
        format!(
            "({col} >= {start} AND {col} < {end})",
            col = column,
            start = dialect.format_date_literal(&start.to_string()),
            end = dialect.format_date_literal(&end_exclusive.to_string()),
        )
    }

    /// The time predicate of the query; empty when the query is not
    /// constrained in time.
    fn render_period_time_field_sql(&self, query: &AnalyticsQuery) -> RenderResult<String> {
        if let Some(indicator) = query
            .program_indicator()
            .filter(|pi| pi.has_non_default_boundaries())
        {
            let condition = self.boundary_condition(query, indicator)?;
            if !condition.is_empty() {
                return Ok(condition);
            }
        }

        let column = self.qualified(self.time_column(query));

        if let (Some(start), Some(end)) = (query.start_date(), query.end_date()) {
            return Ok(self.date_range(&column, start, day_after(end)?));
        }

        let mut ranges = Vec::new();
        for period in query.all_periods() {
            ranges.push(self.date_range(&column, period.start_date(), day_after(period.end_date())?));
        }

        Ok(match ranges.len() {
            0 => String::new(),
            1 => ranges.remove(0),
            _ => format!("({})", ranges.join(" OR ")),
        })
    }

    /// `<column> <op> '<date>'` for one boundary.
    fn render_boundary(
        &self,
        column: &str,
        boundary: &AnalyticsPeriodBoundary,
        (start, end): (NaiveDate, NaiveDate),
    ) -> RenderResult<String> {
        let date = boundary
            .boundary_date(start, end)
            .map_err(|source| RenderError::BoundaryDate {
                target: boundary.boundary_target.clone(),
                source,
            })?;
        Ok(format!(
            "{} {} {}",
            column,
            boundary.sql_operator(),
            self.dialect().format_date_literal(&date.to_string())
        ))
    }
}

fn day_after(date: NaiveDate) -> RenderResult<NaiveDate> {
    Ok(crate::model::PeriodType::Daily.shift_date(date, 1)?)
}

/// The reporting range boundary dates are computed from: the earliest
/// period start to the latest period end, or the explicit dates.
fn reporting_range(query: &AnalyticsQuery, indicator: &ProgramIndicator) -> RenderResult<(NaiveDate, NaiveDate)> {
    match (query.earliest_start_date(), query.latest_end_date()) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(RenderError::MissingReportingRange(indicator.uid().to_string())),
    }
}

fn common_boundary_column(target: &BoundaryTarget, dialect: Dialect) -> RenderResult<String> {
    let column = match target {
        BoundaryTarget::EnrollmentDate => TimeField::EnrollmentDate.column().to_string(),
        BoundaryTarget::ScheduledDate => TimeField::ScheduledDate.column().to_string(),
        BoundaryTarget::DataElement { data_element, .. } => data_element.clone(),
        BoundaryTarget::Attribute(attribute) => attribute.clone(),
        BoundaryTarget::Unknown(target) => {
            return Err(RenderError::UnsupportedBoundary(target.clone()))
        }
        other => return Err(RenderError::UnsupportedBoundary(format!("{:?}", other))),
    };
    Ok(format!("{}.{}", ANALYTICS_TBL_ALIAS, dialect.quote_identifier(&column)))
}

// =============================================================================
// Event
// =============================================================================

/// Time predicates against event tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventTimeFieldSqlRenderer {
    dialect: Dialect,
}

impl EventTimeFieldSqlRenderer {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

const EVENT_TIME_FIELDS: [TimeField; 7] = [
    TimeField::EventDate,
    TimeField::EnrollmentDate,
    TimeField::IncidentDate,
    TimeField::ScheduledDate,
    TimeField::CompletedDate,
    TimeField::Created,
    TimeField::LastUpdated,
];

impl TimeFieldSqlRenderer for EventTimeFieldSqlRenderer {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn default_column(&self) -> &'static str {
        TimeField::EventDate.column()
    }

    fn allowed_time_fields(&self) -> &'static [TimeField] {
        &EVENT_TIME_FIELDS
    }

    fn boundary_column(&self, target: &BoundaryTarget) -> RenderResult<String> {
        match target {
            BoundaryTarget::EventDate => Ok(self.qualified(TimeField::EventDate.column())),
            BoundaryTarget::IncidentDate => Ok(self.qualified(TimeField::IncidentDate.column())),
            other => common_boundary_column(other, self.dialect),
        }
    }

    /// Every boundary except program stage boundaries, AND-joined. Event
    /// date boundaries constrain the event itself.
    fn boundary_condition(&self, query: &AnalyticsQuery, indicator: &ProgramIndicator) -> RenderResult<String> {
        let range = reporting_range(query, indicator)?;
        let conditions = indicator
            .analytics_period_boundaries
            .iter()
            .filter(|b| !b.is_enrollment_having_event_date_cohort_boundary())
            .map(|b| self.render_boundary(&self.boundary_column(&b.target())?, b, range))
            .collect::<RenderResult<Vec<_>>>()?;
        Ok(conditions.join(" AND "))
    }
}

// =============================================================================
// Enrollment
// =============================================================================

/// Time predicates against enrollment tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnrollmentTimeFieldSqlRenderer {
    dialect: Dialect,
}

impl EnrollmentTimeFieldSqlRenderer {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// One `exists` sub-select per program stage with event date
    /// boundaries, correlated on the enrollment.
    fn program_stage_conditions(
        &self,
        indicator: &ProgramIndicator,
        range: (NaiveDate, NaiveDate),
    ) -> RenderResult<Vec<String>> {
        let dialect = self.dialect;
        let event_table = format!(
            "{}_{}",
            AnalyticsTableType::Event.table_name(),
            indicator.program.uid().to_lowercase()
        );
        let event_date = format!(
            "{}.{}",
            EVENT_TBL_ALIAS,
            dialect.quote_identifier(TimeField::EventDate.column())
        );
        let enrollment = dialect.quote_identifier("enrollment");

        indicator
            .program_stage_boundaries()
            .into_iter()
            .map(|(stage, boundaries)| {
                let mut conditions = vec![
                    format!(
                        "{ev}.{enrollment} = {ax}.{enrollment}",
                        ev = EVENT_TBL_ALIAS,
                        ax = ANALYTICS_TBL_ALIAS,
                        enrollment = enrollment
                    ),
                    format!("{} is not null", event_date),
                    format!(
                        "{}.{} = {}",
                        EVENT_TBL_ALIAS,
                        dialect.quote_identifier("ps"),
                        dialect.quote_string(stage)
                    ),
                ];
                for boundary in boundaries {
                    conditions.push(self.render_boundary(&event_date, boundary, range)?);
                }
                Ok(format!(
                    "exists(select 1 from {} as {} where {})",
                    dialect.quote_identifier(&event_table),
                    EVENT_TBL_ALIAS,
                    conditions.join(" AND ")
                ))
            })
            .collect()
    }
}

const ENROLLMENT_TIME_FIELDS: [TimeField; 1] = [TimeField::LastUpdated];

impl TimeFieldSqlRenderer for EnrollmentTimeFieldSqlRenderer {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn default_column(&self) -> &'static str {
        TimeField::EnrollmentDate.column()
    }

    fn allowed_time_fields(&self) -> &'static [TimeField] {
        &ENROLLMENT_TIME_FIELDS
    }

    fn boundary_column(&self, target: &BoundaryTarget) -> RenderResult<String> {
        match target {
            // The enrollment's occurred date is its incident date.
            BoundaryTarget::IncidentDate => Ok(self.qualified("occurreddate")),
            other => common_boundary_column(other, self.dialect),
        }
    }

    /// Cohort boundaries AND-joined, followed by one `exists` clause per
    /// program stage with event date boundaries.
    fn boundary_condition(&self, query: &AnalyticsQuery, indicator: &ProgramIndicator) -> RenderResult<String> {
        let range = reporting_range(query, indicator)?;

        let mut conditions = indicator
            .analytics_period_boundaries
            .iter()
            .filter(|b| b.is_cohort_date_boundary() && !b.is_enrollment_having_event_date_cohort_boundary())
            .map(|b| self.render_boundary(&self.boundary_column(&b.target())?, b, range))
            .collect::<RenderResult<Vec<_>>>()?;

        if indicator.has_enrollment_having_event_date_boundaries() {
            conditions.extend(self.program_stage_conditions(indicator, range)?);
        }

        Ok(conditions.join(" AND "))
    }
}
