//! Programs, program indicators, and analytics period boundaries.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::identifiable::BaseObject;
use super::org_unit::OrgUnitField;
use super::period::{PeriodError, PeriodType};
use super::types::{AggregationType, AnalyticsType};

pub const EVENT_DATE: &str = "EVENT_DATE";
pub const ENROLLMENT_DATE: &str = "ENROLLMENT_DATE";
pub const INCIDENT_DATE: &str = "INCIDENT_DATE";
pub const SCHEDULED_DATE: &str = "SCHEDULED_DATE";

/// Prefix of boundary targets that require an event in a program stage.
pub const COHORT_HAVING_PROGRAM_STAGE_PREFIX: &str = "PS_EVENTDATE:";

/// A tracker or event program.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    #[serde(flatten)]
    pub base: BaseObject,
    /// Whether the program tracks registered entities (has enrollments).
    #[serde(default)]
    pub with_registration: bool,
}

impl Program {
    pub fn new(uid: &str, name: &str) -> Self {
        Self {
            base: BaseObject::new(uid, name),
            with_registration: true,
        }
    }

    pub fn uid(&self) -> &str {
        &self.base.uid
    }
}

/// Where a boundary sits relative to the reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalyticsPeriodBoundaryType {
    BeforeStartOfReportingPeriod,
    BeforeEndOfReportingPeriod,
    AfterStartOfReportingPeriod,
    AfterEndOfReportingPeriod,
}

impl AnalyticsPeriodBoundaryType {
    /// Start boundaries bound the date from below (`>=`).
    pub fn is_start_boundary(&self) -> bool {
        matches!(
            self,
            AnalyticsPeriodBoundaryType::AfterStartOfReportingPeriod
                | AnalyticsPeriodBoundaryType::AfterEndOfReportingPeriod
        )
    }

    /// Whether the boundary is anchored at the end of the reporting period.
    pub fn is_end_anchored(&self) -> bool {
        matches!(
            self,
            AnalyticsPeriodBoundaryType::BeforeEndOfReportingPeriod
                | AnalyticsPeriodBoundaryType::AfterEndOfReportingPeriod
        )
    }
}

/// The date a boundary constrains.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BoundaryTarget {
    EventDate,
    EnrollmentDate,
    IncidentDate,
    ScheduledDate,
    /// Date of an event in the given program stage.
    StageEventDate(String),
    /// Date-valued data element `#{stage.dataElement}`.
    DataElement { stage: String, data_element: String },
    /// Date-valued tracked entity attribute `A{attribute}`.
    Attribute(String),
    Unknown(String),
}

impl BoundaryTarget {
    pub fn parse(target: &str) -> Self {
        match target {
            EVENT_DATE => BoundaryTarget::EventDate,
            ENROLLMENT_DATE => BoundaryTarget::EnrollmentDate,
            INCIDENT_DATE => BoundaryTarget::IncidentDate,
            SCHEDULED_DATE => BoundaryTarget::ScheduledDate,
            _ => {
                if let Some(stage) = target.strip_prefix(COHORT_HAVING_PROGRAM_STAGE_PREFIX) {
                    return BoundaryTarget::StageEventDate(stage.to_string());
                }
                if let Some(inner) = target.strip_prefix("#{").and_then(|t| t.strip_suffix('}')) {
                    if let Some((stage, data_element)) = inner.split_once('.') {
                        return BoundaryTarget::DataElement {
                            stage: stage.to_string(),
                            data_element: data_element.to_string(),
                        };
                    }
                }
                if let Some(attribute) = target.strip_prefix("A{").and_then(|t| t.strip_suffix('}')) {
                    return BoundaryTarget::Attribute(attribute.to_string());
                }
                BoundaryTarget::Unknown(target.to_string())
            }
        }
    }
}

/// A rule redefining which reporting period an event or enrollment counts
/// toward.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsPeriodBoundary {
    pub boundary_target: String,
    pub analytics_period_boundary_type: AnalyticsPeriodBoundaryType,
    #[serde(default)]
    pub offset_period_type: Option<PeriodType>,
    #[serde(default)]
    pub offset_periods: i32,
}

impl AnalyticsPeriodBoundary {
    pub fn new(target: &str, boundary_type: AnalyticsPeriodBoundaryType) -> Self {
        Self {
            boundary_target: target.into(),
            analytics_period_boundary_type: boundary_type,
            offset_period_type: None,
            offset_periods: 0,
        }
    }

    pub fn with_offset(mut self, period_type: PeriodType, periods: i32) -> Self {
        self.offset_period_type = Some(period_type);
        self.offset_periods = periods;
        self
    }

    pub fn target(&self) -> BoundaryTarget {
        BoundaryTarget::parse(&self.boundary_target)
    }

    /// Any boundary on a date other than the event date.
    pub fn is_cohort_date_boundary(&self) -> bool {
        self.boundary_target != EVENT_DATE
    }

    pub fn is_enrollment_having_event_date_cohort_boundary(&self) -> bool {
        self.boundary_target
            .starts_with(COHORT_HAVING_PROGRAM_STAGE_PREFIX)
    }

    /// Program stage of an enrollment-having-event-date boundary.
    pub fn program_stage(&self) -> Option<&str> {
        self.boundary_target
            .strip_prefix(COHORT_HAVING_PROGRAM_STAGE_PREFIX)
    }

    pub fn is_start_boundary(&self) -> bool {
        self.analytics_period_boundary_type.is_start_boundary()
    }

    /// Comparison operator of the rendered boundary condition.
    pub fn sql_operator(&self) -> &'static str {
        if self.is_start_boundary() {
            ">="
        } else {
            "<"
        }
    }

    /// Boundary date for a reporting range `[start, end]`.
    ///
    /// End-anchored boundaries use the day after `end`, so every boundary
    /// compares against a half-open range.
    pub fn boundary_date(&self, start: NaiveDate, end: NaiveDate) -> Result<NaiveDate, PeriodError> {
        let reference = if self.analytics_period_boundary_type.is_end_anchored() {
            PeriodType::Daily.shift_date(end, 1)?
        } else {
            start
        };

        match self.offset_period_type {
            Some(period_type) if self.offset_periods != 0 => {
                period_type.shift_date(reference, self.offset_periods)
            }
            _ => Ok(reference),
        }
    }
}

/// A program indicator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramIndicator {
    #[serde(flatten)]
    pub base: BaseObject,
    pub program: Program,
    #[serde(default)]
    pub analytics_type: AnalyticsType,
    #[serde(default)]
    pub aggregation_type: Option<AggregationType>,
    #[serde(default)]
    pub org_unit_field: Option<String>,
    #[serde(default)]
    pub analytics_period_boundaries: Vec<AnalyticsPeriodBoundary>,
    #[serde(default)]
    pub expression: String,
    #[serde(default)]
    pub filter: Option<String>,
}

impl ProgramIndicator {
    /// A program indicator with the default boundaries of its analytics type.
    pub fn new(uid: &str, name: &str, program: Program, analytics_type: AnalyticsType) -> Self {
        Self {
            base: BaseObject::new(uid, name),
            program,
            analytics_type,
            aggregation_type: None,
            org_unit_field: None,
            analytics_period_boundaries: Self::default_boundaries(analytics_type),
            expression: String::new(),
            filter: None,
        }
    }

    pub fn with_aggregation_type(mut self, aggregation_type: AggregationType) -> Self {
        self.aggregation_type = Some(aggregation_type);
        self
    }

    pub fn with_org_unit_field(mut self, field: &str) -> Self {
        self.org_unit_field = Some(field.into());
        self
    }

    pub fn with_boundaries(mut self, boundaries: Vec<AnalyticsPeriodBoundary>) -> Self {
        self.analytics_period_boundaries = boundaries;
        self
    }

    pub fn uid(&self) -> &str {
        &self.base.uid
    }

    /// Boundaries a freshly created indicator of the given type carries.
    pub fn default_boundaries(analytics_type: AnalyticsType) -> Vec<AnalyticsPeriodBoundary> {
        let target = match analytics_type {
            AnalyticsType::Event => EVENT_DATE,
            AnalyticsType::Enrollment => ENROLLMENT_DATE,
        };
        vec![
            AnalyticsPeriodBoundary::new(
                target,
                AnalyticsPeriodBoundaryType::AfterStartOfReportingPeriod,
            ),
            AnalyticsPeriodBoundary::new(
                target,
                AnalyticsPeriodBoundaryType::BeforeEndOfReportingPeriod,
            ),
        ]
    }

    pub fn has_non_default_boundaries(&self) -> bool {
        let defaults = Self::default_boundaries(self.analytics_type);
        self.analytics_period_boundaries.len() != defaults.len()
            || !defaults
                .iter()
                .all(|d| self.analytics_period_boundaries.contains(d))
    }

    pub fn is_enrollment(&self) -> bool {
        self.analytics_type == AnalyticsType::Enrollment
    }

    /// Effective aggregation type for SQL generation.
    pub fn aggregation_type_fallback(&self) -> AggregationType {
        AggregationType::fallback(self.aggregation_type)
    }

    pub fn org_unit_field(&self) -> OrgUnitField {
        OrgUnitField::from(self.org_unit_field.as_deref())
    }

    pub fn has_enrollment_having_event_date_boundaries(&self) -> bool {
        self.analytics_period_boundaries
            .iter()
            .any(AnalyticsPeriodBoundary::is_enrollment_having_event_date_cohort_boundary)
    }

    /// Enrollment-having-event-date boundaries grouped by program stage.
    pub fn program_stage_boundaries(&self) -> BTreeMap<&str, Vec<&AnalyticsPeriodBoundary>> {
        let mut grouped: BTreeMap<&str, Vec<&AnalyticsPeriodBoundary>> = BTreeMap::new();
        for boundary in &self.analytics_period_boundaries {
            if let Some(stage) = boundary.program_stage() {
                grouped.entry(stage).or_default().push(boundary);
            }
        }
        grouped
    }
}
