//! Enumerations shared across the query model.

use serde::{Deserialize, Serialize};

/// How values of an item are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregationType {
    Sum,
    Average,
    AverageSumOrgUnit,
    Last,
    LastAverageOrgUnit,
    LastLastOrgUnit,
    LastInPeriod,
    LastInPeriodAverageOrgUnit,
    First,
    FirstAverageOrgUnit,
    FirstFirstOrgUnit,
    Count,
    Stddev,
    Variance,
    Min,
    Max,
    MinSumOrgUnit,
    MaxSumOrgUnit,
    None,
    Custom,
    #[default]
    Default,
}

impl AggregationType {
    /// Every variant, in declaration order.
    pub const ALL: [AggregationType; 21] = [
        AggregationType::Sum,
        AggregationType::Average,
        AggregationType::AverageSumOrgUnit,
        AggregationType::Last,
        AggregationType::LastAverageOrgUnit,
        AggregationType::LastLastOrgUnit,
        AggregationType::LastInPeriod,
        AggregationType::LastInPeriodAverageOrgUnit,
        AggregationType::First,
        AggregationType::FirstAverageOrgUnit,
        AggregationType::FirstFirstOrgUnit,
        AggregationType::Count,
        AggregationType::Stddev,
        AggregationType::Variance,
        AggregationType::Min,
        AggregationType::Max,
        AggregationType::MinSumOrgUnit,
        AggregationType::MaxSumOrgUnit,
        AggregationType::None,
        AggregationType::Custom,
        AggregationType::Default,
    ];

    /// The effective aggregation type used for SQL generation of program
    /// indicators. An absent type falls back to `Average`.
    pub fn fallback(aggregation_type: Option<AggregationType>) -> AggregationType {
        use AggregationType as A;

        let Some(t) = aggregation_type else {
            return A::Average;
        };

        match t {
            A::AverageSumOrgUnit | A::MinSumOrgUnit | A::MaxSumOrgUnit | A::LastInPeriod => A::Sum,
            A::LastInPeriodAverageOrgUnit => A::Average,
            A::Last
            | A::First
            | A::FirstAverageOrgUnit
            | A::LastAverageOrgUnit
            | A::Custom
            | A::Average
            | A::Sum
            | A::Stddev
            | A::Count
            | A::Max
            | A::Min => t,
            A::LastLastOrgUnit => A::Last,
            A::FirstFirstOrgUnit => A::First,
            A::Variance => A::Variance,
            A::None | A::Default => A::Average,
        }
    }

    /// Whether values are taken from the last period of the range.
    pub fn is_last_period_aggregation_type(&self) -> bool {
        matches!(
            self,
            AggregationType::Last | AggregationType::LastAverageOrgUnit
        )
    }

    /// Lower-case name, as used in column alias suffixes.
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationType::Sum => "sum",
            AggregationType::Average => "average",
            AggregationType::AverageSumOrgUnit => "average_sum_org_unit",
            AggregationType::Last => "last",
            AggregationType::LastAverageOrgUnit => "last_average_org_unit",
            AggregationType::LastLastOrgUnit => "last_last_org_unit",
            AggregationType::LastInPeriod => "last_in_period",
            AggregationType::LastInPeriodAverageOrgUnit => "last_in_period_average_org_unit",
            AggregationType::First => "first",
            AggregationType::FirstAverageOrgUnit => "first_average_org_unit",
            AggregationType::FirstFirstOrgUnit => "first_first_org_unit",
            AggregationType::Count => "count",
            AggregationType::Stddev => "stddev",
            AggregationType::Variance => "variance",
            AggregationType::Min => "min",
            AggregationType::Max => "max",
            AggregationType::MinSumOrgUnit => "min_sum_org_unit",
            AggregationType::MaxSumOrgUnit => "max_sum_org_unit",
            AggregationType::None => "none",
            AggregationType::Custom => "custom",
            AggregationType::Default => "default",
        }
    }

    /// SQL aggregate function for pivot and outer aggregation.
    pub fn sql_function(&self) -> &'static str {
        match self {
            AggregationType::Average
            | AggregationType::AverageSumOrgUnit
            | AggregationType::LastAverageOrgUnit
            | AggregationType::LastInPeriodAverageOrgUnit
            | AggregationType::FirstAverageOrgUnit => "avg",
            AggregationType::Count => "count",
            AggregationType::Stddev => "stddev",
            AggregationType::Variance => "variance",
            AggregationType::Min | AggregationType::MinSumOrgUnit => "min",
            AggregationType::Max | AggregationType::MaxSumOrgUnit => "max",
            _ => "sum",
        }
    }
}

/// How multiple periods collapse into a total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TotalAggregationType {
    #[default]
    Sum,
    Average,
    None,
}

/// Declared value type of an item or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    Text,
    LongText,
    Letter,
    Email,
    Username,
    Url,
    PhoneNumber,
    #[default]
    Number,
    Integer,
    IntegerPositive,
    Percentage,
    Boolean,
    TrueOnly,
    Date,
    Datetime,
    OrganisationUnit,
}

impl ValueType {
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            ValueType::Text
                | ValueType::LongText
                | ValueType::Letter
                | ValueType::Email
                | ValueType::Username
                | ValueType::Url
                | ValueType::PhoneNumber
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ValueType::Number
                | ValueType::Integer
                | ValueType::IntegerPositive
                | ValueType::Percentage
        )
    }
}

/// Kind of a dimensional item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DimensionItemType {
    DataElement,
    DataElementOperand,
    ReportingRate,
    Subexpression,
    ProgramIndicator,
}

/// Kind of a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DimensionType {
    DataX,
    Period,
    OrganisationUnit,
    Category,
    CategoryOptionGroupSet,
    OrganisationUnitGroupSet,
    DataElementGroupSet,
    ProgramAttribute,
    ProgramDataElement,
}

/// Analytics type of a program indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalyticsType {
    #[default]
    Event,
    Enrollment,
}

/// Physical analytics table families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalyticsTableType {
    DataValue,
    Completeness,
    CompletenessTarget,
    OrgUnitTarget,
    ValidationResult,
    Event,
    Enrollment,
    Ownership,
}

impl AnalyticsTableType {
    /// Base table name.
    pub fn table_name(&self) -> &'static str {
        match self {
            AnalyticsTableType::DataValue => "analytics",
            AnalyticsTableType::Completeness => "analytics_completeness",
            AnalyticsTableType::CompletenessTarget => "analytics_completenesstarget",
            AnalyticsTableType::OrgUnitTarget => "analytics_orgunittarget",
            AnalyticsTableType::ValidationResult => "analytics_validationresult",
            AnalyticsTableType::Event => "analytics_event",
            AnalyticsTableType::Enrollment => "analytics_enrollment",
            AnalyticsTableType::Ownership => "analytics_ownership",
        }
    }

    /// Whether tables of this type exist once per program.
    pub fn is_program_scoped(&self) -> bool {
        matches!(
            self,
            AnalyticsTableType::Event
                | AnalyticsTableType::Enrollment
                | AnalyticsTableType::Ownership
        )
    }

    /// Whether tables of this type are partitioned by year.
    pub fn is_partitioned(&self) -> bool {
        !matches!(
            self,
            AnalyticsTableType::CompletenessTarget
                | AnalyticsTableType::OrgUnitTarget
                | AnalyticsTableType::Enrollment
                | AnalyticsTableType::Ownership
        )
    }
}

/// Time fields a request may select instead of the natural date column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeField {
    EventDate,
    EnrollmentDate,
    IncidentDate,
    ScheduledDate,
    CompletedDate,
    Created,
    LastUpdated,
}

impl TimeField {
    /// Column holding the field in the analytics tables.
    pub fn column(&self) -> &'static str {
        match self {
            TimeField::EventDate => "occurreddate",
            TimeField::EnrollmentDate => "enrollmentdate",
            TimeField::IncidentDate => "incidentdate",
            TimeField::ScheduledDate => "scheduleddate",
            TimeField::CompletedDate => "completeddate",
            TimeField::Created => "created",
            TimeField::LastUpdated => "lastupdated",
        }
    }
}

/// Measure criteria comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeasureFilter {
    Eq,
    Gt,
    Ge,
    Lt,
    Le,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisplayProperty {
    #[default]
    Name,
    ShortName,
}

/// Which of the user's org-unit sets a user org-unit keyword refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserOrgUnitType {
    DataCapture,
    DataOutput,
    TeiSearch,
}
