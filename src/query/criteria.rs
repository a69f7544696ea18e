//! Request criteria: the raw, serde-friendly form of a query.
//!
//! The request layer deserializes an [`AnalyticsCriteria`] and turns it into
//! a builder with [`AnalyticsQueryBuilder::from_criteria`]. Period
//! dimensions are resolved here since ISO period identifiers are
//! self-describing; other dimensions name metadata objects and are added
//! by the caller after resolving [`AnalyticsCriteria::dimension_params`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::dimension::{Dimension, PERIOD_DIM_ID};
use super::{AnalyticsQueryBuilder, IdSchemes, OutputOptions, QueryError, QueryResult};
use crate::idscheme::IdScheme;
use crate::model::{
    AggregationType, DisplayProperty, MeasureFilter, OrgUnitField, Period, SortOrder, TimeField,
    UserOrgUnitType,
};

/// Separator between a dimension key and its items.
pub const DIMENSION_NAME_SEP: char = ':';

/// Separator between dimension items.
pub const OPTION_SEP: char = ';';

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw request options.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsCriteria {
    /// Dimensions as `<key>:<item>;<item>`.
    pub dimension: Vec<String>,
    /// Filters as `<key>:<item>;<item>`.
    pub filter: Vec<String>,
    pub aggregation_type: Option<AggregationType>,
    /// Post-aggregation criteria as `<op>:<value>;<op>:<value>`.
    pub measure_criteria: Option<String>,
    pub pre_aggregation_measure_criteria: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub order: Option<SortOrder>,
    pub time_field: Option<TimeField>,
    pub org_unit_field: Option<String>,
    #[serde(flatten)]
    pub output: OutputOptions,
    pub aggregate_data: bool,
    pub collapse_data_dimensions: bool,
    pub aggregated_enrollments: bool,
    pub display_property: Option<DisplayProperty>,
    pub output_id_scheme: Option<String>,
    pub output_data_item_id_scheme: Option<String>,
    pub output_data_element_id_scheme: Option<String>,
    pub output_org_unit_id_scheme: Option<String>,
    pub input_id_scheme: Option<String>,
    pub approval_level: Option<String>,
    pub relative_period_date: Option<String>,
    pub user_org_unit: Option<String>,
    pub user_org_unit_type: Option<UserOrgUnitType>,
    pub program_stage: Option<String>,
}

/// A dimension parameter split into key and item tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionParam {
    pub key: String,
    pub items: Vec<String>,
}

impl DimensionParam {
    pub fn parse(param: &str) -> QueryResult<Self> {
        let (key, items) = param
            .split_once(DIMENSION_NAME_SEP)
            .filter(|(key, _)| !key.is_empty())
            .ok_or_else(|| QueryError::InvalidDimension(param.to_string()))?;
        Ok(Self {
            key: key.to_string(),
            items: items
                .split(OPTION_SEP)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }

    pub fn is_period(&self) -> bool {
        self.key == PERIOD_DIM_ID
    }

    /// Resolve the items as ISO periods.
    pub fn to_period_dimension(&self) -> QueryResult<Dimension> {
        let periods = self
            .items
            .iter()
            .map(|iso| Period::parse(iso))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Dimension::periods(periods))
    }
}

impl AnalyticsCriteria {
    /// Dimension parameters in request order.
    pub fn dimension_params(&self) -> QueryResult<Vec<DimensionParam>> {
        self.dimension.iter().map(|d| DimensionParam::parse(d)).collect()
    }

    /// Filter parameters in request order.
    pub fn filter_params(&self) -> QueryResult<Vec<DimensionParam>> {
        self.filter.iter().map(|d| DimensionParam::parse(d)).collect()
    }

    fn id_schemes(&self) -> QueryResult<IdSchemes> {
        let scheme = |s: &Option<String>| IdScheme::from(s.as_deref());
        Ok(IdSchemes {
            output_id_scheme: scheme(&self.output_id_scheme)?,
            output_data_item_id_scheme: scheme(&self.output_data_item_id_scheme)?,
            output_data_element_id_scheme: scheme(&self.output_data_element_id_scheme)?,
            output_org_unit_id_scheme: scheme(&self.output_org_unit_id_scheme)?,
            input_id_scheme: scheme(&self.input_id_scheme)?,
        })
    }
}

/// Parse measure criteria such as `GE:10;LT:50.5`.
pub fn parse_measure_criteria(criteria: &str) -> QueryResult<BTreeMap<MeasureFilter, f64>> {
    let invalid = || QueryError::InvalidMeasureCriteria(criteria.to_string());
    let mut parsed = BTreeMap::new();
    for criterion in criteria.split(OPTION_SEP).filter(|c| !c.is_empty()) {
        let (op, value) = criterion.split_once(DIMENSION_NAME_SEP).ok_or_else(invalid)?;
        let filter = match op.to_uppercase().as_str() {
            "EQ" => MeasureFilter::Eq,
            "GT" => MeasureFilter::Gt,
            "GE" => MeasureFilter::Ge,
            "LT" => MeasureFilter::Lt,
            "LE" => MeasureFilter::Le,
            _ => return Err(invalid()),
        };
        let value: f64 = value.trim().parse().map_err(|_| invalid())?;
        parsed.insert(filter, value);
    }
    Ok(parsed)
}

fn parse_date(date: &str) -> QueryResult<NaiveDate> {
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| QueryError::InvalidDate(date.to_string()))
}

impl AnalyticsQueryBuilder {
    /// A builder populated with every option of the criteria.
    pub fn from_criteria(criteria: &AnalyticsCriteria) -> QueryResult<Self> {
        let mut builder = AnalyticsQueryBuilder::new()
            .with_output(criteria.output)
            .with_aggregate_data(criteria.aggregate_data)
            .with_collapse_data_dimensions(criteria.collapse_data_dimensions)
            .with_aggregated_enrollments(criteria.aggregated_enrollments)
            .with_org_unit_field(OrgUnitField::from(criteria.org_unit_field.as_deref()))
            .with_id_schemes(criteria.id_schemes()?);

        for param in criteria.dimension_params()? {
            if param.is_period() {
                builder = builder.with_dimension(param.to_period_dimension()?);
            }
        }
        for param in criteria.filter_params()? {
            if param.is_period() {
                builder = builder.with_filter(param.to_period_dimension()?);
            }
        }

        if let Some(aggregation_type) = criteria.aggregation_type {
            builder = builder.with_aggregation_type(aggregation_type);
        }
        if let Some(measure) = &criteria.measure_criteria {
            builder = builder.with_measure_criteria(parse_measure_criteria(measure)?);
        }
        if let Some(measure) = &criteria.pre_aggregation_measure_criteria {
            builder = builder.with_pre_aggregate_measure_criteria(parse_measure_criteria(measure)?);
        }
        if let Some(date) = &criteria.start_date {
            builder = builder.with_start_date(parse_date(date)?);
        }
        if let Some(date) = &criteria.end_date {
            builder = builder.with_end_date(parse_date(date)?);
        }
        if let Some(order) = criteria.order {
            builder = builder.with_sort_order(order);
        }
        if let Some(time_field) = criteria.time_field {
            builder = builder.with_time_field(time_field);
        }
        if let Some(property) = criteria.display_property {
            builder = builder.with_display_property(property);
        }
        if let Some(level) = &criteria.approval_level {
            builder = builder.with_approval_level(level);
        }
        if let Some(date) = &criteria.relative_period_date {
            builder = builder.with_relative_period_date(parse_date(date)?);
        }
        if let Some(org_unit) = &criteria.user_org_unit {
            let org_unit_type = criteria
                .user_org_unit_type
                .unwrap_or(UserOrgUnitType::DataOutput);
            builder = builder.with_user_org_unit(org_unit, org_unit_type);
        }
        if let Some(stage) = &criteria.program_stage {
            builder = builder.with_program_stage(stage);
        }

        Ok(builder)
    }
}
