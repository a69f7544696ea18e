//! Dimensional items: the "what" of an analytics request.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::category::{CategoryCombo, CategoryResult};
use super::identifiable::BaseObject;
use super::program::{Program, ProgramIndicator};
use super::types::{AggregationType, DimensionItemType, TotalAggregationType, ValueType};
use crate::filter::QueryFilter;

/// Separator between the parts of a compound dimension item identifier.
pub const ITEM_SEP: &str = ".";

/// Placeholder for an absent category option combo in operand identifiers.
pub const SYMBOL_WILDCARD: &str = "*";

/// Reporting-rate metrics of a data set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportingRateMetric {
    ReportingRate,
    ReportingRateOnTime,
    ActualReports,
    ActualReportsOnTime,
    ExpectedReports,
}

impl ReportingRateMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportingRateMetric::ReportingRate => "REPORTING_RATE",
            ReportingRateMetric::ReportingRateOnTime => "REPORTING_RATE_ON_TIME",
            ReportingRateMetric::ActualReports => "ACTUAL_REPORTS",
            ReportingRateMetric::ActualReportsOnTime => "ACTUAL_REPORTS_ON_TIME",
            ReportingRateMetric::ExpectedReports => "EXPECTED_REPORTS",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ReportingRateMetric::ReportingRate => "Reporting rate",
            ReportingRateMetric::ReportingRateOnTime => "Reporting rate on time",
            ReportingRateMetric::ActualReports => "Actual reports",
            ReportingRateMetric::ActualReportsOnTime => "Actual reports on time",
            ReportingRateMetric::ExpectedReports => "Expected reports",
        }
    }
}

impl fmt::Display for ReportingRateMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-item overrides. Absent means "use the item defaults".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryModifiers {
    pub aggregation_type: Option<AggregationType>,
    /// Number of periods to shift; negative looks back.
    pub period_offset: Option<i32>,
}

impl QueryModifiers {
    pub fn aggregation(aggregation_type: AggregationType) -> Self {
        Self {
            aggregation_type: Some(aggregation_type),
            period_offset: None,
        }
    }

    pub fn offset(period_offset: i32) -> Self {
        Self {
            aggregation_type: None,
            period_offset: Some(period_offset),
        }
    }
}

/// The entity behind a dimensional item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemSource {
    DataElement(BaseObject),
    DataElementOperand {
        data_element: BaseObject,
        #[serde(default)]
        category_option_combo: Option<BaseObject>,
        #[serde(default)]
        attribute_option_combo: Option<BaseObject>,
    },
    ReportingRate {
        data_set: BaseObject,
        metric: ReportingRateMetric,
    },
    Subexpression {
        uid: String,
        expression: String,
    },
    ProgramIndicator(Box<ProgramIndicator>),
}

/// An analytic entity: data element, operand, reporting rate, subexpression
/// or program indicator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionalItem {
    source: ItemSource,
    #[serde(default)]
    value_type: ValueType,
    #[serde(default)]
    aggregation_type: AggregationType,
    #[serde(default)]
    total_aggregation_type: TotalAggregationType,
    #[serde(default)]
    query_mods: Option<QueryModifiers>,
}

impl DimensionalItem {
    fn from_source(source: ItemSource) -> Self {
        Self {
            source,
            value_type: ValueType::Number,
            aggregation_type: AggregationType::Sum,
            total_aggregation_type: TotalAggregationType::Sum,
            query_mods: None,
        }
    }

    pub fn data_element(uid: &str, name: &str) -> Self {
        Self::from_source(ItemSource::DataElement(BaseObject::new(uid, name)))
    }

    pub fn operand(
        data_element: BaseObject,
        category_option_combo: Option<BaseObject>,
        attribute_option_combo: Option<BaseObject>,
    ) -> Self {
        Self::from_source(ItemSource::DataElementOperand {
            data_element,
            category_option_combo,
            attribute_option_combo,
        })
    }

    /// An operand whose category option combo is given by its options.
    pub fn operand_for_options(
        data_element: BaseObject,
        category_combo: &CategoryCombo,
        options: &[&str],
    ) -> CategoryResult<Self> {
        let coc = category_combo.option_combo(options)?;
        Ok(Self::operand(data_element, Some(coc.base.clone()), None))
    }

    pub fn reporting_rate(data_set: BaseObject, metric: ReportingRateMetric) -> Self {
        let mut item = Self::from_source(ItemSource::ReportingRate { data_set, metric });
        item.value_type = ValueType::Percentage;
        item.total_aggregation_type = TotalAggregationType::Average;
        item
    }

    pub fn subexpression(uid: &str, expression: &str) -> Self {
        Self::from_source(ItemSource::Subexpression {
            uid: uid.into(),
            expression: expression.into(),
        })
    }

    pub fn program_indicator(indicator: ProgramIndicator) -> Self {
        let aggregation_type = indicator.aggregation_type_fallback();
        let mut item = Self::from_source(ItemSource::ProgramIndicator(Box::new(indicator)));
        item.aggregation_type = aggregation_type;
        item
    }

    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn with_aggregation_type(mut self, aggregation_type: AggregationType) -> Self {
        self.aggregation_type = aggregation_type;
        self
    }

    pub fn with_total_aggregation_type(mut self, total: TotalAggregationType) -> Self {
        self.total_aggregation_type = total;
        self
    }

    pub fn with_query_mods(mut self, query_mods: QueryModifiers) -> Self {
        self.query_mods = Some(query_mods);
        self
    }

    pub fn source(&self) -> &ItemSource {
        &self.source
    }

    pub fn item_type(&self) -> DimensionItemType {
        match &self.source {
            ItemSource::DataElement(_) => DimensionItemType::DataElement,
            ItemSource::DataElementOperand { .. } => DimensionItemType::DataElementOperand,
            ItemSource::ReportingRate { .. } => DimensionItemType::ReportingRate,
            ItemSource::Subexpression { .. } => DimensionItemType::Subexpression,
            ItemSource::ProgramIndicator(_) => DimensionItemType::ProgramIndicator,
        }
    }

    /// UID of the underlying entity (the data element of an operand, the
    /// data set of a reporting rate).
    pub fn uid(&self) -> &str {
        match &self.source {
            ItemSource::DataElement(de) => &de.uid,
            ItemSource::DataElementOperand { data_element, .. } => &data_element.uid,
            ItemSource::ReportingRate { data_set, .. } => &data_set.uid,
            ItemSource::Subexpression { uid, .. } => uid,
            ItemSource::ProgramIndicator(pi) => pi.uid(),
        }
    }

    /// Identifier of the item within the data dimension.
    pub fn dimension_item(&self) -> String {
        match &self.source {
            ItemSource::DataElementOperand {
                data_element,
                category_option_combo,
                attribute_option_combo,
            } => {
                let mut item = data_element.uid.clone();
                match (category_option_combo, attribute_option_combo) {
                    (Some(coc), Some(aoc)) => {
                        item.push_str(ITEM_SEP);
                        item.push_str(&coc.uid);
                        item.push_str(ITEM_SEP);
                        item.push_str(&aoc.uid);
                    }
                    (Some(coc), None) => {
                        item.push_str(ITEM_SEP);
                        item.push_str(&coc.uid);
                    }
                    (None, Some(aoc)) => {
                        item.push_str(ITEM_SEP);
                        item.push_str(SYMBOL_WILDCARD);
                        item.push_str(ITEM_SEP);
                        item.push_str(&aoc.uid);
                    }
                    (None, None) => {}
                }
                item
            }
            ItemSource::ReportingRate { data_set, metric } => {
                format!("{}{}{}", data_set.uid, ITEM_SEP, metric.as_str())
            }
            _ => self.uid().to_string(),
        }
    }

    /// Display name, derived for compound items.
    pub fn name(&self) -> String {
        match &self.source {
            ItemSource::DataElement(de) => de.name.clone(),
            ItemSource::DataElementOperand {
                data_element,
                category_option_combo,
                attribute_option_combo,
            } => {
                let mut name = data_element.name.clone();
                for combo in [category_option_combo, attribute_option_combo]
                    .into_iter()
                    .flatten()
                {
                    name.push(' ');
                    name.push_str(&combo.name);
                }
                name
            }
            ItemSource::ReportingRate { data_set, metric } => {
                format!("{} {}", data_set.name, metric.display_name())
            }
            ItemSource::Subexpression { uid, .. } => uid.clone(),
            ItemSource::ProgramIndicator(pi) => pi.base.name.clone(),
        }
    }

    pub fn category_option_combo(&self) -> Option<&BaseObject> {
        match &self.source {
            ItemSource::DataElementOperand {
                category_option_combo,
                ..
            } => category_option_combo.as_ref(),
            _ => None,
        }
    }

    pub fn attribute_option_combo(&self) -> Option<&BaseObject> {
        match &self.source {
            ItemSource::DataElementOperand {
                attribute_option_combo,
                ..
            } => attribute_option_combo.as_ref(),
            _ => None,
        }
    }

    pub fn program_indicator_ref(&self) -> Option<&ProgramIndicator> {
        match &self.source {
            ItemSource::ProgramIndicator(pi) => Some(pi),
            _ => None,
        }
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn aggregation_type(&self) -> AggregationType {
        self.aggregation_type
    }

    pub fn total_aggregation_type(&self) -> TotalAggregationType {
        self.total_aggregation_type
    }

    pub fn query_mods(&self) -> Option<&QueryModifiers> {
        self.query_mods.as_ref()
    }

    /// Aggregation override from the query modifiers, if any.
    pub fn aggregation_override(&self) -> Option<AggregationType> {
        self.query_mods.and_then(|m| m.aggregation_type)
    }

    /// The override when present, else the declared aggregation type.
    pub fn effective_aggregation_type(&self) -> AggregationType {
        self.aggregation_override().unwrap_or(self.aggregation_type)
    }

    pub fn period_offset(&self) -> i32 {
        self.query_mods
            .and_then(|m| m.period_offset)
            .unwrap_or(0)
    }
}

/// An item of an event query, optionally scoped to a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryItem {
    pub item: DimensionalItem,
    #[serde(default)]
    pub program: Option<Program>,
    #[serde(default)]
    pub aggregation_type: Option<AggregationType>,
    #[serde(default)]
    pub filters: Vec<QueryFilter>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

impl QueryItem {
    pub fn new(item: DimensionalItem) -> Self {
        Self {
            item,
            program: None,
            aggregation_type: None,
            filters: Vec::new(),
            options: None,
        }
    }

    pub fn with_program(mut self, program: Program) -> Self {
        self.program = Some(program);
        self
    }

    pub fn with_aggregation_type(mut self, aggregation_type: AggregationType) -> Self {
        self.aggregation_type = Some(aggregation_type);
        self
    }

    pub fn with_filter(mut self, filter: QueryFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn has_program(&self) -> bool {
        self.program.is_some()
    }

    pub fn has_filter(&self) -> bool {
        !self.filters.is_empty()
    }
}
