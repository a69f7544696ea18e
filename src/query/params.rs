//! The query value and its builder.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::dimension::{Dimension, DimensionItem, DATA_X_DIM_ID, ORGUNIT_DIM_ID, PERIOD_DIM_ID};
use super::{IdSchemes, OutputOptions, Partitions, QueryError, QueryResult, SubQueryDescriptor};
use crate::model::org_unit::level_column;
use crate::model::{
    AggregationType, DimensionItemType, DimensionalItem, DisplayProperty, MeasureFilter, OrgUnit,
    OrgUnitField, Period, Program, ProgramIndicator, QueryItem, SortOrder, TimeField,
    UserOrgUnitType,
};

/// Period column used when a query is not split by period type.
pub(crate) const DEFAULT_PERIOD_COLUMN: &str = PERIOD_DIM_ID;

/// Org unit column used when a query is not split by level.
pub(crate) const DEFAULT_ORG_UNIT_COLUMN: &str = ORGUNIT_DIM_ID;

/// A dimensional analytics request, or one sub-query derived from it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsQuery {
    dimensions: Vec<Dimension>,
    filters: Vec<Dimension>,
    aggregation_type: Option<AggregationType>,
    measure_criteria: BTreeMap<MeasureFilter, f64>,
    pre_aggregate_measure_criteria: BTreeMap<MeasureFilter, f64>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    sort_order: Option<SortOrder>,
    time_field: Option<TimeField>,
    org_unit_field: OrgUnitField,
    output: OutputOptions,
    aggregate_data: bool,
    collapse_data_dimensions: bool,
    aggregated_enrollments: bool,
    individual_evaluation: bool,
    display_property: DisplayProperty,
    id_schemes: IdSchemes,
    approval_level: Option<String>,
    relative_period_date: Option<NaiveDate>,
    user_org_unit: Option<String>,
    user_org_unit_type: Option<UserOrgUnitType>,
    current_user: Option<String>,
    program: Option<Program>,
    program_stage: Option<String>,
    items: Vec<QueryItem>,
    item_program_indicators: Vec<ProgramIndicator>,
    value: Option<DimensionalItem>,
    program_indicator: Option<ProgramIndicator>,
    period_type: Option<String>,
    org_unit_level: Option<u32>,
    table_name: Option<String>,
    partitions: Partitions,
    multiple_queries: bool,
}

impl AnalyticsQuery {
    pub fn builder() -> AnalyticsQueryBuilder {
        AnalyticsQueryBuilder::new()
    }

    /// A builder starting from a copy of this query.
    pub fn to_builder(&self) -> AnalyticsQueryBuilder {
        AnalyticsQueryBuilder {
            query: self.clone(),
        }
    }

    // =========================================================================
    // Dimensions
    // =========================================================================

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn filters(&self) -> &[Dimension] {
        &self.filters
    }

    pub fn dimension(&self, key: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.key == key)
    }

    pub fn filter(&self, key: &str) -> Option<&Dimension> {
        self.filters.iter().find(|d| d.key == key)
    }

    /// Dimension or filter with the given key.
    pub fn dimension_or_filter(&self, key: &str) -> Option<&Dimension> {
        self.dimension(key).or_else(|| self.filter(key))
    }

    /// Periods of the period dimension.
    pub fn periods(&self) -> Vec<&Period> {
        self.dimension(PERIOD_DIM_ID)
            .map(|d| d.period_items().collect())
            .unwrap_or_default()
    }

    /// Periods of the period filter.
    pub fn filter_periods(&self) -> Vec<&Period> {
        self.filter(PERIOD_DIM_ID)
            .map(|d| d.period_items().collect())
            .unwrap_or_default()
    }

    /// Periods of the period dimension followed by those of the filter.
    pub fn all_periods(&self) -> Vec<&Period> {
        let mut periods = self.periods();
        periods.extend(self.filter_periods());
        periods
    }

    pub fn org_units(&self) -> Vec<&OrgUnit> {
        self.dimension(ORGUNIT_DIM_ID)
            .map(|d| d.org_unit_items().collect())
            .unwrap_or_default()
    }

    pub fn filter_org_units(&self) -> Vec<&OrgUnit> {
        self.filter(ORGUNIT_DIM_ID)
            .map(|d| d.org_unit_items().collect())
            .unwrap_or_default()
    }

    /// Items of the data dimension, or of the data filter.
    pub fn data_items(&self) -> Vec<&DimensionalItem> {
        self.dimension_or_filter(DATA_X_DIM_ID)
            .map(|d| d.data_items().collect())
            .unwrap_or_default()
    }

    /// Data items of one kind.
    pub fn data_items_of_type(&self, item_type: DimensionItemType) -> Vec<&DimensionalItem> {
        self.data_items()
            .into_iter()
            .filter(|item| item.item_type() == item_type)
            .collect()
    }

    // =========================================================================
    // Options
    // =========================================================================

    pub fn aggregation_type(&self) -> Option<AggregationType> {
        self.aggregation_type
    }

    pub fn measure_criteria(&self) -> &BTreeMap<MeasureFilter, f64> {
        &self.measure_criteria
    }

    pub fn pre_aggregate_measure_criteria(&self) -> &BTreeMap<MeasureFilter, f64> {
        &self.pre_aggregate_measure_criteria
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    pub fn has_start_end_date(&self) -> bool {
        self.start_date.is_some() && self.end_date.is_some()
    }

    pub fn sort_order(&self) -> Option<SortOrder> {
        self.sort_order
    }

    pub fn time_field(&self) -> Option<TimeField> {
        self.time_field
    }

    pub fn org_unit_field(&self) -> &OrgUnitField {
        &self.org_unit_field
    }

    pub fn output(&self) -> &OutputOptions {
        &self.output
    }

    pub fn is_aggregate_data(&self) -> bool {
        self.aggregate_data
    }

    pub fn is_collapse_data_dimensions(&self) -> bool {
        self.collapse_data_dimensions
    }

    pub fn is_aggregated_enrollments(&self) -> bool {
        self.aggregated_enrollments
    }

    pub fn is_individual_evaluation(&self) -> bool {
        self.individual_evaluation
    }

    pub fn display_property(&self) -> DisplayProperty {
        self.display_property
    }

    pub fn id_schemes(&self) -> &IdSchemes {
        &self.id_schemes
    }

    pub fn approval_level(&self) -> Option<&str> {
        self.approval_level.as_deref()
    }

    pub fn relative_period_date(&self) -> Option<NaiveDate> {
        self.relative_period_date
    }

    pub fn user_org_unit(&self) -> Option<&str> {
        self.user_org_unit.as_deref()
    }

    pub fn user_org_unit_type(&self) -> Option<UserOrgUnitType> {
        self.user_org_unit_type
    }

    pub fn current_user(&self) -> Option<&str> {
        self.current_user.as_deref()
    }

    pub fn program(&self) -> Option<&Program> {
        self.program.as_ref()
    }

    pub fn program_stage(&self) -> Option<&str> {
        self.program_stage.as_deref()
    }

    pub fn items(&self) -> &[QueryItem] {
        &self.items
    }

    pub fn item_program_indicators(&self) -> &[ProgramIndicator] {
        &self.item_program_indicators
    }

    pub fn value(&self) -> Option<&DimensionalItem> {
        self.value.as_ref()
    }

    pub fn program_indicator(&self) -> Option<&ProgramIndicator> {
        self.program_indicator.as_ref()
    }

    pub fn has_program_indicator(&self) -> bool {
        self.program_indicator.is_some()
    }

    /// Whether the query's program indicator overrides the default
    /// analytics period boundaries.
    pub fn has_non_default_boundaries(&self) -> bool {
        self.program_indicator
            .as_ref()
            .is_some_and(ProgramIndicator::has_non_default_boundaries)
    }

    // =========================================================================
    // Sub-query state
    // =========================================================================

    /// Lower-cased period type name of a query split by period type.
    pub fn period_type(&self) -> Option<&str> {
        self.period_type.as_deref()
    }

    pub fn org_unit_level(&self) -> Option<u32> {
        self.org_unit_level
    }

    /// Column holding the period identifiers of this query.
    pub fn period_column(&self) -> String {
        self.period_type
            .clone()
            .unwrap_or_else(|| DEFAULT_PERIOD_COLUMN.to_string())
    }

    /// Column holding the org unit identifiers of this query.
    pub fn org_unit_column(&self) -> String {
        self.org_unit_level
            .map(level_column)
            .unwrap_or_else(|| DEFAULT_ORG_UNIT_COLUMN.to_string())
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    pub fn partitions(&self) -> &Partitions {
        &self.partitions
    }

    pub fn is_multiple_queries(&self) -> bool {
        self.multiple_queries
    }

    /// Earliest date the query reads: the start date, else the earliest
    /// period start.
    pub fn earliest_start_date(&self) -> Option<NaiveDate> {
        self.start_date.or_else(|| {
            self.all_periods()
                .into_iter()
                .map(Period::start_date)
                .min()
        })
    }

    /// Latest date the query reads: the end date, else the latest period
    /// end.
    pub fn latest_end_date(&self) -> Option<NaiveDate> {
        self.end_date.or_else(|| {
            self.all_periods()
                .into_iter()
                .map(Period::end_date)
                .max()
        })
    }

    /// The descriptor of a planned sub-query.
    pub fn descriptor(&self) -> QueryResult<SubQueryDescriptor> {
        let table_name = self.table_name.clone().ok_or(QueryError::NotPlanned)?;
        Ok(SubQueryDescriptor {
            table_name,
            partitions: self.partitions.to_vec(),
            multiple_queries: self.multiple_queries,
        })
    }
}

/// Builder for [`AnalyticsQuery`].
#[derive(Debug, Clone, Default)]
#[must_use = "builders have no effect until used"]
pub struct AnalyticsQueryBuilder {
    query: AnalyticsQuery,
}

impl AnalyticsQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(self) -> AnalyticsQuery {
        self.query
    }

    // =========================================================================
    // Dimensions
    // =========================================================================

    /// Add a dimension, replacing any dimension with the same key.
    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        upsert(&mut self.query.dimensions, dimension);
        self
    }

    /// Add a filter, replacing any filter with the same key.
    pub fn with_filter(mut self, filter: Dimension) -> Self {
        upsert(&mut self.query.filters, filter);
        self
    }

    pub fn remove_dimension(mut self, key: &str) -> Self {
        self.query.dimensions.retain(|d| d.key != key);
        self
    }

    pub fn remove_filter(mut self, key: &str) -> Self {
        self.query.filters.retain(|d| d.key != key);
        self
    }

    /// Replace the periods of the period dimension, or of the period filter
    /// when the query has no period dimension, and record their type.
    pub fn with_periods(mut self, periods: Vec<Period>, period_type: &str) -> Self {
        let items = periods.into_iter().map(DimensionItem::Period).collect();
        replace_items(&mut self.query, PERIOD_DIM_ID, items);
        self.query.period_type = Some(period_type.to_lowercase());
        self
    }

    /// Replace the org units of the org unit dimension, or filter, and
    /// record their level.
    pub fn with_org_units(mut self, org_units: Vec<OrgUnit>, level: u32) -> Self {
        let items = org_units.into_iter().map(DimensionItem::OrgUnit).collect();
        replace_items(&mut self.query, ORGUNIT_DIM_ID, items);
        self.query.org_unit_level = Some(level);
        self
    }

    // =========================================================================
    // Options
    // =========================================================================

    pub fn with_aggregation_type(mut self, aggregation_type: AggregationType) -> Self {
        self.query.aggregation_type = Some(aggregation_type);
        self
    }

    pub fn with_measure_criteria(mut self, criteria: BTreeMap<MeasureFilter, f64>) -> Self {
        self.query.measure_criteria = criteria;
        self
    }

    pub fn with_pre_aggregate_measure_criteria(
        mut self,
        criteria: BTreeMap<MeasureFilter, f64>,
    ) -> Self {
        self.query.pre_aggregate_measure_criteria = criteria;
        self
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.query.start_date = Some(date);
        self
    }

    pub fn with_end_date(mut self, date: NaiveDate) -> Self {
        self.query.end_date = Some(date);
        self
    }

    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.query.sort_order = Some(sort_order);
        self
    }

    pub fn with_time_field(mut self, time_field: TimeField) -> Self {
        self.query.time_field = Some(time_field);
        self
    }

    pub fn with_org_unit_field(mut self, field: OrgUnitField) -> Self {
        self.query.org_unit_field = field;
        self
    }

    pub fn with_output(mut self, output: OutputOptions) -> Self {
        self.query.output = output;
        self
    }

    pub fn with_aggregate_data(mut self, aggregate_data: bool) -> Self {
        self.query.aggregate_data = aggregate_data;
        self
    }

    pub fn with_collapse_data_dimensions(mut self, collapse: bool) -> Self {
        self.query.collapse_data_dimensions = collapse;
        self
    }

    pub fn with_aggregated_enrollments(mut self, aggregated: bool) -> Self {
        self.query.aggregated_enrollments = aggregated;
        self
    }

    pub fn with_individual_evaluation(mut self, individual: bool) -> Self {
        self.query.individual_evaluation = individual;
        self
    }

    pub fn with_display_property(mut self, property: DisplayProperty) -> Self {
        self.query.display_property = property;
        self
    }

    pub fn with_id_schemes(mut self, schemes: IdSchemes) -> Self {
        self.query.id_schemes = schemes;
        self
    }

    pub fn with_approval_level(mut self, level: &str) -> Self {
        self.query.approval_level = Some(level.into());
        self
    }

    pub fn with_relative_period_date(mut self, date: NaiveDate) -> Self {
        self.query.relative_period_date = Some(date);
        self
    }

    pub fn with_user_org_unit(mut self, org_unit: &str, org_unit_type: UserOrgUnitType) -> Self {
        self.query.user_org_unit = Some(org_unit.into());
        self.query.user_org_unit_type = Some(org_unit_type);
        self
    }

    pub fn with_current_user(mut self, username: &str) -> Self {
        self.query.current_user = Some(username.into());
        self
    }

    pub fn with_program(mut self, program: Program) -> Self {
        self.query.program = Some(program);
        self
    }

    pub fn with_program_stage(mut self, stage: &str) -> Self {
        self.query.program_stage = Some(stage.into());
        self
    }

    pub fn with_items(mut self, items: Vec<QueryItem>) -> Self {
        self.query.items = items;
        self
    }

    pub fn with_item(mut self, item: QueryItem) -> Self {
        self.query.items.push(item);
        self
    }

    pub fn with_item_program_indicators(mut self, indicators: Vec<ProgramIndicator>) -> Self {
        self.query.item_program_indicators = indicators;
        self
    }

    pub fn with_value(mut self, value: DimensionalItem) -> Self {
        self.query.value = Some(value);
        self
    }

    pub fn with_program_indicator(mut self, indicator: ProgramIndicator) -> Self {
        self.query.program_indicator = Some(indicator);
        self
    }

    // =========================================================================
    // Sub-query state
    // =========================================================================

    pub fn with_period_type(mut self, period_type: &str) -> Self {
        self.query.period_type = Some(period_type.to_lowercase());
        self
    }

    pub fn with_org_unit_level(mut self, level: u32) -> Self {
        self.query.org_unit_level = Some(level);
        self
    }

    pub fn with_table_name(mut self, table_name: &str) -> Self {
        self.query.table_name = Some(table_name.into());
        self
    }

    pub fn with_partitions(mut self, partitions: Partitions) -> Self {
        self.query.partitions = partitions;
        self
    }

    pub fn with_multiple_queries(mut self, multiple: bool) -> Self {
        self.query.multiple_queries = multiple;
        self
    }
}

fn upsert(dimensions: &mut Vec<Dimension>, dimension: Dimension) {
    match dimensions.iter_mut().find(|d| d.key == dimension.key) {
        Some(existing) => *existing = dimension,
        None => dimensions.push(dimension),
    }
}

/// Replace the items of the dimension with `key`, falling back to the filter
/// with that key.
fn replace_items(query: &mut AnalyticsQuery, key: &str, items: Vec<DimensionItem>) {
    if let Some(dim) = query.dimensions.iter_mut().find(|d| d.key == key) {
        dim.items = items;
    } else if let Some(filter) = query.filters.iter_mut().find(|d| d.key == key) {
        filter.items = items;
    }
}
