//! The groupers of the aggregate planning pipeline.
//!
//! Each grouper maps one query to the sub-queries it splits into. A query a
//! grouper does not apply to comes back unchanged as a single-element list.

use std::collections::BTreeMap;

use crate::model::{OrgUnit, Period, PeriodType};
use crate::query::AnalyticsQuery;

/// A pipeline stage.
pub type Grouper = fn(&AnalyticsQuery) -> Vec<AnalyticsQuery>;

/// The stages of [`super::QueryPlanner::plan_aggregate_query`], in order.
pub const GROUPERS: [(&str, Grouper); 4] = [
    ("query items", group_by_query_items),
    ("org unit level", group_by_org_unit_level),
    ("period type", group_by_period_type),
    ("period", group_by_period),
];

/// One sub-query per query item and per item program indicator when
/// aggregating data; one per query item when collapsing data dimensions.
pub fn group_by_query_items(query: &AnalyticsQuery) -> Vec<AnalyticsQuery> {
    if query.is_aggregate_data() {
        if query.items().is_empty() && query.item_program_indicators().is_empty() {
            return vec![query.clone()];
        }

        let items = query.items().iter().map(|item| {
            let aggregation_type = item
                .aggregation_type
                .unwrap_or_else(|| item.item.aggregation_type());

            let mut builder = query
                .to_builder()
                .with_items(vec![item.clone()])
                .with_item_program_indicators(Vec::new())
                .with_value(item.item.clone())
                .with_aggregation_type(aggregation_type);
            if let Some(program) = &item.program {
                builder = builder.with_program(program.clone());
            }
            builder.build()
        });

        let indicators = query.item_program_indicators().iter().map(|pi| {
            query
                .to_builder()
                .with_items(Vec::new())
                .with_item_program_indicators(vec![pi.clone()])
                .with_program_indicator(pi.clone())
                .with_program(pi.program.clone())
                .with_aggregation_type(pi.aggregation_type_fallback())
                .with_org_unit_field(pi.org_unit_field())
                .build()
        });

        items.chain(indicators).collect()
    } else if query.is_collapse_data_dimensions() && !query.items().is_empty() {
        query
            .items()
            .iter()
            .map(|item| query.to_builder().with_items(vec![item.clone()]).build())
            .collect()
    } else {
        vec![query.clone()]
    }
}

/// One sub-query per hierarchy level of the org units of the org unit
/// dimension.
pub fn group_by_org_unit_level(query: &AnalyticsQuery) -> Vec<AnalyticsQuery> {
    let org_units = query.org_units();
    if org_units.is_empty() {
        return vec![query.clone()];
    }

    let mut by_level: BTreeMap<u32, Vec<OrgUnit>> = BTreeMap::new();
    for ou in org_units {
        by_level.entry(ou.level).or_default().push(ou.clone());
    }

    by_level
        .into_iter()
        .map(|(level, units)| query.to_builder().with_org_units(units, level).build())
        .collect()
}

/// One sub-query per period type of the periods of the period dimension,
/// or of the period filter when there is no period dimension.
pub fn group_by_period_type(query: &AnalyticsQuery) -> Vec<AnalyticsQuery> {
    let periods = match query.periods() {
        periods if !periods.is_empty() => periods,
        _ => query.filter_periods(),
    };
    if periods.is_empty() {
        return vec![query.clone()];
    }

    let mut by_type: BTreeMap<PeriodType, Vec<Period>> = BTreeMap::new();
    for period in periods {
        by_type
            .entry(period.period_type())
            .or_default()
            .push(period.clone());
    }

    by_type
        .into_iter()
        .map(|(period_type, periods)| {
            query
                .to_builder()
                .with_periods(periods, period_type.name())
                .build()
        })
        .collect()
}

/// Whether periods must be evaluated one at a time.
///
/// Any one of: a last-value aggregation type, an ownership org unit field,
/// an explicit request for individual evaluation, or program indicator
/// boundaries other than the defaults.
pub fn requires_period_split(query: &AnalyticsQuery) -> bool {
    query
        .aggregation_type()
        .is_some_and(|t| t.is_last_period_aggregation_type())
        || query.org_unit_field().is_ownership()
        || query.is_individual_evaluation()
        || query.has_non_default_boundaries()
}

/// One sub-query per period of the period dimension, when
/// [`requires_period_split`] holds.
pub fn group_by_period(query: &AnalyticsQuery) -> Vec<AnalyticsQuery> {
    let periods = query.periods();
    if !requires_period_split(query) || periods.is_empty() {
        return vec![query.clone()];
    }

    periods
        .into_iter()
        .map(|period| {
            query
                .to_builder()
                .with_periods(vec![period.clone()], period.period_type().name())
                .build()
        })
        .collect()
}
