//! Aggregate query planning: grouping stages, fallback aggregation, and
//! sub-query stamping.

use cubeplan::model::{
    AggregationType, AnalyticsType, DimensionalItem, OrgUnit, Period, Program, ProgramIndicator,
    QueryItem,
};
use cubeplan::planner::QueryPlanner;
use cubeplan::query::{AnalyticsQuery, Dimension, SubQueryDescriptor};
use insta::assert_snapshot;

fn periods(isos: &[&str]) -> Vec<Period> {
    isos.iter().map(|p| Period::parse(p).unwrap()).collect()
}

fn base_query(isos: &[&str]) -> AnalyticsQuery {
    AnalyticsQuery::builder()
        .with_dimension(Dimension::data(vec![DimensionalItem::data_element(
            "fbfJHSPpUQD",
            "ANC 1st visit",
        )]))
        .with_dimension(Dimension::periods(periods(isos)))
        .with_dimension(Dimension::org_units(vec![OrgUnit::new(
            "ImspTQPwCqd",
            "Sierra Leone",
            1,
        )]))
        .build()
}

fn descriptors(queries: &[AnalyticsQuery]) -> Vec<SubQueryDescriptor> {
    queries.iter().map(|q| q.descriptor().unwrap()).collect()
}

#[test]
fn test_single_item_single_period_is_identity() {
    let query = base_query(&["202305"])
        .to_builder()
        .with_aggregation_type(AggregationType::Sum)
        .build();
    let planned = QueryPlanner::new().plan_aggregate_query(&query).unwrap();

    let expected = query
        .to_builder()
        .with_org_unit_level(1)
        .with_period_type("Monthly")
        .with_table_name("analytics")
        .with_partitions([2023].into_iter().collect())
        .build();
    assert_eq!(planned, vec![expected]);
}

#[test]
fn test_last_splits_every_period() {
    let query = base_query(&["202301", "202302", "202303"])
        .to_builder()
        .with_aggregation_type(AggregationType::Last)
        .build();
    let planned = QueryPlanner::new().plan_aggregate_query(&query).unwrap();

    assert_eq!(planned.len(), 3);
    let isos: Vec<String> = planned.iter().map(|q| q.periods()[0].iso()).collect();
    assert_eq!(isos, vec!["202301", "202302", "202303"]);
    assert!(planned.iter().all(|q| q.periods().len() == 1));
    assert!(planned.iter().all(|q| q.period_type() == Some("monthly")));

    let json = serde_json::to_string(&descriptors(&planned)).unwrap();
    assert_snapshot!(json, @r#"[{"tableName":"analytics","partitions":[2023],"multipleQueries":true},{"tableName":"analytics","partitions":[2023],"multipleQueries":true},{"tableName":"analytics","partitions":[2023],"multipleQueries":true}]"#);
}

#[test]
fn test_sum_keeps_periods_together() {
    let query = base_query(&["202301", "202302", "202303"])
        .to_builder()
        .with_aggregation_type(AggregationType::Sum)
        .build();
    let planned = QueryPlanner::new().plan_aggregate_query(&query).unwrap();
    assert_eq!(planned.len(), 1);
    assert_eq!(planned[0].periods().len(), 3);
    assert!(!planned[0].is_multiple_queries());
}

#[test]
fn test_stages_multiply() {
    let query = AnalyticsQuery::builder()
        .with_dimension(Dimension::periods(periods(&["2022", "202301", "202302"])))
        .with_dimension(Dimension::org_units(vec![
            OrgUnit::new("O6uvpzGd5pu", "Bo", 2),
            OrgUnit::new("DiszpKrYNg8", "Ngelehun CHC", 4),
        ]))
        .with_aggregation_type(AggregationType::LastAverageOrgUnit)
        .build();
    let planned = QueryPlanner::new().plan_aggregate_query(&query).unwrap();

    // 2 levels x (1 yearly + 2 monthly periods)
    assert_eq!(planned.len(), 6);
    assert!(planned.iter().all(AnalyticsQuery::is_multiple_queries));
    assert_eq!(planned[0].org_unit_column(), "uidlevel2");
    assert_eq!(planned[5].org_unit_column(), "uidlevel4");

    let years: Vec<Vec<i32>> = planned.iter().map(|q| q.partitions().to_vec()).collect();
    assert_eq!(years, vec![vec![2023], vec![2023], vec![2022], vec![2023], vec![2023], vec![2022]]);
}

#[test]
fn test_aggregate_data_items() {
    let program = Program::new("IpHINAT79UW", "Child Programme");
    let query = base_query(&["202305"])
        .to_builder()
        .with_aggregate_data(true)
        .with_items(vec![
            QueryItem::new(DimensionalItem::data_element("qrur9Dvnyt5", "Age")).with_program(program.clone()),
            QueryItem::new(DimensionalItem::data_element("oZg33kd9taw", "Weight"))
                .with_program(program.clone())
                .with_aggregation_type(AggregationType::Max),
        ])
        .with_item_program_indicators(vec![ProgramIndicator::new(
            "Uvn6LCg7dVU",
            "ANC visits",
            program,
            AnalyticsType::Enrollment,
        )
        .with_aggregation_type(AggregationType::LastInPeriod)])
        .build();

    let planned = QueryPlanner::new().plan_aggregate_query(&query).unwrap();
    assert_eq!(planned.len(), 3);
    assert_eq!(planned[0].aggregation_type(), Some(AggregationType::Sum));
    assert_eq!(planned[1].aggregation_type(), Some(AggregationType::Max));
    assert_eq!(planned[2].aggregation_type(), Some(AggregationType::Sum));

    assert_eq!(planned[0].table_name(), Some("analytics_event_iphinat79uw"));
    assert_eq!(planned[0].value().map(DimensionalItem::uid), Some("qrur9Dvnyt5"));
    assert_eq!(planned[2].table_name(), Some("analytics_enrollment_iphinat79uw"));
    assert!(planned[2].partitions().is_empty());
}

#[test]
fn test_item_type_wins_over_query_aggregation() {
    let query = base_query(&["202305"])
        .to_builder()
        .with_aggregate_data(true)
        .with_aggregation_type(AggregationType::Sum)
        .with_items(vec![QueryItem::new(
            DimensionalItem::data_element("qrur9Dvnyt5", "Age")
                .with_aggregation_type(AggregationType::Average),
        )])
        .build();

    let planned = QueryPlanner::new().plan_aggregate_query(&query).unwrap();
    assert_eq!(planned.len(), 1);
    assert_eq!(planned[0].aggregation_type(), Some(AggregationType::Average));
}

#[test]
fn test_fallback_table() {
    use AggregationType as A;

    let cases = [
        (A::AverageSumOrgUnit, A::Sum),
        (A::MinSumOrgUnit, A::Sum),
        (A::MaxSumOrgUnit, A::Sum),
        (A::LastInPeriod, A::Sum),
        (A::LastInPeriodAverageOrgUnit, A::Average),
        (A::Last, A::Last),
        (A::First, A::First),
        (A::FirstAverageOrgUnit, A::FirstAverageOrgUnit),
        (A::LastAverageOrgUnit, A::LastAverageOrgUnit),
        (A::Custom, A::Custom),
        (A::Average, A::Average),
        (A::Sum, A::Sum),
        (A::Stddev, A::Stddev),
        (A::Count, A::Count),
        (A::Max, A::Max),
        (A::Min, A::Min),
        (A::LastLastOrgUnit, A::Last),
        (A::FirstFirstOrgUnit, A::First),
        (A::Variance, A::Variance),
        (A::None, A::Average),
        (A::Default, A::Average),
    ];
    for (declared, expected) in cases {
        assert_eq!(A::fallback(Some(declared)), expected, "{:?}", declared);
    }
    assert_eq!(A::fallback(None), A::Average);
}
