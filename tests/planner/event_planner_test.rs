//! Event and enrollment query planning.

use cubeplan::model::{AnalyticsTableType, AnalyticsType, Period, Program, ProgramIndicator};
use cubeplan::partition::{PartitionError, StaticPartitionProbe};
use cubeplan::planner::{PlanError, QueryPlanner};
use cubeplan::query::{AnalyticsQuery, Dimension};

fn program() -> Program {
    Program::new("IpHINAT79UW", "Child Programme")
}

fn event_query(isos: &[&str]) -> AnalyticsQuery {
    AnalyticsQuery::builder()
        .with_program(program())
        .with_dimension(Dimension::periods(
            isos.iter().map(|p| Period::parse(p).unwrap()).collect(),
        ))
        .build()
}

#[test]
fn test_event_query_is_not_split() {
    let query = event_query(&["202212", "202301", "2023Q2"]);
    let planned = QueryPlanner::new().plan_event_query(&query).unwrap();

    assert_eq!(planned.table_name(), Some("analytics_event_iphinat79uw"));
    assert_eq!(planned.partitions().to_vec(), vec![2022, 2023]);
    assert_eq!(planned.periods().len(), 3);
    assert_eq!(planned.period_type(), None);
    assert!(!planned.is_multiple_queries());
}

#[test]
fn test_event_query_with_enrollment_indicator_reads_enrollments() {
    let indicator = ProgramIndicator::new("Uvn6LCg7dVU", "ANC visits", program(), AnalyticsType::Enrollment);
    let query = event_query(&["2023"])
        .to_builder()
        .with_program_indicator(indicator)
        .build();
    let planned = QueryPlanner::new().plan_event_query(&query).unwrap();
    assert_eq!(planned.table_name(), Some("analytics_enrollment_iphinat79uw"));
    assert!(planned.partitions().is_empty());
}

#[test]
fn test_event_query_without_program_reads_data_values() {
    let without_program = AnalyticsQuery::builder()
        .with_dimension(Dimension::periods(vec![Period::parse("2023").unwrap()]))
        .build();
    let planned = QueryPlanner::new().plan_event_query(&without_program).unwrap();
    assert_eq!(planned.table_name(), Some("analytics"));
}

#[test]
fn test_enrollment_query() {
    let query = event_query(&["2022", "2023"]);
    let planned = QueryPlanner::new().plan_enrollment_query(&query).unwrap();
    assert_eq!(planned.table_name(), Some("analytics_enrollment_iphinat79uw"));
    assert!(planned.partitions().is_empty());

    let descriptor = planned.descriptor().unwrap();
    assert_eq!(descriptor.table_name, "analytics_enrollment_iphinat79uw");
    assert!(descriptor.partitions.is_empty());
}

#[test]
fn test_enrollment_query_requires_program() {
    let query = AnalyticsQuery::builder()
        .with_dimension(Dimension::periods(vec![Period::parse("2023").unwrap()]))
        .build();
    assert!(matches!(
        QueryPlanner::new().plan_enrollment_query(&query),
        Err(PlanError::Partition(PartitionError::MissingProgram(AnalyticsTableType::Enrollment)))
    ));
}

#[test]
fn test_probe_only_prunes_for_users() {
    let probe = StaticPartitionProbe::new().with_partition("analytics_event_iphinat79uw", 2023);
    let planner = QueryPlanner::with_probe(&probe);
    assert!(planner.resolver().has_probe());

    let query = event_query(&["2021", "2022", "2023"]);
    let anonymous = planner.plan_event_query(&query).unwrap();
    assert_eq!(anonymous.partitions().to_vec(), vec![2021, 2022, 2023]);

    let user = query.to_builder().with_current_user("admin").build();
    let pruned = planner.plan_event_query(&user).unwrap();
    assert_eq!(pruned.partitions().to_vec(), vec![2023]);

    // pruning never changes anything but the partitions
    let expected = anonymous
        .to_builder()
        .with_current_user("admin")
        .with_partitions([2023].into_iter().collect())
        .build();
    assert_eq!(pruned, expected);
}
