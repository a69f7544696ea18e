//! Query construction through the builder and from request criteria.

use chrono::NaiveDate;
use cubeplan::idscheme::IdScheme;
use cubeplan::model::{
    AggregationType, DimensionalItem, MeasureFilter, OrgUnit, OrgUnitField, Period, TimeField,
};
use cubeplan::query::criteria::{parse_measure_criteria, DimensionParam};
use cubeplan::query::{AnalyticsCriteria, AnalyticsQuery, AnalyticsQueryBuilder, Dimension, QueryError};

fn periods(isos: &[&str]) -> Vec<Period> {
    isos.iter().map(|p| Period::parse(p).unwrap()).collect()
}

#[test]
fn test_builder_does_not_touch_source_query() {
    let original = AnalyticsQuery::builder()
        .with_dimension(Dimension::periods(periods(&["202301", "202302"])))
        .with_aggregation_type(AggregationType::Sum)
        .build();

    let derived = original
        .to_builder()
        .with_periods(periods(&["202301"]), "Monthly")
        .with_aggregation_type(AggregationType::Last)
        .build();

    assert_eq!(original.periods().len(), 2);
    assert_eq!(original.period_type(), None);
    assert_eq!(original.aggregation_type(), Some(AggregationType::Sum));
    assert_eq!(derived.periods().len(), 1);
    assert_eq!(derived.period_type(), Some("monthly"));
    assert_eq!(derived.period_column(), "monthly");
}

#[test]
fn test_dimensions_are_replaced_by_key() {
    let query = AnalyticsQuery::builder()
        .with_dimension(Dimension::periods(periods(&["2022"])))
        .with_dimension(Dimension::periods(periods(&["2023"])))
        .with_dimension(Dimension::data(vec![DimensionalItem::data_element("fbfJHSPpUQD", "ANC 1st visit")]))
        .build();

    assert_eq!(query.dimensions().len(), 2);
    assert_eq!(query.periods()[0].iso(), "2023");
    assert_eq!(query.data_items()[0].uid(), "fbfJHSPpUQD");

    let without = query.to_builder().remove_dimension("pe").build();
    assert!(without.periods().is_empty());
}

#[test]
fn test_org_unit_level_and_column() {
    let query = AnalyticsQuery::builder()
        .with_dimension(Dimension::org_units(vec![OrgUnit::new("ImspTQPwCqd", "Sierra Leone", 1)]))
        .build();
    assert_eq!(query.org_unit_column(), "ou");

    let level = query
        .to_builder()
        .with_org_units(vec![OrgUnit::new("O6uvpzGd5pu", "Bo", 2)], 2)
        .build();
    assert_eq!(level.org_unit_level(), Some(2));
    assert_eq!(level.org_unit_column(), "uidlevel2");
    assert_eq!(level.org_units()[0].uid(), "O6uvpzGd5pu");
}

#[test]
fn test_date_range_spans_dimension_and_filter() {
    let query = AnalyticsQuery::builder()
        .with_dimension(Dimension::periods(periods(&["202303"])))
        .with_filter(Dimension::periods(periods(&["2022Q4"])))
        .build();
    assert_eq!(query.earliest_start_date(), NaiveDate::from_ymd_opt(2022, 10, 1));
    assert_eq!(query.latest_end_date(), NaiveDate::from_ymd_opt(2023, 3, 31));

    let explicit = query
        .to_builder()
        .with_start_date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
        .with_end_date(NaiveDate::from_ymd_opt(2020, 6, 30).unwrap())
        .build();
    assert!(explicit.has_start_end_date());
    assert_eq!(explicit.earliest_start_date(), NaiveDate::from_ymd_opt(2020, 1, 1));
}

#[test]
fn test_descriptor_requires_planning() {
    assert_eq!(AnalyticsQuery::default().descriptor(), Err(QueryError::NotPlanned));

    let planned = AnalyticsQuery::builder()
        .with_table_name("analytics")
        .with_partitions([2023, 2022].into_iter().collect())
        .build();
    let descriptor = planned.descriptor().unwrap();
    assert_eq!(descriptor.partitions, vec![2022, 2023]);
    assert_eq!(
        serde_json::to_string(&descriptor).unwrap(),
        r#"{"tableName":"analytics","partitions":[2022,2023],"multipleQueries":false}"#
    );
}

#[test]
fn test_dimension_param_parsing() {
    let param = DimensionParam::parse("pe:202301;202302").unwrap();
    assert!(param.is_period());
    assert_eq!(param.items, vec!["202301", "202302"]);

    assert_eq!(
        DimensionParam::parse("no-separator"),
        Err(QueryError::InvalidDimension("no-separator".to_string()))
    );
}

#[test]
fn test_measure_criteria() {
    let criteria = parse_measure_criteria("GE:10;lt:50.5").unwrap();
    assert_eq!(criteria.get(&MeasureFilter::Ge), Some(&10.0));
    assert_eq!(criteria.get(&MeasureFilter::Lt), Some(&50.5));
    assert!(matches!(
        parse_measure_criteria("XX:1"),
        Err(QueryError::InvalidMeasureCriteria(_))
    ));
}

#[test]
fn test_from_criteria() {
    let json = r#"{
        "dimension": ["dx:fbfJHSPpUQD", "pe:202301;202302"],
        "filter": ["ou:ImspTQPwCqd", "pe:2022"],
        "aggregationType": "LAST",
        "measureCriteria": "GT:5",
        "startDate": "2023-01-01",
        "endDate": "2023-02-28",
        "timeField": "ENROLLMENT_DATE",
        "orgUnitField": "OWNER_AT_END",
        "outputIdScheme": "CODE",
        "skipMeta": true,
        "aggregateData": true
    }"#;
    let criteria: AnalyticsCriteria = serde_json::from_str(json).unwrap();
    let query = AnalyticsQueryBuilder::from_criteria(&criteria).unwrap().build();

    assert_eq!(query.periods().len(), 2);
    assert_eq!(query.filter_periods()[0].iso(), "2022");
    assert!(query.dimension("dx").is_none());
    assert_eq!(query.aggregation_type(), Some(AggregationType::Last));
    assert_eq!(query.measure_criteria().get(&MeasureFilter::Gt), Some(&5.0));
    assert_eq!(query.start_date(), NaiveDate::from_ymd_opt(2023, 1, 1));
    assert_eq!(query.time_field(), Some(TimeField::EnrollmentDate));
    assert_eq!(query.org_unit_field(), &OrgUnitField::OwnerAtEnd);
    assert_eq!(query.id_schemes().output_id_scheme, IdScheme::Code);
    assert!(query.output().skip_meta);
    assert!(query.is_aggregate_data());
}

#[test]
fn test_from_criteria_rejects_bad_input() {
    let bad_date = AnalyticsCriteria {
        start_date: Some("01/01/2023".to_string()),
        ..Default::default()
    };
    assert_eq!(
        AnalyticsQueryBuilder::from_criteria(&bad_date).unwrap_err(),
        QueryError::InvalidDate("01/01/2023".to_string())
    );

    let bad_period = AnalyticsCriteria {
        dimension: vec!["pe:2023X".to_string()],
        ..Default::default()
    };
    assert!(matches!(
        AnalyticsQueryBuilder::from_criteria(&bad_period),
        Err(QueryError::Period(_))
    ));

    let bad_scheme = AnalyticsCriteria {
        output_id_scheme: Some("SHORT".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        AnalyticsQueryBuilder::from_criteria(&bad_scheme),
        Err(QueryError::IdScheme(_))
    ));
}
