//! Subexpression pivot and period shift statements.

use cubeplan::model::{
    AggregationType, BaseObject, CategoryCombo, CategoryError, CategoryOptionCombo, DimensionType,
    DimensionalItem, OrgUnit, Period, QueryModifiers,
};
use cubeplan::query::{AnalyticsQuery, Dimension, DimensionItem};
use cubeplan::sql::subexpression::column_alias;
use cubeplan::sql::{Dialect, RenderError, Subexpression, SubexpressionSqlGenerator};
use insta::assert_snapshot;
use sqlparser::dialect::{DuckDbDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;

fn de(uid: &str) -> DimensionalItem {
    DimensionalItem::data_element(uid, uid)
}

fn operand(de: &str, coc: Option<&str>, aoc: Option<&str>) -> DimensionalItem {
    let combo = |uid: &str| BaseObject::new(uid, uid);
    DimensionalItem::operand(BaseObject::new(de, de), coc.map(combo), aoc.map(combo))
}

fn query() -> AnalyticsQuery {
    AnalyticsQuery::builder()
        .with_dimension(Dimension::periods(vec![Period::parse("202305").unwrap()]))
        .with_dimension(Dimension::org_units(vec![OrgUnit::new("ImspTQPwCqd", "Sierra Leone", 1)]))
        .build()
}

fn golden_subexpression() -> Subexpression {
    Subexpression::new("subExprA01", "deA*(deoA+deoB)+deoC-deE")
        .with_item("deA", de("deA"))
        .with_item("deoA", operand("deB", Some("cocA"), None))
        .with_item("deoB", operand("deC", Some("cocB"), Some("cocC")))
        .with_item("deoC", operand("deD", None, Some("cocD")))
        .with_item(
            "deE",
            de("deE").with_query_mods(QueryModifiers::aggregation(AggregationType::Min)),
        )
}

#[test]
fn test_pivot_golden() {
    let sql = SubexpressionSqlGenerator::default()
        .get_sql(&golden_subexpression(), &query())
        .unwrap();

    let expected = concat!(
        r#"select ax."pe",ax."ou",sum("deA"*("deB_cocA"+"deC_cocB_cocC")+"deD__cocD"-"deE_agg_min") as "value" "#,
        r#"from (select ax."pe",ax."ou","#,
        r#"sum(case when ax."dx" = 'deA' then ax."value"::numeric else null end) as "deA","#,
        r#"sum(case when ax."dx" = 'deB' and ax."co" = 'cocA' then ax."value"::numeric else null end) as "deB_cocA","#,
        r#"sum(case when ax."dx" = 'deC' and ax."co" = 'cocB' and ax."ao" = 'cocC' then ax."value"::numeric else null end) as "deC_cocB_cocC","#,
        r#"sum(case when ax."dx" = 'deD' and ax."ao" = 'cocD' then ax."value"::numeric else null end) as "deD__cocD","#,
        r#"min(case when ax."dx" = 'deE' then ax."value"::numeric else null end) as "deE_agg_min" "#,
        r#"from "analytics" as ax "#,
        r#"where ax."dx" in ('deA','deB','deC','deD','deE') and ax."pe" in ('202305') and ax."ou" in ('ImspTQPwCqd') "#,
        r#"group by ax."pe",ax."ou") as ax "#,
        r#"where ("deA"*("deB_cocA"+"deC_cocB_cocC")+"deD__cocD"-"deE_agg_min") is not null "#,
        r#"group by ax."pe",ax."ou""#,
    );
    assert_eq!(sql, expected);
    Parser::parse_sql(&PostgreSqlDialect {}, &sql).unwrap();
}

#[test]
fn test_period_offset_joins_shift_table() {
    let sub = Subexpression::new("subExprB01", "a-b")
        .with_item("a", de("deA"))
        .with_item("b", de("deA").with_query_mods(QueryModifiers::offset(-1)));
    let sql = SubexpressionSqlGenerator::default().get_sql(&sub, &query()).unwrap();

    assert_snapshot!(sql, @r#"select ax."pe",sum("deA"-"deA_minus_1") as "value" from (select shift."reportperiod" as "pe",ax."ou",sum(case when shift."delta" = 0 and ax."dx" = 'deA' then ax."value"::numeric else null end) as "deA",sum(case when shift."delta" = -1 and ax."dx" = 'deA' then ax."value"::numeric else null end) as "deA_minus_1" from "analytics" as ax join (values (-1,'202305','202304'),(0,'202305','202305')) as shift ("delta","reportperiod","dataperiod") on shift."dataperiod" = ax."pe" where ax."dx" in ('deA') and ax."pe" in ('202304','202305') and ax."ou" in ('ImspTQPwCqd') group by shift."reportperiod",ax."ou") as ax where ("deA"-"deA_minus_1") is not null group by ax."pe""#);
    Parser::parse_sql(&PostgreSqlDialect {}, &sql).unwrap();
}

#[test]
fn test_forward_offsets_cover_every_period() {
    let sub = Subexpression::new("subExprC01", "a+b")
        .with_item("a", de("deA"))
        .with_item("b", de("deB").with_query_mods(QueryModifiers::offset(2)));
    let q = query()
        .to_builder()
        .with_dimension(Dimension::periods(vec![
            Period::parse("2022Q4").unwrap(),
            Period::parse("2023Q1").unwrap(),
        ]))
        .build();
    let sql = SubexpressionSqlGenerator::default().get_sql(&sub, &q).unwrap();

    assert!(sql.contains(
        "(values (0,'2022Q4','2022Q4'),(0,'2023Q1','2023Q1'),(2,'2022Q4','2023Q2'),(2,'2023Q1','2023Q3'))"
    ));
    assert!(sql.contains("ax.\"pe\" in ('2022Q4','2023Q1','2023Q2','2023Q3')"));
    assert!(sql.contains("as \"deB_plus_2\""));
}

#[test]
fn test_sub_query_columns_and_filters() {
    let q = query()
        .to_builder()
        .with_periods(vec![Period::parse("202305").unwrap()], "Monthly")
        .with_org_units(vec![OrgUnit::new("O6uvpzGd5pu", "Bo", 2)], 2)
        .with_filter(Dimension::new(
            "J5jldMd8OHv",
            DimensionType::OrganisationUnitGroupSet,
            vec![DimensionItem::Option(BaseObject::new("CXw2yu5fodb", "CHC"))],
        ))
        .with_aggregation_type(AggregationType::Average)
        .with_table_name("analytics_2023")
        .build();
    let sub = Subexpression::new("subExprD01", "a/b")
        .with_item("a", de("deA"))
        .with_item("b", de("deB"));
    let sql = SubexpressionSqlGenerator::new(Dialect::DuckDb).get_sql(&sub, &q).unwrap();

    assert!(sql.starts_with("select ax.\"monthly\",ax.\"uidlevel2\",avg(\"deA\"/\"deB\") as \"value\""));
    assert!(sql.contains("cast(ax.\"value\" as double)"));
    assert!(sql.contains("from \"analytics_2023\" as ax"));
    assert!(sql.contains("ax.\"monthly\" in ('202305') and ax.\"uidlevel2\" in ('O6uvpzGd5pu')"));
    assert!(sql.contains("and ax.\"J5jldMd8OHv\" in ('CXw2yu5fodb')"));
    assert!(sql.ends_with("group by ax.\"monthly\",ax.\"uidlevel2\""));
    Parser::parse_sql(&DuckDbDialect {}, &sql).unwrap();
}

#[test]
fn test_literals_are_escaped() {
    let sub = Subexpression::new("subExprE01", "a").with_item("a", de("de'A"));
    let sql = SubexpressionSqlGenerator::default().get_sql(&sub, &query()).unwrap();
    assert!(sql.contains("ax.\"dx\" = 'de''A'"));
    assert!(sql.contains("ax.\"dx\" in ('de''A')"));
}

#[test]
fn test_aliases() {
    assert_eq!(column_alias(&operand("deA", None, Some("aocA"))), "deA__aocA");
    assert_eq!(
        column_alias(
            &operand("deA", Some("cocA"), None).with_query_mods(QueryModifiers {
                aggregation_type: Some(AggregationType::Last),
                period_offset: Some(-12),
            })
        ),
        "deA_cocA_agg_last_minus_12"
    );
}

#[test]
fn test_empty_subexpression_is_rejected() {
    assert_eq!(
        SubexpressionSqlGenerator::default().get_sql(&Subexpression::new("subExprF01", "1"), &query()),
        Err(RenderError::EmptySubexpression("subExprF01".to_string()))
    );
}

#[test]
fn test_offset_without_periods_is_rejected() {
    let sub = Subexpression::new("s1", "a-b")
        .with_item("a", de("deA"))
        .with_item("b", de("deA").with_query_mods(QueryModifiers::offset(-1)));

    let err = SubexpressionSqlGenerator::default()
        .get_sql(&sub, &AnalyticsQuery::default())
        .unwrap_err();

    assert_eq!(err, RenderError::MissingPeriods("s1".into()));
}

#[test]
fn test_offset_out_of_range_is_an_error() {
    let query = AnalyticsQuery::builder()
        .with_dimension(Dimension::periods(vec![Period::parse("2023").unwrap()]))
        .build();
    let sub = Subexpression::new("s1", "a")
        .with_item("a", de("deA").with_query_mods(QueryModifiers::offset(-400_000_000)));

    let err = SubexpressionSqlGenerator::default()
        .get_sql(&sub, &query)
        .unwrap_err();

    assert!(matches!(err, RenderError::Period(_)), "{err:?}");
}

#[test]
fn test_operand_resolved_from_options() {
    let combo = CategoryCombo::new("dPmavA0qloX", "Sex and age")
        .with_option_combo(CategoryOptionCombo::new("cocFemU5", "Female, <5", ["female", "under5"]))
        .with_option_combo(CategoryOptionCombo::new("cocMalU5", "Male, <5", ["male", "under5"]));

    let item = DimensionalItem::operand_for_options(BaseObject::new("deA", "deA"), &combo, &["under5", "male"])
        .unwrap();
    assert_eq!(column_alias(&item), "deA_cocMalU5");

    let err = DimensionalItem::operand_for_options(BaseObject::new("deA", "deA"), &combo, &["over5"])
        .unwrap_err();
    assert_eq!(
        err,
        CategoryError::UnresolvableOptionCombo {
            combo: "dPmavA0qloX".to_string(),
            options: vec!["over5".to_string()],
        }
    );
}
