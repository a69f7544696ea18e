//! Filter operator translation to SQL.

use cubeplan::filter::{BindValue, FilterError, QueryFilter, QueryOperator};
use cubeplan::model::ValueType;

fn filter(op: QueryOperator, value: &str) -> QueryFilter {
    QueryFilter::new(op, value)
}

#[test]
fn test_operator_text() {
    let cases = [
        (QueryOperator::Eq, "="),
        (QueryOperator::Ieq, "="),
        (QueryOperator::Ne, "!="),
        (QueryOperator::Neq, "!="),
        (QueryOperator::Nieq, "!="),
        (QueryOperator::Gt, ">"),
        (QueryOperator::Ge, ">="),
        (QueryOperator::Lt, "<"),
        (QueryOperator::Le, "<="),
        (QueryOperator::Like, "like"),
        (QueryOperator::Nlike, "not like"),
        (QueryOperator::Ilike, "ilike"),
        (QueryOperator::Nilike, "not ilike"),
        (QueryOperator::Sw, "like"),
        (QueryOperator::Ew, "like"),
        (QueryOperator::In, "in"),
        (QueryOperator::Null, "is"),
        (QueryOperator::Nnull, "is not"),
    ];
    for (op, text) in cases {
        assert_eq!(filter(op, "x").sql_operator(false), text, "{}", op.as_str());
    }
}

#[test]
fn test_parse_operators() {
    assert_eq!("ilike".parse::<QueryOperator>().unwrap(), QueryOperator::Ilike);
    assert_eq!("!null".parse::<QueryOperator>().unwrap(), QueryOperator::Nnull);
    assert_eq!(
        "BETWEEN".parse::<QueryOperator>(),
        Err(FilterError::UnsupportedOperator("BETWEEN".to_string()))
    );

    let parsed: QueryFilter = "IN:a;b".parse().unwrap();
    assert_eq!(parsed, filter(QueryOperator::In, "a;b"));
    assert_eq!(parsed.to_string(), "IN:a;b");
    assert!(matches!("nothing".parse::<QueryFilter>(), Err(FilterError::MalformedFilter(_))));
}

#[test]
fn test_sql_filter_literals() {
    assert_eq!(filter(QueryOperator::Eq, "Male").sql_filter(false), "'Male'");
    assert_eq!(filter(QueryOperator::Eq, "O'Neil").sql_filter(false), "'O''Neil'");
    assert_eq!(filter(QueryOperator::In, "a;b;c").sql_filter(false), "('a','b','c')");
    assert_eq!(filter(QueryOperator::Like, "50%_off").sql_filter(false), "'%50\\%\\_off%'");
    assert_eq!(filter(QueryOperator::Ilike, "a\\").sql_filter(false), "'%a\\\\%'");
    assert_eq!(filter(QueryOperator::Sw, "ab_").sql_filter(false), "'ab_%'");
    assert_eq!(filter(QueryOperator::Ew, "it's").sql_filter(false), "'%it''s'");
    assert_eq!(filter(QueryOperator::Null, "ignored").sql_filter(false), "null");
    assert_eq!(filter(QueryOperator::Nnull, "").sql_filter(true), "null");
}

#[test]
fn test_null_sentinel() {
    let eq = filter(QueryOperator::Eq, "NV");
    assert_eq!(eq.sql_condition("ax.\"gender\"", ValueType::Text, true), "ax.\"gender\" is null");
    assert_eq!(eq.sql_condition("ax.\"gender\"", ValueType::Text, false), "ax.\"gender\" = 'NV'");

    let ne = filter(QueryOperator::Ne, "NV");
    assert_eq!(ne.sql_condition("ax.\"gender\"", ValueType::Text, true), "ax.\"gender\" is not null");

    // only equality operators honor the sentinel
    let gt = filter(QueryOperator::Gt, "NV");
    assert_eq!(gt.sql_condition("ax.\"age\"", ValueType::Number, true), "ax.\"age\" > 'NV'");
}

#[test]
fn test_case_insensitive_equality() {
    let ieq = filter(QueryOperator::Ieq, "MALE");
    assert_eq!(ieq.sql_condition("ax.\"gender\"", ValueType::Text, false), "lower(ax.\"gender\") = 'male'");
    assert_eq!(ieq.sql_condition("ax.\"gender\"", ValueType::Number, false), "ax.\"gender\" = 'MALE'");

    let nieq = filter(QueryOperator::Nieq, "Female");
    assert_eq!(nieq.sql_filter_column("ax.\"gender\"", ValueType::LongText), "lower(ax.\"gender\")");
    assert_eq!(nieq.sql_condition("ax.\"gender\"", ValueType::Email, false), "lower(ax.\"gender\") != 'female'");
}

#[test]
fn test_bind_values() {
    assert_eq!(
        filter(QueryOperator::In, "a;b").sql_bind_condition("ax.\"x\"", ValueType::Text, false),
        (
            "ax.\"x\" in (?,?)".to_string(),
            BindValue::List(vec!["a".to_string(), "b".to_string()])
        )
    );
    assert_eq!(
        filter(QueryOperator::Like, "a_b").sql_bind_filter(false),
        BindValue::Single("%a\\_b%".to_string())
    );
    assert_eq!(
        filter(QueryOperator::Eq, "NV").sql_bind_condition("ax.\"x\"", ValueType::Text, true),
        ("ax.\"x\" is null".to_string(), BindValue::Null)
    );
    assert_eq!(
        filter(QueryOperator::Ieq, "ABC").sql_bind_condition("ax.\"x\"", ValueType::Text, false),
        ("lower(ax.\"x\") = ?".to_string(), BindValue::Single("abc".to_string()))
    );
}
