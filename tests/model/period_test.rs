//! Period parsing, rendering and shifting.

use chrono::NaiveDate;
use cubeplan::model::{Period, PeriodError, PeriodType};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_iso_identifiers_round_trip() {
    for iso in [
        "20230501", "2023W18", "202305", "202303B", "2023Q2", "2023S1", "2023", "2023April",
        "2023July", "2023Oct",
    ] {
        assert_eq!(Period::parse(iso).unwrap().iso(), iso);
    }
}

#[test]
fn test_period_ranges() {
    let may = Period::parse("202305").unwrap();
    assert_eq!(may.period_type(), PeriodType::Monthly);
    assert_eq!(may.start_date(), date(2023, 5, 1));
    assert_eq!(may.end_date(), date(2023, 5, 31));
    assert_eq!(may.end_date_exclusive(), Some(date(2023, 6, 1)));

    let financial = Period::parse("2023April").unwrap();
    assert_eq!(financial.start_date(), date(2023, 4, 1));
    assert_eq!(financial.end_date(), date(2024, 3, 31));

    let week = Period::parse("2023W18").unwrap();
    assert_eq!(week.start_date(), date(2023, 5, 1));
    assert_eq!(week.end_date(), date(2023, 5, 7));

    let bimonth = Period::parse("202303B").unwrap();
    assert_eq!(bimonth.start_date(), date(2023, 5, 1));
    assert_eq!(bimonth.end_date(), date(2023, 6, 30));
}

#[test]
fn test_create_from_date() {
    let day = date(2023, 8, 15);
    assert_eq!(Period::of(PeriodType::Quarterly, day).unwrap().iso(), "2023Q3");
    assert_eq!(Period::of(PeriodType::SixMonthly, day).unwrap().iso(), "2023S2");
    assert_eq!(Period::of(PeriodType::FinancialOct, day).unwrap().iso(), "2022Oct");
    assert_eq!(Period::of(PeriodType::FinancialJuly, day).unwrap().iso(), "2023July");
}

#[test]
fn test_shift() {
    let may = Period::parse("202305").unwrap();
    assert_eq!(may.shift(-1).unwrap().iso(), "202304");
    assert_eq!(may.shift(-5).unwrap().iso(), "202212");
    assert_eq!(may.shift(8).unwrap().iso(), "202401");
    assert_eq!(may.shift(0).unwrap(), may);

    assert_eq!(Period::parse("2023Q1").unwrap().shift(-1).unwrap().iso(), "2022Q4");
    assert_eq!(Period::parse("2023W1").unwrap().shift(-1).unwrap().iso(), "2022W52");
}

#[test]
fn test_invalid_identifiers() {
    assert_eq!(
        Period::parse("2023Q5"),
        Err(PeriodError::InvalidIsoPeriod("2023Q5".to_string()))
    );
    assert!(Period::parse("202313").is_err());
    assert!(Period::parse("202307B").is_err());
    assert!(Period::parse("May 2023").is_err());
}

#[test]
fn test_period_type_names() {
    assert_eq!(PeriodType::from_name("monthly").unwrap(), PeriodType::Monthly);
    assert_eq!(PeriodType::FinancialApril.name(), "FinancialApril");
    assert!(matches!(
        PeriodType::from_name("Fortnightly"),
        Err(PeriodError::UnknownPeriodType(_))
    ));
}

#[test]
fn test_serde_uses_iso() {
    let json = serde_json::to_string(&Period::parse("2023Q2").unwrap()).unwrap();
    assert_eq!(json, "\"2023Q2\"");
    let period: Period = serde_json::from_str("\"202212\"").unwrap();
    assert_eq!(period.start_date(), date(2022, 12, 1));
}
