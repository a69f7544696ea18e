//! Periods and period types.
//!
//! A period is a closed date range `[start, end]` of a given period type.
//! Periods are identified on the wire by ISO-style period identifiers:
//!
//! | Type           | Example    |
//! |----------------|------------|
//! | Daily          | `20230501` |
//! | Weekly         | `2023W18`  |
//! | Monthly        | `202305`   |
//! | BiMonthly      | `202303B`  |
//! | Quarterly      | `2023Q2`   |
//! | SixMonthly     | `2023S1`   |
//! | Yearly         | `2023`     |
//! | FinancialApril | `2023April`|
//! | FinancialJuly  | `2023July` |
//! | FinancialOct   | `2023Oct`  |

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Errors raised while building, parsing, or shifting periods.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PeriodError {
    #[error("Invalid period identifier: '{0}'")]
    InvalidIsoPeriod(String),

    #[error("Unknown period type: '{0}'")]
    UnknownPeriodType(String),

    #[error("Period out of supported date range: {period_type} at {date}")]
    OutOfRange { period_type: String, date: String },
}

/// A period type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PeriodType {
    Daily,
    Weekly,
    Monthly,
    BiMonthly,
    Quarterly,
    SixMonthly,
    Yearly,
    FinancialApril,
    FinancialJuly,
    FinancialOct,
}

impl PeriodType {
    pub const ALL: [PeriodType; 10] = [
        PeriodType::Daily,
        PeriodType::Weekly,
        PeriodType::Monthly,
        PeriodType::BiMonthly,
        PeriodType::Quarterly,
        PeriodType::SixMonthly,
        PeriodType::Yearly,
        PeriodType::FinancialApril,
        PeriodType::FinancialJuly,
        PeriodType::FinancialOct,
    ];

    /// Period type name; its lower-cased form names the period column.
    pub fn name(&self) -> &'static str {
        match self {
            PeriodType::Daily => "Daily",
            PeriodType::Weekly => "Weekly",
            PeriodType::Monthly => "Monthly",
            PeriodType::BiMonthly => "BiMonthly",
            PeriodType::Quarterly => "Quarterly",
            PeriodType::SixMonthly => "SixMonthly",
            PeriodType::Yearly => "Yearly",
            PeriodType::FinancialApril => "FinancialApril",
            PeriodType::FinancialJuly => "FinancialJuly",
            PeriodType::FinancialOct => "FinancialOct",
        }
    }

    /// Look up a period type by name, ignoring case.
    pub fn from_name(name: &str) -> Result<Self, PeriodError> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| PeriodError::UnknownPeriodType(name.to_string()))
    }

    /// Length in months for month-based types.
    fn months(&self) -> Option<u32> {
        match self {
            PeriodType::Daily | PeriodType::Weekly => None,
            PeriodType::Monthly => Some(1),
            PeriodType::BiMonthly => Some(2),
            PeriodType::Quarterly => Some(3),
            PeriodType::SixMonthly => Some(6),
            PeriodType::Yearly
            | PeriodType::FinancialApril
            | PeriodType::FinancialJuly
            | PeriodType::FinancialOct => Some(12),
        }
    }

    /// First month (1-based) of the type's yearly cycle.
    fn anchor_month(&self) -> u32 {
        match self {
            PeriodType::FinancialApril => 4,
            PeriodType::FinancialJuly => 7,
            PeriodType::FinancialOct => 10,
            _ => 1,
        }
    }

    fn out_of_range(&self, date: NaiveDate) -> PeriodError {
        PeriodError::OutOfRange {
            period_type: self.name().to_string(),
            date: date.to_string(),
        }
    }

    /// The period of this type containing `date`.
    pub fn create_period(&self, date: NaiveDate) -> Result<Period, PeriodError> {
        let (start, end) = match self {
            PeriodType::Daily => (date, date),
            PeriodType::Weekly => {
                let back = u64::from(date.weekday().num_days_from_monday());
                let start = date
                    .checked_sub_days(Days::new(back))
                    .ok_or_else(|| self.out_of_range(date))?;
                let end = start
                    .checked_add_days(Days::new(6))
                    .ok_or_else(|| self.out_of_range(date))?;
                (start, end)
            }
            _ => {
                let months = self.months().unwrap_or(1) as i32;
                let anchor0 = self.anchor_month() as i32 - 1;
                let delta = (date.month0() as i32 - anchor0).rem_euclid(months);
                let start_abs = date.year() * 12 + date.month0() as i32 - delta;
                let start = NaiveDate::from_ymd_opt(
                    start_abs.div_euclid(12),
                    start_abs.rem_euclid(12) as u32 + 1,
                    1,
                )
                .ok_or_else(|| self.out_of_range(date))?;
                let end = start
                    .checked_add_months(Months::new(months as u32))
                    .and_then(|d| d.pred_opt())
                    .ok_or_else(|| self.out_of_range(date))?;
                (start, end)
            }
        };

        Ok(Period {
            period_type: *self,
            start,
            end,
        })
    }

    /// Move `date` by `n` periods of this type (negative moves back).
    pub fn shift_date(&self, date: NaiveDate, n: i32) -> Result<NaiveDate, PeriodError> {
        let magnitude = n.unsigned_abs();
        let shifted = match self.months() {
            Some(months) => {
                let months = months
                    .checked_mul(magnitude)
                    .map(Months::new)
                    .ok_or_else(|| self.out_of_range(date))?;
                if n < 0 {
                    date.checked_sub_months(months)
                } else {
                    date.checked_add_months(months)
                }
            }
            None => {
                let days_per_period = if *self == PeriodType::Weekly { 7 } else { 1 };
                let days = Days::new(u64::from(magnitude) * days_per_period);
                if n < 0 {
                    date.checked_sub_days(days)
                } else {
                    date.checked_add_days(days)
                }
            }
        };
        shifted.ok_or_else(|| self.out_of_range(date))
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A reporting period.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    period_type: PeriodType,
    start: NaiveDate,
    end: NaiveDate,
}

static ISO_PATTERNS: LazyLock<Vec<(Regex, PeriodType)>> = LazyLock::new(|| {
    [
        (r"^(\d{4})(\d{2})(\d{2})$", PeriodType::Daily),
        (r"^(\d{4})W(\d{1,2})$", PeriodType::Weekly),
        (r"^(\d{4})(\d{2})$", PeriodType::Monthly),
        (r"^(\d{4})(\d{2})B$", PeriodType::BiMonthly),
        (r"^(\d{4})Q([1-4])$", PeriodType::Quarterly),
        (r"^(\d{4})S([12])$", PeriodType::SixMonthly),
        (r"^(\d{4})$", PeriodType::Yearly),
        (r"^(\d{4})April$", PeriodType::FinancialApril),
        (r"^(\d{4})July$", PeriodType::FinancialJuly),
        (r"^(\d{4})Oct$", PeriodType::FinancialOct),
    ]
    .into_iter()
    .map(|(pattern, period_type)| {
        (
            Regex::new(pattern).expect("valid period pattern"),
            period_type,
        )
    })
    .collect()
});

impl Period {
    /// The period of the given type containing `date`.
    pub fn of(period_type: PeriodType, date: NaiveDate) -> Result<Self, PeriodError> {
        period_type.create_period(date)
    }

    /// Parse an ISO period identifier.
    pub fn parse(iso: &str) -> Result<Self, PeriodError> {
        let invalid = || PeriodError::InvalidIsoPeriod(iso.to_string());

        let (captures, period_type) = ISO_PATTERNS
            .iter()
            .find_map(|(re, t)| re.captures(iso).map(|c| (c, *t)))
            .ok_or_else(invalid)?;

        let number = |i: usize| -> Result<u32, PeriodError> {
            captures
                .get(i)
                .and_then(|m| m.as_str().parse().ok())
                .ok_or_else(invalid)
        };
        let year = number(1)? as i32;

        let date = match period_type {
            PeriodType::Daily => NaiveDate::from_ymd_opt(year, number(2)?, number(3)?),
            PeriodType::Weekly => NaiveDate::from_isoywd_opt(year, number(2)?, Weekday::Mon),
            PeriodType::Monthly => NaiveDate::from_ymd_opt(year, number(2)?, 1),
            PeriodType::BiMonthly => {
                let index = number(2)?;
                if !(1..=6).contains(&index) {
                    return Err(invalid());
                }
                NaiveDate::from_ymd_opt(year, index * 2 - 1, 1)
            }
            PeriodType::Quarterly => NaiveDate::from_ymd_opt(year, number(2)? * 3 - 2, 1),
            PeriodType::SixMonthly => NaiveDate::from_ymd_opt(year, number(2)? * 6 - 5, 1),
            PeriodType::Yearly => NaiveDate::from_ymd_opt(year, 1, 1),
            t => NaiveDate::from_ymd_opt(year, t.anchor_month(), 1),
        }
        .ok_or_else(invalid)?;

        period_type.create_period(date)
    }

    pub fn period_type(&self) -> PeriodType {
        self.period_type
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end
    }

    /// Exclusive upper bound: the day after the end date.
    pub fn end_date_exclusive(&self) -> Option<NaiveDate> {
        self.end.succ_opt()
    }

    /// The ISO period identifier.
    pub fn iso(&self) -> String {
        let year = self.start.year();
        let month0 = self.start.month0();
        match self.period_type {
            PeriodType::Daily => self.start.format("%Y%m%d").to_string(),
            PeriodType::Weekly => {
                let week = self.start.iso_week();
                format!("{}W{}", week.year(), week.week())
            }
            PeriodType::Monthly => format!("{}{:02}", year, month0 + 1),
            PeriodType::BiMonthly => format!("{}{:02}B", year, month0 / 2 + 1),
            PeriodType::Quarterly => format!("{}Q{}", year, month0 / 3 + 1),
            PeriodType::SixMonthly => format!("{}S{}", year, month0 / 6 + 1),
            PeriodType::Yearly => year.to_string(),
            PeriodType::FinancialApril => format!("{}April", year),
            PeriodType::FinancialJuly => format!("{}July", year),
            PeriodType::FinancialOct => format!("{}Oct", year),
        }
    }

    /// The period `n` periods away of the same type (negative looks back).
    pub fn shift(&self, n: i32) -> Result<Period, PeriodError> {
        let start = self.period_type.shift_date(self.start, n)?;
        self.period_type.create_period(start)
    }
}

impl FromStr for Period {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::parse(s)
    }
}

impl TryFrom<String> for Period {
    type Error = PeriodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Period::parse(&value)
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.iso()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.iso())
    }
}
