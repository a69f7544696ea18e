//! Value filters and their translation to SQL.
//!
//! A [`QueryFilter`] pairs an operator with a raw literal. Two renderings
//! are offered:
//!
//! - [`QueryFilter::sql_bind_filter`] shapes the value for a bind
//!   parameter. Prefer it wherever the caller controls statement
//!   preparation.
//! - [`QueryFilter::sql_filter`] embeds the literal into SQL text. Quotes
//!   are always escaped, but `SW`/`EW` do not escape `_` or `%` in the
//!   literal, so those operators match wildcards the caller passes in.
//!
//! The literal `NV` stands for "no value": with null substitution enabled,
//! `EQ:NV` renders as `is null` and `NE:NV` as `is not null`.

mod operator;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::ValueType;
use crate::sql::escape;

pub use operator::QueryOperator;

/// The "no value" sentinel literal.
pub const NULL_VALUE: &str = "NV";

/// Separator of `IN` literals.
pub const OPTION_SEP: char = ';';

/// Errors raised while parsing filters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("Unsupported operator: '{0}'")]
    UnsupportedOperator(String),

    #[error("Malformed filter '{0}', expected <operator>:<value>")]
    MalformedFilter(String),
}

pub type FilterResult<T> = Result<T, FilterError>;

/// A value shaped for a bind parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Single(String),
    List(Vec<String>),
    Null,
}

/// Add the wildcards an operator implies to an unescaped literal.
pub fn affix_like_wildcards(operator: QueryOperator, literal: &str) -> String {
    match operator {
        op if op.is_like() => format!("%{}%", literal),
        QueryOperator::Sw => format!("{}%", literal),
        QueryOperator::Ew => format!("%{}", literal),
        _ => literal.to_string(),
    }
}

/// An operator and literal pair, e.g. `GT:5` or `IN:a;b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryFilter {
    pub operator: QueryOperator,
    pub filter: String,
}

impl QueryFilter {
    pub fn new(operator: QueryOperator, filter: impl Into<String>) -> Self {
        Self {
            operator,
            filter: filter.into(),
        }
    }

    /// Whether the literal is the `NV` sentinel.
    pub fn is_null_value(&self) -> bool {
        self.filter.eq_ignore_ascii_case(NULL_VALUE)
    }

    fn substitutes_null(&self, substitute_null: bool) -> bool {
        substitute_null && self.operator.is_equality() && self.is_null_value()
    }

    /// SQL operator text.
    pub fn sql_operator(&self, substitute_null: bool) -> &'static str {
        if self.substitutes_null(substitute_null) {
            return if self.operator.is_negated() { "is not" } else { "is" };
        }
        self.operator.sql_text()
    }

    /// The literal as an SQL fragment.
    pub fn sql_filter(&self, substitute_null: bool) -> String {
        let op = self.operator;
        if op.is_null_test() || self.substitutes_null(substitute_null) {
            return escape::NULL_LITERAL.to_string();
        }
        match op {
            _ if op.is_like() => {
                escape::quote_literal(&format!("%{}%", escape::escape_like_wildcards(&self.filter)))
            }
            QueryOperator::Sw | QueryOperator::Ew => {
                escape::quote_literal(&affix_like_wildcards(op, &self.filter))
            }
            QueryOperator::In => escape::quote_list(self.options()),
            _ => escape::quote_literal(&self.filter),
        }
    }

    /// The literal shaped for a bind parameter.
    pub fn sql_bind_filter(&self, substitute_null: bool) -> BindValue {
        let op = self.operator;
        if op.is_null_test() || self.substitutes_null(substitute_null) {
            return BindValue::Null;
        }
        match op {
            _ if op.is_like() => {
                BindValue::Single(format!("%{}%", escape::escape_like_wildcards(&self.filter)))
            }
            QueryOperator::Sw | QueryOperator::Ew => {
                BindValue::Single(affix_like_wildcards(op, &self.filter))
            }
            QueryOperator::In => {
                BindValue::List(self.options().map(str::to_string).collect())
            }
            _ => BindValue::Single(self.filter.clone()),
        }
    }

    /// The column reference, lower-cased for case-insensitive comparison
    /// of text values.
    pub fn sql_filter_column(&self, column: &str, value_type: ValueType) -> String {
        if self.lowers_case(value_type) {
            format!("lower({})", column)
        } else {
            column.to_string()
        }
    }

    /// A full `<column> <operator> <literal>` condition.
    pub fn sql_condition(&self, column: &str, value_type: ValueType, substitute_null: bool) -> String {
        let mut literal = self.sql_filter(substitute_null);
        if self.lowers_case(value_type) {
            literal = literal.to_lowercase();
        }
        format!(
            "{} {} {}",
            self.sql_filter_column(column, value_type),
            self.sql_operator(substitute_null),
            literal
        )
    }

    /// A condition with `?` placeholders and the values to bind.
    pub fn sql_bind_condition(
        &self,
        column: &str,
        value_type: ValueType,
        substitute_null: bool,
    ) -> (String, BindValue) {
        let mut value = self.sql_bind_filter(substitute_null);
        if self.lowers_case(value_type) {
            if let BindValue::Single(v) = &mut value {
                *v = v.to_lowercase();
            }
        }
        let placeholder = match &value {
            BindValue::Null => escape::NULL_LITERAL.to_string(),
            BindValue::Single(_) => "?".to_string(),
            BindValue::List(values) => format!("({})", vec!["?"; values.len()].join(",")),
        };
        let sql = format!(
            "{} {} {}",
            self.sql_filter_column(column, value_type),
            self.sql_operator(substitute_null),
            placeholder
        );
        (sql, value)
    }

    fn lowers_case(&self, value_type: ValueType) -> bool {
        self.operator.is_case_insensitive() && value_type.is_text()
    }

    fn options(&self) -> impl Iterator<Item = &str> {
        self.filter.split(OPTION_SEP)
    }
}

impl FromStr for QueryFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (operator, filter) = s
            .split_once(':')
            .ok_or_else(|| FilterError::MalformedFilter(s.to_string()))?;
        Ok(QueryFilter::new(operator.parse()?, filter))
    }
}

impl fmt::Display for QueryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.operator, self.filter)
    }
}
