//! Filter operators and their SQL text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::FilterError;

/// Operator of a value filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryOperator {
    Eq,
    Ne,
    Neq,
    Ieq,
    Nieq,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
    Nlike,
    Ilike,
    Nilike,
    Sw,
    Ew,
    In,
    Null,
    Nnull,
}

impl QueryOperator {
    pub const ALL: [QueryOperator; 18] = [
        QueryOperator::Eq,
        QueryOperator::Ne,
        QueryOperator::Neq,
        QueryOperator::Ieq,
        QueryOperator::Nieq,
        QueryOperator::Gt,
        QueryOperator::Ge,
        QueryOperator::Lt,
        QueryOperator::Le,
        QueryOperator::Like,
        QueryOperator::Nlike,
        QueryOperator::Ilike,
        QueryOperator::Nilike,
        QueryOperator::Sw,
        QueryOperator::Ew,
        QueryOperator::In,
        QueryOperator::Null,
        QueryOperator::Nnull,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryOperator::Eq => "EQ",
            QueryOperator::Ne => "NE",
            QueryOperator::Neq => "NEQ",
            QueryOperator::Ieq => "IEQ",
            QueryOperator::Nieq => "NIEQ",
            QueryOperator::Gt => "GT",
            QueryOperator::Ge => "GE",
            QueryOperator::Lt => "LT",
            QueryOperator::Le => "LE",
            QueryOperator::Like => "LIKE",
            QueryOperator::Nlike => "NLIKE",
            QueryOperator::Ilike => "ILIKE",
            QueryOperator::Nilike => "NILIKE",
            QueryOperator::Sw => "SW",
            QueryOperator::Ew => "EW",
            QueryOperator::In => "IN",
            QueryOperator::Null => "NULL",
            QueryOperator::Nnull => "NNULL",
        }
    }

    /// SQL text of the operator, before null substitution.
    pub fn sql_text(&self) -> &'static str {
        match self {
            QueryOperator::Eq | QueryOperator::Ieq => "=",
            QueryOperator::Ne | QueryOperator::Neq | QueryOperator::Nieq => "!=",
            QueryOperator::Gt => ">",
            QueryOperator::Ge => ">=",
            QueryOperator::Lt => "<",
            QueryOperator::Le => "<=",
            QueryOperator::Like | QueryOperator::Sw | QueryOperator::Ew => "like",
            QueryOperator::Nlike => "not like",
            QueryOperator::Ilike => "ilike",
            QueryOperator::Nilike => "not ilike",
            QueryOperator::In => "in",
            QueryOperator::Null => "is",
            QueryOperator::Nnull => "is not",
        }
    }

    /// Operators matching a `%value%` pattern.
    pub fn is_like(&self) -> bool {
        matches!(
            self,
            QueryOperator::Like | QueryOperator::Nlike | QueryOperator::Ilike | QueryOperator::Nilike
        )
    }

    /// Operators testing (in)equality; these honor the null sentinel.
    pub fn is_equality(&self) -> bool {
        matches!(
            self,
            QueryOperator::Eq
                | QueryOperator::Ne
                | QueryOperator::Neq
                | QueryOperator::Ieq
                | QueryOperator::Nieq
        )
    }

    pub fn is_negated(&self) -> bool {
        matches!(
            self,
            QueryOperator::Ne
                | QueryOperator::Neq
                | QueryOperator::Nieq
                | QueryOperator::Nlike
                | QueryOperator::Nilike
                | QueryOperator::Nnull
        )
    }

    pub fn is_case_insensitive(&self) -> bool {
        matches!(self, QueryOperator::Ieq | QueryOperator::Nieq)
    }

    /// Operators whose literal is always `null`.
    pub fn is_null_test(&self) -> bool {
        matches!(self, QueryOperator::Null | QueryOperator::Nnull)
    }
}

impl FromStr for QueryOperator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        if upper == "!NULL" {
            return Ok(QueryOperator::Nnull);
        }
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == upper)
            .ok_or_else(|| FilterError::UnsupportedOperator(s.to_string()))
    }
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
