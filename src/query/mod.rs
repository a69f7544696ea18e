//! The analytics query model.
//!
//! An [`AnalyticsQuery`] is built once per request through an
//! [`AnalyticsQueryBuilder`] and never changes afterwards. The planner
//! derives sub-queries from it with [`AnalyticsQuery::to_builder`]; a
//! sub-query is the same type with its table name, partitions and
//! `multiple_queries` flag filled in.

pub mod criteria;
pub mod dimension;
mod params;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::filter::FilterError;
use crate::idscheme::{IdScheme, IdSchemeError};
use crate::model::PeriodError;

pub use criteria::AnalyticsCriteria;
pub use dimension::{Dimension, DimensionItem, DATA_X_DIM_ID, ORGUNIT_DIM_ID, PERIOD_DIM_ID};
pub use params::{AnalyticsQuery, AnalyticsQueryBuilder};

/// Errors raised while building a query.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("Invalid dimension '{0}', expected <key>:<item>;<item>")]
    InvalidDimension(String),

    #[error("Invalid measure criteria '{0}'")]
    InvalidMeasureCriteria(String),

    #[error("Invalid date '{0}', expected yyyy-MM-dd")]
    InvalidDate(String),

    #[error("Query has not been planned: no table name")]
    NotPlanned,

    #[error(transparent)]
    Period(#[from] PeriodError),

    #[error(transparent)]
    IdScheme(#[from] IdSchemeError),

    #[error(transparent)]
    Filter(#[from] FilterError),
}

pub type QueryResult<T> = Result<T, QueryError>;

/// The year partitions a sub-query reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Partitions(BTreeSet<i32>);

impl Partitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn years(&self) -> &BTreeSet<i32> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, year: i32) -> bool {
        self.0.contains(&year)
    }

    /// Years in ascending order.
    pub fn to_vec(&self) -> Vec<i32> {
        self.0.iter().copied().collect()
    }
}

impl FromIterator<i32> for Partitions {
    fn from_iter<T: IntoIterator<Item = i32>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeSet<i32>> for Partitions {
    fn from(years: BTreeSet<i32>) -> Self {
        Self(years)
    }
}

/// What the execution layer needs to run one sub-query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubQueryDescriptor {
    pub table_name: String,
    pub partitions: Vec<i32>,
    pub multiple_queries: bool,
}

/// Flags shaping the response rather than the SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputOptions {
    pub skip_meta: bool,
    pub skip_data: bool,
    pub completed_only: bool,
    pub hierarchy_meta: bool,
    pub ignore_limit: bool,
    pub hide_empty_rows: bool,
    pub hide_empty_columns: bool,
    pub show_hierarchy: bool,
    pub include_num_den: bool,
    pub include_metadata_details: bool,
    pub duplicates_only: bool,
}

/// The identifier schemes of a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdSchemes {
    pub output_id_scheme: IdScheme,
    pub output_data_item_id_scheme: IdScheme,
    pub output_data_element_id_scheme: IdScheme,
    pub output_org_unit_id_scheme: IdScheme,
    pub input_id_scheme: IdScheme,
}

impl IdSchemes {
    /// Scheme for data items: the specific one when set, else the general
    /// output scheme.
    pub fn data_item_scheme(&self) -> &IdScheme {
        if self.output_data_item_id_scheme.is_not_null() {
            &self.output_data_item_id_scheme
        } else {
            &self.output_id_scheme
        }
    }

    pub fn org_unit_scheme(&self) -> &IdScheme {
        if self.output_org_unit_id_scheme.is_not_null() {
            &self.output_org_unit_id_scheme
        } else {
            &self.output_id_scheme
        }
    }
}
