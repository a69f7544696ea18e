//! Table and partition resolution.
//!
//! Every planned sub-query reads one analytics table, named after its
//! [`AnalyticsTableType`] (and program, for program-scoped types), and a
//! set of year partitions `<table>_<year>` covering its date range.
//!
//! When the query is made on behalf of a user and a [`PartitionProbe`] is
//! configured, partitions without a backing table are pruned. Skipping the
//! probe never changes the SQL of a sub-query, only which partitions it
//! reads.

mod probe;
mod sqlite;

use std::collections::BTreeSet;

use chrono::Datelike;
use tracing::{debug, warn};

use crate::model::{AnalyticsTableType, Program};
use crate::query::AnalyticsQuery;

pub use probe::{CachedPartitionProbe, PartitionProbe, StaticPartitionProbe};
pub use sqlite::SqlitePartitionProbe;

/// Errors raised while resolving tables and partitions.
#[derive(Debug, thiserror::Error)]
pub enum PartitionError {
    #[error("Table type {0:?} requires a program")]
    MissingProgram(AnalyticsTableType),

    #[error("Partition probe failed: {0}")]
    Probe(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type PartitionResult<T> = Result<T, PartitionError>;

/// Name of the physical table of one year partition.
pub fn partition_table_name(table: &str, year: i32) -> String {
    format!("{}_{}", table, year)
}

/// Name of the analytics table of a type, scoped to the program for
/// program-scoped types.
pub fn table_name(table_type: AnalyticsTableType, program: Option<&Program>) -> PartitionResult<String> {
    let base = table_type.table_name();
    if !table_type.is_program_scoped() {
        return Ok(base.to_string());
    }
    let program = program.ok_or(PartitionError::MissingProgram(table_type))?;
    Ok(format!("{}_{}", base, program.uid().to_lowercase()))
}

/// Table type an aggregate or event query reads.
///
/// Enrollment-typed program indicators and aggregated enrollments read the
/// enrollment table; other program queries read the event table; queries
/// without a program read data values.
pub fn table_type(query: &AnalyticsQuery) -> AnalyticsTableType {
    let enrollment_indicator = query
        .program_indicator()
        .is_some_and(|pi| pi.is_enrollment());

    if enrollment_indicator || query.is_aggregated_enrollments() {
        AnalyticsTableType::Enrollment
    } else if query.program().is_some() {
        AnalyticsTableType::Event
    } else {
        AnalyticsTableType::DataValue
    }
}

/// Every year from the earliest start to the latest end of the query.
pub fn partition_years(query: &AnalyticsQuery) -> BTreeSet<i32> {
    match (query.earliest_start_date(), query.latest_end_date()) {
        (Some(start), Some(end)) if start <= end => (start.year()..=end.year()).collect(),
        _ => BTreeSet::new(),
    }
}

/// Stamps queries with their table name and partitions.
#[derive(Clone, Copy, Default)]
pub struct PartitionResolver<'a> {
    probe: Option<&'a dyn PartitionProbe>,
}

impl<'a> PartitionResolver<'a> {
    pub fn new() -> Self {
        Self { probe: None }
    }

    pub fn with_probe(probe: &'a dyn PartitionProbe) -> Self {
        Self { probe: Some(probe) }
    }

    pub fn has_probe(&self) -> bool {
        self.probe.is_some()
    }

    /// A copy of the query reading the given table type.
    pub fn resolve(
        &self,
        query: &AnalyticsQuery,
        table_type: AnalyticsTableType,
    ) -> PartitionResult<AnalyticsQuery> {
        let table = table_name(table_type, query.program())?;

        let partitions = if table_type.is_partitioned() {
            self.existing_years(query, &table, partition_years(query))?
        } else {
            BTreeSet::new()
        };

        debug!(table = %table, partitions = ?partitions, "Resolved table");

        Ok(query
            .to_builder()
            .with_table_name(&table)
            .with_partitions(partitions.into())
            .build())
    }

    fn existing_years(
        &self,
        query: &AnalyticsQuery,
        table: &str,
        years: BTreeSet<i32>,
    ) -> PartitionResult<BTreeSet<i32>> {
        let Some(user) = query.current_user() else {
            return Ok(years);
        };
        let Some(probe) = self.probe else {
            warn!(user, table, "No partition probe configured, partitions not pruned");
            return Ok(years);
        };

        let existing = probe.existing_partitions(table, &years)?;
        if existing.len() < years.len() {
            let missing: Vec<i32> = years.difference(&existing).copied().collect();
            debug!(table, ?missing, "Pruned partitions without a table");
        }
        Ok(existing)
    }
}

impl std::fmt::Debug for PartitionResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionResolver")
            .field("probe", &self.probe.is_some())
            .finish()
    }
}
