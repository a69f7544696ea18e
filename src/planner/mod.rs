//! Query planner - splits one analytics request into executable sub-queries.
//!
//! Aggregate queries run through four groupers, each fed every query the
//! previous one produced:
//! 1. Query items: one sub-query per item when aggregating data
//! 2. Org unit level: one sub-query per hierarchy level
//! 3. Period type: one sub-query per period type
//! 4. Period: one sub-query per period for last-value style evaluation
//!
//! Every resulting sub-query is then stamped with its table and partitions.

pub mod grouping;

use tracing::{debug, info};

use crate::model::AnalyticsTableType;
use crate::partition::{self, PartitionError, PartitionProbe, PartitionResolver};
use crate::query::AnalyticsQuery;

pub use grouping::{requires_period_split, GROUPERS};

/// Errors that can occur during planning.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("Partition resolution failed: {0}")]
    Partition(#[from] PartitionError),
}

pub type PlanResult<T> = Result<T, PlanError>;

/// Main entry point for query planning.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryPlanner<'a> {
    resolver: PartitionResolver<'a>,
}

impl<'a> QueryPlanner<'a> {
    /// A planner that never prunes partitions.
    pub fn new() -> Self {
        Self::default()
    }

    /// A planner pruning partitions through the given probe.
    pub fn with_probe(probe: &'a dyn PartitionProbe) -> Self {
        Self {
            resolver: PartitionResolver::with_probe(probe),
        }
    }

    pub fn resolver(&self) -> &PartitionResolver<'a> {
        &self.resolver
    }

    /// Split an aggregate query into sub-queries.
    ///
    /// When more than one sub-query results, all of them are flagged as
    /// multiple queries.
    pub fn plan_aggregate_query(&self, query: &AnalyticsQuery) -> PlanResult<Vec<AnalyticsQuery>> {
        let mut queries = vec![query.clone()];

        for (stage, grouper) in GROUPERS {
            queries = queries.iter().flat_map(grouper).collect();
            debug!(stage, count = queries.len(), "Grouped queries");
        }

        let mut planned = queries
            .iter()
            .map(|q| self.resolver.resolve(q, partition::table_type(q)))
            .collect::<Result<Vec<_>, _>>()?;

        if planned.len() > 1 {
            planned = planned
                .into_iter()
                .map(|q| q.to_builder().with_multiple_queries(true).build())
                .collect();
        }

        info!(sub_queries = planned.len(), "Planned aggregate query");
        Ok(planned)
    }

    /// Resolve the table and partitions of an event query without splitting.
    pub fn plan_event_query(&self, query: &AnalyticsQuery) -> PlanResult<AnalyticsQuery> {
        let planned = self.resolver.resolve(query, partition::table_type(query))?;
        info!(table = planned.table_name().unwrap_or_default(), "Planned event query");
        Ok(planned)
    }

    /// Resolve the enrollment table and partitions of an enrollment query.
    pub fn plan_enrollment_query(&self, query: &AnalyticsQuery) -> PlanResult<AnalyticsQuery> {
        let planned = self.resolver.resolve(query, AnalyticsTableType::Enrollment)?;
        info!(table = planned.table_name().unwrap_or_default(), "Planned enrollment query");
        Ok(planned)
    }
}
