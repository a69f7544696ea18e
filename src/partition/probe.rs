//! Partition existence probes.

use std::collections::{BTreeMap, BTreeSet};

use dashmap::DashMap;
use tracing::debug;

use super::PartitionResult;

/// Looks up which year partitions of an analytics table physically exist.
///
/// Implementations must be idempotent; the resolver may ask the same
/// question many times.
pub trait PartitionProbe: Send + Sync {
    /// The subset of `years` whose `<table>_<year>` table exists.
    fn existing_partitions(&self, table: &str, years: &BTreeSet<i32>)
        -> PartitionResult<BTreeSet<i32>>;
}

/// An in-memory partition catalogue.
#[derive(Debug, Clone, Default)]
pub struct StaticPartitionProbe {
    partitions: BTreeMap<String, BTreeSet<i32>>,
}

impl StaticPartitionProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_partition(mut self, table: &str, year: i32) -> Self {
        self.partitions.entry(table.to_string()).or_default().insert(year);
        self
    }

    pub fn with_partitions(mut self, table: &str, years: impl IntoIterator<Item = i32>) -> Self {
        self.partitions
            .entry(table.to_string())
            .or_default()
            .extend(years);
        self
    }
}

impl PartitionProbe for StaticPartitionProbe {
    fn existing_partitions(
        &self,
        table: &str,
        years: &BTreeSet<i32>,
    ) -> PartitionResult<BTreeSet<i32>> {
        Ok(self
            .partitions
            .get(table)
            .map(|existing| existing.intersection(years).copied().collect())
            .unwrap_or_default())
    }
}

/// Memoises the answers of another probe.
///
/// Answers are kept for the lifetime of the wrapper, so a partition created
/// afterwards is only seen by a new wrapper.
pub struct CachedPartitionProbe<P> {
    inner: P,
    known: DashMap<(String, i32), bool>,
}

impl<P: PartitionProbe> CachedPartitionProbe<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            known: DashMap::new(),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of cached (table, year) answers.
    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    pub fn clear(&self) {
        self.known.clear();
    }
}

impl<P: PartitionProbe> PartitionProbe for CachedPartitionProbe<P> {
    fn existing_partitions(
        &self,
        table: &str,
        years: &BTreeSet<i32>,
    ) -> PartitionResult<BTreeSet<i32>> {
        let mut existing = BTreeSet::new();
        let mut unknown = BTreeSet::new();

        for &year in years {
            match self.known.get(&(table.to_string(), year)) {
                Some(exists) if *exists => {
                    existing.insert(year);
                }
                Some(_) => {}
                None => {
                    unknown.insert(year);
                }
            }
        }

        if !unknown.is_empty() {
            debug!(table, years = ?unknown, "Probing uncached partitions");
            let found = self.inner.existing_partitions(table, &unknown)?;
            for year in unknown {
                let exists = found.contains(&year);
                self.known.insert((table.to_string(), year), exists);
                if exists {
                    existing.insert(year);
                }
            }
        }

        Ok(existing)
    }
}
