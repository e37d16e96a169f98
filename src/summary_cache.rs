//! Memoizes dashboard summaries between writes.
//!
//! Every write to the data source bumps the [SnapshotVersion]. Summaries are
//! cached under a key that includes the version they were computed from, so a
//! write makes every older entry unreachable. Older entries are dropped as soon
//! as a newer version is stored.

use std::{
    num::NonZeroUsize,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use lru::LruCache;
use time::Date;

use crate::analytics::{DashboardSummary, TechnicianFilter, TimeWindow};

/// The maximum number of summaries kept, the least recently used is evicted first.
pub const SUMMARY_CACHE_CAPACITY: NonZeroUsize =
    NonZeroUsize::new(32).expect("summary cache capacity must be non-zero");

/// A counter that changes whenever vehicles, service records or call records change.
#[derive(Debug, Clone, Default)]
pub struct SnapshotVersion(Arc<AtomicU64>);

impl SnapshotVersion {
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Mark the data as changed, returning the new version.
    pub fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Everything a dashboard summary depends on besides the data itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SummaryKey {
    pub version: u64,
    pub window: TimeWindow,
    pub technician: TechnicianFilter,
    pub today: Date,
}

#[derive(Debug)]
struct Entries {
    latest_version: u64,
    summaries: LruCache<SummaryKey, Arc<DashboardSummary>>,
}

/// A bounded cache of dashboard summaries shared between requests.
#[derive(Debug, Clone)]
pub struct SummaryCache {
    entries: Arc<Mutex<Entries>>,
}

impl Default for SummaryCache {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Entries {
                latest_version: 0,
                summaries: LruCache::new(SUMMARY_CACHE_CAPACITY),
            })),
        }
    }
}

impl SummaryCache {
    /// Get the summary for `key`, computing and storing it on a miss.
    ///
    /// Errors from `compute` are returned and nothing is stored.
    /// A poisoned lock skips the cache rather than failing the request.
    pub fn get_or_try_compute<F, E>(
        &self,
        key: SummaryKey,
        compute: F,
    ) -> Result<Arc<DashboardSummary>, E>
    where
        F: FnOnce() -> Result<DashboardSummary, E>,
    {
        if let Some(summary) = self.get(&key) {
            tracing::debug!("summary cache hit for {key:?}");
            return Ok(summary);
        }

        let summary = Arc::new(compute()?);
        self.insert(key, summary.clone());

        Ok(summary)
    }

    fn get(&self, key: &SummaryKey) -> Option<Arc<DashboardSummary>> {
        let mut entries = self
            .entries
            .lock()
            .inspect_err(|error| tracing::warn!("could not lock summary cache: {error}"))
            .ok()?;

        entries.summaries.get(key).cloned()
    }

    fn insert(&self, key: SummaryKey, summary: Arc<DashboardSummary>) {
        let Ok(mut entries) = self
            .entries
            .lock()
            .inspect_err(|error| tracing::warn!("could not lock summary cache: {error}"))
        else {
            return;
        };

        if key.version < entries.latest_version {
            return;
        }

        if key.version > entries.latest_version {
            entries.summaries.clear();
            entries.latest_version = key.version;
        }

        entries.summaries.put(key, summary);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().unwrap().summaries.len()
    }
}
