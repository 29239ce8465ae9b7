//! Bounded-window usage snapshots

use crate::services::{Clock, UsageInterval, UsageStatsService};
use crate::UsageRecord;
use tracing::{debug, warn};

/// Default selection window: the last 1000 seconds
pub const DEFAULT_SELECTION_WINDOW_MS: i64 = 1000 * 1000;

/// Usage records from one query, consumed once in OS order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    records: Vec<UsageRecord>,
}

impl Snapshot {
    pub fn new(records: Vec<UsageRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl IntoIterator for Snapshot {
    type Item = UsageRecord;
    type IntoIter = std::vec::IntoIter<UsageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl FromIterator<UsageRecord> for Snapshot {
    fn from_iter<I: IntoIterator<Item = UsageRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

pub struct UsageSnapshotQuerier<'a, S, C> {
    service: &'a S,
    clock: &'a C,
}

impl<'a, S, C> UsageSnapshotQuerier<'a, S, C>
where
    S: UsageStatsService,
    C: Clock,
{
    pub fn new(service: &'a S, clock: &'a C) -> Self {
        Self { service, clock }
    }

    /// Records for `[now - window_ms, now]`. A failed query reads as no usage.
    pub fn query_snapshot(&self, window_ms: i64) -> Snapshot {
        let end = self.clock.now_millis();
        let begin = end.saturating_sub(window_ms);

        match self
            .service
            .query_usage_stats(UsageInterval::Daily, begin, end)
        {
            Ok(records) => {
                debug!("Snapshot holds {} usage records", records.len());
                Snapshot::new(records)
            }
            Err(e) => {
                warn!("Treating failed usage query as empty: {}", e);
                Snapshot::default()
            }
        }
    }
}
