use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::TrackerError;
use crate::record::TaskRecord;
use crate::sheet::SheetBackend;

pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Memoizes the full-table read for a fixed freshness window.
///
/// Mutations must call `invalidate` synchronously; there is no
/// patch-in-place of the cached table, so the next `load` after a write
/// always refetches. The current instant is an explicit parameter to
/// keep freshness testable.
#[derive(Debug)]
pub struct RecordCache {
    ttl: Duration,
    fetched_at: Option<Instant>,
    rows: Vec<TaskRecord>,
}

impl RecordCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            fetched_at: None,
            rows: Vec::new(),
        }
    }

    pub fn is_fresh(&self, now: Instant) -> bool {
        self.fetched_at
            .is_some_and(|at| now.saturating_duration_since(at) < self.ttl)
    }

    /// Cached rows when inside the freshness window, otherwise a fresh
    /// `read_all` that resets the window.
    pub async fn load(
        &mut self,
        backend: &dyn SheetBackend,
        now: Instant,
    ) -> Result<Vec<TaskRecord>, TrackerError> {
        if self.is_fresh(now) {
            debug!(rows = self.rows.len(), "serving cached table");
            return Ok(self.rows.clone());
        }

        let rows = backend.read_all().await?;
        self.rows = rows.clone();
        self.fetched_at = Some(now);
        debug!(rows = rows.len(), "refreshed table cache");
        Ok(rows)
    }

    /// Drop the cached table entirely. Called after every update or
    /// append.
    pub fn invalidate(&mut self) {
        self.fetched_at = None;
        self.rows.clear();
    }
}

impl Default for RecordCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
