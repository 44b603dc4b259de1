use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::debug;

use crate::error::TrackerError;
use crate::record::TaskRecord;

/// Row-level operations against the hosted spreadsheet.
///
/// `row_index` is zero-based over data rows; implementations translate
/// to storage coordinates (1-based plus the header row). Writes cover
/// the full A-Q span in one call, including the Last Updated cell, so a
/// reader never observes fresh fields next to a stale stamp. The stamp
/// is supplied by the caller at write time, never by the browser.
#[async_trait]
pub trait SheetBackend: Send + Sync {
    /// All data rows in storage order.
    async fn read_all(&self) -> Result<Vec<TaskRecord>, TrackerError>;

    /// Overwrite the full row at `row_index` with `record`, stamping
    /// the Last Updated cell with `stamp`.
    async fn update_row(
        &self,
        row_index: usize,
        record: &TaskRecord,
        stamp: &str,
    ) -> Result<(), TrackerError>;

    /// Append `record` after the last data row.
    async fn append_row(&self, record: &TaskRecord, stamp: &str) -> Result<(), TrackerError>;
}

/// In-process backend for tests and offline demos. Counts `read_all`
/// calls so cache behavior can be asserted without a network.
#[derive(Debug, Default)]
pub struct MemorySheet {
    rows: Mutex<Vec<TaskRecord>>,
    reads: AtomicUsize,
}

impl MemorySheet {
    pub fn new(rows: Vec<TaskRecord>) -> Self {
        Self {
            rows: Mutex::new(rows),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn row_count(&self) -> usize {
        self.lock_rows().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn row(&self, index: usize) -> Option<TaskRecord> {
        self.lock_rows()
            .ok()
            .and_then(|rows| rows.get(index).cloned())
    }

    fn lock_rows(&self) -> Result<std::sync::MutexGuard<'_, Vec<TaskRecord>>, TrackerError> {
        self.rows
            .lock()
            .map_err(|_| TrackerError::unavailable("memory sheet lock poisoned"))
    }
}

#[async_trait]
impl SheetBackend for MemorySheet {
    async fn read_all(&self) -> Result<Vec<TaskRecord>, TrackerError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let rows = self.lock_rows()?;
        debug!(rows = rows.len(), "memory sheet read");
        Ok(rows.clone())
    }

    async fn update_row(
        &self,
        row_index: usize,
        record: &TaskRecord,
        stamp: &str,
    ) -> Result<(), TrackerError> {
        let mut rows = self.lock_rows()?;
        let slot = rows
            .get_mut(row_index)
            .ok_or_else(|| TrackerError::not_found(format!("row {row_index}")))?;
        *slot = TaskRecord {
            last_updated: stamp.to_string(),
            ..record.clone()
        };
        Ok(())
    }

    async fn append_row(&self, record: &TaskRecord, stamp: &str) -> Result<(), TrackerError> {
        let mut rows = self.lock_rows()?;
        rows.push(TaskRecord {
            last_updated: stamp.to_string(),
            ..record.clone()
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::record::Status;

    use super::*;

    fn seeded() -> MemorySheet {
        MemorySheet::new(vec![
            TaskRecord {
                record_id: "REC_0001".to_string(),
                client_name: "Ada".to_string(),
                task_name: "Resume review".to_string(),
                ..TaskRecord::default()
            },
            TaskRecord {
                record_id: "REC_0002".to_string(),
                client_name: "Grace".to_string(),
                task_name: "Mock interview".to_string(),
                ..TaskRecord::default()
            },
        ])
    }

    #[tokio::test]
    async fn update_replaces_only_the_target_row() {
        let sheet = seeded();
        let untouched = sheet.row(1).expect("seeded row");

        let mut edited = sheet.row(0).expect("seeded row");
        edited.status = Status::Completed;
        edited.notes = "wrapped up".to_string();

        sheet
            .update_row(0, &edited, "2026-08-26 10:00:00")
            .await
            .expect("update succeeds");

        let stored = sheet.row(0).expect("row still present");
        assert_eq!(stored.status, Status::Completed);
        assert_eq!(stored.last_updated, "2026-08-26 10:00:00");
        assert_eq!(sheet.row(1).expect("other row"), untouched);
    }

    #[tokio::test]
    async fn update_out_of_range_is_not_found() {
        let sheet = seeded();
        let record = TaskRecord::default();
        let err = sheet
            .update_row(5, &record, "stamp")
            .await
            .expect_err("index past end");
        assert!(matches!(err, TrackerError::ResourceNotFound(_)));
        assert_eq!(sheet.row_count(), 2);
    }

    #[tokio::test]
    async fn append_stamps_and_grows_the_table() {
        let sheet = seeded();
        let record = TaskRecord {
            record_id: "REC_0003".to_string(),
            client_name: "Lin".to_string(),
            task_name: "Cover letter".to_string(),
            ..TaskRecord::default()
        };

        sheet
            .append_row(&record, "2026-08-26 11:00:00")
            .await
            .expect("append succeeds");

        assert_eq!(sheet.row_count(), 3);
        let stored = sheet.row(2).expect("appended row");
        assert_eq!(stored.record_id, "REC_0003");
        assert_eq!(stored.last_updated, "2026-08-26 11:00:00");
    }
}
