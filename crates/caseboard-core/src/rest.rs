use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::TrackerError;
use crate::record::{HEADER_ROWS, TaskRecord};
use crate::sheet::SheetBackend;

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Values-API client for the hosted spreadsheet. Three endpoints are
/// consumed: read a range, overwrite a range, append after a range.
/// Auth is a bearer token from the service-account credential.
#[derive(Debug, Clone)]
pub struct RestSheet {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    worksheet: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct WriteBody {
    values: Vec<Vec<String>>,
}

impl RestSheet {
    pub fn new(
        base_url: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        worksheet: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            spreadsheet_id: spreadsheet_id.into(),
            worksheet: worksheet.into(),
            token: token.into(),
        }
    }

    fn values_url(&self, range: &str) -> String {
        // Worksheet names may contain spaces; the range sits in the
        // URL path and must be percent-encoded.
        let full = format!("{}!{}", self.worksheet, range).replace(' ', "%20");
        format!(
            "{}/{}/values/{}",
            self.base_url, self.spreadsheet_id, full
        )
    }

    fn storage_row(row_index: usize) -> usize {
        // Zero-based data index to 1-based storage row under the header.
        row_index + HEADER_ROWS + 1
    }

    async fn check(
        &self,
        response: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<reqwest::Response, TrackerError> {
        let response = response.map_err(|err| TrackerError::unavailable(err.to_string()))?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(TrackerError::not_found(format!(
                "spreadsheet {} worksheet {:?}",
                self.spreadsheet_id, self.worksheet
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrackerError::unavailable(format!(
                "{status}: {}",
                body.trim()
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl SheetBackend for RestSheet {
    #[tracing::instrument(skip(self))]
    async fn read_all(&self) -> Result<Vec<TaskRecord>, TrackerError> {
        let url = self.values_url("A1:Q");
        debug!(url = %url, "reading worksheet");

        let response = self
            .check(
                self.http
                    .get(&url)
                    .bearer_auth(&self.token)
                    .send()
                    .await,
            )
            .await?;

        let range: ValueRange = response
            .json()
            .await
            .map_err(|err| TrackerError::unavailable(format!("invalid response body: {err}")))?;

        let records: Vec<TaskRecord> = range
            .values
            .iter()
            .skip(HEADER_ROWS)
            .map(|cells| TaskRecord::from_cells(cells))
            .collect();

        info!(rows = records.len(), "loaded worksheet");
        Ok(records)
    }

    #[tracing::instrument(skip(self, record), fields(record_id = %record.record_id))]
    async fn update_row(
        &self,
        row_index: usize,
        record: &TaskRecord,
        stamp: &str,
    ) -> Result<(), TrackerError> {
        let row = Self::storage_row(row_index);
        let url = format!(
            "{}?valueInputOption=RAW",
            self.values_url(&format!("A{row}:Q{row}"))
        );
        let body = WriteBody {
            values: vec![record.to_cells(stamp)],
        };

        self.check(
            self.http
                .put(&url)
                .bearer_auth(&self.token)
                .json(&body)
                .send()
                .await,
        )
        .await?;

        info!(row, "row updated");
        Ok(())
    }

    #[tracing::instrument(skip(self, record), fields(record_id = %record.record_id))]
    async fn append_row(&self, record: &TaskRecord, stamp: &str) -> Result<(), TrackerError> {
        let url = format!(
            "{}:append?valueInputOption=RAW",
            self.values_url("A1:Q")
        );
        let body = WriteBody {
            values: vec![record.to_cells(stamp)],
        };

        self.check(
            self.http
                .post(&url)
                .bearer_auth(&self.token)
                .json(&body)
                .send()
                .await,
        )
        .await?;

        info!(record_id = %record.record_id, "row appended");
        Ok(())
    }
}
