use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use caseboard_core::cache::RecordCache;
use caseboard_core::error::TrackerError;
use caseboard_core::record::TaskRecord;
use caseboard_core::sheet::SheetBackend;
use tokio::sync::Mutex;
use tracing::warn;

use crate::html;

/// Shared per-request state: one backend, one table cache.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn SheetBackend>,
    pub cache: Arc<Mutex<RecordCache>>,
    pub logo_path: PathBuf,
    pub has_logo: bool,
}

impl AppState {
    pub fn new(backend: Arc<dyn SheetBackend>, cache_ttl: Duration, logo_path: PathBuf) -> Self {
        let has_logo = logo_path.exists();
        if !has_logo {
            warn!(logo = %logo_path.display(), "logo not found; pages render without it");
        }
        Self {
            backend,
            cache: Arc::new(Mutex::new(RecordCache::new(cache_ttl))),
            logo_path,
            has_logo,
        }
    }

    /// The full table, served from the cache inside its freshness
    /// window.
    pub async fn table(&self) -> Result<Vec<TaskRecord>, TrackerError> {
        let mut cache = self.cache.lock().await;
        cache.load(self.backend.as_ref(), Instant::now()).await
    }

    /// Called synchronously after every update or append.
    pub async fn invalidate(&self) {
        self.cache.lock().await.invalidate();
    }
}

/// Backend failures surface verbatim; nothing is retried or hidden.
pub fn error_response(state: &AppState, err: &TrackerError) -> Response {
    let status = match err {
        TrackerError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        TrackerError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
        TrackerError::BackendUnavailable(_) => StatusCode::BAD_GATEWAY,
        TrackerError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let body = format!(
        "<p class=\"error\">{}</p><p><a href=\"/clients\">Back to clients</a></p>",
        html::escape(&err.to_string())
    );
    (status, html::page("Error", &body, state.has_logo)).into_response()
}
