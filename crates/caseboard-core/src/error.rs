use thiserror::Error;

/// Failure taxonomy for the tracker.
///
/// Backend failures carry the underlying message verbatim; the screens
/// surface it to the user rather than hiding it behind a generic page.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Missing or malformed credentials/config. Fatal at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The remote table could not be reached or refused authentication.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The spreadsheet, worksheet, or row does not exist.
    #[error("not found: {0}")]
    ResourceNotFound(String),

    /// A required form field was missing on create.
    #[error("{field} is required")]
    Validation { field: String },
}

impl TrackerError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::BackendUnavailable(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::ResourceNotFound(msg.into())
    }

    pub fn validation(field: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
        }
    }
}
