use thiserror::Error;

/// Error types for the dashboard controller
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The request never produced a response
    #[error("Request failed: {0}")]
    Network(String),

    /// The backend answered with a non-2xx status
    #[error("Failed to fetch {url}: HTTP {status}")]
    Http { url: String, status: u16 },

    /// The response body did not match the expected payload
    #[error("Failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The charting library rejected a chart description
    #[error("Chart error: {0}")]
    Chart(String),

    /// A DOM operation failed
    #[error("DOM error: {0}")]
    Dom(String),
}

impl DashboardError {
    pub fn status(&self) -> Option<u16> {
        match self {
            DashboardError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;
