//! Snapshot Errors
//!
//! Error types for fetching report snapshots.

/// Errors that can occur while loading a snapshot
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Source could not serve the request
    #[error("Snapshot source unavailable: {0}")]
    Unavailable(String),
}

impl SnapshotError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SnapshotError::Database(sqlx::Error::PoolTimedOut)
                | SnapshotError::Database(sqlx::Error::Io(_))
                | SnapshotError::Unavailable(_)
        )
    }
}
