//! Error types for melonbooks_tracker

/// Unified error type for catalog operations
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// A required field was blank or missing after trimming
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An artist with this (name, site) pair is already tracked
    #[error("Artist '{name}' is already tracked for site '{site}'")]
    DuplicateArtist { name: String, site: String },

    /// Database operation failed (includes failure to open the database)
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result alias for catalog operations
pub type Result<T> = std::result::Result<T, TrackerError>;
