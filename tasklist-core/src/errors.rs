use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Unknown priority: {0:?}")]
    UnknownPriority(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// True for failures raised by the underlying store (reads, writes, migrations).
    pub fn is_store_failure(&self) -> bool {
        matches!(self, ClientError::Database(_) | ClientError::Migration(_))
    }

    /// True when a stored value could not be decoded into a known type.
    pub fn is_decode_failure(&self) -> bool {
        matches!(self, ClientError::UnknownPriority(_))
    }
}
