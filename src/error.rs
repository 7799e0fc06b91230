use thiserror::Error;

/// Coarse classification of a [`DbError`], used to pick the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input from the caller. Always recoverable.
    Validation,
    /// The addressed line or snapshot does not exist, or is not addressable.
    NotFound,
    /// The primary file or history directory could not be read or written.
    Storage,
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required fields: {}", .fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },

    #[error("Invalid value for field {field}: {detail}")]
    InvalidField { field: &'static str, detail: String },

    #[error("Invalid line number: {raw}")]
    InvalidLineNumber { raw: String },

    #[error("Invalid backup filename")]
    InvalidBackupName { name: String },

    #[error("Entry not found at line {line}")]
    LineNotFound { line: usize },

    #[error("Cannot edit header or comment line")]
    HeaderEdit { line: usize },

    #[error("Cannot delete header or comment line")]
    HeaderDelete { line: usize },

    #[error("Backup file not found")]
    BackupNotFound { name: String },

    #[error("operation timed out after {millis}ms")]
    Timeout { millis: u64 },

    #[error("operation abandoned before it started")]
    Abandoned,

    #[error("config error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl DbError {
    /// Classify this error for the caller.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Json(_)
            | Self::MissingFields { .. }
            | Self::InvalidField { .. }
            | Self::InvalidLineNumber { .. }
            | Self::InvalidBackupName { .. } => ErrorKind::Validation,
            Self::LineNotFound { .. }
            | Self::HeaderEdit { .. }
            | Self::HeaderDelete { .. }
            | Self::BackupNotFound { .. } => ErrorKind::NotFound,
            Self::Io(_)
            | Self::Timeout { .. }
            | Self::Abandoned
            | Self::Config(_)
            | Self::Other(_) => ErrorKind::Storage,
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
