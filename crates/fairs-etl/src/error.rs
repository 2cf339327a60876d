//! Error types for the fairs ETL
//!
//! Messages are user-facing. Database and connection failures deliberately
//! carry no detail: the raw error goes to the failure log, and the caller only
//! learns that the step failed.

use thiserror::Error;

/// Result type alias for ETL operations
pub type Result<T> = std::result::Result<T, EtlError>;

#[derive(Error, Debug)]
pub enum EtlError {
    /// Required connection parameters are missing or invalid
    #[error("Configuration error: {0}. Check your .env file or environment variables.")]
    Configuration(String),

    /// Could not establish a database session
    #[error("Unable to connect to the database, check the log file for more details.")]
    Connection,

    /// The remote archive could not be fetched
    #[error("Failed to download remote file from URL {url}: {reason}")]
    Download { url: String, reason: String },

    /// The archive is unreadable or lacks the requested file
    #[error("Archive error: {0}")]
    Archive(String),

    /// No dataset handler exists for the requested file
    #[error("File `{0}` is not available for ETL")]
    UnsupportedFile(String),

    /// The CSV content has no usable header or malformed rows
    #[error("Parse error: {0}")]
    Parse(String),

    /// Any failure inside the load transaction; everything was rolled back
    #[error("Failed to insert records in the database, check the log file for more details.")]
    Insertion,

    /// The interactive file selection was cancelled or failed
    #[error("File selection failed: {0}")]
    Prompt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EtlError {
    pub fn download(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Download {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn archive(message: impl Into<String>) -> Self {
        Self::Archive(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}

impl From<csv::Error> for EtlError {
    fn from(err: csv::Error) -> Self {
        EtlError::Parse(err.to_string())
    }
}

impl From<zip::result::ZipError> for EtlError {
    fn from(err: zip::result::ZipError) -> Self {
        EtlError::Archive(err.to_string())
    }
}
