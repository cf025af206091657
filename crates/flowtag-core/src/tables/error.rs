use thiserror::Error;

/// Errors returned when a reference table source cannot be read.
///
/// Malformed rows never surface here; they are skipped during the load.
///
/// # Examples
/// ```
/// use flowtag_core::TableError;
///
/// let err = TableError::from(std::io::Error::other("denied"));
/// assert!(err.to_string().contains("I/O error"));
/// ```
#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),
}
