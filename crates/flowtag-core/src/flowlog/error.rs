use thiserror::Error;

/// Reasons a flow-log line could not be decoded into a record.
///
/// # Examples
/// ```
/// use flowtag_core::FlowLogError;
///
/// let err = FlowLogError::TooFewFields { needed: 14, actual: 3 };
/// assert!(err.to_string().contains("too few fields"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowLogError {
    #[error("too few fields: need {needed}, got {actual}")]
    TooFewFields { needed: usize, actual: usize },
    #[error("invalid destination port: {value:?}")]
    InvalidPort { value: String },
    #[error("invalid protocol number: {value:?}")]
    InvalidProtocol { value: String },
}
