use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Coarse error classes exposed to callers alongside the HTTP-style status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Authorization,
    Upstream,
    Signature,
    Internal,
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    InvalidTransition(String),
    #[error("{0}")]
    AlreadyApproved(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Payment gateway error: {0}")]
    PaymentGateway(String),
    #[error("Upstream timeout: {0}")]
    UpstreamTimeout(String),
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl WorkflowError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidTransition(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) | Self::InvalidTransition(_) | Self::AlreadyApproved(_) => {
                ErrorKind::Conflict
            }
            Self::Unauthorized(_) | Self::Forbidden(_) => ErrorKind::Authorization,
            Self::PaymentGateway(_) | Self::UpstreamTimeout(_) => ErrorKind::Upstream,
            Self::InvalidSignature => ErrorKind::Signature,
            Self::Io(_) | Self::Csv(_) | Self::Json(_) | Self::Internal(_) => ErrorKind::Internal,
            #[cfg(feature = "storage-rocksdb")]
            Self::RocksDb(_) => ErrorKind::Internal,
        }
    }

    /// HTTP-mappable status class for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_)
            | Self::Conflict(_)
            | Self::InvalidTransition(_)
            | Self::AlreadyApproved(_) => 400,
            Self::Unauthorized(_) | Self::InvalidSignature => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            _ => 500,
        }
    }

    /// Only upstream failures are worth retrying; signature failures never are.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Upstream
    }
}
