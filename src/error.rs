//! Error taxonomy shared by the status and clock functions.
//!
//! Each failure is tagged with one of three categories so that callers can
//! branch on [`ErrorKind`] instead of inspecting messages.

use thiserror::Error;

use crate::store::StoreBackendError;

/// Malformed request shape or unrecognized transition command.
///
/// Always raised before the store is touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Parameters must contain 'function', 'change_status', or 'check_auth'")]
    MissingParameters,

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Invalid status value: {0}")]
    InvalidCommand(String),

    #[error("Parameter '{key}' must be a string")]
    InvalidParameter { key: String },

    #[error("Auth code missing or not accepted")]
    Unauthorized,

    #[error("Malformed invocation event: {0}")]
    MalformedEvent(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Read,
    Write,
}

impl std::fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreOperation::Read => write!(f, "read"),
            StoreOperation::Write => write!(f, "write"),
        }
    }
}

/// A failed read or write against the status store.
///
/// For writes issued as part of a multi-key transition, `write_index` is the
/// position of the failing write in the plan and `applied` lists the logical
/// keys already written before it. Those writes are not rolled back.
#[derive(Debug, Error)]
#[error("Store {op} failed for key '{key}': {source}")]
pub struct StoreAccessError {
    pub op: StoreOperation,
    pub key: String,
    pub write_index: Option<usize>,
    pub applied: Vec<String>,
    #[source]
    pub source: StoreBackendError,
}

impl StoreAccessError {
    pub fn read(key: impl Into<String>, source: StoreBackendError) -> Self {
        Self {
            op: StoreOperation::Read,
            key: key.into(),
            write_index: None,
            applied: Vec::new(),
            source,
        }
    }

    pub fn write(
        key: impl Into<String>,
        write_index: usize,
        applied: Vec<String>,
        source: StoreBackendError,
    ) -> Self {
        Self {
            op: StoreOperation::Write,
            key: key.into(),
            write_index: Some(write_index),
            applied,
            source,
        }
    }
}

/// Business-hours settings that cannot be interpreted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigFormatError {
    #[error("Invalid cutoff '{value}': expected 24-hour HH:MM")]
    InvalidCutoff { value: String },

    #[error("Invalid UTC offset of {hours} hours")]
    InvalidUtcOffset { hours: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    StoreAccess,
    ConfigFormat,
}

/// Any failure a function handler can surface to its host.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    StoreAccess(#[from] StoreAccessError),

    #[error(transparent)]
    ConfigFormat(#[from] ConfigFormatError),
}

impl HandlerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HandlerError::Validation(_) => ErrorKind::Validation,
            HandlerError::StoreAccess(_) => ErrorKind::StoreAccess,
            HandlerError::ConfigFormat(_) => ErrorKind::ConfigFormat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_variant() {
        let err: HandlerError = ValidationError::MissingParameters.into();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err: HandlerError = ConfigFormatError::InvalidCutoff {
            value: "bad".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::ConfigFormat);

        let err: HandlerError = StoreAccessError::read(
            "SC Emergency Mode",
            StoreBackendError::Unavailable("down".to_string()),
        )
        .into();
        assert_eq!(err.kind(), ErrorKind::StoreAccess);
    }

    #[test]
    fn write_error_reports_position_and_applied_keys() {
        let err = StoreAccessError::write(
            "FES Meeting Mode",
            1,
            vec!["SC Emergency Mode".to_string()],
            StoreBackendError::Unavailable("throttled".to_string()),
        );
        assert_eq!(err.op, StoreOperation::Write);
        assert_eq!(err.write_index, Some(1));
        assert_eq!(err.applied, vec!["SC Emergency Mode".to_string()]);
        assert!(err.to_string().contains("write failed for key 'FES Meeting Mode'"));
    }
}
