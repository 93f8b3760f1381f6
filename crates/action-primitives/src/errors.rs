//! Error types for action primitives

use cdp_adapter::{AdapterError, AdapterErrorKind};
use thiserror::Error;

/// Errors raised while delivering prompts or waiting for completion
#[derive(Debug, Error, Clone)]
pub enum ActionError {
    /// Navigation could not be confirmed
    #[error("Navigation timeout: {0}")]
    NavTimeout(String),

    /// A bounded wait elapsed without the expected signal
    #[error("Wait timeout: {0}")]
    WaitTimeout(String),

    /// Element could not be located
    #[error("Anchor not found: {0}")]
    AnchorNotFound(String),

    /// Element exists but refused the interaction
    #[error("Element not enabled: {0}")]
    NotEnabled(String),

    /// CDP communication or protocol error
    #[error("CDP I/O error: {0}")]
    CdpIo(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AdapterError> for ActionError {
    fn from(err: AdapterError) -> Self {
        let message = err.to_string();
        match err.kind {
            AdapterErrorKind::NavTimeout => ActionError::NavTimeout(message),
            AdapterErrorKind::TargetNotFound => ActionError::AnchorNotFound(message),
            AdapterErrorKind::CdpIo => ActionError::CdpIo(message),
            AdapterErrorKind::NotEnabled => ActionError::NotEnabled(message),
            AdapterErrorKind::Internal => ActionError::Internal(message),
        }
    }
}
