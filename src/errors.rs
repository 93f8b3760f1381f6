//! Error types for the chatrelay controller and its file surfaces

use std::path::PathBuf;

use action_primitives::ActionError;
use cdp_adapter::AdapterError;
use chatrelay_core_types::{ConversationRecord, RecordError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("table error in {path}: {source}")]
    Table {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("table {path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },

    #[error("archive error: {0}")]
    Archive(String),

    #[error("browser surface error: {0}")]
    Surface(#[from] AdapterError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("record invariant violated: {0}")]
    Record(#[from] RecordError),
}

impl RelayError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn table(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Table {
            path: path.into(),
            source,
        }
    }
}

/// Fail-fast dispatch abort.
///
/// Carries the records that completed before the failing prompt so callers
/// can persist partial progress.
#[derive(Debug, Error)]
#[error("dispatch aborted at prompt {} of {total}: {source}", .failed_index + 1)]
pub struct DispatchFailure {
    pub completed: Vec<ConversationRecord>,
    pub failed_index: usize,
    pub total: usize,
    #[source]
    pub source: ActionError,
}
