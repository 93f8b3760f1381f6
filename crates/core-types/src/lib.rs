use std::fmt;

use chrono::{DateTime, Local};
use thiserror::Error;
use uuid::Uuid;

/// Shared error type for record state transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("{message}")]
    Message { message: String },
}

impl RecordError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Coarse lifecycle of a record, derived from which fields are populated.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecordStatus {
    Pending,
    DispatchFailed,
    Dispatched,
    CollectFailed,
    Answered,
}

/// One row per submitted prompt.
///
/// Fields are private so the invariants hold for every record that leaves a
/// phase: `link` is only present after a successful dispatch, `reply` is only
/// present alongside a `link`, and `prompt` never changes.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversationRecord {
    id: RecordId,
    prompt: String,
    link: Option<String>,
    reply: Option<String>,
    error: Option<String>,
    submitted_at: Option<DateTime<Local>>,
}

impl ConversationRecord {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(),
            prompt: prompt.into(),
            link: None,
            reply: None,
            error: None,
            submitted_at: None,
        }
    }

    /// Rebuild a record loaded from an earlier run (e.g. a submitted table).
    ///
    /// A reply without a link is dropped so the loaded record still satisfies
    /// the record invariant.
    pub fn restore(
        prompt: impl Into<String>,
        link: Option<String>,
        reply: Option<String>,
        error: Option<String>,
        submitted_at: Option<DateTime<Local>>,
    ) -> Self {
        let link = link.filter(|value| !value.trim().is_empty());
        let reply = match link {
            Some(_) => reply.filter(|value| !value.is_empty()),
            None => None,
        };
        Self {
            id: RecordId::new(),
            prompt: prompt.into(),
            link,
            reply,
            error: error.filter(|value| !value.is_empty()),
            submitted_at,
        }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub fn reply(&self) -> Option<&str> {
        self.reply.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn submitted_at(&self) -> Option<DateTime<Local>> {
        self.submitted_at
    }

    pub fn status(&self) -> RecordStatus {
        match (&self.link, &self.reply, &self.error) {
            (None, _, Some(_)) => RecordStatus::DispatchFailed,
            (None, _, None) => RecordStatus::Pending,
            (Some(_), Some(_), _) => RecordStatus::Answered,
            (Some(_), None, Some(_)) => RecordStatus::CollectFailed,
            (Some(_), None, None) => RecordStatus::Dispatched,
        }
    }

    /// Record a completed dispatch. The link is set exactly once.
    pub fn mark_dispatched(
        &mut self,
        link: impl Into<String>,
        at: DateTime<Local>,
    ) -> Result<(), RecordError> {
        if self.link.is_some() {
            return Err(RecordError::new(format!(
                "record {} already holds a thread link",
                self.id
            )));
        }
        self.link = Some(link.into());
        self.submitted_at = Some(at);
        self.error = None;
        Ok(())
    }

    /// Record a failed dispatch. The record keeps no link and no reply.
    pub fn mark_failed(&mut self, cause: impl Into<String>) {
        self.link = None;
        self.reply = None;
        self.submitted_at = None;
        self.error = Some(cause.into());
    }

    /// Store the extracted reply. Only valid once a link is present, and only once.
    pub fn set_reply(&mut self, reply: impl Into<String>) -> Result<(), RecordError> {
        if self.link.is_none() {
            return Err(RecordError::new(format!(
                "record {} has no thread link; reply cannot be attached",
                self.id
            )));
        }
        if self.reply.is_some() {
            return Err(RecordError::new(format!(
                "record {} already holds a reply",
                self.id
            )));
        }
        self.reply = Some(reply.into());
        self.error = None;
        Ok(())
    }

    /// Record a collection failure; the link stays, the reply stays absent.
    pub fn mark_collect_failed(&mut self, cause: impl Into<String>) {
        if self.reply.is_none() {
            self.error = Some(cause.into());
        }
    }
}
