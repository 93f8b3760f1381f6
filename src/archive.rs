//! Message extraction from a conversation-archive export (`conversations.json`)

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::RelayError;

const ROOT_NODE: &str = "client-created-root";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
struct Conversation {
    #[serde(default)]
    mapping: HashMap<String, Node>,
}

#[derive(Debug, Default, Deserialize)]
struct Node {
    #[serde(default)]
    message: Option<Message>,
    #[serde(default)]
    children: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    author: Option<Author>,
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Author {
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Value>,
}

impl Message {
    fn to_archived(&self) -> Option<ArchivedMessage> {
        let role = self.author.as_ref()?.role.clone()?;
        let content: String = self
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(Value::as_str)
            .collect();
        let content = content.trim();
        if role.is_empty() || content.is_empty() {
            return None;
        }
        Some(ArchivedMessage {
            role,
            content: content.to_string(),
        })
    }
}

/// Depth-first walk of the reply tree from the client root, children in
/// order, keeping messages that have both a role and non-empty text.
fn walk(conversation: &Conversation) -> Vec<ArchivedMessage> {
    let mut messages = Vec::new();
    let mut visited = HashSet::new();
    let mut stack: Vec<&str> = conversation
        .mapping
        .get(ROOT_NODE)
        .map(|root| root.children.iter().rev().map(String::as_str).collect())
        .unwrap_or_default();

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let Some(node) = conversation.mapping.get(id) else {
            continue;
        };
        if let Some(message) = node.message.as_ref().and_then(Message::to_archived) {
            messages.push(message);
        }
        stack.extend(node.children.iter().rev().map(String::as_str));
    }
    messages
}

/// Messages of one archived conversation, or `None` if it is malformed.
pub fn extract_messages(conversation: &Value) -> Option<Vec<ArchivedMessage>> {
    let parsed = Conversation::deserialize(conversation).ok()?;
    Some(walk(&parsed))
}

/// Conversations whose first message starts with `prefix`.
pub fn extract_archive(archive: &Value, prefix: &str) -> Result<Vec<Vec<ArchivedMessage>>, RelayError> {
    let conversations = archive
        .as_array()
        .ok_or_else(|| RelayError::Archive("expected a JSON array of conversations".to_string()))?;

    let kept: Vec<_> = conversations
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let messages = extract_messages(item);
            if messages.is_none() {
                debug!(index, "skipping malformed conversation");
            }
            messages
        })
        .filter(|messages| {
            messages
                .first()
                .is_some_and(|first| first.content.starts_with(prefix))
        })
        .collect();
    Ok(kept)
}

pub fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}_messages.json"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub output: PathBuf,
    pub conversations: usize,
}

pub async fn export_archive(
    input: &Path,
    output: Option<&Path>,
    prefix: &str,
) -> Result<ExportSummary, RelayError> {
    let raw = tokio::fs::read_to_string(input)
        .await
        .map_err(|err| RelayError::io(input, err))?;
    let archive: Value = serde_json::from_str(&raw)
        .map_err(|err| RelayError::Archive(format!("{}: {err}", input.display())))?;

    let conversations = extract_archive(&archive, prefix)?;
    let output = output.map(Path::to_path_buf).unwrap_or_else(|| default_output(input));
    let body = serde_json::to_string_pretty(&conversations)
        .map_err(|err| RelayError::Archive(err.to_string()))?;
    tokio::fs::write(&output, body)
        .await
        .map_err(|err| RelayError::io(&output, err))?;

    info!(
        output = %output.display(),
        conversations = conversations.len(),
        "exported archived conversations"
    );
    Ok(ExportSummary {
        output,
        conversations: conversations.len(),
    })
}
