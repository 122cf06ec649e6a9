// ABOUTME: Immutable message record carried by the message bus
// ABOUTME: Messages without a target are broadcast to every subscriber

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a bus message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    Information,
    Warning,
    Error,
    StatusChange,
    Progress,
    Custom(String),
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::Information => f.write_str("Information"),
            MessageType::Warning => f.write_str("Warning"),
            MessageType::Error => f.write_str("Error"),
            MessageType::StatusChange => f.write_str("StatusChange"),
            MessageType::Progress => f.write_str("Progress"),
            MessageType::Custom(name) => write!(f, "Custom({name})"),
        }
    }
}

/// A message published on the bus.
///
/// Fields are read-only once constructed; the timestamp is taken at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    kind: MessageType,
    sender_id: String,
    content: serde_json::Value,
    target_id: Option<String>,
    timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a broadcast message
    pub fn new(
        kind: MessageType,
        sender_id: impl Into<String>,
        content: impl Into<serde_json::Value>,
    ) -> Self {
        Self {
            kind,
            sender_id: sender_id.into(),
            content: content.into(),
            target_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Address the message to a single recipient
    pub fn to(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    pub fn kind(&self) -> &MessageType {
        &self.kind
    }

    pub fn sender_id(&self) -> &str {
        &self.sender_id
    }

    pub fn content(&self) -> &serde_json::Value {
        &self.content
    }

    pub fn target_id(&self) -> Option<&str> {
        self.target_id.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_broadcast(&self) -> bool {
        self.target_id.is_none()
    }

    /// Content as text when it is a JSON string
    pub fn text(&self) -> Option<&str> {
        self.content.as_str()
    }
}
