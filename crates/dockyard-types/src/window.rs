// ABOUTME: Dockable window data shared by factories, surfaces and the shell
// ABOUTME: Content is an opaque JSON payload owned by the presentation layer

use serde::{Deserialize, Serialize};

/// A content panel that can live in one docking region or float on its own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockableWindow {
    /// Identifier, unique within a region
    pub id: String,

    /// Title shown on the window's tab
    pub title: String,

    /// Short description for tooltips and pickers
    #[serde(default)]
    pub description: String,

    /// Opaque payload rendered by the presentation layer
    #[serde(default)]
    pub content: serde_json::Value,

    #[serde(default = "default_true")]
    pub can_close: bool,

    #[serde(default = "default_true")]
    pub can_float: bool,

    #[serde(default)]
    pub is_floating: bool,
}

fn default_true() -> bool {
    true
}

impl DockableWindow {
    /// Create a closable, floatable window with no content
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            content: serde_json::Value::Null,
            can_close: true,
            can_float: true,
            is_floating: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_content(mut self, content: serde_json::Value) -> Self {
        self.content = content;
        self
    }

    pub fn closable(mut self, can_close: bool) -> Self {
        self.can_close = can_close;
        self
    }

    pub fn floatable(mut self, can_float: bool) -> Self {
        self.can_float = can_float;
        self
    }

    /// Whether the window still needs an id assigned by its factory
    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }
}
