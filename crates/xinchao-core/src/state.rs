//! UI-agnostic conversation state types
//!
//! This module contains data structures shared between shells (the TUI
//! today, other front ends later) and doesn't depend on any UI framework.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A single entry in the conversation. Immutable once appended; the shell
/// keeps these in insertion order and that ordered list is the entire
/// conversation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

impl ChatMessage {
    pub fn user(content: String) -> Self {
        Self {
            role: ChatRole::User,
            content,
            timestamp: Local::now(),
        }
    }

    pub fn assistant(content: String) -> Self {
        Self {
            role: ChatRole::Assistant,
            content,
            timestamp: Local::now(),
        }
    }

    /// Clock label shown next to the message, e.g. "14:07".
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    User,
    Assistant,
}
