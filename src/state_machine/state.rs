//! Conversation state types

use serde::{Deserialize, Serialize};

/// What the conversation is doing right now
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
#[derive(Default)]
pub enum ChatState {
    /// Ready for user input
    #[default]
    Idle,
    /// Loading the current session at startup
    Hydrating,
    /// A prediction request is in flight
    Sending,
    /// The location dialog is open for a diagnosis turn
    AwaitingLocation { target_message_id: String },
    /// A weather lookup is in flight for a diagnosis turn
    ResolvingLocation {
        target_message_id: String,
        location: String,
    },
    /// The session is being reset
    ClearingChat,
}

impl ChatState {
    /// True while a backend request is in flight
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Sending | Self::ResolvingLocation { .. })
    }

    /// True while the location dialog is open
    pub fn location_dialog_open(&self) -> bool {
        matches!(self, Self::AwaitingLocation { .. })
    }

    /// The diagnosis turn a location flow is currently aimed at
    pub fn pending_location_target(&self) -> Option<&str> {
        match self {
            Self::AwaitingLocation { target_message_id }
            | Self::ResolvingLocation {
                target_message_id, ..
            } => Some(target_message_id),
            _ => None,
        }
    }
}
