//! Effects produced by state transitions
//!
//! Transitions stay pure by describing work instead of doing it. The
//! controller executes each effect and feeds any completion event back in.

use crate::services::{DiseaseInfo, ImageUpload, WeatherInfo};
use serde::{Deserialize, Serialize};

/// Side effect requested by a transition
#[derive(Debug, Clone)]
pub enum Effect {
    /// Append a user turn to the transcript
    AppendUserMessage {
        content: String,
        image: Option<String>,
    },
    /// Append a system turn to the transcript
    AppendSystemMessage {
        content: String,
        disease_info: Option<DiseaseInfo>,
        is_location_request: bool,
    },
    /// Patch the diagnosis turn a location flow was aimed at
    ResolveLocationRequest {
        message_id: String,
        weather: Option<WeatherInfo>,
    },
    /// Send a prediction request to the backend
    RequestPrediction {
        text: Option<String>,
        image: Option<ImageUpload>,
    },
    /// Send a weather lookup to the backend
    RequestLocationInfo { location: String },
    /// Load the most recent session from the store
    LoadCurrentSession,
    /// Create a fresh session and switch to it
    ResetSession,
    /// Show a toast to the user
    Notify(Notice),
}

impl Effect {
    pub fn append_user_message(content: impl Into<String>, image: Option<String>) -> Self {
        Self::AppendUserMessage {
            content: content.into(),
            image,
        }
    }

    pub fn append_system_text(content: impl Into<String>) -> Self {
        Self::AppendSystemMessage {
            content: content.into(),
            disease_info: None,
            is_location_request: false,
        }
    }

    /// A diagnosis turn always starts out waiting for the user's location
    pub fn append_diagnosis(content: impl Into<String>, info: DiseaseInfo) -> Self {
        Self::AppendSystemMessage {
            content: content.into(),
            disease_info: Some(info),
            is_location_request: true,
        }
    }

    pub fn notify_error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Notify(Notice::new(NoticeKind::Error, title, description))
    }

    pub fn notify_success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Notify(Notice::new(NoticeKind::Success, title, description))
    }

    pub fn notify_info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Notify(Notice::new(NoticeKind::Info, title, description))
    }
}

/// Toast content for the host UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}
