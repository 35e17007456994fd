//! Session record types
//!
//! Field names and epoch-millisecond timestamps match the browser-storage
//! layout, so existing records keep loading unchanged.

use crate::services::{DiseaseInfo, WeatherInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    System,
}

/// One turn in the conversation transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Local display handle for an attached image. The handle is only valid
    /// within the session that created it; the bytes are never persisted, so
    /// this is dead after a reload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disease_info: Option<DiseaseInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_info: Option<WeatherInfo>,
    /// Set on a diagnosis turn that is still waiting for the user's location
    #[serde(default)]
    pub is_location_request: bool,
}

impl Message {
    /// Create a user turn, optionally carrying an image handle
    pub fn user(id: impl Into<String>, content: impl Into<String>, image: Option<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::User,
            content: content.into(),
            image,
            timestamp: Utc::now(),
            disease_info: None,
            weather_info: None,
            is_location_request: false,
        }
    }

    /// Create a system turn with plain content
    pub fn system(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::System,
            content: content.into(),
            image: None,
            timestamp: Utc::now(),
            disease_info: None,
            weather_info: None,
            is_location_request: false,
        }
    }
}

/// A full conversation with its transcript and timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub messages: Vec<Message>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
