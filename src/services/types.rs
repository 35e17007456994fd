//! Request and response types shared by all diagnosis backends

use serde::{Deserialize, Serialize};

/// Structured diagnosis attached to a system turn. Serialized with its
/// snake_case wire names, stored verbatim inside the message record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseInfo {
    pub disease_name: String,
    pub details: String,
    pub treatment: String,
    pub medications: Vec<String>,
}

/// Weather report attached to a resolved location request. Snake_case wire
/// names, like [`DiseaseInfo`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherInfo {
    pub location: String,
    pub temperature: f64,
    pub humidity: f64,
    pub conditions: String,
    pub suitable_for_treatment: bool,
    pub recommendation: String,
}

/// Image selected by the user for one prediction round
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    /// Local display handle shown in the transcript
    pub handle: String,
    /// Raw bytes sent to the backend
    pub data: Vec<u8>,
    /// MIME type of the bytes, e.g. image/png
    pub media_type: String,
}

/// One prediction round: text, image, or both
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionRequest {
    pub text: Option<String>,
    pub image: Option<ImageUpload>,
}

impl PredictionRequest {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.image.is_none()
    }
}

/// Backend answer to a prediction request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PredictionResponse {
    /// A recognized disease with treatment guidance
    Diagnosis(DiseaseInfo),
    /// Free-form reply with no structured diagnosis
    Reply { message: String },
}

/// Backend answer to a weather lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LocationInfoResponse {
    /// Weather data for the submitted location
    Weather(WeatherInfo),
    /// Plain confirmation without weather data
    Acknowledgment { message: String },
}
