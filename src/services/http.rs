//! HTTP adapter for the deployed diagnosis backend
//!
//! Sends predictions to `POST {base}/api/predict` (multipart when an image is
//! attached, JSON otherwise) and weather lookups to `GET {base}/api/weather`.
//! Wire responses are normalized into the tagged response enums so callers
//! never see partial payloads.

use super::types::{
    DiseaseInfo, LocationInfoResponse, PredictionRequest, PredictionResponse, WeatherInfo,
};
use super::{DiagnosisService, ServiceError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for the hosted diagnosis API
pub struct HttpService {
    client: Client,
    base_url: String,
}

impl HttpService {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self { client, base_url }
    }

    async fn send_predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<reqwest::Response, ServiceError> {
        let url = format!("{}/api/predict", self.base_url);

        let builder = if let Some(image) = &request.image {
            let part = Part::bytes(image.data.clone())
                .file_name(image.handle.clone())
                .mime_str(&image.media_type)
                .map_err(|e| {
                    ServiceError::invalid_request(format!("Invalid image media type: {e}"))
                })?;

            let mut form = Form::new().part("image", part);
            if let Some(text) = &request.text {
                form = form.text("text", text.clone());
            }

            self.client.post(&url).multipart(form)
        } else if let Some(text) = &request.text {
            self.client.post(&url).json(&PredictTextBody { text: text.clone() })
        } else {
            return Err(ServiceError::invalid_request(
                "Either text or image must be provided",
            ));
        };

        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ServiceError::network(format!("Request timeout: {e}"))
            } else if e.is_connect() {
                ServiceError::network(format!("Connection failed: {e}"))
            } else {
                ServiceError::unknown(format!("Request failed: {e}"))
            }
        })
    }

    fn classify_error(&self, status: reqwest::StatusCode, body: &str) -> ServiceError {
        // Backends wrap error text in either "error" or "detail"
        let message = serde_json::from_str::<ErrorWire>(body)
            .ok()
            .and_then(|e| e.error.or(e.detail))
            .unwrap_or_else(|| body.to_string());

        match status.as_u16() {
            400 => ServiceError::invalid_request(format!("Invalid request: {message}")),
            401 | 403 => ServiceError::auth(format!("Authentication failed: {message}")),
            429 => ServiceError::rate_limit(format!("Rate limited: {message}")),
            500..=599 => ServiceError::server_error(format!("Server error: {message}")),
            _ => ServiceError::unknown(format!("HTTP {status}: {message}")),
        }
    }
}

#[async_trait]
impl DiagnosisService for HttpService {
    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResponse, ServiceError> {
        let response = self.send_predict(request).await?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(self.classify_error(status, &body));
        }

        let wire: PredictWire = serde_json::from_str(&body).map_err(|e| {
            ServiceError::decode(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        normalize_prediction(wire)
    }

    async fn fetch_location_info(
        &self,
        location: &str,
    ) -> Result<LocationInfoResponse, ServiceError> {
        let url = format!("{}/api/weather", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("location", location)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ServiceError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    ServiceError::network(format!("Connection failed: {e}"))
                } else {
                    ServiceError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(self.classify_error(status, &body));
        }

        let wire: WeatherWire = serde_json::from_str(&body).map_err(|e| {
            ServiceError::decode(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        normalize_weather(wire)
    }

    fn backend_name(&self) -> &str {
        "http"
    }
}

// ============================================================
// Wire normalization
// ============================================================

/// A payload with a disease name is a diagnosis; one with only a message is a
/// plain reply. Anything else is a decode failure.
fn normalize_prediction(wire: PredictWire) -> Result<PredictionResponse, ServiceError> {
    if let Some(disease_name) = wire.disease_name {
        return Ok(PredictionResponse::Diagnosis(DiseaseInfo {
            disease_name,
            details: wire.details.unwrap_or_default(),
            treatment: wire.treatment.unwrap_or_default(),
            medications: wire.medications.unwrap_or_default(),
        }));
    }

    if let Some(message) = wire.message {
        return Ok(PredictionResponse::Reply { message });
    }

    Err(ServiceError::decode(
        "Response had neither disease_name nor message",
    ))
}

/// Any weather field present makes the payload a weather report, with absent
/// fields filled by neutral defaults. A bare message is an acknowledgment.
fn normalize_weather(wire: WeatherWire) -> Result<LocationInfoResponse, ServiceError> {
    let has_weather = wire.location.is_some()
        || wire.temperature.is_some()
        || wire.humidity.is_some()
        || wire.conditions.is_some()
        || wire.suitable_for_treatment.is_some()
        || wire.recommendation.is_some();

    if has_weather {
        return Ok(LocationInfoResponse::Weather(WeatherInfo {
            location: wire.location.unwrap_or_default(),
            temperature: wire.temperature.unwrap_or_default(),
            humidity: wire.humidity.unwrap_or_default(),
            conditions: wire.conditions.unwrap_or_else(|| "N/A".to_string()),
            suitable_for_treatment: wire.suitable_for_treatment.unwrap_or_default(),
            recommendation: wire.recommendation.unwrap_or_default(),
        }));
    }

    if let Some(message) = wire.message {
        return Ok(LocationInfoResponse::Acknowledgment { message });
    }

    Err(ServiceError::decode(
        "Response had neither weather fields nor message",
    ))
}

// ============================================================
// Diagnosis API types
// ============================================================

#[derive(Debug, Serialize)]
struct PredictTextBody {
    text: String,
}

#[derive(Debug, Default, Deserialize)]
struct PredictWire {
    disease_name: Option<String>,
    details: Option<String>,
    treatment: Option<String>,
    medications: Option<Vec<String>>,
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WeatherWire {
    location: Option<String>,
    temperature: Option<f64>,
    humidity: Option<f64>,
    conditions: Option<String>,
    suitable_for_treatment: Option<bool>,
    recommendation: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorWire {
    error: Option<String>,
    detail: Option<String>,
}
