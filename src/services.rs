//! External service abstraction
//!
//! Backends implement [`DiagnosisService`]; the controller only ever sees the
//! trait. [`HttpService`] talks to the deployed API, [`OfflineService`] answers
//! from scripted data for demos and tests.

mod error;
mod http;
mod offline;
mod types;

pub use error::{ServiceError, ServiceErrorKind};
pub use http::HttpService;
pub use offline::OfflineService;
pub use types::{
    DiseaseInfo, ImageUpload, LocationInfoResponse, PredictionRequest, PredictionResponse,
    WeatherInfo,
};

use async_trait::async_trait;
use std::sync::Arc;

/// Backend capable of diagnosing plant diseases and looking up weather
#[async_trait]
pub trait DiagnosisService: Send + Sync {
    /// Run one prediction round over the given text and/or image
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse, ServiceError>;

    /// Fetch weather guidance for a treatment location
    async fn fetch_location_info(&self, location: &str)
        -> Result<LocationInfoResponse, ServiceError>;

    /// Short backend label used in logs
    fn backend_name(&self) -> &str;
}

// ============================================================
// Arc implementation for trait objects
// ============================================================

#[async_trait]
impl<T: DiagnosisService + ?Sized> DiagnosisService for Arc<T> {
    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResponse, ServiceError> {
        (**self).predict(request).await
    }

    async fn fetch_location_info(
        &self,
        location: &str,
    ) -> Result<LocationInfoResponse, ServiceError> {
        (**self).fetch_location_info(location).await
    }

    fn backend_name(&self) -> &str {
        (**self).backend_name()
    }
}

/// Wrapper that adds request logging to any diagnosis service
pub struct LoggingService {
    inner: Arc<dyn DiagnosisService>,
    backend: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn DiagnosisService>) -> Self {
        let backend = inner.backend_name().to_string();
        Self { inner, backend }
    }
}

#[async_trait]
impl DiagnosisService for LoggingService {
    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResponse, ServiceError> {
        let start = std::time::Instant::now();
        let has_image = request.image.is_some();

        tracing::debug!(
            backend = %self.backend,
            has_image = has_image,
            "Sending prediction request"
        );

        let result = self.inner.predict(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                let diagnosis = matches!(response, PredictionResponse::Diagnosis(_));
                tracing::info!(
                    backend = %self.backend,
                    duration_ms = %duration.as_millis(),
                    diagnosis = diagnosis,
                    "Prediction completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    backend = %self.backend,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    transient = e.kind.is_transient(),
                    "Prediction failed"
                );
            }
        }

        result
    }

    async fn fetch_location_info(
        &self,
        location: &str,
    ) -> Result<LocationInfoResponse, ServiceError> {
        let start = std::time::Instant::now();

        let result = self.inner.fetch_location_info(location).await;
        let duration = start.elapsed();

        match &result {
            Ok(_) => {
                tracing::info!(
                    backend = %self.backend,
                    duration_ms = %duration.as_millis(),
                    "Weather lookup completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    backend = %self.backend,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    transient = e.kind.is_transient(),
                    "Weather lookup failed"
                );
            }
        }

        result
    }

    fn backend_name(&self) -> &str {
        &self.backend
    }
}
