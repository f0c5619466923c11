//! InterviewLens Prediction Client
//!
//! A client for the prediction service, submitting profile pairs and
//! returning the rendered interview plan.

use crate::consts::http::REQUEST_TIMEOUT_SECS;
use crate::environment::Environment;
use crate::profile::{PredictRequest, PredictResponse};
use crate::service::error::ServiceError;
use crate::service::PredictionService;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, ClientBuilder, Response};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PredictionClient {
    client: Client,
    environment: Environment,
}

impl PredictionClient {
    /// Create a new prediction client for the given environment.
    pub fn new(environment: Environment) -> Self {
        Self {
            client: ClientBuilder::new()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to create HTTP client"),
            environment,
        }
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.environment.api_base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    async fn handle_response_status(response: Response) -> Result<Response, ServiceError> {
        if !response.status().is_success() {
            return Err(ServiceError::from_response(response).await);
        }
        Ok(response)
    }

    /// Get a reference to the environment.
    #[allow(dead_code)]
    pub fn environment(&self) -> &Environment {
        &self.environment
    }
}

/// Validate a 2xx body against the expected `{ "html": string }` shape.
///
/// Absent, non-string, or empty `html` is a malformed response; partial
/// payloads must never reach the renderer as empty content.
pub(crate) fn parse_predict_response(body: &str) -> Result<PredictResponse, ServiceError> {
    let response: PredictResponse = serde_json::from_str(body).map_err(|e| {
        ServiceError::MalformedResponse(format!("expected an object with an `html` field: {}", e))
    })?;
    if response.html.trim().is_empty() {
        return Err(ServiceError::MalformedResponse(
            "`html` field is empty".to_string(),
        ));
    }
    Ok(response)
}

#[async_trait]
impl PredictionService for PredictionClient {
    async fn predict_questions(
        &self,
        access_token: &str,
        request: &PredictRequest,
    ) -> Result<PredictResponse, ServiceError> {
        let url = self.build_url("api/predict-questions/");
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", access_token))
            .json(request)
            .send()
            .await?;

        let response = Self::handle_response_status(response).await?;
        let body = response.text().await?;
        parse_predict_response(&body)
    }
}
