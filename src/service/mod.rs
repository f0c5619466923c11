//! Client for the InterviewLens prediction service.

pub mod client;
pub mod error;

pub use client::PredictionClient;
pub use error::ServiceError;

use crate::profile::{PredictRequest, PredictResponse};
use async_trait::async_trait;

/// The prediction service capability consumed by the submission layer.
///
/// Implementations issue exactly one request per call and never retry; the
/// caller decides what a failure means.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PredictionService: Send + Sync {
    /// Submit both profiles and return the validated success payload.
    async fn predict_questions(
        &self,
        access_token: &str,
        request: &PredictRequest,
    ) -> Result<PredictResponse, ServiceError>;
}
