//! Submission Orchestrator
//!
//! Owns the submit lifecycle for a profile pair:
//! credential acquisition → request dispatch → outcome classification →
//! state transition. Guarantees at most one in-flight submission, and that
//! every submission leaves the pending state with exactly one terminal
//! outcome. Nothing is retried; the user re-triggers by resubmitting.

use crate::auth::{CredentialError, CredentialProvider, TokenRequest};
use crate::profile::{PredictRequest, ProfileForm};
use crate::service::{PredictionService, ServiceError};
use log::{debug, info, warn};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use uuid::Uuid;

/// User-facing message when no credential could be obtained.
pub const AUTH_FAILURE_MESSAGE: &str = "Could not authenticate. Please log in and try again.";
/// User-facing message when the service could not be reached at all.
pub const CONNECTIVITY_FAILURE_MESSAGE: &str =
    "Could not reach the prediction service. Check your connection and try again.";
/// Fallback when the service rejected the request without a usable detail.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong";
/// User-facing message for a 2xx response with an unusable payload.
pub const MALFORMED_RESPONSE_MESSAGE: &str =
    "The prediction service returned an unexpected response.";

/// Observable lifecycle of a submission. Exactly one value is active at any
/// time; entering `Pending` discards any previous outcome so a stale result
/// never shows alongside an in-flight request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Pending,
    Succeeded {
        /// Server-rendered HTML interview plan. Unsanitized; display goes
        /// through the renderer.
        document: String,
    },
    Failed {
        message: String,
    },
}

impl SubmissionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, SubmissionState::Pending)
    }
}

/// Everything that can end a submission short of success. All variants
/// collapse to `Failed` for display; the distinction picks the message and
/// feeds the diagnostic log.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("credential acquisition failed: {0}")]
    Auth(#[from] CredentialError),

    #[error("transport failure: {0}")]
    Transport(reqwest::Error),

    #[error("service returned HTTP {status}")]
    Service {
        status: u16,
        detail: Option<String>,
        body: String,
    },

    #[error("malformed service response: {0}")]
    MalformedResponse(String),
}

impl From<ServiceError> for SubmissionError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Reqwest(err) => SubmissionError::Transport(err),
            ServiceError::Http {
                status,
                detail,
                body,
            } => SubmissionError::Service {
                status,
                detail,
                body,
            },
            ServiceError::MalformedResponse(msg) => SubmissionError::MalformedResponse(msg),
        }
    }
}

impl SubmissionError {
    /// The terse message shown to the user.
    fn user_message(&self) -> String {
        match self {
            SubmissionError::Auth(_) => AUTH_FAILURE_MESSAGE.to_string(),
            SubmissionError::Transport(_) => CONNECTIVITY_FAILURE_MESSAGE.to_string(),
            SubmissionError::Service {
                detail: Some(detail),
                ..
            } => detail.clone(),
            SubmissionError::Service { detail: None, .. } => GENERIC_FAILURE_MESSAGE.to_string(),
            SubmissionError::MalformedResponse(_) => MALFORMED_RESPONSE_MESSAGE.to_string(),
        }
    }

    /// Raw status codes and bodies go to the log, not to the user.
    fn log_diagnostics(&self, submission_id: Uuid) {
        match self {
            SubmissionError::Auth(e) => {
                warn!("Submission {}: credential acquisition failed: {}", submission_id, e)
            }
            SubmissionError::Transport(e) => {
                warn!("Submission {}: transport failure: {}", submission_id, e)
            }
            SubmissionError::Service { status, body, .. } => warn!(
                "Submission {}: service returned HTTP {}: {}",
                submission_id, status, body
            ),
            SubmissionError::MalformedResponse(msg) => {
                warn!("Submission {}: malformed response: {}", submission_id, msg)
            }
        }
    }
}

pub struct SubmissionOrchestrator {
    credentials: Box<dyn CredentialProvider>,
    service: Box<dyn PredictionService>,
    token_request: TokenRequest,
    state: Arc<Mutex<SubmissionState>>,
}

impl SubmissionOrchestrator {
    /// Create an orchestrator over the given capabilities. The credential
    /// provider and service are injected so tests can substitute fakes.
    pub fn new(
        credentials: Box<dyn CredentialProvider>,
        service: Box<dyn PredictionService>,
        token_request: TokenRequest,
    ) -> Self {
        Self {
            credentials,
            service,
            token_request,
            state: Arc::new(Mutex::new(SubmissionState::Idle)),
        }
    }

    /// Current submission state. Readers never mutate it; all transitions
    /// happen inside [`submit`](Self::submit).
    pub fn state(&self) -> SubmissionState {
        self.state.lock().unwrap().clone()
    }

    /// Run one submission of the form's current contents.
    ///
    /// A call while a submission is outstanding is a no-op and returns
    /// `Pending` without issuing a second request. Otherwise the form is
    /// snapshotted before the first suspension point, the previous outcome
    /// is discarded, and the returned state is the terminal one, never
    /// `Pending`.
    ///
    /// Required-field validation belongs to the form layer; this method
    /// sends whatever snapshot it is given.
    pub async fn submit(&self, form: &ProfileForm) -> SubmissionState {
        {
            let mut state = self.state.lock().unwrap();
            if state.is_pending() {
                return state.clone();
            }
            *state = SubmissionState::Pending;
        }

        let request = form.snapshot();
        let submission_id = Uuid::new_v4();
        debug!("Submission {}: dispatching", submission_id);

        let terminal = match self.run(&request).await {
            Ok(document) => {
                info!(
                    "Submission {}: succeeded ({} bytes)",
                    submission_id,
                    document.len()
                );
                SubmissionState::Succeeded { document }
            }
            Err(e) => {
                e.log_diagnostics(submission_id);
                SubmissionState::Failed {
                    message: e.user_message(),
                }
            }
        };

        *self.state.lock().unwrap() = terminal.clone();
        terminal
    }

    async fn run(&self, request: &PredictRequest) -> Result<String, SubmissionError> {
        // Re-acquired on every submission; the provider owns expiry and
        // silent refresh. On failure the service is never contacted.
        let token = self.credentials.acquire_token(&self.token_request).await?;
        let response = self.service.predict_questions(&token.token, request).await?;
        Ok(response.html)
    }
}
