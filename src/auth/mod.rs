//! Credential acquisition for the prediction service.
//!
//! The submission layer consumes credentials through the
//! [`CredentialProvider`] capability; the production implementation in
//! [`provider`] speaks the identity provider's OAuth endpoints and owns the
//! token cache, its expiry, and the persisted session.

pub mod provider;
pub mod session;

pub use provider::OidcCredentialProvider;
pub use session::Session;

use crate::consts::auth::TOKEN_EXPIRY_LEEWAY_SECS;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Parameters of a token acquisition: which API the token is for and what
/// it is allowed to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    pub audience: String,
    pub scope: String,
}

/// An opaque bearer token with its expiry instant.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Whether the token is still usable, with a safety margin so a token
    /// that expires mid-request is not handed out.
    pub fn is_fresh(&self) -> bool {
        self.expires_at - Duration::seconds(TOKEN_EXPIRY_LEEWAY_SECS) > Utc::now()
    }
}

#[derive(Debug, Error)]
pub enum CredentialError {
    /// No usable session. Covers both a missing session file and a refresh
    /// token the identity provider no longer accepts.
    #[error("not logged in; run `interviewlens login` first")]
    NotAuthenticated,

    /// Reqwest error talking to the identity provider.
    #[error("identity provider request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// The identity provider answered with an OAuth error.
    #[error("identity provider rejected the request ({error}): {description}")]
    Rejected { error: String, description: String },

    /// A token endpoint response that could not be interpreted.
    #[error("malformed identity provider response: {0}")]
    MalformedResponse(String),

    /// The user did not confirm the device login in time.
    #[error("login was not confirmed in time")]
    LoginTimeout,

    /// Reading or writing the persisted session failed.
    #[error("session storage error: {0}")]
    Session(#[from] std::io::Error),
}

/// Capability for obtaining a bearer token, possibly via a silent refresh.
///
/// Injected into the submission orchestrator so tests can substitute a fake;
/// a failure here means the caller is unauthenticated and no service call
/// should be attempted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn acquire_token(&self, request: &TokenRequest) -> Result<AccessToken, CredentialError>;
}
