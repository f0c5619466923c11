//! OAuth credential provider.
//!
//! Speaks the identity provider's tenant endpoints:
//! * refresh-token grant for silent access-token acquisition
//! * device-authorization grant for interactive login
//! * userinfo for identity display
//!
//! Owns the in-memory token cache and the persisted refresh token; callers
//! only ever see [`AccessToken`]s.

use crate::auth::session::Session;
use crate::auth::{AccessToken, CredentialError, CredentialProvider, TokenRequest};
use crate::consts::auth::{DEVICE_FLOW_TIMEOUT_SECS, DEVICE_POLL_INTERVAL_SECS, SUBMISSION_SCOPE};
use crate::consts::http::REQUEST_TIMEOUT_SECS;
use crate::environment::Environment;
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

fn default_poll_interval() -> u64 {
    DEVICE_POLL_INTERVAL_SECS
}

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    #[serde(default)]
    verification_uri_complete: String,
    expires_in: u64,
    #[serde(default = "default_poll_interval")]
    interval: u64,
}

/// Claims returned by the identity provider's userinfo endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub picture: String,
}

/// Outcome of one device-flow polling attempt.
enum PollOutcome {
    Tokens(TokenResponse),
    Pending,
    SlowDown,
}

pub struct OidcCredentialProvider {
    client: Client,
    environment: Environment,
    session_path: PathBuf,
    cached: Mutex<Option<(TokenRequest, AccessToken)>>,
}

impl OidcCredentialProvider {
    /// Create a provider for the given environment, persisting the session
    /// at the given path.
    pub fn new(environment: Environment, session_path: PathBuf) -> Self {
        Self {
            client: ClientBuilder::new()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to create HTTP client"),
            environment,
            session_path,
            cached: Mutex::new(None),
        }
    }

    fn tenant_url(&self, endpoint: &str) -> String {
        format!(
            "https://{}/{}",
            self.environment.auth_domain.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// The token request used for submissions and identity display.
    pub fn default_token_request(&self) -> TokenRequest {
        TokenRequest {
            audience: self.environment.auth_audience.clone(),
            scope: SUBMISSION_SCOPE.to_string(),
        }
    }

    /// Interactive device-flow login. Prints the verification instructions,
    /// waits for the user to confirm in a browser, then persists the session.
    pub async fn login(&self, scope: &str) -> Result<UserInfo, CredentialError> {
        let url = self.tenant_url("oauth/device/code");
        let response = self
            .client
            .post(&url)
            .form(&[
                ("client_id", self.environment.auth_client_id.as_str()),
                ("scope", scope),
                ("audience", self.environment.auth_audience.as_str()),
            ])
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        if !(200..300).contains(&status) {
            return Err(oauth_error(status, &body));
        }
        let device: DeviceCodeResponse = serde_json::from_str(&body)
            .map_err(|e| CredentialError::MalformedResponse(e.to_string()))?;

        if device.verification_uri_complete.is_empty() {
            println!("Open {} and enter code: {}", device.verification_uri, device.user_code);
        } else {
            println!("Open {} to confirm the login", device.verification_uri_complete);
            println!("Your code is: {}", device.user_code);
        }

        let deadline = device.expires_in.min(DEVICE_FLOW_TIMEOUT_SECS);
        let mut interval = device.interval.max(1);
        let mut waited: u64 = 0;
        loop {
            if waited >= deadline {
                return Err(CredentialError::LoginTimeout);
            }
            tokio::time::sleep(Duration::from_secs(interval)).await;
            waited += interval;

            let url = self.tenant_url("oauth/token");
            let response = self
                .client
                .post(&url)
                .form(&[
                    (
                        "grant_type",
                        "urn:ietf:params:oauth:grant-type:device_code",
                    ),
                    ("device_code", device.device_code.as_str()),
                    ("client_id", self.environment.auth_client_id.as_str()),
                ])
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.text().await?;

            match parse_device_poll(status, &body)? {
                PollOutcome::Tokens(tokens) => {
                    let refresh_token = tokens.refresh_token.ok_or_else(|| {
                        CredentialError::MalformedResponse(
                            "login response carried no refresh token".to_string(),
                        )
                    })?;
                    let info = self
                        .fetch_userinfo(&tokens.access_token)
                        .await
                        .unwrap_or_default();
                    Session {
                        refresh_token,
                        user_name: info.name.clone(),
                    }
                    .save(&self.session_path)?;
                    return Ok(info);
                }
                PollOutcome::Pending => {}
                PollOutcome::SlowDown => interval += 5,
            }
        }
    }

    /// Revoke the refresh token (best effort) and clear the session.
    pub async fn logout(&self) -> Result<(), CredentialError> {
        *self.cached.lock().unwrap() = None;

        if let Ok(session) = Session::load_from_file(&self.session_path) {
            let url = self.tenant_url("oauth/revoke");
            let result = self
                .client
                .post(&url)
                .json(&serde_json::json!({
                    "client_id": self.environment.auth_client_id,
                    "token": session.refresh_token,
                }))
                .send()
                .await;
            match result {
                Ok(response) if !response.status().is_success() => {
                    warn!(
                        "Token revocation returned HTTP {}; clearing session anyway",
                        response.status()
                    );
                }
                Err(e) => warn!("Token revocation failed: {}; clearing session anyway", e),
                _ => {}
            }
        }

        Session::clear(&self.session_path)?;
        Ok(())
    }

    /// Identity of the logged-in user, fetched with a fresh access token.
    pub async fn userinfo(&self) -> Result<UserInfo, CredentialError> {
        let token = self.acquire_token(&self.default_token_request()).await?;
        self.fetch_userinfo(&token.token).await
    }

    async fn fetch_userinfo(&self, access_token: &str) -> Result<UserInfo, CredentialError> {
        let url = self.tenant_url("userinfo");
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(CredentialError::MalformedResponse(format!(
                "userinfo returned HTTP {}",
                response.status().as_u16()
            )));
        }
        let info = response
            .json::<UserInfo>()
            .await
            .map_err(|e| CredentialError::MalformedResponse(e.to_string()))?;
        Ok(info)
    }
}

#[async_trait]
impl CredentialProvider for OidcCredentialProvider {
    async fn acquire_token(&self, request: &TokenRequest) -> Result<AccessToken, CredentialError> {
        {
            let cached = self.cached.lock().unwrap();
            if let Some((cached_request, token)) = cached.as_ref() {
                if cached_request == request && token.is_fresh() {
                    return Ok(token.clone());
                }
            }
        }

        let session = Session::load_from_file(&self.session_path)
            .map_err(|_| CredentialError::NotAuthenticated)?;

        debug!("Refreshing access token for audience {}", request.audience);
        let url = self.tenant_url("oauth/token");
        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.environment.auth_client_id.as_str()),
                ("refresh_token", session.refresh_token.as_str()),
                ("audience", request.audience.as_str()),
                ("scope", request.scope.as_str()),
            ])
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        let tokens = parse_token_response(status, &body)?;

        // The provider may rotate refresh tokens; keep the stored one current.
        if let Some(new_refresh) = &tokens.refresh_token {
            if *new_refresh != session.refresh_token {
                Session {
                    refresh_token: new_refresh.clone(),
                    user_name: session.user_name.clone(),
                }
                .save(&self.session_path)?;
            }
        }

        let token = AccessToken {
            token: tokens.access_token,
            expires_at: Utc::now() + chrono::Duration::seconds(tokens.expires_in),
        };
        *self.cached.lock().unwrap() = Some((request.clone(), token.clone()));
        Ok(token)
    }
}

/// Interpret a token endpoint response for the refresh grant.
fn parse_token_response(status: u16, body: &str) -> Result<TokenResponse, CredentialError> {
    if (200..300).contains(&status) {
        return serde_json::from_str(body)
            .map_err(|e| CredentialError::MalformedResponse(e.to_string()));
    }
    Err(oauth_error(status, body))
}

/// Interpret one polling response from the device-flow token endpoint.
fn parse_device_poll(status: u16, body: &str) -> Result<PollOutcome, CredentialError> {
    if (200..300).contains(&status) {
        let tokens = serde_json::from_str(body)
            .map_err(|e| CredentialError::MalformedResponse(e.to_string()))?;
        return Ok(PollOutcome::Tokens(tokens));
    }
    match serde_json::from_str::<OAuthErrorBody>(body) {
        Ok(err) => match err.error.as_str() {
            "authorization_pending" => Ok(PollOutcome::Pending),
            "slow_down" => Ok(PollOutcome::SlowDown),
            "expired_token" => Err(CredentialError::LoginTimeout),
            _ => Err(CredentialError::Rejected {
                error: err.error,
                description: err.error_description,
            }),
        },
        Err(_) => Err(CredentialError::MalformedResponse(format!(
            "HTTP {}: {}",
            status, body
        ))),
    }
}

/// Map a non-2xx token endpoint body to a credential error. A rejected
/// refresh token means the session is gone, which callers treat as
/// "not logged in" rather than a distinct failure.
fn oauth_error(status: u16, body: &str) -> CredentialError {
    match serde_json::from_str::<OAuthErrorBody>(body) {
        Ok(err) if err.error == "invalid_grant" => CredentialError::NotAuthenticated,
        Ok(err) => CredentialError::Rejected {
            error: err.error,
            description: err.error_description,
        },
        Err(_) => {
            CredentialError::MalformedResponse(format!("HTTP {}: {}", status, body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::EnvironmentType;
    use tempfile::tempdir;

    #[test]
    fn test_parse_token_response_success() {
        let tokens = parse_token_response(
            200,
            r#"{"access_token": "at-123", "expires_in": 86400, "refresh_token": "rt-456"}"#,
        )
        .unwrap();
        assert_eq!(tokens.access_token, "at-123");
        assert_eq!(tokens.expires_in, 86400);
        assert_eq!(tokens.refresh_token.as_deref(), Some("rt-456"));
    }

    #[test]
    fn test_parse_token_response_without_rotation() {
        let tokens =
            parse_token_response(200, r#"{"access_token": "at", "expires_in": 600}"#).unwrap();
        assert!(tokens.refresh_token.is_none());
    }

    #[test]
    // A revoked or expired refresh token is an authentication failure, not a
    // transport problem.
    fn test_invalid_grant_maps_to_not_authenticated() {
        let result = parse_token_response(
            403,
            r#"{"error": "invalid_grant", "error_description": "Unknown or invalid refresh token."}"#,
        );
        assert!(matches!(result, Err(CredentialError::NotAuthenticated)));
    }

    #[test]
    fn test_other_oauth_errors_are_surfaced() {
        let result = parse_token_response(
            401,
            r#"{"error": "invalid_client", "error_description": "Client authentication failed"}"#,
        );
        match result {
            Err(CredentialError::Rejected { error, .. }) => assert_eq!(error, "invalid_client"),
            other => panic!("unexpected result: {:?}", other.err()),
        }
    }

    #[test]
    fn test_non_json_error_body_is_malformed() {
        let result = parse_token_response(502, "<html>Bad Gateway</html>");
        assert!(matches!(result, Err(CredentialError::MalformedResponse(_))));
    }

    #[test]
    fn test_device_poll_outcomes() {
        assert!(matches!(
            parse_device_poll(403, r#"{"error": "authorization_pending"}"#),
            Ok(PollOutcome::Pending)
        ));
        assert!(matches!(
            parse_device_poll(429, r#"{"error": "slow_down"}"#),
            Ok(PollOutcome::SlowDown)
        ));
        assert!(matches!(
            parse_device_poll(403, r#"{"error": "expired_token"}"#),
            Err(CredentialError::LoginTimeout)
        ));
        assert!(matches!(
            parse_device_poll(403, r#"{"error": "access_denied"}"#),
            Err(CredentialError::Rejected { .. })
        ));
        assert!(matches!(
            parse_device_poll(200, r#"{"access_token": "at", "expires_in": 600}"#),
            Ok(PollOutcome::Tokens(_))
        ));
    }

    #[tokio::test]
    // Without a persisted session the provider must fail before any network
    // call is attempted.
    async fn test_acquire_token_without_session_is_not_authenticated() {
        let dir = tempdir().unwrap();
        let provider = OidcCredentialProvider::new(
            Environment::new(EnvironmentType::Local),
            dir.path().join("session.json"),
        );
        let result = provider.acquire_token(&provider.default_token_request()).await;
        assert!(matches!(result, Err(CredentialError::NotAuthenticated)));
    }
}

#[cfg(test)]
/// These are ignored by default since they require a live identity provider tenant.
mod live_identity_tests {
    use super::*;
    use crate::environment::{Environment, EnvironmentType};

    #[tokio::test]
    #[ignore] // This test requires a configured tenant and an interactive browser.
    async fn test_device_flow_login() {
        let path = crate::auth::session::get_session_path().unwrap();
        let provider =
            OidcCredentialProvider::new(Environment::new(EnvironmentType::Staging), path);
        match provider.login(crate::consts::auth::LOGIN_SCOPE).await {
            Ok(info) => println!("Logged in as {} <{}>", info.name, info.email),
            Err(e) => panic!("Login failed: {}", e),
        }
    }
}
