//! Error handling for the prediction service client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Reqwest error, typically related to network issues or request failures.
    /// Timeouts surface here as well.
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("HTTP error with status {status}")]
    Http {
        status: u16,
        /// Human-readable `detail` field from the response body, if present.
        detail: Option<String>,
        /// Raw response body, kept for diagnostics only.
        body: String,
    },

    /// A 2xx response whose payload did not match the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ServiceError {
    pub async fn from_response(response: reqwest::Response) -> ServiceError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read response text".to_string());
        let detail = extract_detail(&body);

        ServiceError::Http {
            status,
            detail,
            body,
        }
    }
}

/// Pull the human-readable `detail` field out of an error body, if any.
///
/// The service usually returns `{"detail": "..."}`, but field-validation
/// failures carry a nested object; those are compacted to a JSON string so
/// the user still sees which field was rejected.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => serde_json::to_string(other).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_detail_string() {
        assert_eq!(
            extract_detail(r#"{"detail": "email invalid"}"#),
            Some("email invalid".to_string())
        );
    }

    #[test]
    fn test_extract_detail_nested_object_is_compacted() {
        let detail =
            extract_detail(r#"{"detail": {"interviewee": {"email": ["Enter a valid email."]}}}"#)
                .unwrap();
        assert!(detail.contains("valid email"));
    }

    #[test]
    fn test_extract_detail_absent_or_unparseable() {
        assert_eq!(extract_detail(r#"{"error": "nope"}"#), None);
        assert_eq!(extract_detail("<html>Bad Gateway</html>"), None);
        assert_eq!(extract_detail(""), None);
        assert_eq!(extract_detail(r#"{"detail": null}"#), None);
    }
}
