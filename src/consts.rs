pub mod http {
    /// Upper bound on a single prediction request. The service renders the
    /// plan synchronously, so generation time dominates the round trip.
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
}

pub mod auth {
    /// Tokens within this many seconds of expiry are treated as expired and
    /// re-acquired before use.
    pub const TOKEN_EXPIRY_LEEWAY_SECS: i64 = 30;

    /// Fallback polling interval for the device login flow when the identity
    /// provider does not suggest one.
    pub const DEVICE_POLL_INTERVAL_SECS: u64 = 5;

    /// Give up on a device login that has not been confirmed after this long.
    pub const DEVICE_FLOW_TIMEOUT_SECS: u64 = 300;

    /// Scope requested for prediction submissions.
    pub const SUBMISSION_SCOPE: &str = "openid profile email";

    /// Scope requested at login. Includes offline_access so the identity
    /// provider issues a refresh token for silent re-acquisition.
    pub const LOGIN_SCOPE: &str = "openid profile email offline_access";
}
