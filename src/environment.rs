use clap::ValueEnum;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

#[derive(Clone, Default, Copy, PartialEq, Eq, ValueEnum, Debug)]
pub enum EnvironmentType {
    /// Local development environment.
    Local,
    /// Staging environment for pre-production testing.
    Staging,
    /// Production environment.
    #[default]
    Production,
}

/// Per-environment endpoints: the prediction service base URL and the
/// identity-provider settings used to obtain access tokens for it.
#[derive(Clone, Debug)]
pub struct Environment {
    pub env_type: EnvironmentType,
    pub api_base_url: String,
    pub auth_domain: String,
    pub auth_client_id: String,
    pub auth_audience: String,
}

impl Environment {
    /// Create the environment for the given deployment tier.
    pub fn new(env_type: EnvironmentType) -> Self {
        match env_type {
            EnvironmentType::Local => Self {
                env_type,
                api_base_url: "http://localhost:8000".to_string(),
                auth_domain: "dev-interviewlens.us.auth0.com".to_string(),
                auth_client_id: "lens-cli-local".to_string(),
                auth_audience: "http://localhost:8000/api".to_string(),
            },
            EnvironmentType::Staging => Self {
                env_type,
                api_base_url: "https://staging-api.interviewlens.app".to_string(),
                auth_domain: "staging-interviewlens.us.auth0.com".to_string(),
                auth_client_id: "lens-cli-staging".to_string(),
                auth_audience: "https://staging-api.interviewlens.app/api".to_string(),
            },
            EnvironmentType::Production => Self {
                env_type,
                api_base_url: "https://api.interviewlens.app".to_string(),
                auth_domain: "interviewlens.us.auth0.com".to_string(),
                auth_client_id: "lens-cli".to_string(),
                auth_audience: "https://api.interviewlens.app/api".to_string(),
            },
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new(EnvironmentType::default())
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<EnvironmentType>().map(Environment::new)
    }
}

impl FromStr for EnvironmentType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(EnvironmentType::Local),
            "staging" => Ok(EnvironmentType::Staging),
            "production" => Ok(EnvironmentType::Production),
            _ => Err(()),
        }
    }
}

impl Display for EnvironmentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvironmentType::Local => write!(f, "Local"),
            EnvironmentType::Staging => write!(f, "Staging"),
            EnvironmentType::Production => write!(f, "Production"),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.env_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parses_case_insensitively() {
        let env: Environment = "STAGING".parse().unwrap();
        assert_eq!(env.env_type, EnvironmentType::Staging);
        assert!("nonsense".parse::<Environment>().is_err());
    }

    #[test]
    fn test_default_environment_is_production() {
        let env = Environment::default();
        assert_eq!(env.env_type, EnvironmentType::Production);
        assert!(env.api_base_url.starts_with("https://"));
    }
}
