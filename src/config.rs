//! Application configuration.

use crate::environment::Environment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::{fs, path::Path};

/// Get the path to the InterviewLens config file. A `lens.config` in the
/// current directory takes precedence over `~/.interviewlens/config.json`.
pub fn get_config_path() -> Result<PathBuf, std::io::Error> {
    let local_config_path = std::env::current_dir()?.join("lens.config");
    if local_config_path.exists() {
        return Ok(local_config_path);
    }

    let home_path = home::home_dir().ok_or(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        "Home directory not found",
    ))?;
    let config_path = home_path.join(".interviewlens").join("config.json");
    Ok(config_path)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Environment name ("local", "staging", "production"). Empty means the
    /// default environment.
    #[serde(default)]
    pub environment: String,

    /// Override for the prediction service base URL. Empty means the
    /// environment default.
    #[serde(default)]
    pub api_base_url: String,

    /// Override for the identity provider domain.
    #[serde(default)]
    pub auth_domain: String,

    /// Override for the identity provider client ID.
    #[serde(default)]
    pub auth_client_id: String,

    /// Override for the API audience requested with each token.
    #[serde(default)]
    pub auth_audience: String,
}

impl Config {
    /// Create a Config for the given environment with no overrides.
    pub fn new(environment: Environment) -> Self {
        Config {
            environment: environment.to_string().to_lowercase(),
            api_base_url: String::new(),
            auth_domain: String::new(),
            auth_client_id: String::new(),
            auth_audience: String::new(),
        }
    }

    /// Loads configuration from a JSON file at the given path.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if reading from file fails or JSON is invalid.
    pub fn load_from_file(path: &Path) -> Result<Self, std::io::Error> {
        let buf = fs::read(path)?;
        let config: Config = serde_json::from_slice(&buf)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }

    /// Saves the configuration to a JSON file at the given path.
    ///
    /// Directories will be created if they don't exist. This method overwrites existing files.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if writing to file fails or serialization fails.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Apply non-empty overrides from this config onto an environment.
    pub fn apply_overrides(&self, environment: &mut Environment) {
        if !self.api_base_url.is_empty() {
            environment.api_base_url = self.api_base_url.clone();
        }
        if !self.auth_domain.is_empty() {
            environment.auth_domain = self.auth_domain.clone();
        }
        if !self.auth_client_id.is_empty() {
            environment.auth_client_id = self.auth_client_id.clone();
        }
        if !self.auth_audience.is_empty() {
            environment.auth_audience = self.auth_audience.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::EnvironmentType;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    /// Helper function to create a test configuration.
    fn get_config() -> Config {
        Config {
            environment: "staging".to_string(),
            api_base_url: "http://127.0.0.1:9000".to_string(),
            auth_domain: "tenant.example.auth0.com".to_string(),
            auth_client_id: "test-client".to_string(),
            auth_audience: "http://127.0.0.1:9000/api".to_string(),
        }
    }

    #[test]
    // Loading a saved configuration file should return the same configuration.
    fn test_load_recovers_saved_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = get_config();
        config.save(&path).unwrap();

        let loaded_config = Config::load_from_file(&path).unwrap();
        assert_eq!(config, loaded_config);
    }

    #[test]
    // Saving a configuration should create directories if they don't exist.
    fn test_save_creates_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nonexistent_dir").join("config.json");
        let config = get_config();
        let result = config.save(&path);

        assert!(result.is_ok(), "Failed to save config");
        assert!(
            path.parent().unwrap().exists(),
            "Parent directory does not exist"
        );
    }

    #[test]
    // Saving a configuration should overwrite an existing file.
    fn test_save_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config1 = get_config();
        config1.auth_client_id = "first-client".to_string();
        config1.save(&path).unwrap();

        let mut config2 = get_config();
        config2.auth_client_id = "second-client".to_string();
        config2.save(&path).unwrap();

        let loaded_config = Config::load_from_file(&path).unwrap();
        assert_eq!(config2, loaded_config);
    }

    #[test]
    // Loading an invalid JSON file should return an error.
    fn test_load_rejects_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid_config.json");

        let mut file = File::create(&path).unwrap();
        writeln!(file, "invalid json").unwrap();

        let result = Config::load_from_file(&path);
        assert!(result.is_err());
    }

    #[test]
    // Should load JSON containing only an environment name.
    fn test_load_config_with_only_environment() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut file = File::create(&path).unwrap();
        writeln!(file, r#"{{ "environment": "local" }}"#).unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.environment, "local");
        assert!(config.api_base_url.is_empty());
        assert!(config.auth_domain.is_empty());
        assert!(config.auth_client_id.is_empty());
        assert!(config.auth_audience.is_empty());
    }

    #[test]
    // Should ignore unexpected fields in the JSON.
    fn test_load_config_with_additional_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut file = File::create(&path).unwrap();
        writeln!(
            file,
            r#"{{ "environment": "production", "extra_field": "value" }}"#
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.environment, "production");
        assert!(config.api_base_url.is_empty());
    }

    #[test]
    // Empty override fields must leave the environment untouched; non-empty
    // fields must replace the environment defaults.
    fn test_apply_overrides() {
        let mut environment = Environment::new(EnvironmentType::Production);
        let defaults = environment.clone();

        let mut config = Config::new(environment.clone());
        config.apply_overrides(&mut environment);
        assert_eq!(environment.api_base_url, defaults.api_base_url);
        assert_eq!(environment.auth_domain, defaults.auth_domain);

        config.api_base_url = "http://127.0.0.1:9000".to_string();
        config.auth_audience = "http://127.0.0.1:9000/api".to_string();
        config.apply_overrides(&mut environment);
        assert_eq!(environment.api_base_url, "http://127.0.0.1:9000");
        assert_eq!(environment.auth_audience, "http://127.0.0.1:9000/api");
        assert_eq!(environment.auth_domain, defaults.auth_domain);
    }
}
