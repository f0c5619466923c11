//! Persisted login session for the InterviewLens client.
//!
//! Holds the refresh token issued at login so later runs can acquire access
//! tokens silently.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the session storage path, creating the parent directory if needed.
pub fn get_session_path() -> Result<PathBuf, std::io::Error> {
    let home_path = home::home_dir().ok_or(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        "Home directory not found",
    ))?;
    let session_path = home_path.join(".interviewlens").join("session.json");

    if let Some(parent) = session_path.parent() {
        fs::create_dir_all(parent)?;
    }

    Ok(session_path)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Refresh token issued by the identity provider at login.
    pub refresh_token: String,

    /// Display name of the logged-in user, cached for offline display.
    #[serde(default)]
    pub user_name: String,
}

impl Session {
    /// Loads the session from a JSON file at the given path.
    pub fn load_from_file(path: &Path) -> Result<Self, std::io::Error> {
        let buf = fs::read(path)?;
        let session: Session = serde_json::from_slice(&buf)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(session)
    }

    /// Saves the session to a JSON file at the given path.
    ///
    /// The file is restricted to owner read/write; it holds a long-lived
    /// credential.
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

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            fs::set_permissions(path, permissions)?;
        }

        Ok(())
    }

    /// Remove the persisted session. Missing file is not an error.
    pub fn clear(path: &Path) -> Result<(), std::io::Error> {
        if !path.exists() {
            return Ok(());
        }
        fs::remove_file(path)
    }
}
