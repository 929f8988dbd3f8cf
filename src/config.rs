//! Saved session configuration.

use crate::api::types::LoginResponse;
use crate::consts::cli_consts::paths;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::{fs, path::Path};

/// Who is logged in, and the tokens that prove it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub user_id: u64,
    pub organization_id: u64,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub email: String,
    /// Sent as `Authorization: Bearer ...`.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Sent as `x-access-token`.
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl Config {
    #[cfg(test)]
    pub fn new(user_id: u64, organization_id: u64) -> Self {
        Config {
            user_id,
            organization_id,
            user_name: String::new(),
            email: String::new(),
            auth_token: None,
            access_token: None,
            refresh_token: None,
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

    /// Removes the saved session. A missing file is not an error.
    pub fn clear(path: &Path) -> Result<(), std::io::Error> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// The token sent as `x-access-token`. At login the response's top-level
    /// token wins over the user's own.
    pub fn effective_access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

impl From<&LoginResponse> for Config {
    fn from(response: &LoginResponse) -> Self {
        Config {
            user_id: response.user.id,
            organization_id: response.user.organization.id,
            user_name: response.user.user_name.clone(),
            email: response.user.email.clone(),
            auth_token: response.user.auth_token.clone(),
            access_token: response
                .access_token
                .clone()
                .or_else(|| response.user.access_token.clone()),
            refresh_token: response.refresh_token.clone(),
        }
    }
}

fn config_dir() -> Result<PathBuf, std::io::Error> {
    let home = home::home_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine the home directory",
        )
    })?;
    Ok(home.join(paths::CONFIG_DIR))
}

/// Path of the saved session, `~/.insights/config.json`.
pub fn get_config_path() -> Result<PathBuf, std::io::Error> {
    Ok(config_dir()?.join(paths::CONFIG_FILE))
}

/// Path of the preference store, `~/.insights/preferences.json`.
pub fn get_preferences_path() -> Result<PathBuf, std::io::Error> {
    Ok(config_dir()?.join(paths::PREFERENCES_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{Organization, User};
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn login_response() -> LoginResponse {
        LoginResponse {
            user: User {
                id: 4459,
                user_name: "dana".to_string(),
                email: "dana@example.com".to_string(),
                organization: Organization {
                    id: 1960,
                    org_name: "Acme".to_string(),
                },
                auth_token: Some("auth-123".to_string()),
                access_token: Some("user-access".to_string()),
            },
            access_token: None,
            refresh_token: Some("refresh".to_string()),
            application_access: Some(true),
            is_new_user: None,
        }
    }

    #[test]
    // Loading a saved configuration file should return the same configuration.
    fn test_load_recovers_saved_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = Config::from(&login_response());
        config.save(&path).unwrap();

        let loaded_config = Config::load_from_file(&path).unwrap();
        assert_eq!(config, loaded_config);
    }

    #[test]
    // Saving a configuration should create directories if they don't exist.
    fn test_save_creates_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nonexistent_dir").join("config.json");

        let config = Config::new(1, 2);
        let result = config.save(&path);

        assert!(result.is_ok(), "Failed to save config");
        assert!(
            path.parent().unwrap().exists(),
            "Parent directory does not exist"
        );
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
    // Clearing removes the file and tolerates a file that is already gone.
    fn test_clear_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        Config::new(1, 2).save(&path).unwrap();

        Config::clear(&path).unwrap();
        assert!(!path.exists());
        Config::clear(&path).unwrap();
    }

    #[test]
    // The user's access token is used when the response has no top-level one.
    fn test_access_token_falls_back_to_user() {
        let config = Config::from(&login_response());
        assert_eq!(config.user_id, 4459);
        assert_eq!(config.organization_id, 1960);
        assert_eq!(config.auth_token.as_deref(), Some("auth-123"));
        assert_eq!(config.effective_access_token(), Some("user-access"));
    }
}
