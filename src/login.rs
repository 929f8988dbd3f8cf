//! Logging in to the analytics API and saving the session.

use crate::api::DashboardApi;
use crate::api::error::ApiError;
use crate::api::types::LoginPayload;
use crate::config::Config;
use crate::pretty::{
    handle_cmd_error, print_cmd_error, print_cmd_info, print_friendly_error_header,
};
use std::path::Path;

/// Exchanges email and password for a session and saves it to `config_path`.
pub async fn login(
    email: &str,
    password: &str,
    config_path: &Path,
    api: &dyn DashboardApi,
) -> Result<Config, Box<dyn std::error::Error>> {
    if email.trim().is_empty() || password.is_empty() {
        print_cmd_error!("❌ Email and password are required.");
        return Err(Box::from("Email and password are required."));
    }

    let payload = LoginPayload {
        initial_email: email.trim().to_string(),
        password: password.to_string(),
    };
    let response = match api.login(&payload).await {
        Ok(response) => response,
        Err(e) => {
            if matches!(e, ApiError::Http { status, .. } if status >= 500) {
                print_friendly_error_header();
            }
            if let Some(pretty_error) = e.to_pretty() {
                print_cmd_error!("Failed to log in.", "{}", pretty_error);
            } else {
                print_cmd_error!("Failed to log in.", "{}", e);
            }
            return Err(e.into());
        }
    };

    let config = Config::from(&response);
    config
        .save(config_path)
        .map_err(|e| handle_cmd_error!(e, "Failed to save config."))?;

    print_cmd_info!(
        "✅ Logged in.",
        "User: {} ({}), organization {}",
        config.user_name,
        config.email,
        config.organization_id
    );
    Ok(config)
}

/// Loads the saved session, pointing the user at `login` when there is none.
pub fn require_session(config_path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    if !config_path.exists() {
        print_cmd_error!("❌ Not logged in. Run: insights login --email <EMAIL> --password <PASSWORD>");
        return Err(Box::new(ApiError::NotLoggedIn));
    }
    Config::load_from_file(config_path)
        .map_err(|e| handle_cmd_error!(e, "Failed to load config, please log in again").into())
}
