use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents the API deployments the CLI can talk to.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Environment {
    /// The hosted analytics API.
    #[default]
    Production,
    /// A development server on this machine.
    Local,
    /// Any other deployment, addressed by its base URL.
    Custom { url: String },
}

impl Environment {
    /// Returns the API base URL associated with the environment.
    pub fn api_url(&self) -> String {
        match self {
            Environment::Production => "https://app.insightlyanalytics.ai/hivelapi".to_string(),
            Environment::Local => "http://localhost:8080/hivelapi".to_string(),
            Environment::Custom { url } => url.trim_end_matches('/').to_string(),
        }
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "local" => Ok(Environment::Local),
            lower if lower.starts_with("http://") || lower.starts_with("https://") => {
                Ok(Environment::Custom {
                    url: trimmed.to_string(),
                })
            }
            _ => Err(()),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Production => write!(f, "Production"),
            Environment::Local => write!(f, "Local"),
            Environment::Custom { url } => write!(f, "Custom({})", url),
        }
    }
}

impl Debug for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Environment::{}, URL: {}", self, self.api_url())
    }
}
