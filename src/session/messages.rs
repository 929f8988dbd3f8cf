//! Unified messaging system for session operations

// ANSI Color Codes for session messages
pub const COLOR_INFO: &str = "\x1b[1;36m"; // Bold Cyan
pub const COLOR_SUCCESS: &str = "\x1b[1;32m"; // Bold Green
pub const COLOR_RESET: &str = "\x1b[0m";

/// Session-specific message types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMessage {
    Info(String),
    Success(String),
}

impl SessionMessage {
    pub fn info(msg: impl Into<String>) -> Self {
        Self::Info(msg.into())
    }

    pub fn success(msg: impl Into<String>) -> Self {
        Self::Success(msg.into())
    }

    pub fn print(&self) {
        println!("{}", self.formatted());
    }

    fn formatted(&self) -> String {
        match self {
            Self::Info(msg) => format!("{}[INFO]{} {}", COLOR_INFO, COLOR_RESET, msg),
            Self::Success(msg) => format!("{}[SUCCESS]{} {}", COLOR_SUCCESS, COLOR_RESET, msg),
        }
    }
}

pub fn print_session_starting(user_name: &str, organization_id: u64) {
    let who = if user_name.is_empty() {
        "unknown user".to_string()
    } else {
        user_name.to_string()
    };
    SessionMessage::info(format!(
        "Opening board browser for {} (organization {})",
        who, organization_id
    ))
    .print();
}

pub fn print_session_exit_success() {
    SessionMessage::success("Insights browser closed").print();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_tagged() {
        let msg = SessionMessage::success("done").formatted();
        assert!(msg.contains("[SUCCESS]"));
        assert!(msg.ends_with("done"));
    }
}
