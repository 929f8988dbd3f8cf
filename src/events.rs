//! Event System
//!
//! Activity log entries produced by background fetches and shown in the browser.

use crate::logging::{LogLevel, should_log_with_env};
use chrono::Local;
use std::fmt::Display;

/// Where an event came from.
#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum Source {
    /// Template and board list fetches.
    Catalog,
    /// Metric graph and drill-down fetches.
    Charts,
    /// Favorite toggles and their server mirror.
    Favorites,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum EventType {
    Success,
    Error,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub source: Source,
    pub msg: String,
    pub timestamp: String,
    pub event_type: EventType,
    pub log_level: LogLevel,
}

impl Event {
    pub fn new(source: Source, msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self {
            source,
            msg,
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            event_type,
            log_level,
        }
    }

    pub fn catalog_with_level(msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self::new(Source::Catalog, msg, event_type, log_level)
    }

    pub fn charts_with_level(msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self::new(Source::Charts, msg, event_type, log_level)
    }

    pub fn favorites_with_level(msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self::new(Source::Favorites, msg, event_type, log_level)
    }

    pub fn should_display(&self) -> bool {
        // Always show success events and info level events
        if self.event_type == EventType::Success || self.log_level >= LogLevel::Info {
            return true;
        }
        should_log_with_env(self.log_level)
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] {}", self.event_type, self.timestamp, self.msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_at_info_or_above_are_shown() {
        let event = Event::favorites_with_level(
            "Failed to sync favorites".to_string(),
            EventType::Error,
            LogLevel::Error,
        );
        assert!(event.should_display());
        assert_eq!(event.source, Source::Favorites);
    }

    #[test]
    fn success_is_always_shown() {
        let event =
            Event::catalog_with_level("Loaded".to_string(), EventType::Success, LogLevel::Trace);
        assert!(event.should_display());
        assert!(event.to_string().starts_with("Success ["));
    }
}
