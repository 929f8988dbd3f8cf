//! Dashboard utility functions
//!
//! Contains helper functions used across dashboard components

use crate::events::Source;
use ratatui::prelude::Color;

/// Get a ratatui color for an event based on where it came from
pub fn get_source_color(source: &Source) -> Color {
    match source {
        Source::Catalog => Color::Cyan,
        Source::Charts => Color::Yellow,
        Source::Favorites => Color::Green,
    }
}

/// Format compact timestamp with date and time from full timestamp
pub fn format_compact_timestamp(timestamp: &str) -> String {
    // "YYYY-MM-DD HH:MM:SS" -> "MM-DD HH:MM"
    let mut parts = timestamp.split(' ');
    if let (Some(date_part), Some(time_part)) = (parts.next(), parts.next()) {
        if let (Some(month_day), Some(hour_min)) = (date_part.get(5..10), time_part.get(0..5)) {
            return format!("{} {}", month_day, hour_min);
        }
    }
    timestamp.to_string()
}

/// Clean HTTP error messages
pub fn clean_http_error_message(msg: &str) -> String {
    if msg.contains("ConnectTimeout") || msg.contains("connect timeout") {
        return "Connection timeout - press r to retry".to_string();
    }
    if msg.contains("TimedOut") || msg.contains("operation timed out") {
        return "Request timed out - press r to retry".to_string();
    }
    if msg.contains("reqwest::Error") || msg.contains("error sending request") {
        return "Network error - press r to retry".to_string();
    }
    msg.to_string()
}

/// Shortens `text` to `width` characters, ending in "..." when cut.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_timestamp_keeps_month_day_and_minutes() {
        assert_eq!(format_compact_timestamp("2024-05-20 14:03:59"), "05-20 14:03");
        assert_eq!(format_compact_timestamp("garbage"), "garbage");
    }

    #[test]
    fn network_errors_are_shortened() {
        assert_eq!(
            clean_http_error_message("Reqwest error: error sending request for url"),
            "Network error - press r to retry"
        );
        assert_eq!(clean_http_error_message("HTTP 500"), "HTTP 500");
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("Engineering", 20), "Engineering");
        assert_eq!(truncate("Engineering Metrics", 10), "Enginee...");
    }
}
