use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backlog of each change feed channel (default: 100)
    pub event_channel_capacity: usize,
    /// Maximum size of event history for SSE replay (default: 1,000)
    pub event_history_max_size: usize,
    /// Seed demo dealers, users, deliveries and messages on startup (default: true)
    pub seed_demo_data: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `EVENT_CHANNEL_CAPACITY` - Change feed channel capacity (default: 100)
    /// - `EVENT_HISTORY_MAX_SIZE` - SSE event history size (default: 1,000)
    /// - `SEED_DEMO_DATA` - Seed demo data (default: true)
    pub fn from_env() -> Self {
        Self {
            event_channel_capacity: env::var("EVENT_CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            event_history_max_size: env::var("EVENT_HISTORY_MAX_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1_000),
            seed_demo_data: env::var("SEED_DEMO_DATA")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(true),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            event_channel_capacity: 100,
            event_history_max_size: 1_000,
            seed_demo_data: true,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag(" ON "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("no"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();

        assert_eq!(config.event_channel_capacity, 100);
        assert_eq!(config.event_history_max_size, 1_000);
        assert!(config.seed_demo_data);
    }
}
