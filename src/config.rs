use std::time::Duration;

use crate::battle::constants::net;

/// Arena client configuration
#[derive(Debug, Clone)]
pub struct ArenaConfig {
    /// Base URL of the backend API, e.g. http://127.0.0.1:8000/api
    pub api_base_url: String,
    /// Bearer token for authenticated endpoints
    pub auth_token: Option<String>,
    /// Seconds between resolution status polls
    pub poll_interval_secs: u64,
    /// Let the built-in pilot activate ready skills during local combat
    pub auto_cast: bool,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000/api".to_string(),
            auth_token: None,
            poll_interval_secs: net::POLL_INTERVAL_SECS,
            auto_cast: true,
        }
    }
}

impl ArenaConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("WB_API_URL") {
            if url.is_empty() {
                tracing::warn!("Empty WB_API_URL, using default");
            } else {
                config.api_base_url = url;
            }
        }

        if let Ok(token) = std::env::var("WB_AUTH_TOKEN") {
            if !token.is_empty() {
                config.auth_token = Some(token);
            }
        }

        if let Ok(interval) = std::env::var("WB_POLL_INTERVAL_SECS") {
            if let Ok(parsed) = interval.parse::<u64>() {
                if parsed > 0 {
                    config.poll_interval_secs = parsed;
                } else {
                    tracing::warn!("WB_POLL_INTERVAL_SECS must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid WB_POLL_INTERVAL_SECS '{}', using default", interval);
            }
        }

        if let Ok(auto_cast) = std::env::var("WB_AUTO_CAST") {
            match auto_cast.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => config.auto_cast = true,
                "0" | "false" | "no" => config.auto_cast = false,
                other => tracing::warn!("Invalid WB_AUTO_CAST '{}', using default", other),
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if self.api_base_url.is_empty() {
            return Err("api_base_url cannot be empty".to_string());
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err("api_base_url must be an http(s) URL".to_string());
        }
        if self.poll_interval_secs == 0 {
            return Err("poll_interval_secs must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
