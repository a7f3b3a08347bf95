use std::env;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the job service REST API
    /// Format: http(s)://HOST:PORT/api
    pub api_base_url: String,

    /// Directory for rolling log files
    pub log_dir: String,
}

/// Default API base when nothing is configured; matches the service's
/// development setup.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

impl Config {
    /// Load configuration from environment variables
    ///
    /// Optional environment variables:
    /// - API_BASE_URL: job service base URL (default: http://localhost:8000/api)
    /// - LOG_DIR: log file directory (default: logs)
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let api_base_url = env::var("API_BASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let log_dir = env::var("LOG_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "logs".to_string());

        Ok(Config {
            api_base_url,
            log_dir,
        })
    }
}
