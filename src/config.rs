//! Application configuration
//!
//! Environment-driven with hard fallbacks so the client runs unconfigured
//! on a fresh device.

use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// REST backend base URL
    pub api_base_url: String,
    /// App-private data directory (local database + stored images)
    pub data_dir: PathBuf,
    /// Per-request timeout at the API client boundary
    pub request_timeout: Duration,
    /// Connection timeout at the API client boundary
    pub connect_timeout: Duration,
    /// Maximum photo references per incident
    pub max_photos_per_incident: usize,
    /// Age after which orphaned stored images are swept
    pub image_retention_days: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: std::env::var("VIGIE_API_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api".to_string()),
            data_dir: std::env::var("VIGIE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".vigie")),
            request_timeout: Duration::from_secs(
                std::env::var("VIGIE_REQUEST_TIMEOUT_SEC")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
            connect_timeout: Duration::from_secs(10),
            max_photos_per_incident: 6,
            image_retention_days: 7,
        }
    }
}

impl AppConfig {
    /// Load configuration, reading `.env` first if present
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::default()
    }

    /// SQLite URL for the local store
    ///
    /// `mode=rwc` creates the database file on first launch.
    pub fn database_url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.db_path().display())
    }

    /// Path of the local database file
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("vigie.db")
    }

    /// Directory holding processed incident photos
    pub fn images_dir(&self) -> PathBuf {
        self.data_dir.join("images")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_format() {
        let config = AppConfig {
            data_dir: PathBuf::from("/tmp/vigie-test"),
            ..AppConfig::default()
        };
        assert!(config.database_url().starts_with("sqlite:///tmp/vigie-test"));
        assert!(config.database_url().ends_with("mode=rwc"));
    }

    #[test]
    fn test_images_dir_under_data_dir() {
        let config = AppConfig::default();
        assert!(config.images_dir().starts_with(&config.data_dir));
    }
}
