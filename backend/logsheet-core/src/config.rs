// src/config.rs
use serde::Deserialize;
use std::time::Duration;

use crate::ess_client::DEFAULT_TIMEOUT_SECS;
use crate::timesheet::{MonthNameCase, SheetOptions};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // ESS upstream
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    // Server Configuration
    #[serde(default = "default_server_host")]
    pub server_host: String,
    #[serde(default = "default_server_port")]
    pub server_port: u16,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,

    // Credentials for the one-shot `export` command
    pub username_ess: Option<String>,
    pub password_ess: Option<String>,

    // Sheet layout
    #[serde(default)]
    pub month_name_case: MonthNameCase,
    #[serde(default)]
    pub sheet_plain: bool,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    3000
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        envy::from_env::<Config>()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// TLS paths, only when both are configured.
    pub fn tls_paths(&self) -> Option<(&str, &str)> {
        match (&self.cert_path, &self.key_path) {
            (Some(cert), Some(key)) => Some((cert.as_str(), key.as_str())),
            _ => None,
        }
    }

    pub fn sheet_options(&self) -> SheetOptions {
        SheetOptions {
            month_case: self.month_name_case,
            styled: !self.sheet_plain,
            ..SheetOptions::default()
        }
    }
}
