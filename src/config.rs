use anyhow::{bail, Context, Result};
use std::time::Duration;

pub const DEFAULT_STORE_URL: &str = "redis://localhost/5";
pub const DEFAULT_VALIDATION_URL: &str = "https://wasipaid.com/receipt";

#[derive(Debug, Clone)]
pub struct Config {
    pub debug: bool,
    pub host: String,
    pub port: u16,

    // Record store
    pub store_url: String,

    // Callback validation
    pub validation_url: String,
    pub validation_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            host: "0.0.0.0".to_string(),
            port: 8080,
            store_url: DEFAULT_STORE_URL.to_string(),
            validation_url: DEFAULT_VALIDATION_URL.to_string(),
            validation_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            debug: std::env::var("DEBUG").map(|v| v == "1").unwrap_or(false),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT")?,

            store_url: std::env::var("REDIS_URL")
                .or_else(|_| std::env::var("REDISTOGO_URL"))
                .unwrap_or_else(|_| DEFAULT_STORE_URL.to_string()),

            validation_url: std::env::var("VALIDATION_URL")
                .unwrap_or_else(|_| DEFAULT_VALIDATION_URL.to_string()),
            validation_timeout: Duration::from_secs(
                std::env::var("VALIDATION_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .context("Invalid VALIDATION_TIMEOUT_SECS")?,
            ),
        };

        config.validate()?;
        Ok(config)
    }

    /// Default tracing filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }

    pub fn uses_memory_store(&self) -> bool {
        self.store_url.starts_with("memory://")
    }

    pub fn validate(&self) -> Result<()> {
        if !self.validation_url.starts_with("http") {
            bail!("VALIDATION_URL must be HTTP(S) URL");
        }

        if self.validation_timeout.is_zero() {
            bail!("VALIDATION_TIMEOUT_SECS must be greater than zero");
        }

        let known_scheme = ["redis://", "rediss://", "unix://", "memory://"]
            .iter()
            .any(|scheme| self.store_url.starts_with(scheme));
        if !known_scheme {
            bail!("Unsupported store URL: {}", self.store_url);
        }

        tracing::info!(debug = self.debug, "Configuration validated");

        Ok(())
    }
}
