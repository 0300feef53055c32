use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub database_url: String,

    // Cross-origin access for the presentation layer
    pub cors_origins: Vec<String>,
    pub public_base_url: Option<String>,

    pub log_dir: String,
    pub log_level: tracing::Level,

    // Rate limiting on write routes, 0 disables it
    pub rate_limit_per_min: u32,

    pub seed_sample_data: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://hrms.db".to_string()),

            cors_origins: parse_origins(
                &env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()),
            ),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .ok()
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: parse_var("LOG_LEVEL", "info")?,

            rate_limit_per_min: parse_var("RATE_LIMIT_PER_MIN", "100")?,

            seed_sample_data: parse_var("SEED_SAMPLE_DATA", "false")?,
        })
    }

    /// True when any origin may call the API.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse_var<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse()
        .with_context(|| format!("{key} has an invalid value: {raw:?}"))
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
