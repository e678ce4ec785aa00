use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub cors_allowed_origins: Option<String>,
    pub band_code_prefix: String,
    pub stats_utc_offset_minutes: i32,
    pub scan_channel_capacity: usize,
    pub log_request_body: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL")?,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS").ok(),
            band_code_prefix: env::var("BAND_CODE_PREFIX").unwrap_or_else(|_| "NKM".to_string()),
            stats_utc_offset_minutes: env::var("STATS_UTC_OFFSET_MINUTES")
                .unwrap_or_else(|_| "0".to_string())
                .parse()?,
            scan_channel_capacity: env::var("SCAN_CHANNEL_CAPACITY")
                .unwrap_or_else(|_| "64".to_string())
                .parse()?,
            log_request_body: env::var("LOG_REQUEST_BODY")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub fn test_config(database_url: &str) -> Config {
        Config {
            server_port: 0,
            database_url: database_url.to_string(),
            cors_allowed_origins: None,
            band_code_prefix: "NKM".to_string(),
            stats_utc_offset_minutes: 0,
            scan_channel_capacity: 64,
            log_request_body: false,
        }
    }

    #[test]
    fn band_code_prefix_defaults_to_nkm() {
        let config = test_config("postgres://localhost/test");
        assert_eq!(config.band_code_prefix, "NKM");
        assert_eq!(config.stats_utc_offset_minutes, 0);
    }
}
