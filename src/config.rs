use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};

const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost",
    "http://localhost:3000",
    "http://127.0.0.1",
    "http://127.0.0.1:3000",
];

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database URL
    pub database_url: String,

    /// Address the HTTP server listens on
    pub bind_addr: SocketAddr,

    /// Origins allowed to call the API from a browser
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:data/calebet.db".to_string()),

            bind_addr: env::var("BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
                .parse()
                .context("BIND_ADDR must be a valid socket address")?,

            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| parse_origins(&origins))
                .unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect()),
        })
    }
}

/// Split a comma-separated origin list, dropping blanks
fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" http://a.com , ,http://b.com:3000"),
            vec!["http://a.com".to_string(), "http://b.com:3000".to_string()]
        );
        assert!(parse_origins("").is_empty());
    }
}
