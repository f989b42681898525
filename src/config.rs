use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum StoreBackend {
    Mysql,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub api_prefix: String,

    /// Monthly working days used when a request does not give its own.
    pub default_working_days: u32,
    pub settings_cache_ttl_secs: u64,
    pub log_dir: String,

    // Rate limiting
    pub rate_auth_per_min: u32,
    pub rate_upload_per_min: u32,
    pub rate_api_per_min: u32,

    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

fn var_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key} has an invalid value `{raw}`: {e}")),
        Err(_) => Ok(default),
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let store_backend = var_or("STORE_BACKEND", StoreBackend::Mysql)?;
        let database_url = optional("DATABASE_URL");
        if store_backend == StoreBackend::Mysql && database_url.is_none() {
            return Err(anyhow!("DATABASE_URL must be set when STORE_BACKEND is mysql"));
        }

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").context("SERVER_ADDR must be set")?,
            store_backend,
            database_url,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            default_working_days: var_or("DEFAULT_WORKING_DAYS", 26)?,
            settings_cache_ttl_secs: var_or("SETTINGS_CACHE_TTL_SECS", 300)?,
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),

            rate_auth_per_min: var_or("RATE_AUTH_PER_MIN", 60)?,
            rate_upload_per_min: var_or("RATE_UPLOAD_PER_MIN", 30)?,
            rate_api_per_min: var_or("RATE_API_PER_MIN", 1000)?,

            admin_username: optional("ADMIN_USERNAME"),
            admin_password: optional("ADMIN_PASSWORD"),
        })
    }

    /// In-memory configuration with default limits, for tests and local runs.
    pub fn in_memory() -> Self {
        Self {
            server_addr: "127.0.0.1:8080".to_string(),
            store_backend: StoreBackend::Memory,
            database_url: None,
            api_prefix: "/api".to_string(),
            default_working_days: 26,
            settings_cache_ttl_secs: 300,
            log_dir: "logs".to_string(),
            rate_auth_per_min: 60,
            rate_upload_per_min: 30,
            rate_api_per_min: 1000,
            admin_username: None,
            admin_password: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_parse_case_sensitively() {
        assert_eq!(StoreBackend::from_str("memory").unwrap(), StoreBackend::Memory);
        assert_eq!(StoreBackend::from_str("mysql").unwrap(), StoreBackend::Mysql);
        assert!(StoreBackend::from_str("postgres").is_err());
    }

    #[test]
    fn in_memory_defaults() {
        let config = Config::in_memory();
        assert_eq!(config.default_working_days, 26);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.api_prefix, "/api");
    }
}
