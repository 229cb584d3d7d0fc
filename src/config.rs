use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::tmdb::TMDB_BASE;

/// Server configuration loaded from environment variables.
///
/// | Env Var                  | Default                        |
/// |--------------------------|--------------------------------|
/// | `TMDB_API_KEY`           | required                       |
/// | `TMDB_BASE_URL`          | `https://api.themoviedb.org/3` |
/// | `HOST`                   | `0.0.0.0`                      |
/// | `PORT`                   | `3000`                         |
/// | `STATIC_DIR`             | `public`                       |
/// | `RATE_LIMIT_MAX`         | `100`                          |
/// | `RATE_LIMIT_WINDOW_SECS` | `900`                          |
#[derive(Debug, Clone)]
pub struct Config {
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub rate_limit_max: u32,
    pub rate_limit_window_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let tmdb_api_key = get("TMDB_API_KEY").context("TMDB_API_KEY not set")?;
        Ok(Self {
            tmdb_api_key,
            tmdb_base_url: get("TMDB_BASE_URL").unwrap_or_else(|| TMDB_BASE.to_string()),
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(get("PORT"), "PORT", 3000)?,
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            rate_limit_max: parse_or(get("RATE_LIMIT_MAX"), "RATE_LIMIT_MAX", 100)?,
            rate_limit_window_secs: parse_or(
                get("RATE_LIMIT_WINDOW_SECS"),
                "RATE_LIMIT_WINDOW_SECS",
                900,
            )?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(v) => v
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a valid number, got '{v}'")),
        None => Ok(default),
    }
}
