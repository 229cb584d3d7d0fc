use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::media::{MediaType, SearchType};

pub const TMDB_BASE: &str = "https://api.themoviedb.org/3";
/// Locale every upstream response is requested in.
pub const LANGUAGE: &str = "pt-BR";

/// Upstream operations the proxy relays. Bodies are returned untouched.
#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn trending(&self, media: MediaType) -> Result<Value>;
    async fn search(&self, kind: SearchType, query: &str) -> Result<Value>;
    async fn details(&self, media: MediaType, id: u64) -> Result<Value>;
    async fn credits(&self, media: MediaType, id: u64) -> Result<Value>;
    async fn recommendations(&self, media: MediaType, id: u64) -> Result<Value>;
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TmdbClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let user_agent = format!("telaflix/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Appends credential and locale to `path`, which may already carry a query.
    fn url(&self, path: &str) -> String {
        let sep = if path.contains('?') { '&' } else { '?' };
        format!(
            "{}{path}{sep}api_key={}&language={LANGUAGE}",
            self.base_url,
            urlencoding::encode(&self.api_key)
        )
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        debug!("GET {}", path);
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .with_context(|| format!("request to {path} failed"))?;
        let status = res.status();
        let text = res.text().await.context("reading body failed")?;
        if !status.is_success() {
            // The full URL carries the api key; only the path is reported.
            return Err(anyhow!("{} -> {}: {}", path, status, text));
        }
        let parsed: Value = serde_json::from_str(&text).context("JSON parse failed")?;
        Ok(parsed)
    }
}

pub(crate) fn trending_path(media: MediaType) -> String {
    format!("/trending/{media}/week")
}

pub(crate) fn search_path(kind: SearchType, query: &str) -> String {
    format!("/search/{kind}?query={}", urlencoding::encode(query))
}

pub(crate) fn details_path(media: MediaType, id: u64) -> String {
    format!("/{media}/{id}")
}

pub(crate) fn credits_path(media: MediaType, id: u64) -> String {
    format!("/{media}/{id}/credits")
}

pub(crate) fn recommendations_path(media: MediaType, id: u64) -> String {
    format!("/{media}/{id}/recommendations")
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn trending(&self, media: MediaType) -> Result<Value> {
        self.get_json(&trending_path(media)).await
    }

    async fn search(&self, kind: SearchType, query: &str) -> Result<Value> {
        self.get_json(&search_path(kind, query)).await
    }

    async fn details(&self, media: MediaType, id: u64) -> Result<Value> {
        self.get_json(&details_path(media, id)).await
    }

    async fn credits(&self, media: MediaType, id: u64) -> Result<Value> {
        self.get_json(&credits_path(media, id)).await
    }

    async fn recommendations(&self, media: MediaType, id: u64) -> Result<Value> {
        self.get_json(&recommendations_path(media, id)).await
    }
}
