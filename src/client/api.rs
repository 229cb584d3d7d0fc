use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::media::{Credits, DetailRecord, MediaType, SearchResults, SearchType};

/// The proxy routes as seen by the rendering client.
#[async_trait]
pub trait MediaApi: Send + Sync {
    async fn trending(&self, media: MediaType) -> Result<SearchResults>;
    async fn search(&self, query: &str, kind: SearchType) -> Result<SearchResults>;
    async fn details(&self, id: u64, media: MediaType) -> Result<DetailRecord>;
    async fn credits(&self, id: u64, media: MediaType) -> Result<Credits>;
    async fn recommendations(&self, id: u64, media: MediaType) -> Result<SearchResults>;
}

/// Talks to a proxy instance rooted at `base_url` (e.g. `http://127.0.0.1:3000/api`).
#[derive(Debug, Clone)]
pub struct HttpMediaApi {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ProxyError {
    error: String,
}

impl HttpMediaApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .user_agent(format!("telaflix/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build proxy HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path_and_query);
        let res = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;
        let status = res.status();
        let text = res.text().await.context("reading body failed")?;
        if !status.is_success() {
            let message = serde_json::from_str::<ProxyError>(&text)
                .map(|e| e.error)
                .unwrap_or(text);
            return Err(anyhow!("{} -> {}: {}", path_and_query, status, message));
        }
        serde_json::from_str(&text).context("JSON parse failed")
    }
}

pub(crate) fn media_query(route: &str, id: u64, media: MediaType) -> String {
    format!("/{route}?id={id}&type={media}")
}

#[async_trait]
impl MediaApi for HttpMediaApi {
    async fn trending(&self, media: MediaType) -> Result<SearchResults> {
        self.get_json(&format!("/trending?type={media}")).await
    }

    async fn search(&self, query: &str, kind: SearchType) -> Result<SearchResults> {
        self.get_json(&format!(
            "/search?query={}&type={kind}",
            urlencoding::encode(query)
        ))
        .await
    }

    async fn details(&self, id: u64, media: MediaType) -> Result<DetailRecord> {
        self.get_json(&media_query("details", id, media)).await
    }

    async fn credits(&self, id: u64, media: MediaType) -> Result<Credits> {
        self.get_json(&media_query("credits", id, media)).await
    }

    async fn recommendations(&self, id: u64, media: MediaType) -> Result<SearchResults> {
        self.get_json(&media_query("recommendations", id, media))
            .await
    }
}
