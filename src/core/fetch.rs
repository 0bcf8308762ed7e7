use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::core::error::{EmojiError, EmojiResult};

/// Where upstream datasets and asset bundles come from
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch_bytes(&self, url: &str) -> EmojiResult<Vec<u8>>;

    async fn fetch_text(&self, url: &str) -> EmojiResult<String> {
        let bytes = self.fetch_bytes(url).await?;
        String::from_utf8(bytes).map_err(|e| EmojiError::parse(url, e))
    }
}

/// HTTP(S) fetcher backed by reqwest
pub struct HttpSource {
    http: Client,
}

impl HttpSource {
    pub fn new() -> EmojiResult<Self> {
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(15))
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| EmojiError::transport("client", e))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl RemoteSource for HttpSource {
    async fn fetch_bytes(&self, url: &str) -> EmojiResult<Vec<u8>> {
        info!("Downloading {}", url);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| EmojiError::transport(url, e))?;

        if !response.status().is_success() {
            return Err(EmojiError::transport(
                url,
                format!("HTTP {}", response.status().as_u16()),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| EmojiError::transport(url, e))?;
        debug!("Received {} bytes from {}", bytes.len(), url);

        Ok(bytes.to_vec())
    }
}
