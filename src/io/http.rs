use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::ArchiveSource;
use anyhow::{Result, bail};

/// Archive served over HTTP(S), e.g. the download link of a stored report
pub struct HttpArchive {
    client: Client,
    url: String,
    max_retry: u32,
}

impl HttpArchive {
    pub fn new(url: String) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            url,
            max_retry: 10,
        })
    }

    async fn fetch(&self, limit: u64) -> Result<Vec<u8>> {
        let mut retry_count = 0;

        loop {
            match self.client.get(&self.url).send().await {
                Ok(resp) => {
                    if !resp.status().is_success() {
                        bail!("HTTP request failed with status: {}", resp.status());
                    }

                    // Reject early when the server announces the size
                    if let Some(length) = resp.content_length() {
                        if length > limit {
                            bail!("archive is {} bytes, larger than the {} byte limit", length, limit);
                        }
                    }

                    return read_capped(resp, limit).await;
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    retry_count += 1;
                    if retry_count >= self.max_retry {
                        bail!("Max retries exceeded");
                    }
                    tracing::warn!(
                        retry = retry_count,
                        max_retry = self.max_retry,
                        error = %e,
                        "connection error, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(500 * retry_count as u64)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Read a response body chunk by chunk, stopping once it exceeds `limit`.
async fn read_capped(mut resp: reqwest::Response, limit: u64) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = resp.chunk().await? {
        if data.len() as u64 + chunk.len() as u64 > limit {
            bail!("archive is larger than the {} byte limit", limit);
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

#[async_trait]
impl ArchiveSource for HttpArchive {
    async fn load(&self, limit: u64) -> Result<Vec<u8>> {
        let data = self.fetch(limit).await?;
        tracing::debug!(url = %self.url, bytes = data.len(), "downloaded archive");
        Ok(data)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
