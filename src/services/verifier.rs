use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Exact response body the receipt service sends for an authentic callback.
pub const CONFIRMATION: &[u8] = b"VALID";

/// Confirms that a callback body really came from the notifier.
#[async_trait]
pub trait Verifier: Send + Sync {
    async fn confirm(&self, raw_body: &[u8]) -> bool;
}

/// Echoes the raw callback body to the receipt endpoint and expects `VALID` back.
pub struct HttpVerifier {
    validation_url: String,
    client: reqwest::Client,
}

impl HttpVerifier {
    pub fn new(validation_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build validation HTTP client")?;

        Ok(Self {
            validation_url: validation_url.into(),
            client,
        })
    }

    async fn post_back(&self, raw_body: &[u8]) -> reqwest::Result<(reqwest::StatusCode, Vec<u8>)> {
        // The exact received bytes go back; re-encoding could reorder keys.
        let response = self
            .client
            .post(&self.validation_url)
            .body(raw_body.to_vec())
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok((status, body.to_vec()))
    }
}

#[async_trait]
impl Verifier for HttpVerifier {
    async fn confirm(&self, raw_body: &[u8]) -> bool {
        match self.post_back(raw_body).await {
            Ok((_, body)) if body == CONFIRMATION => true,
            Ok((status, body)) => {
                tracing::warn!(
                    status = %status,
                    "Receipt service did not confirm callback: {}",
                    String::from_utf8_lossy(&body)
                );
                false
            }
            Err(e) => {
                tracing::warn!("Receipt service request failed: {}", e);
                false
            }
        }
    }
}
