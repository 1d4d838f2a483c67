use anyhow::{Context, Result};
use std::cell::OnceCell;
use std::io::Write;
use std::time::Duration;

/// Retrieves remote content over HTTP(S)
pub trait UriFetcher {
    /// Stream the body of `uri` into `out`, returning the number of bytes written
    fn fetch_to(&self, uri: &str, out: &mut dyn Write) -> Result<u64>;

    /// HTTP status code returned for a HEAD request to `uri`
    fn status_code(&self, uri: &str) -> Result<u16>;
}

/// Blocking reqwest client, built on first request
pub struct HttpFetcher {
    timeout: Duration,
    client: OnceCell<reqwest::blocking::Client>,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            client: OnceCell::new(),
        }
    }

    fn client(&self) -> Result<&reqwest::blocking::Client> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(self.client.get_or_init(|| client))
    }
}

impl UriFetcher for HttpFetcher {
    fn fetch_to(&self, uri: &str, out: &mut dyn Write) -> Result<u64> {
        tracing::debug!(uri, "fetching");
        let mut response = self
            .client()?
            .get(uri)
            .send()
            .with_context(|| format!("Failed to download {}", uri))?
            .error_for_status()
            .with_context(|| format!("HTTP error downloading {}", uri))?;
        let written = response
            .copy_to(out)
            .with_context(|| format!("Failed to read content of {}", uri))?;
        Ok(written)
    }

    fn status_code(&self, uri: &str) -> Result<u16> {
        let response = self
            .client()?
            .head(uri)
            .send()
            .with_context(|| format!("Failed to reach {}", uri))?;
        Ok(response.status().as_u16())
    }
}
