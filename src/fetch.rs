use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_URL: &str = "http://www.senate.gov/galleries/pdcl/";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out fetching {0}")]
    Timeout(String),
    #[error("could not connect to {url}: {reason}")]
    Connect { url: String, reason: String },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("failed reading floor log body: {0}")]
    Body(String),
}

/// Where the floor log HTML comes from.
pub trait DocumentSource {
    async fn fetch(&self) -> Result<String, FetchError>;
}

/// The live floor log over HTTP. One attempt per run, bounded by a timeout.
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

impl DocumentSource for HttpSource {
    async fn fetch(&self) -> Result<String, FetchError> {
        let stamp = chrono::Utc::now().timestamp().to_string();
        info!("Fetching floor log: {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .query(&[("break_cache", stamp.as_str())])
            .send()
            .await
            .map_err(|e| classify(&self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let html = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.url.clone())
            } else {
                FetchError::Body(e.to_string())
            }
        })?;
        debug!("Fetched {} bytes", html.len());
        Ok(html)
    }
}

fn classify(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(url.to_string())
    } else {
        FetchError::Connect {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_host_is_a_fetch_error() {
        // Nothing listens on the discard port; a proxy in between may answer 5xx instead.
        let source = HttpSource::new("http://127.0.0.1:9/", Duration::from_secs(2)).unwrap();
        let err = source.fetch().await.unwrap_err();
        assert!(
            matches!(
                err,
                FetchError::Connect { .. } | FetchError::Timeout(_) | FetchError::Status { .. }
            ),
            "{:?}",
            err
        );
    }
}
