use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;

use crate::error::TransportError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Fetches a whole resource into memory.
///
/// `on_progress` receives the number of bytes received so far and may be
/// called from any worker task.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        on_progress: &(dyn Fn(u64) + Send + Sync),
    ) -> Result<Vec<u8>, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a transport with the updater's user agent and connect timeout.
    ///
    /// # Errors
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn with_defaults() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(format!("patchkit/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(TransportError::request)?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(
        &self,
        url: &str,
        on_progress: &(dyn Fn(u64) + Send + Sync),
    ) -> Result<Vec<u8>, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(TransportError::request)?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                status: response.status().as_u16(),
            });
        }

        let capacity = response
            .content_length()
            .and_then(|length| usize::try_from(length).ok())
            .unwrap_or(0);
        let mut data = Vec::with_capacity(capacity);

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(TransportError::body)?;
            data.extend_from_slice(&chunk);
            on_progress(data.len() as u64);
        }

        Ok(data)
    }
}
