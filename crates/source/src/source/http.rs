//! HTTP document source.

use crate::DocumentSource;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::{Client, Response};
use std::time::Duration;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Document source backed by plain HTTP GET requests.
///
/// The index is fetched from a fixed URL; documents are fetched from whatever
/// address their index record carries. No authentication is sent.
///
/// # Examples
///
/// ```no_run
/// use folio_source::source::HttpSource;
/// use std::time::Duration;
///
/// # fn example() -> folio_source::error::Result<()> {
/// let source = HttpSource::new("docs", "https://example.com/data/docs.json")?
///     .with_timeout(Duration::from_secs(10))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpSource {
    name: String,
    index_url: String,
    user_agent: String,
    timeout: Duration,
    client: Client,
}

impl HttpSource {
    /// Create a source with the default user agent and timeout.
    pub fn new(name: impl Into<String>, index_url: impl Into<String>) -> Result<Self> {
        let user_agent = concat!("folio/", env!("CARGO_PKG_VERSION")).to_string();
        Ok(Self {
            name: name.into(),
            index_url: index_url.into(),
            client: Self::client(&user_agent, DEFAULT_TIMEOUT)?,
            user_agent,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Rebuild the client with a different per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.timeout = timeout;
        self.client = Self::client(&self.user_agent, self.timeout)?;
        Ok(self)
    }

    /// Rebuild the client with a different user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Result<Self> {
        self.user_agent = user_agent.into();
        self.client = Self::client(&self.user_agent, self.timeout)?;
        Ok(self)
    }

    pub fn index_url(&self) -> &str {
        &self.index_url
    }

    fn client(user_agent: &str, timeout: Duration) -> Result<Client> {
        Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .or_raise(|| ErrorKind::Transport("client construction".to_string()))
    }

    /// Issue a GET and reject non-success statuses.
    async fn get(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send().await.or_raise(|| ErrorKind::Transport(url.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(source = %self.name, url, status = status.as_u16(), "Request rejected");
            exn::bail!(ErrorKind::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_index(&self) -> Result<Vec<u8>> {
        let response = self.get(&self.index_url).await?;
        let body = response.bytes().await.or_raise(|| ErrorKind::Body(self.index_url.clone()))?;
        Ok(body.to_vec())
    }

    async fn fetch(&self, address: &str) -> Result<String> {
        let response = self.get(address).await?;
        response.text().await.or_raise(|| ErrorKind::Body(address.to_string()))
    }
}
