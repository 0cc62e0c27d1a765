//! HTTP source over an OData-style paged resource.
//!
//! Reads issue `GET {uri}?$skip={index}&$top={count}` and decode a JSON
//! payload whose records live in a top-level `value` array (`d.results`
//! is accepted for older verbose-JSON services). Counts issue
//! `GET {uri}/$count`, which returns a bare integer body.
//!
//! The transport is a trait so tests and embedders can substitute their
//! own HTTP stack; the default is a thin `reqwest` adapter.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use super::{Record, Source};
use crate::error::{CacheError, Result};

/// Basic-auth credentials forwarded verbatim to the transport.
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never log the password.
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// Raw transport response. Status interpretation stays in [`HttpSource`].
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Injectable HTTP transport.
///
/// Cancellation is cooperative: dropping the returned future must abort
/// the underlying request, which `reqwest` does.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, credentials: Option<&Credentials>) -> Result<HttpResponse>;
}

/// Default transport over a shared [`reqwest::Client`].
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, credentials: Option<&Credentials>) -> Result<HttpResponse> {
        let mut request = self.client.get(url);
        if let Some(c) = credentials {
            request = request.basic_auth(&c.user, Some(&c.password));
        }
        let response = request.send().await.map_err(|e| CacheError::Transport {
            message: e.to_string(),
            status: e.status().map(|s| s.as_u16()),
            url: Some(url.to_string()),
        })?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| CacheError::Transport {
                message: e.to_string(),
                status: Some(status),
                url: Some(url.to_string()),
            })?
            .to_vec();
        Ok(HttpResponse { status, body })
    }
}

/// Normalize a resource URI into a cache identity.
///
/// Trims surrounding whitespace and parses, which lower-cases scheme and
/// host, so equivalent spellings of the same resource map to the same
/// persisted cache state.
pub fn normalize_uri(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CacheError::Configuration("source URI is empty".into()));
    }
    let url = reqwest::Url::parse(trimmed)
        .map_err(|e| CacheError::Configuration(format!("invalid source URI '{trimmed}': {e}")))?;
    Ok(url.to_string())
}

/// [`Source`] over a remote OData-style resource.
pub struct HttpSource<R> {
    uri: String,
    transport: Arc<dyn HttpTransport>,
    credentials: Option<Credentials>,
    _records: PhantomData<fn() -> R>,
}

impl<R: Record> HttpSource<R> {
    /// Build a source over `uri`, normalizing it for identity.
    pub fn new(
        uri: &str,
        transport: Arc<dyn HttpTransport>,
        credentials: Option<Credentials>,
    ) -> Result<Self> {
        let mut uri = normalize_uri(uri)?;
        while uri.ends_with('/') {
            uri.pop();
        }
        Ok(Self {
            uri,
            transport,
            credentials,
            _records: PhantomData,
        })
    }

    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self.transport.get(url, self.credentials.as_ref()).await?;
        if response.status >= 400 {
            return Err(CacheError::Transport {
                message: format!("request failed with status {}", response.status),
                status: Some(response.status),
                url: Some(url.to_string()),
            });
        }
        Ok(response)
    }
}

/// Pull the record array out of an OData payload: `value` for JSON Light,
/// `d.results` for the older verbose format.
fn record_array(payload: &serde_json::Value) -> Result<&Vec<serde_json::Value>> {
    payload
        .get("value")
        .and_then(|v| v.as_array())
        .or_else(|| payload.pointer("/d/results").and_then(|v| v.as_array()))
        .ok_or_else(|| CacheError::Payload("response has neither 'value' nor 'd.results'".into()))
}

#[async_trait]
impl<R: Record> Source<R> for HttpSource<R> {
    fn identity(&self) -> String {
        self.uri.clone()
    }

    async fn count(&self) -> Result<u64> {
        let url = format!("{}/$count", self.uri);
        let response = self.get(&url).await?;
        let body = String::from_utf8_lossy(&response.body);
        body.trim()
            .parse::<u64>()
            .map_err(|_| CacheError::Payload(format!("non-numeric $count body: {:?}", body.trim())))
    }

    async fn read(&self, index: u64, count: u64) -> Result<Vec<R>> {
        let separator = if self.uri.contains('?') { '&' } else { '?' };
        let url = format!("{}{separator}$skip={index}&$top={count}", self.uri);
        trace!(%url, "source read");
        let response = self.get(&url).await?;
        let payload: serde_json::Value = serde_json::from_slice(&response.body)
            .map_err(|e| CacheError::Payload(format!("invalid JSON body: {e}")))?;
        record_array(&payload)?
            .iter()
            .map(|v| {
                serde_json::from_value(v.clone())
                    .map_err(|e| CacheError::Payload(format!("malformed record: {e}")))
            })
            .collect()
    }
}
