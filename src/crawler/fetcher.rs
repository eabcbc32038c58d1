//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the auditor:
//! - Building one HTTP client per run with browser-like headers
//! - GET requests for pages whose links are extracted
//! - HEAD requests for status checks
//! - Error classification (timeout, transport failure, pool saturation)
//!
//! Every request is a single attempt; there are no retries.

use crate::config::{Config, CrawlerConfig, HeaderConfig};
use crate::ConfigError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::error::Error as StdError;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// `ENFILE` / `EMFILE`: the process or system ran out of file descriptors
const FD_EXHAUSTION_CODES: [i32; 2] = [23, 24];

/// HTTP method used for a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMethod {
    /// Download the page; the body is kept when the status is 200
    Get,
    /// Status check only
    Head,
}

/// A response that arrived before the timeout
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Final HTTP status code, after redirects
    pub status: u16,

    /// Page body, read only for a GET answered with 200
    pub body: Option<String>,
}

/// Why a fetch produced no response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("{0}")]
    Transport(String),

    #[error("connection pool exhausted: {0}")]
    PoolExhausted(String),
}

/// Builds an HTTP client with the configured headers and timeout
///
/// Redirects are followed up to `max-redirects` hops.
pub fn build_http_client(
    headers: &HeaderConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, crate::AuditError> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(USER_AGENT, header_value("user-agent", &headers.user_agent)?);
    default_headers.insert(ACCEPT, header_value("accept", &headers.accept)?);
    default_headers.insert(
        ACCEPT_LANGUAGE,
        header_value("accept-language", &headers.accept_language)?,
    );

    let client = Client::builder()
        .default_headers(default_headers)
        .timeout(Duration::from_millis(crawler.request_timeout_ms))
        .redirect(Policy::limited(crawler.max_redirects as usize))
        .pool_max_idle_per_host(crawler.max_workers as usize)
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value)
        .map_err(|e| ConfigError::Validation(format!("Invalid {} header: {}", name, e)))
}

/// Performs GET and HEAD requests for one audit run
///
/// Cheap to clone: clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    pool_markers: Vec<String>,
}

impl Fetcher {
    /// Creates a fetcher from the full configuration
    pub fn new(config: &Config) -> Result<Self, crate::AuditError> {
        let client = build_http_client(&config.headers, &config.crawler)?;
        Ok(Self::with_client(
            client,
            config.crawler.pool_exhaustion_markers.clone(),
        ))
    }

    /// Wraps an existing client
    pub fn with_client(client: Client, pool_markers: Vec<String>) -> Self {
        Self {
            client,
            pool_markers,
        }
    }

    /// Fetches a URL once
    ///
    /// # Returns
    ///
    /// * `Ok(FetchResponse)` - The server answered (any status)
    /// * `Err(FetchError)` - Timeout, transport failure or pool saturation
    pub async fn fetch(&self, url: &str, method: FetchMethod) -> Result<FetchResponse, FetchError> {
        let request = match method {
            FetchMethod::Get => self.client.get(url),
            FetchMethod::Head => self.client.head(url),
        };

        let response = request
            .send()
            .await
            .map_err(|e| classify_error(e, &self.pool_markers))?;

        let status = response.status();
        let body = if method == FetchMethod::Get && status == StatusCode::OK {
            let text = response
                .text()
                .await
                .map_err(|e| classify_error(e, &self.pool_markers))?;
            Some(text)
        } else {
            None
        };

        Ok(FetchResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// Maps a client error onto a `FetchError`
///
/// The URL is stripped from the message; the report already carries it.
pub fn classify_error(error: reqwest::Error, pool_markers: &[String]) -> FetchError {
    if error.is_timeout() {
        return FetchError::Timeout;
    }

    let error = error.without_url();
    let local_exhaustion = is_local_resource_exhaustion(&error);
    let message = error_chain_message(&error);

    if local_exhaustion || is_pool_exhaustion_message(&message, pool_markers) {
        FetchError::PoolExhausted(message)
    } else {
        FetchError::Transport(message)
    }
}

/// Joins an error and its sources with `": "`
///
/// `"error sending request: error trying to connect: tcp connect error: ..."`
fn error_chain_message(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(err) = source {
        message.push_str(": ");
        message.push_str(&err.to_string());
        source = err.source();
    }

    message
}

/// Returns true if the message contains one of the pool-saturation markers
pub fn is_pool_exhaustion_message(message: &str, markers: &[String]) -> bool {
    let message = message.to_lowercase();
    markers
        .iter()
        .any(|marker| message.contains(&marker.to_lowercase()))
}

/// Walks the error chain looking for local socket or descriptor exhaustion
fn is_local_resource_exhaustion(error: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(error);

    while let Some(err) = current {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::AddrNotAvailable {
                return true;
            }
            if let Some(code) = io_err.raw_os_error() {
                if FD_EXHAUSTION_CODES.contains(&code) {
                    return true;
                }
            }
        }
        current = err.source();
    }

    false
}
