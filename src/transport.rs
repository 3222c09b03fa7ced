//! Transport seam that sends a prepared request.
//!
//! The configuration layer hands a fully materialized [`PreparedRequest`]
//! to a [`Transport`]; the transport owns the network exchange and returns
//! the response as-is. No retries, no response deserialization; those
//! concerns live above and below this seam, not in it.

use crate::{PreparedRequest, Result};
use async_trait::async_trait;
use http::StatusCode;
use std::collections::HashMap;
use std::time::Duration;

/// The raw outcome of sending a prepared request.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The response headers as a plain mapping. Non-UTF-8 values are
    /// dropped.
    pub headers: HashMap<String, String>,
    /// The raw response body.
    pub body: String,
}

/// Sends prepared requests over some medium.
///
/// Implement this to swap the network layer out in tests or embed the
/// configuration core in a different execution pipeline.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the response, whatever its status.
    async fn send(&self, request: PreparedRequest) -> Result<TransportResponse>;
}

/// A [`Transport`] over `reqwest`.
///
/// # Examples
///
/// ```no_run
/// use backhaul::transport::{HttpTransport, Transport};
/// use backhaul::{Request, RequestConfig};
///
/// # async fn example() -> Result<(), backhaul::Error> {
/// let transport = HttpTransport::builder().build()?;
///
/// let mut request = Request::new(RequestConfig::new("https://api.example.com/status"));
/// let prepared = request.execute()?;
/// let response = transport.send(prepared).await?;
/// println!("status: {}", response.status);
/// # Ok(())
/// # }
/// ```
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// Creates a builder for configuring a transport.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }

    /// Creates a transport honoring a configuration's timeout and redirect
    /// policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`](crate::Error::Network) if the underlying
    /// HTTP client cannot be constructed.
    pub fn for_config(config: &crate::RequestConfig) -> Result<Self> {
        Self::builder()
            .timeout(config.timeout())
            .follow_redirect(config.follow_redirect())
            .build()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: PreparedRequest) -> Result<TransportResponse> {
        let url = url::Url::parse(&request.url)?;

        tracing::debug!(
            method = %request.method,
            url = %url,
            "Sending request"
        );

        let mut builder = self.client.request(request.method.clone(), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;

        tracing::info!(
            status = status.as_u16(),
            method = %request.method,
            "Received response"
        );

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

/// Builder for configuring and creating an [`HttpTransport`].
#[derive(Debug)]
pub struct HttpTransportBuilder {
    timeout: Option<Duration>,
    follow_redirect: bool,
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self {
            timeout: None,
            follow_redirect: true,
        }
    }
}

impl HttpTransportBuilder {
    /// Sets a per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets whether redirects are followed. On by default, matching the
    /// config-level `follow_redirect` default.
    pub fn follow_redirect(mut self, follow: bool) -> Self {
        self.follow_redirect = follow;
        self
    }

    /// Builds the transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`](crate::Error::Network) if the underlying
    /// HTTP client cannot be constructed.
    pub fn build(self) -> Result<HttpTransport> {
        let redirect = if self.follow_redirect {
            reqwest::redirect::Policy::default()
        } else {
            reqwest::redirect::Policy::none()
        };
        let client = reqwest::Client::builder().redirect(redirect).build()?;
        Ok(HttpTransport {
            client,
            timeout: self.timeout,
        })
    }
}
