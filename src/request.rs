//! Single-shot request wrappers.
//!
//! A [`Request`] (or [`ApiRequest`]) owns its configuration exclusively and
//! tracks an idle/executing flag. `execute()` transitions idle to executing
//! exactly once and materializes the configuration into a
//! [`PreparedRequest`]; invoking it again on the same instance fails. The
//! core does not model completion; whatever transport consumes the prepared
//! request owns the rest of the lifecycle, so a fresh request object is
//! required per attempt.

use crate::config::compute_headers;
use crate::{auth, ApiRequestConfig, Error, RequestConfig, Result};
use http::Method;
use serde_json::{json, Value};
use std::collections::HashMap;

/// A fully materialized request, ready to hand to a transport.
///
/// This is the boundary shape of the crate: everything derived or computed
/// by the configuration layer has been flattened into plain values.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// The HTTP method.
    pub method: Method,
    /// The final URL, with cache-busting and query string applied.
    pub url: String,
    /// The final headers as a plain mapping.
    pub headers: HashMap<String, String>,
    /// The request body, if any.
    pub body: Option<Value>,
}

// The idle -> executing guard shared by both request types. Exists to catch
// the logic error of re-invoking a single-use-in-flight object, not to
// arbitrate concurrent access.
#[derive(Debug, Clone, Copy, Default)]
struct ExecutionState {
    executing: bool,
}

impl ExecutionState {
    fn begin(&mut self) -> Result<()> {
        if self.executing {
            return Err(Error::AlreadyExecuting);
        }
        self.executing = true;
        Ok(())
    }
}

/// A single-shot request over a [`RequestConfig`].
///
/// # Examples
///
/// ```
/// use backhaul::{Request, RequestConfig};
///
/// let mut request = Request::new(RequestConfig::new("https://api.example.com/status"));
/// let prepared = request.execute().unwrap();
/// assert_eq!(prepared.method, http::Method::GET);
///
/// // A request object is single-use.
/// assert!(request.execute().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    config: RequestConfig,
    state: ExecutionState,
}

impl Request {
    /// Wraps a configuration in an idle request.
    pub fn new(config: RequestConfig) -> Self {
        Self {
            config,
            state: ExecutionState::default(),
        }
    }

    /// Returns the wrapped configuration.
    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Returns the wrapped configuration for mutation.
    pub fn config_mut(&mut self) -> &mut RequestConfig {
        &mut self.config
    }

    /// Returns `true` once `execute()` has been invoked.
    pub fn is_executing(&self) -> bool {
        self.state.executing
    }

    /// Transitions idle to executing and materializes the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExecuting`] if invoked while this instance is
    /// already executing.
    pub fn execute(&mut self) -> Result<PreparedRequest> {
        self.state.begin()?;

        let prepared = PreparedRequest {
            method: self.config.method().clone(),
            url: self.config.url(),
            headers: self.config.headers().to_map(),
            body: self.config.body().cloned(),
        };
        tracing::debug!(
            method = %prepared.method,
            url = %prepared.url,
            "Prepared request"
        );
        Ok(prepared)
    }

    /// Pass-through point for a transport-level cancellation signal. No
    /// state transition happens here.
    pub fn cancel(&self) {}

    /// Produces a plain-object snapshot of the request.
    pub fn to_json(&self) -> Value {
        json!({
            "method": self.config.method().as_str(),
            "headers": self.config.headers().to_json(),
            "url": self.config.raw_url(),
            "data": self.config.data(),
        })
    }
}

/// A single-shot request over an [`ApiRequestConfig`].
///
/// Beyond [`Request`], `execute()` first resolves the `Authorization` header
/// from the configured auth type and the client context, merges it into the
/// configuration's headers, and only then performs the idle-to-executing
/// transition.
///
/// # Examples
///
/// ```
/// use backhaul::{ApiRequest, ApiRequestConfig, AuthType, ClientContext};
/// use std::sync::Arc;
///
/// let client = Arc::new(ClientContext {
///     app_key: Some("myapp".to_string()),
///     app_secret: Some("secret".to_string()),
///     ..Default::default()
/// });
///
/// let mut config = ApiRequestConfig::new("https://baas.example.com/appdata/myapp/books", client);
/// config.set_auth_type(AuthType::App);
///
/// let mut request = ApiRequest::new(config);
/// let prepared = request.execute().unwrap();
/// assert!(prepared.headers["Authorization"].starts_with("Basic "));
/// ```
#[derive(Debug, Clone)]
pub struct ApiRequest {
    config: ApiRequestConfig,
    state: ExecutionState,
}

impl ApiRequest {
    /// Wraps a configuration in an idle request.
    pub fn new(config: ApiRequestConfig) -> Self {
        Self {
            config,
            state: ExecutionState::default(),
        }
    }

    /// Returns the wrapped configuration.
    pub fn config(&self) -> &ApiRequestConfig {
        &self.config
    }

    /// Returns the wrapped configuration for mutation.
    pub fn config_mut(&mut self) -> &mut ApiRequestConfig {
        &mut self.config
    }

    /// Returns `true` once `execute()` has been invoked.
    pub fn is_executing(&self) -> bool {
        self.state.executing
    }

    /// Resolves credentials, merges the `Authorization` header, and
    /// materializes the configuration.
    ///
    /// # Errors
    ///
    /// Surfaces the configured auth cascade's error, an
    /// [`Error::PropertiesTooLarge`] from header computation, or
    /// [`Error::AlreadyExecuting`] on reuse.
    pub fn execute(&mut self) -> Result<PreparedRequest> {
        if let Some(credential) = auth::resolve(self.config.auth_type(), self.config.client())? {
            let value = credential.authorization_value();
            self.config.headers_mut().set("Authorization", value)?;
        }

        let headers = compute_headers(&self.config)?;
        self.state.begin()?;

        let prepared = PreparedRequest {
            method: self.config.method().clone(),
            url: self.config.url(),
            headers: headers.to_map(),
            body: self.config.body().cloned(),
        };
        tracing::debug!(
            method = %prepared.method,
            url = %prepared.url,
            auth_type = ?self.config.auth_type(),
            "Prepared API request"
        );
        Ok(prepared)
    }

    /// Pass-through point for a transport-level cancellation signal. No
    /// state transition happens here.
    pub fn cancel(&self) {}

    /// Produces a plain-object snapshot of the request, including the query
    /// object as-is. Headers go through the same derivation as any other
    /// read, so the snapshot carries the API-version, app-version, and
    /// custom-properties headers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PropertiesTooLarge`] when the serialized custom
    /// properties exceed the configured byte cap; a snapshot never hides
    /// headers the request itself could not send.
    pub fn to_json(&self) -> Result<Value> {
        let headers = compute_headers(&self.config)?;
        Ok(json!({
            "method": self.config.method().as_str(),
            "headers": headers.to_json(),
            "url": self.config.base().raw_url(),
            "data": self.config.body(),
            "query": self.config.query(),
        }))
    }
}
