//! Request configuration types with validated accessors.
//!
//! [`RequestConfig`] holds the protocol-level fields every request carries:
//! method, headers, URL, body, timeout, and redirect/cache flags. Setters
//! validate synchronously and fail on invalid input.
//!
//! [`ApiRequestConfig`] composes a `RequestConfig` with the API-specific
//! fields of the backend service: auth type, query object, API version,
//! custom request properties, and app version. Its `url()` and `headers()`
//! accessors are not plain field reads: they compute the final value from
//! the current field state on every call, so a snapshot taken before a
//! mutation is stale afterwards.

use crate::{AuthType, ClientContext, Error, Headers, Result};
use http::Method;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Fallback request timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Protocol version sent to the backend unless overridden.
pub const DEFAULT_API_VERSION: u32 = 3;

/// Cap on the serialized byte length of the custom-properties header.
pub const MAX_PROPERTIES_BYTES: usize = 2000;

const APP_VERSION_HEADER: &str = "x-client-app-version";
const API_VERSION_HEADER: &str = "x-api-version";
const PROPERTIES_HEADER: &str = "x-custom-request-properties";

/// Tunable constants for request configuration.
///
/// These replace ambient process-wide lookups with an explicit struct passed
/// at construction; the `Default` impl carries the documented fallbacks.
///
/// # Examples
///
/// ```
/// use backhaul::{ConfigDefaults, RequestConfig};
/// use std::time::Duration;
///
/// let defaults = ConfigDefaults {
///     timeout: Duration::from_secs(5),
///     ..Default::default()
/// };
/// let config = RequestConfig::with_defaults("https://api.example.com", defaults);
/// assert_eq!(config.timeout(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct ConfigDefaults {
    /// Request timeout applied when the caller does not set one.
    pub timeout: Duration,
    /// API protocol version applied when the caller does not set one.
    pub api_version: u32,
    /// Maximum serialized byte length of the custom-properties header.
    pub max_properties_bytes: usize,
}

impl Default for ConfigDefaults {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            api_version: DEFAULT_API_VERSION,
            max_properties_bytes: MAX_PROPERTIES_BYTES,
        }
    }
}

/// Base configuration for an outgoing HTTP request.
///
/// # Examples
///
/// ```
/// use backhaul::RequestConfig;
///
/// let mut config = RequestConfig::new("https://api.example.com/status");
/// config.set_method("post").unwrap();
/// assert_eq!(config.method(), &http::Method::POST);
///
/// // The accept header is present by default.
/// assert_eq!(config.headers().get("Accept"), Some("application/json"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestConfig {
    method: Method,
    headers: Headers,
    url: String,
    body: Option<Value>,
    timeout: Duration,
    follow_redirect: bool,
    no_cache: bool,
    defaults: ConfigDefaults,
}

impl RequestConfig {
    /// Creates a configuration for `url` with the documented defaults:
    /// `GET`, an `accept: application/json` header, a 30 second timeout,
    /// redirects followed, cache-busting off.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_defaults(url, ConfigDefaults::default())
    }

    /// Creates a configuration with explicit tunables.
    pub fn with_defaults(url: impl Into<String>, defaults: ConfigDefaults) -> Self {
        let mut headers = Headers::new();
        headers.insert_static("accept", "application/json");
        Self {
            method: Method::GET,
            headers,
            url: url.into(),
            body: None,
            timeout: defaults.timeout,
            follow_redirect: true,
            no_cache: false,
            defaults,
        }
    }

    /// Returns the configured HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Sets the HTTP method from a string, case-normalized.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMethod`] for anything other than GET, POST,
    /// PATCH, PUT, or DELETE.
    pub fn set_method(&mut self, method: &str) -> Result<()> {
        self.method = match method.to_uppercase().as_str() {
            "GET" => Method::GET,
            "POST" => Method::POST,
            "PATCH" => Method::PATCH,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            _ => return Err(Error::InvalidMethod(method.to_string())),
        };
        Ok(())
    }

    /// Returns the configured headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the configured headers for mutation.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Replaces the headers wholesale from a plain key-value object.
    ///
    /// The `accept` default survives the replacement unless the object
    /// overwrites it itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `object` is not a JSON object,
    /// or [`Error::InvalidHeader`] for an invalid entry.
    pub fn set_headers(&mut self, object: &Value) -> Result<()> {
        let mut headers = Headers::from_object(object)?;
        if !headers.has("accept") {
            headers.insert_static("accept", "application/json");
        }
        self.headers = headers;
        Ok(())
    }

    /// Returns the request URL as it should be sent.
    ///
    /// When `no_cache` is enabled, each read appends a fresh random
    /// cache-busting query parameter; the stored URL is untouched and two
    /// consecutive reads differ.
    pub fn url(&self) -> String {
        if self.no_cache {
            cache_bust(&self.url)
        } else {
            self.url.clone()
        }
    }

    /// Returns the stored URL without cache-busting applied.
    pub fn raw_url(&self) -> &str {
        &self.url
    }

    /// Replaces the request URL.
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// Returns the request body, if any.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Sets the request body.
    pub fn set_body(&mut self, body: impl Into<Option<Value>>) {
        self.body = body.into();
    }

    /// Alias for [`body`](RequestConfig::body); the payload travels under
    /// the `data` name in snapshots.
    pub fn data(&self) -> Option<&Value> {
        self.body()
    }

    /// Alias for [`set_body`](RequestConfig::set_body).
    pub fn set_data(&mut self, data: impl Into<Option<Value>>) {
        self.set_body(data)
    }

    /// Returns the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sets the timeout; `None` falls back to the configured default rather
    /// than failing.
    pub fn set_timeout(&mut self, timeout: impl Into<Option<Duration>>) {
        self.timeout = timeout.into().unwrap_or(self.defaults.timeout);
    }

    /// Returns whether the transport should follow redirects.
    pub fn follow_redirect(&self) -> bool {
        self.follow_redirect
    }

    /// Sets the redirect policy flag.
    pub fn set_follow_redirect(&mut self, follow: bool) {
        self.follow_redirect = follow;
    }

    /// Returns whether cache-busting is enabled.
    pub fn no_cache(&self) -> bool {
        self.no_cache
    }

    /// Enables or disables cache-busting of [`url`](RequestConfig::url)
    /// reads.
    pub fn set_no_cache(&mut self, no_cache: bool) {
        self.no_cache = no_cache;
    }

    pub(crate) fn defaults(&self) -> &ConfigDefaults {
        &self.defaults
    }
}

/// Appends a random `_` query parameter to defeat aggressive HTTP caches.
fn cache_bust(url: &str) -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}_={token}")
}

/// The entity-path segments extracted from an API request URL.
///
/// The backend's data URLs follow the segment pattern
/// `/:namespace/:appKey/:collection/:entityId`; segments that the URL does
/// not carry stay `None`. Each present segment is percent-decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PathSegments {
    /// The leading namespace segment, e.g. `appdata` or `user`.
    pub namespace: Option<String>,
    /// The app key addressed by the URL.
    pub app_key: Option<String>,
    /// The collection addressed by the URL.
    pub collection: Option<String>,
    /// The entity id addressed by the URL.
    pub entity_id: Option<String>,
}

impl PathSegments {
    /// Extracts segments from a URL. A URL that does not match the pattern
    /// still succeeds, with unmatched segments left `None`.
    ///
    /// The mapping is positional: an empty segment (consecutive slashes)
    /// stays `None` in its own position rather than shifting later segments
    /// forward.
    pub fn from_url(url: &str) -> Self {
        let path = match url::Url::parse(url) {
            Ok(parsed) => parsed.path().to_string(),
            // Relative URL; treat the part before any query as the path.
            Err(_) => url.split('?').next().unwrap_or_default().to_string(),
        };

        let mut segments = path
            .strip_prefix('/')
            .unwrap_or(&path)
            .split('/')
            .map(|segment| {
                if segment.is_empty() {
                    None
                } else {
                    Some(decode_segment(segment))
                }
            });
        Self {
            namespace: segments.next().flatten(),
            app_key: segments.next().flatten(),
            collection: segments.next().flatten(),
            entity_id: segments.next().flatten(),
        }
    }
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// Configuration for a request against the backend API.
///
/// Composes a [`RequestConfig`] with the API-specific fields and defines its
/// own `url()`/`headers()` accessors that call into the base ones and
/// augment the result.
///
/// # Examples
///
/// ```
/// use backhaul::{ApiRequestConfig, ClientContext};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let client = Arc::new(ClientContext::default());
/// let mut config = ApiRequestConfig::new(
///     "https://baas.example.com/appdata/myapp/books",
///     client,
/// );
/// assert_eq!(config.segments().collection.as_deref(), Some("books"));
///
/// config.set_query(Some(json!({ "limit": 10 }))).unwrap();
/// assert_eq!(
///     config.url(),
///     "https://baas.example.com/appdata/myapp/books?limit=10"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ApiRequestConfig {
    base: RequestConfig,
    client: Arc<ClientContext>,
    auth_type: AuthType,
    query: Option<serde_json::Map<String, Value>>,
    online: bool,
    cache_enabled: bool,
    api_version: u32,
    properties: serde_json::Map<String, Value>,
    app_version: Option<String>,
    segments: PathSegments,
}

impl ApiRequestConfig {
    /// Creates an API request configuration for `url`, referencing the
    /// shared client context.
    pub fn new(url: impl Into<String>, client: Arc<ClientContext>) -> Self {
        Self::with_defaults(url, client, ConfigDefaults::default())
    }

    /// Creates an API request configuration with explicit tunables.
    pub fn with_defaults(
        url: impl Into<String>,
        client: Arc<ClientContext>,
        defaults: ConfigDefaults,
    ) -> Self {
        let api_version = defaults.api_version;
        let base = RequestConfig::with_defaults(url, defaults);
        let segments = PathSegments::from_url(base.raw_url());
        Self {
            base,
            client,
            auth_type: AuthType::default(),
            query: None,
            online: true,
            cache_enabled: true,
            api_version,
            properties: serde_json::Map::new(),
            app_version: None,
            segments,
        }
    }

    /// Returns the base configuration.
    pub fn base(&self) -> &RequestConfig {
        &self.base
    }

    /// Returns the base configuration for mutation.
    ///
    /// Note that replacing the URL through the base bypasses path-segment
    /// extraction; use [`set_url`](ApiRequestConfig::set_url) instead.
    pub fn base_mut(&mut self) -> &mut RequestConfig {
        &mut self.base
    }

    /// Returns the shared client context this request resolves auth against.
    pub fn client(&self) -> &ClientContext {
        &self.client
    }

    /// Returns the configured HTTP method.
    pub fn method(&self) -> &Method {
        self.base.method()
    }

    /// Sets the HTTP method. See [`RequestConfig::set_method`].
    pub fn set_method(&mut self, method: &str) -> Result<()> {
        self.base.set_method(method)
    }

    /// Returns the request body, if any.
    pub fn body(&self) -> Option<&Value> {
        self.base.body()
    }

    /// Sets the request body.
    pub fn set_body(&mut self, body: impl Into<Option<Value>>) {
        self.base.set_body(body)
    }

    /// Returns the selected auth type.
    pub fn auth_type(&self) -> AuthType {
        self.auth_type
    }

    /// Selects which credential scheme authorizes the request.
    pub fn set_auth_type(&mut self, auth_type: AuthType) {
        self.auth_type = auth_type;
    }

    /// Returns the query object, if any.
    pub fn query(&self) -> Option<&serde_json::Map<String, Value>> {
        self.query.as_ref()
    }

    /// Sets the query object serialized into the URL's query string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when `query` is neither `None` nor
    /// a JSON object.
    pub fn set_query(&mut self, query: Option<Value>) -> Result<()> {
        self.query = match query {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(map),
            Some(_) => {
                return Err(Error::InvalidArgument(
                    "query must be a plain key-value object".to_string(),
                ))
            }
        };
        Ok(())
    }

    /// Returns whether the request targets the live backend.
    pub fn online(&self) -> bool {
        self.online
    }

    /// Sets the online/offline flag.
    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }

    /// Returns whether response caching is enabled for this request.
    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    /// Enables or disables response caching for this request.
    pub fn set_cache_enabled(&mut self, enabled: bool) {
        self.cache_enabled = enabled;
    }

    /// Returns the API protocol version sent with the request.
    pub fn api_version(&self) -> u32 {
        self.api_version
    }

    /// Sets the API protocol version; `None` falls back to the configured
    /// default rather than failing.
    pub fn set_api_version(&mut self, version: impl Into<Option<u32>>) {
        self.api_version = version.into().unwrap_or(self.base.defaults().api_version);
    }

    /// Returns the custom request properties.
    pub fn properties(&self) -> &serde_json::Map<String, Value> {
        &self.properties
    }

    /// Replaces the custom request properties.
    ///
    /// The size cap is enforced when headers are computed, not here, since
    /// the serialized form is what counts against the cap.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when `properties` is not a JSON
    /// object.
    pub fn set_properties(&mut self, properties: Value) -> Result<()> {
        match properties {
            Value::Object(map) => {
                self.properties = map;
                Ok(())
            }
            _ => Err(Error::InvalidArgument(
                "custom properties must be a plain key-value object".to_string(),
            )),
        }
    }

    /// Returns the composed app-version string, if set.
    pub fn app_version(&self) -> Option<&str> {
        self.app_version.as_deref()
    }

    /// Composes the app version from up to three positional segments,
    /// `major[.minor[.patch]]`. An empty iterator clears the version.
    ///
    /// # Examples
    ///
    /// ```
    /// # use backhaul::{ApiRequestConfig, ClientContext};
    /// # use std::sync::Arc;
    /// # let mut config = ApiRequestConfig::new("https://x/y", Arc::new(ClientContext::default()));
    /// config.set_app_version([1, 2, 3]);
    /// assert_eq!(config.app_version(), Some("1.2.3"));
    ///
    /// config.set_app_version([1]);
    /// assert_eq!(config.app_version(), Some("1"));
    /// ```
    pub fn set_app_version<I>(&mut self, segments: I)
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        let joined: Vec<String> = segments
            .into_iter()
            .take(3)
            .map(|segment| segment.to_string())
            .collect();
        self.app_version = if joined.is_empty() {
            None
        } else {
            Some(joined.join("."))
        };
    }

    /// Clears the app-version string, removing its header on the next
    /// computation.
    pub fn clear_app_version(&mut self) {
        self.app_version = None;
    }

    /// Replaces the request URL and re-extracts the entity-path segments.
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.base.set_url(url);
        self.segments = PathSegments::from_url(self.base.raw_url());
    }

    /// Returns the entity-path segments extracted from the URL.
    pub fn segments(&self) -> &PathSegments {
        &self.segments
    }

    /// Returns the request URL as it should be sent: the base URL, with
    /// cache-busting applied underneath when enabled, then the query string
    /// appended when a non-empty query object exists.
    pub fn url(&self) -> String {
        let url = self.base.url();
        match &self.query {
            Some(query) if !query.is_empty() => append_query(url, query),
            _ => url,
        }
    }

    /// Computes the final headers for this request. Derived headers are
    /// recomputed on every call; see [`compute_headers`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::PropertiesTooLarge`] when the serialized custom
    /// properties exceed the configured byte cap.
    pub fn headers(&self) -> Result<Headers> {
        compute_headers(self)
    }

    /// Returns the stored base headers for mutation.
    pub fn headers_mut(&mut self) -> &mut Headers {
        self.base.headers_mut()
    }
}

/// Computes the full header map for an API request from the current
/// configuration state.
///
/// Starts from the stored base headers, then derives:
///
/// * the API version header, always present;
/// * the client app-version header, present only when an app version is
///   set and explicitly removed otherwise;
/// * the custom-properties header, carrying the JSON-serialized properties
///   object; its encoded byte length must stay under the configured cap.
///
/// These headers are derived, not stored: a snapshot taken before mutating
/// `app_version` or `properties` is stale afterwards, so callers recompute
/// at the point headers are needed.
///
/// # Errors
///
/// Returns [`Error::PropertiesTooLarge`] when the serialized properties
/// exceed the cap; the header is never silently truncated.
pub fn compute_headers(config: &ApiRequestConfig) -> Result<Headers> {
    let mut headers = config.base.headers().clone();

    headers.set(API_VERSION_HEADER, config.api_version.to_string())?;

    match &config.app_version {
        Some(version) => headers.set(APP_VERSION_HEADER, version.clone())?,
        None => headers.remove(APP_VERSION_HEADER),
    }

    if config.properties.is_empty() {
        headers.remove(PROPERTIES_HEADER);
    } else {
        let serialized = Value::Object(config.properties.clone()).to_string();
        let limit = config.base.defaults().max_properties_bytes;
        // Strictly under the cap: a serialization exactly at the limit fails.
        if serialized.len() >= limit {
            return Err(Error::PropertiesTooLarge {
                size: serialized.len(),
                limit,
            });
        }
        headers.set(PROPERTIES_HEADER, serialized)?;
    }

    Ok(headers)
}

/// Appends a percent-encoded query string built from a query object.
fn append_query(url: String, query: &serde_json::Map<String, Value>) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in query {
        match value {
            Value::String(s) => serializer.append_pair(key, s),
            other => serializer.append_pair(key, &other.to_string()),
        };
    }
    let query_string = serializer.finish();
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{query_string}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn api_config(url: &str) -> ApiRequestConfig {
        ApiRequestConfig::new(url, Arc::new(ClientContext::default()))
    }

    #[test]
    fn test_method_is_case_normalized_and_validated() {
        let mut config = RequestConfig::new("https://x/y");
        config.set_method("delete").unwrap();
        assert_eq!(config.method(), &Method::DELETE);

        assert!(matches!(
            config.set_method("TRACE"),
            Err(Error::InvalidMethod(_))
        ));
        // Failed set leaves the previous method in place.
        assert_eq!(config.method(), &Method::DELETE);
    }

    #[test]
    fn test_accept_header_defaulted_and_overwritable() {
        let config = RequestConfig::new("https://x/y");
        assert_eq!(config.headers().get("accept"), Some("application/json"));

        let mut config = RequestConfig::new("https://x/y");
        config
            .set_headers(&json!({ "x-custom": "1" }))
            .unwrap();
        assert_eq!(config.headers().get("accept"), Some("application/json"));

        config
            .set_headers(&json!({ "Accept": "text/xml" }))
            .unwrap();
        assert_eq!(config.headers().get("accept"), Some("text/xml"));
    }

    #[test]
    fn test_no_cache_reads_differ_but_stored_url_is_untouched() {
        let mut config = RequestConfig::new("https://x/y");
        assert_eq!(config.url(), config.url());

        config.set_no_cache(true);
        let first = config.url();
        let second = config.url();
        assert_ne!(first, second);
        assert!(first.starts_with("https://x/y?_="));
        assert_eq!(config.raw_url(), "https://x/y");
    }

    #[test]
    fn test_timeout_falls_back_to_default() {
        let mut config = RequestConfig::new("https://x/y");
        config.set_timeout(Duration::from_secs(5));
        assert_eq!(config.timeout(), Duration::from_secs(5));

        config.set_timeout(None);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_query_object_is_appended_to_the_url() {
        let mut config = api_config("https://x/y");
        config.set_query(Some(json!({ "a": 1 }))).unwrap();
        assert_eq!(config.url(), "https://x/y?a=1");

        // Empty query objects leave the URL alone.
        config.set_query(Some(json!({}))).unwrap();
        assert_eq!(config.url(), "https://x/y");

        assert!(matches!(
            config.set_query(Some(json!([1, 2]))),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_query_values_are_percent_encoded() {
        let mut config = api_config("https://x/y");
        config
            .set_query(Some(json!({ "name": "a b&c" })))
            .unwrap();
        assert_eq!(config.url(), "https://x/y?name=a+b%26c");
    }

    #[test]
    fn test_cache_bust_is_applied_underneath_the_query_string() {
        let mut config = api_config("https://x/y");
        config.base_mut().set_no_cache(true);
        config.set_query(Some(json!({ "a": 1 }))).unwrap();

        let url = config.url();
        // raw URL -> cache-bust -> query append
        assert!(url.starts_with("https://x/y?_="));
        assert!(url.ends_with("&a=1"));
    }

    #[test]
    fn test_path_segments_are_extracted_and_decoded() {
        let config = api_config("https://host/appdata/myapp/mycollection/abc123/");
        let segments = config.segments();
        assert_eq!(segments.namespace.as_deref(), Some("appdata"));
        assert_eq!(segments.app_key.as_deref(), Some("myapp"));
        assert_eq!(segments.collection.as_deref(), Some("mycollection"));
        assert_eq!(segments.entity_id.as_deref(), Some("abc123"));

        let config = api_config("https://host/appdata/myapp/my%20books");
        assert_eq!(config.segments().collection.as_deref(), Some("my books"));
        assert_eq!(config.segments().entity_id, None);
    }

    #[test]
    fn test_segments_serialize_for_snapshots() {
        let config = api_config("https://host/appdata/myapp/books");
        let value = serde_json::to_value(config.segments()).unwrap();
        assert_eq!(value["app_key"], "myapp");
        assert_eq!(value["entity_id"], Value::Null);
    }

    #[test]
    fn test_non_matching_urls_still_succeed() {
        let config = api_config("https://host/");
        assert_eq!(config.segments(), &PathSegments::default());

        let config = api_config("/appdata/myapp");
        assert_eq!(config.segments().namespace.as_deref(), Some("appdata"));
        assert_eq!(config.segments().app_key.as_deref(), Some("myapp"));
        assert_eq!(config.segments().collection, None);
    }

    #[test]
    fn test_empty_segments_hold_their_position() {
        // Consecutive slashes leave a hole; later segments keep their slots.
        let config = api_config("https://host/appdata//books");
        let segments = config.segments();
        assert_eq!(segments.namespace.as_deref(), Some("appdata"));
        assert_eq!(segments.app_key, None);
        assert_eq!(segments.collection.as_deref(), Some("books"));
        assert_eq!(segments.entity_id, None);
    }

    #[test]
    fn test_set_url_reextracts_segments() {
        let mut config = api_config("https://host/appdata/one/books");
        config.set_url("https://host/user/two");
        assert_eq!(config.segments().namespace.as_deref(), Some("user"));
        assert_eq!(config.segments().app_key.as_deref(), Some("two"));
        assert_eq!(config.segments().collection, None);
    }

    #[test]
    fn test_app_version_joins_up_to_three_segments() {
        let mut config = api_config("https://x/y");
        config.set_app_version([1, 2, 3]);
        assert_eq!(config.app_version(), Some("1.2.3"));

        config.set_app_version([1]);
        assert_eq!(config.app_version(), Some("1"));

        config.set_app_version(Vec::<u32>::new());
        assert_eq!(config.app_version(), None);
    }

    #[test]
    fn test_derived_headers_recompute_on_every_read() {
        let mut config = api_config("https://x/y");

        let headers = config.headers().unwrap();
        assert_eq!(headers.get(API_VERSION_HEADER), Some("3"));
        assert!(!headers.has(APP_VERSION_HEADER));
        assert!(!headers.has(PROPERTIES_HEADER));

        config.set_app_version(["2", "1"]);
        config.set_properties(json!({ "tier": "gold" })).unwrap();

        let headers = config.headers().unwrap();
        assert_eq!(headers.get(APP_VERSION_HEADER), Some("2.1"));
        assert_eq!(headers.get(PROPERTIES_HEADER), Some(r#"{"tier":"gold"}"#));

        config.clear_app_version();
        let headers = config.headers().unwrap();
        assert!(!headers.has(APP_VERSION_HEADER));
    }

    #[test]
    fn test_properties_over_the_byte_cap_fail_the_header_read() {
        let mut config = api_config("https://x/y");
        let big = "x".repeat(MAX_PROPERTIES_BYTES);
        config.set_properties(json!({ "blob": big })).unwrap();

        assert!(matches!(
            config.headers(),
            Err(Error::PropertiesTooLarge { .. })
        ));

        let small = "x".repeat(16);
        config.set_properties(json!({ "blob": small })).unwrap();
        assert!(config.headers().is_ok());
    }

    #[test]
    fn test_properties_cap_counts_serialized_bytes_not_characters() {
        let defaults = ConfigDefaults {
            max_properties_bytes: 24,
            ..Default::default()
        };
        let mut config = ApiRequestConfig::with_defaults(
            "https://x/y",
            Arc::new(ClientContext::default()),
            defaults,
        );

        // {"k":"ééééé"} is 13 characters but 18 bytes serialized.
        config.set_properties(json!({ "k": "ééééé" })).unwrap();
        assert!(config.headers().is_ok());

        config.set_properties(json!({ "k": "ééééééééé" })).unwrap();
        assert!(matches!(
            config.headers(),
            Err(Error::PropertiesTooLarge { size: 26, limit: 24 })
        ));
    }

    #[test]
    fn test_properties_exactly_at_the_cap_fail() {
        let defaults = ConfigDefaults {
            max_properties_bytes: 24,
            ..Default::default()
        };
        let mut config = ApiRequestConfig::with_defaults(
            "https://x/y",
            Arc::new(ClientContext::default()),
            defaults,
        );

        // {"k":"<16 a's>"} serializes to exactly 24 bytes.
        config.set_properties(json!({ "k": "a".repeat(16) })).unwrap();
        assert!(matches!(
            config.headers(),
            Err(Error::PropertiesTooLarge { size: 24, limit: 24 })
        ));

        // One byte under the cap passes.
        config.set_properties(json!({ "k": "a".repeat(15) })).unwrap();
        assert!(config.headers().is_ok());
    }

    #[test]
    fn test_api_version_falls_back_to_default() {
        let mut config = api_config("https://x/y");
        config.set_api_version(5);
        assert_eq!(config.api_version(), 5);

        config.set_api_version(None);
        assert_eq!(config.api_version(), DEFAULT_API_VERSION);
    }
}
