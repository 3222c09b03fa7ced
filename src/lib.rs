//! # Backhaul - request configuration and credential resolution for BaaS clients
//!
//! Backhaul is the request-building core of a backend-as-a-service client
//! SDK. It assembles an outgoing request's method, URL, headers, body, and
//! query string from a declarative configuration, resolves which of several
//! credential schemes to attach, and validates protocol-level constraints
//! (header size caps, API versioning, cache-busting) before handing a fully
//! materialized request to a transport.
//!
//! ## Quick Start
//!
//! ```no_run
//! use backhaul::transport::{HttpTransport, Transport};
//! use backhaul::{ApiRequest, ApiRequestConfig, AuthType, ClientContext};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), backhaul::Error> {
//!     // The client context holds the credentials requests resolve against.
//!     let client = Arc::new(ClientContext {
//!         app_key: Some("myapp".to_string()),
//!         app_secret: Some("app-secret".to_string()),
//!         ..Default::default()
//!     });
//!
//!     // Build a declarative request configuration.
//!     let mut config = ApiRequestConfig::new(
//!         "https://baas.example.com/appdata/myapp/books",
//!         client,
//!     );
//!     config.set_method("POST")?;
//!     config.set_auth_type(AuthType::App);
//!     config.set_body(json!({ "title": "Dune" }));
//!     config.set_app_version([1, 2, 3]);
//!
//!     // Resolve credentials and materialize the request...
//!     let mut request = ApiRequest::new(config);
//!     let prepared = request.execute()?;
//!
//!     // ...then hand it to a transport.
//!     let transport = HttpTransport::builder().build()?;
//!     let response = transport.send(prepared).await?;
//!     println!("status: {}", response.status);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Validated configuration** - Setters validate synchronously; invalid
//!   methods, headers, and objects fail at the point of mutation
//! - **Cascading authentication** - Named credential strategies with
//!   explicit, per-type fallback and error-surfacing rules
//! - **Derived headers** - API version, app version, and size-capped custom
//!   properties are recomputed from the current state on every read
//! - **Case-insensitive headers** - One entry per header name, with JSON
//!   serialization of non-string values
//! - **Entity-path extraction** - `/:namespace/:appKey/:collection/:entityId`
//!   segments parsed and percent-decoded from the request URL
//! - **Single-shot execution** - Requests guard against accidental reuse
//!   while in flight
//! - **Pluggable transport** - A small trait seam over `reqwest`, with no
//!   retry or response-parsing policy baked in
//!
//! ## Authentication
//!
//! Authentication is a priority-ordered cascade rather than a single fixed
//! scheme, because a client may hold only app-level credentials, only the
//! master secret, or a live user session:
//!
//! ```
//! use backhaul::auth::resolve;
//! use backhaul::{AuthType, ClientContext};
//!
//! let context = ClientContext {
//!     app_key: Some("myapp".to_string()),
//!     master_secret: Some("master-secret".to_string()),
//!     ..Default::default()
//! };
//!
//! // No session is active, so `All` falls back to Basic credentials.
//! let credential = resolve(AuthType::All, &context).unwrap().unwrap();
//! assert_eq!(credential.scheme, "Basic");
//! ```

pub mod auth;
mod config;
mod context;
mod error;
mod headers;
mod request;
pub mod transport;

pub use auth::AuthType;
pub use config::{
    compute_headers, ApiRequestConfig, ConfigDefaults, PathSegments, RequestConfig,
    DEFAULT_API_VERSION, DEFAULT_TIMEOUT, MAX_PROPERTIES_BYTES,
};
pub use context::{ActiveUser, ClientContext};
pub use error::{Error, Result};
pub use headers::Headers;
pub use request::{ApiRequest, PreparedRequest, Request};
