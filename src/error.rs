//! Error types for request configuration and credential resolution.
//!
//! Every failure in this crate is raised synchronously at the call that
//! triggered it. Validation errors come from config setters, credential
//! errors from the auth resolver, and the reentrancy error from
//! [`execute`](crate::Request::execute). The crate performs no retries;
//! retry policy belongs to whatever sits on top of the transport.

/// The main error type for request configuration and credential resolution.
///
/// # Examples
///
/// ```
/// use backhaul::{Error, RequestConfig};
///
/// let mut config = RequestConfig::new("https://api.example.com/data");
/// match config.set_method("TRACE") {
///     Err(Error::InvalidMethod(m)) => assert_eq!(m, "TRACE"),
///     other => panic!("expected InvalidMethod, got {:?}", other),
/// }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The method string is not one of GET, POST, PATCH, PUT, or DELETE.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// A header name or value failed validation.
    ///
    /// Raised when setting a header with an empty name, or a missing/empty
    /// value.
    #[error("Invalid header: {reason}")]
    InvalidHeader {
        /// What was wrong with the header.
        reason: String,
    },

    /// An argument that must be a plain key-value object was something else.
    ///
    /// Raised by `add_all` on headers, and by the query/properties setters.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An auth strategy's required credential fields are absent.
    ///
    /// May be swallowed by a higher-priority fallback strategy, or surfaced
    /// to the caller once all fallbacks are exhausted.
    ///
    /// # Fields
    ///
    /// * `strategy` - The strategy that failed (`app`, `master`, ...)
    /// * `missing` - Which credential fields were absent
    #[error("Missing credentials for {strategy} authentication: {missing}")]
    CredentialsMissing {
        /// The auth strategy that could not be satisfied.
        strategy: &'static str,
        /// The credential fields that were absent.
        missing: &'static str,
    },

    /// The session auth strategy was invoked with no logged-in user,
    /// or the active user carries no usable session token.
    #[error("No active user session")]
    NoActiveSession,

    /// The serialized custom-properties header exceeds the configured byte
    /// cap. Always fatal to the header computation; never silently truncated.
    ///
    /// # Fields
    ///
    /// * `size` - The serialized size in bytes
    /// * `limit` - The configured cap
    #[error("Custom request properties are {size} bytes; the limit is {limit} bytes")]
    PropertiesTooLarge {
        /// Serialized byte length of the properties object.
        size: usize,
        /// The configured maximum.
        limit: usize,
    },

    /// `execute()` was invoked on a request that is already executing.
    ///
    /// A request object is single-use-in-flight; build a fresh one per
    /// attempt.
    #[error("Request is already executing; create a new request instance")]
    AlreadyExecuting,

    /// A network-level error occurred while the transport was sending a
    /// prepared request.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// An invalid URL was handed to the transport.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns `true` if this error is a credential-class failure.
    ///
    /// Only credential-class failures are eligible to trigger the next
    /// strategy in a composite auth cascade. Anything else propagates
    /// immediately instead of being mis-reported as a fallback attempt.
    ///
    /// # Examples
    ///
    /// ```
    /// use backhaul::Error;
    ///
    /// assert!(Error::NoActiveSession.is_credential_failure());
    /// assert!(!Error::InvalidMethod("TRACE".into()).is_credential_failure());
    /// ```
    pub fn is_credential_failure(&self) -> bool {
        matches!(
            self,
            Error::CredentialsMissing { .. } | Error::NoActiveSession
        )
    }
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
