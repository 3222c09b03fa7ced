//! Credential resolution strategies.
//!
//! Authentication is a priority-ordered cascade rather than a single fixed
//! scheme: the client may hold only app-level credentials, only the master
//! secret, or a live user session, and request builders should not need to
//! know which is available. Each [`AuthType`] names either a single strategy
//! or a composite that tries candidates in order.
//!
//! Only credential-class failures ([`Error::is_credential_failure`]) trigger
//! the next candidate in a composite; any other error propagates immediately.
//! Each composite defines which candidate's error is surfaced when every
//! candidate fails; see [`resolve`] for the per-type rules.

use crate::{ClientContext, Error, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// Names the credential scheme that authorizes a request.
///
/// # Examples
///
/// ```
/// use backhaul::{AuthType, ClientContext};
/// use backhaul::auth::resolve;
///
/// // `None` never attaches credentials.
/// let context = ClientContext::default();
/// assert!(resolve(AuthType::None, &context).unwrap().is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthType {
    /// Try the active user session, then fall back to `Basic`.
    All,
    /// App key + app secret as HTTP Basic credentials.
    App,
    /// Try `Master`, then fall back to `App`; the `App` failure is surfaced
    /// if both fail.
    Basic,
    /// Try the active user session, then fall back to `Master`; the
    /// *session* failure is surfaced if both fail.
    #[default]
    Default,
    /// App key + master secret as HTTP Basic credentials.
    Master,
    /// No credentials attached.
    None,
    /// The active user's session token.
    Session,
}

/// The credentials produced by a strategy, before header encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// A username/password pair, base64-encoded into the header value.
    Basic {
        /// The username half of the pair.
        username: String,
        /// The password half of the pair.
        password: String,
    },
    /// An opaque token used verbatim in the header value.
    Token(String),
}

/// A resolved `(scheme, credentials)` pair ready to become an
/// `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCredential {
    /// The authorization scheme, e.g. `Basic` or `Session`.
    pub scheme: String,
    /// The credentials carried under that scheme.
    pub credentials: Credentials,
}

impl AuthCredential {
    fn basic(scheme: &str, username: &str, password: &str) -> Self {
        Self {
            scheme: scheme.to_string(),
            credentials: Credentials::Basic {
                username: username.to_string(),
                password: password.to_string(),
            },
        }
    }

    /// Renders the `Authorization` header value: `"{scheme} {credentials}"`,
    /// where a username/password pair is base64-encoded as `user:pass` and a
    /// token is used verbatim.
    ///
    /// # Examples
    ///
    /// ```
    /// use backhaul::auth::{AuthCredential, Credentials};
    ///
    /// let credential = AuthCredential {
    ///     scheme: "Basic".to_string(),
    ///     credentials: Credentials::Basic {
    ///         username: "key".to_string(),
    ///         password: "secret".to_string(),
    ///     },
    /// };
    /// assert_eq!(credential.authorization_value(), "Basic a2V5OnNlY3JldA==");
    /// ```
    pub fn authorization_value(&self) -> String {
        match &self.credentials {
            Credentials::Basic { username, password } => {
                let encoded = BASE64.encode(format!("{username}:{password}"));
                format!("{} {}", self.scheme, encoded)
            }
            Credentials::Token(token) => format!("{} {}", self.scheme, token),
        }
    }
}

/// Resolves an [`AuthType`] against the client's credentials.
///
/// Returns `Ok(None)` when the type attaches no credentials, `Ok(Some(..))`
/// with the resolved `(scheme, credentials)` pair, or the surfaced error for
/// the type's cascade:
///
/// * `None` - always `Ok(None)`.
/// * `App` / `Master` / `Session` - single strategies, their own error.
/// * `Basic` - `master`, then `app`; the `app` error surfaces.
/// * `All` - `session`, then `basic`.
/// * `Default` - `session`, then `master`; when both fail, the *original
///   session* error surfaces so callers see the session-specific failure.
pub fn resolve(auth_type: AuthType, context: &ClientContext) -> Result<Option<AuthCredential>> {
    let resolved = match auth_type {
        AuthType::None => return Ok(None),
        AuthType::App => app(context),
        AuthType::Master => master(context),
        AuthType::Basic => basic(context),
        AuthType::Session => session(context),
        AuthType::All => match session(context) {
            Ok(credential) => Ok(credential),
            Err(e) if e.is_credential_failure() => basic(context),
            Err(e) => Err(e),
        },
        AuthType::Default => match session(context) {
            Ok(credential) => Ok(credential),
            Err(session_err) if session_err.is_credential_failure() => match master(context) {
                Ok(credential) => Ok(credential),
                // Callers rely on seeing the session-specific error, not
                // the master one.
                Err(e) if e.is_credential_failure() => Err(session_err),
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        },
    };

    match &resolved {
        Ok(credential) => tracing::debug!(
            auth_type = ?auth_type,
            scheme = %credential.scheme,
            "Resolved request credentials"
        ),
        Err(e) => tracing::debug!(
            auth_type = ?auth_type,
            error = %e,
            "Failed to resolve request credentials"
        ),
    }

    resolved.map(Some)
}

fn app(context: &ClientContext) -> Result<AuthCredential> {
    match (&context.app_key, &context.app_secret) {
        (Some(key), Some(secret)) => Ok(AuthCredential::basic("Basic", key, secret)),
        _ => Err(Error::CredentialsMissing {
            strategy: "app",
            missing: "app key and app secret",
        }),
    }
}

fn master(context: &ClientContext) -> Result<AuthCredential> {
    match (&context.app_key, &context.master_secret) {
        (Some(key), Some(secret)) => Ok(AuthCredential::basic("Basic", key, secret)),
        _ => Err(Error::CredentialsMissing {
            strategy: "master",
            missing: "app key and master secret",
        }),
    }
}

fn basic(context: &ClientContext) -> Result<AuthCredential> {
    match master(context) {
        Ok(credential) => Ok(credential),
        Err(e) if e.is_credential_failure() => app(context),
        Err(e) => Err(e),
    }
}

fn session(context: &ClientContext) -> Result<AuthCredential> {
    let token = context
        .active_session_token()
        .ok_or(Error::NoActiveSession)?;
    Ok(AuthCredential {
        scheme: "Session".to_string(),
        credentials: Credentials::Token(token.to_string()),
    })
}
