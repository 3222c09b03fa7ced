//! The client credential context that requests resolve auth against.
//!
//! [`ClientContext`] is a read-only view into the client's credentials. The
//! request layer references it (usually behind an `Arc`) and never mutates
//! it; the surrounding SDK owns it and keeps `active_user` in sync with the
//! session store. Both types serialize, so the session store can persist
//! and restore them as-is.

use serde::{Deserialize, Serialize};

/// Credentials held by the client: app-level secrets and, when an end-user is
/// logged in, the active user session.
///
/// # Examples
///
/// ```
/// use backhaul::{ActiveUser, ClientContext};
///
/// let context = ClientContext {
///     app_key: Some("my-app".to_string()),
///     app_secret: Some("app-secret".to_string()),
///     master_secret: None,
///     active_user: Some(ActiveUser::with_token("session-token")),
/// };
/// assert_eq!(context.active_session_token(), Some("session-token"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientContext {
    /// The application key identifying the backend app.
    pub app_key: Option<String>,
    /// The app-level secret, paired with `app_key` for app authentication.
    pub app_secret: Option<String>,
    /// The master secret, paired with `app_key` for master authentication.
    pub master_secret: Option<String>,
    /// The currently logged-in end-user, if any.
    pub active_user: Option<ActiveUser>,
}

impl ClientContext {
    /// Returns the active user's session token, if a user is logged in and
    /// their metadata carries one.
    pub fn active_session_token(&self) -> Option<&str> {
        self.active_user.as_ref()?.auth_token.as_deref()
    }
}

/// The logged-in end-user session tracked by the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveUser {
    /// The user's login name, when known.
    pub username: Option<String>,
    /// The session authentication token issued at login, carried in the
    /// user's metadata block. Absent when the session is invalid.
    pub auth_token: Option<String>,
}

impl ActiveUser {
    /// Creates an active user carrying the given session token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            username: None,
            auth_token: Some(token.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_user_restores_from_a_persisted_session() {
        let stored = r#"{"username":"alice","auth_token":"tok-123"}"#;
        let user: ActiveUser = serde_json::from_str(stored).unwrap();

        assert_eq!(user.username.as_deref(), Some("alice"));
        assert_eq!(user.auth_token.as_deref(), Some("tok-123"));
    }

    #[test]
    fn test_context_round_trips_through_the_session_store() {
        let context = ClientContext {
            app_key: Some("myapp".to_string()),
            active_user: Some(ActiveUser::with_token("tok-123")),
            ..Default::default()
        };

        let stored = serde_json::to_string(&context).unwrap();
        let restored: ClientContext = serde_json::from_str(&stored).unwrap();
        assert_eq!(restored.active_session_token(), Some("tok-123"));
    }
}
