//! The interactive half of an OAuth sign-in.
//!
//! The Identity Toolkit hands back an authorization URL; something on the
//! application side has to show it to the user (a browser redirect, a popup
//! window, a webview) and capture the URL the provider redirects back to.
//! That component implements [`AuthDriver`].

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInMode {
    /// Navigate the current window to the provider.
    Redirect,
    /// Open the provider in a separate window and keep the current one.
    Popup,
}

impl fmt::Display for SignInMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignInMode::Redirect => f.write_str("redirect"),
            SignInMode::Popup => f.write_str("popup"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizationRequest {
    pub mode: SignInMode,
    pub provider_id: String,
    /// Provider authorization page to open.
    pub auth_uri: String,
    pub session_id: Option<String>,
}

#[async_trait::async_trait]
pub trait AuthDriver: Send + Sync {
    /// Runs the provider's authorization page and returns the full callback
    /// URL, including the query string or fragment the provider appended.
    async fn authorize(&self, request: AuthorizationRequest) -> anyhow::Result<String>;
}
