//! Identity provider descriptors for the supported OAuth sign-in sources.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Returned when a provider id does not name a supported provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No identity provider registered for `{0}`")]
pub struct ProviderLookupError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Google,
    GitHub,
    Facebook,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [ProviderKind::Google, ProviderKind::GitHub, ProviderKind::Facebook];

    /// The Firebase provider id, as returned by `fetchSignInMethodsForEmail`.
    pub fn provider_id(self) -> &'static str {
        match self {
            ProviderKind::Google => "google.com",
            ProviderKind::GitHub => "github.com",
            ProviderKind::Facebook => "facebook.com",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.provider_id())
    }
}

impl FromStr for ProviderKind {
    type Err = ProviderLookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.provider_id() == s)
            .ok_or_else(|| ProviderLookupError(s.to_string()))
    }
}

/// A configured OAuth provider: which IdP, plus the custom parameters and
/// scopes sent when starting its authorization flow.
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthProvider {
    kind: ProviderKind,
    custom_parameters: BTreeMap<String, String>,
    scopes: Vec<String>,
}

impl OAuthProvider {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            custom_parameters: BTreeMap::new(),
            scopes: Vec::new(),
        }
    }

    /// Google, always showing the account chooser.
    pub fn google() -> Self {
        Self::new(ProviderKind::Google).with_custom_parameter("prompt", "select_account")
    }

    /// Facebook, rendering its dialog in popup form.
    pub fn facebook() -> Self {
        Self::new(ProviderKind::Facebook).with_custom_parameter("display", "popup")
    }

    /// GitHub, offering to pick the account.
    pub fn github() -> Self {
        Self::new(ProviderKind::GitHub).with_custom_parameter("login", "select_account")
    }

    pub fn with_custom_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.push(scope.into());
        self
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn provider_id(&self) -> &'static str {
        self.kind.provider_id()
    }

    pub fn custom_parameters(&self) -> &BTreeMap<String, String> {
        &self.custom_parameters
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }
}

/// The fixed set of providers the app signs in with, one descriptor per kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRegistry {
    google: OAuthProvider,
    github: OAuthProvider,
    facebook: OAuthProvider,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self {
            google: OAuthProvider::google(),
            github: OAuthProvider::github(),
            facebook: OAuthProvider::facebook(),
        }
    }
}

impl ProviderRegistry {
    /// Replaces the descriptor registered for `provider.kind()`.
    pub fn with_provider(mut self, provider: OAuthProvider) -> Self {
        match provider.kind() {
            ProviderKind::Google => self.google = provider,
            ProviderKind::GitHub => self.github = provider,
            ProviderKind::Facebook => self.facebook = provider,
        }
        self
    }

    pub fn get(&self, kind: ProviderKind) -> &OAuthProvider {
        match kind {
            ProviderKind::Google => &self.google,
            ProviderKind::GitHub => &self.github,
            ProviderKind::Facebook => &self.facebook,
        }
    }

    /// Resolves a provider id such as `github.com`.
    pub fn lookup(&self, provider_id: &str) -> Result<&OAuthProvider, ProviderLookupError> {
        let kind: ProviderKind = provider_id.parse()?;
        Ok(self.get(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_descriptors() {
        let registry = ProviderRegistry::default();

        let google = registry.get(ProviderKind::Google);
        assert_eq!(google.provider_id(), "google.com");
        assert_eq!(google.custom_parameters().get("prompt").map(String::as_str), Some("select_account"));

        let facebook = registry.get(ProviderKind::Facebook);
        assert_eq!(facebook.custom_parameters().get("display").map(String::as_str), Some("popup"));

        let github = registry.get(ProviderKind::GitHub);
        assert_eq!(github.custom_parameters().get("login").map(String::as_str), Some("select_account"));
    }

    #[test]
    fn lookup_by_provider_id() {
        let registry = ProviderRegistry::default();
        assert_eq!(registry.lookup("github.com").unwrap().kind(), ProviderKind::GitHub);
        assert_eq!(registry.lookup("facebook.com").unwrap().kind(), ProviderKind::Facebook);
    }

    #[test]
    fn lookup_unknown_provider() {
        let registry = ProviderRegistry::default();
        assert_eq!(
            registry.lookup("password").unwrap_err(),
            ProviderLookupError("password".to_string())
        );
    }

    #[test]
    fn replace_descriptor() {
        let registry = ProviderRegistry::default()
            .with_provider(OAuthProvider::github().with_scope("read:user"));
        assert_eq!(registry.get(ProviderKind::GitHub).scopes(), ["read:user".to_string()]);
    }
}
