//! Firebase web app configuration.
//!
//! The shape matches the config object the Firebase console hands out for a web
//! app (`apiKey`, `authDomain`, `projectId`, ...), so the same JSON file can be
//! shared with other clients of the project.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a [`FirebaseConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The config JSON is malformed.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A required environment variable is not set.
    #[error("Missing environment variable {0}")]
    MissingVar(&'static str),
    /// A required field is present but empty.
    #[error("Config field `{0}` must not be empty")]
    EmptyField(&'static str),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messaging_sender_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_id: Option<String>,
}

impl FirebaseConfig {
    /// Reads the config from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parses the config from a JSON string.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: FirebaseConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the config from `FIREBASE_*` environment variables.
    ///
    /// `FIREBASE_API_KEY`, `FIREBASE_AUTH_DOMAIN` and `FIREBASE_PROJECT_ID` are required.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::MissingVar(name));

        let config = FirebaseConfig {
            api_key: required("FIREBASE_API_KEY")?,
            auth_domain: required("FIREBASE_AUTH_DOMAIN")?,
            project_id: required("FIREBASE_PROJECT_ID")?,
            storage_bucket: lookup("FIREBASE_STORAGE_BUCKET"),
            messaging_sender_id: lookup("FIREBASE_MESSAGING_SENDER_ID"),
            app_id: lookup("FIREBASE_APP_ID"),
            measurement_id: lookup("FIREBASE_MEASUREMENT_ID"),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that the fields every service needs are set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::EmptyField("apiKey"));
        }
        if self.project_id.trim().is_empty() {
            return Err(ConfigError::EmptyField("projectId"));
        }
        Ok(())
    }

    /// The OAuth handler URL on the project's auth domain.
    pub fn auth_handler_url(&self) -> String {
        format!("https://{}/__/auth/handler", self.auth_domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn parses_console_config() {
        let raw = r#"{
            "apiKey": "AIzaSyTest",
            "authDomain": "quiz-app.firebaseapp.com",
            "projectId": "quiz-app",
            "storageBucket": "quiz-app.appspot.com",
            "messagingSenderId": "1234",
            "appId": "1:1234:web:abcd"
        }"#;

        let config = FirebaseConfig::from_json(raw).unwrap();
        assert_eq!(config.api_key, "AIzaSyTest");
        assert_eq!(config.project_id, "quiz-app");
        assert_eq!(config.storage_bucket.as_deref(), Some("quiz-app.appspot.com"));
        assert_eq!(config.measurement_id, None);
        assert_eq!(
            config.auth_handler_url(),
            "https://quiz-app.firebaseapp.com/__/auth/handler"
        );
    }

    #[test]
    fn rejects_empty_project_id() {
        let raw = r#"{ "apiKey": "key", "authDomain": "d", "projectId": "" }"#;
        let err = FirebaseConfig::from_json(raw).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyField("projectId")));
    }

    #[test]
    fn reads_environment() {
        let vars: HashMap<&str, &str> = [
            ("FIREBASE_API_KEY", "key"),
            ("FIREBASE_AUTH_DOMAIN", "quiz-app.firebaseapp.com"),
            ("FIREBASE_PROJECT_ID", "quiz-app"),
            ("FIREBASE_APP_ID", "1:1234:web:abcd"),
        ]
        .into_iter()
        .collect();

        let config =
            FirebaseConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.auth_domain, "quiz-app.firebaseapp.com");
        assert_eq!(config.app_id.as_deref(), Some("1:1234:web:abcd"));
        assert_eq!(config.storage_bucket, None);
    }

    #[test]
    fn missing_required_variable() {
        let err = FirebaseConfig::from_lookup(|name| {
            (name == "FIREBASE_API_KEY").then(|| "key".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("FIREBASE_AUTH_DOMAIN")));
    }
}
