//! Firebase access layer for the quiz app.
//!
//! A [`FirebaseApp`] is built once from a [`FirebaseConfig`] and handed to the
//! [`Backend`](backend::Backend), which exposes the Auth and Firestore handles,
//! the Google/Facebook/GitHub sign-in flows and the profile and quiz helpers.
//!
//! ```rust,no_run
//! # use quiz_firebase::{backend::Backend, auth::driver::AuthDriver, FirebaseConfig};
//! # use std::sync::Arc;
//! # async fn run(driver: Arc<dyn AuthDriver>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = FirebaseConfig::from_file("firebase.json")?;
//! let backend = Backend::initialize(config, driver);
//!
//! let credential = backend.sign_in_with_google().await?;
//! backend
//!     .create_user_profile_document(Some(&credential.user), &serde_json::Map::new())
//!     .await?;
//!
//! let snapshot = backend.firestore().collection("collections").get().await?;
//! let quizzes = quiz_firebase::backend::convert_collections_snapshot_to_map(&snapshot)?;
//! # let _ = quizzes;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod backend;
pub mod core;
pub mod firestore;

pub use crate::core::config::{ConfigError, FirebaseConfig};

use crate::core::middleware::ApiKeyMiddleware;
use crate::core::session::Session;
use auth::driver::AuthDriver;
use auth::FirebaseAuth;
use firestore::FirebaseFirestore;
use std::sync::Arc;

/// The initialized backend context: project config plus the signed-in session.
#[derive(Clone)]
pub struct FirebaseApp {
    config: FirebaseConfig,
    session: Arc<Session>,
}

impl FirebaseApp {
    pub fn new(config: FirebaseConfig) -> Self {
        Self {
            config,
            session: Arc::new(Session::new()),
        }
    }

    pub fn config(&self) -> &FirebaseConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn auth(&self, driver: Arc<dyn AuthDriver>) -> FirebaseAuth {
        FirebaseAuth::new(self, driver)
    }

    pub fn firestore(&self) -> FirebaseFirestore {
        FirebaseFirestore::new(self)
    }

    pub(crate) fn middleware(&self) -> ApiKeyMiddleware {
        ApiKeyMiddleware::new(self.config.api_key.clone())
    }
}
