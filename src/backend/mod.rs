//! The quiz app's entry point into Firebase.
//!
//! [`Backend`] owns the initialized [`FirebaseApp`] together with its Auth and
//! Firestore handles and the provider descriptors. Build it once at startup and
//! pass it by reference wherever the app needs the backend.

mod profile;
mod quiz;
mod sign_in;


pub use profile::{ProfileError, USERS_COLLECTION};
pub use quiz::{convert_collections_snapshot_to_map, encode_uri, MalformedSnapshotError, QuizCollection};

use crate::auth::driver::AuthDriver;
use crate::auth::provider::ProviderRegistry;
use crate::auth::FirebaseAuth;
use crate::firestore::FirebaseFirestore;
use crate::{FirebaseApp, FirebaseConfig};
use std::sync::Arc;

pub struct Backend {
    app: FirebaseApp,
    auth: FirebaseAuth,
    firestore: FirebaseFirestore,
    providers: ProviderRegistry,
}

impl Backend {
    /// Initializes the app from `config` and derives the Auth and Firestore handles.
    pub fn initialize(config: FirebaseConfig, driver: Arc<dyn AuthDriver>) -> Self {
        let app = FirebaseApp::new(config);
        let auth = app.auth(driver);
        let firestore = app.firestore();
        tracing::debug!(project_id = %app.config().project_id, "firebase backend initialized");
        Self::from_parts(app, auth, firestore, ProviderRegistry::default())
    }

    /// Assembles a backend from handles built elsewhere, e.g. against an emulator.
    pub fn from_parts(
        app: FirebaseApp,
        auth: FirebaseAuth,
        firestore: FirebaseFirestore,
        providers: ProviderRegistry,
    ) -> Self {
        Self {
            app,
            auth,
            firestore,
            providers,
        }
    }

    pub fn app(&self) -> &FirebaseApp {
        &self.app
    }

    pub fn auth(&self) -> &FirebaseAuth {
        &self.auth
    }

    pub fn firestore(&self) -> &FirebaseFirestore {
        &self.firestore
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }
}
