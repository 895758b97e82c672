//! Cloud Firestore module.
//!
//! This module provides the document-store handle: references to collections
//! and documents, snapshots of what was read, and atomic write batches.
//!
//! It mirrors the Firebase web SDK's structure using `CollectionReference` and
//! `DocumentReference`. Requests are authorized with the project's API key and,
//! once somebody has signed in, with that user's ID token.

pub mod batch;
pub mod models;
pub mod reference;
pub mod snapshot;

#[cfg(test)]
mod tests;

use self::batch::WriteBatch;
use self::reference::{CollectionReference, DocumentReference};
use crate::FirebaseApp;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use thiserror::Error;

const FIRESTORE_V1_API: &str =
    "https://firestore.googleapis.com/v1/projects/{project_id}/databases/(default)/documents";

/// Errors that can occur during Firestore operations.
#[derive(Error, Debug)]
pub enum FirestoreError {
    /// Wrapper for `reqwest::Error`.
    #[error("HTTP Request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    /// Wrapper for `reqwest_middleware::Error`.
    #[error("Middleware error: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),
    /// Errors returned by the Firestore API.
    #[error("API error: {0}")]
    ApiError(String),
    /// Wrapper for `serde_json::Error`.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    /// The configured endpoint is not a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Client for interacting with Cloud Firestore.
pub struct FirebaseFirestore {
    client: ClientWithMiddleware,
    base_url: String,
}

impl FirebaseFirestore {
    /// Creates a new `FirebaseFirestore` instance.
    ///
    /// This is typically called via `FirebaseApp::firestore()`.
    pub fn new(app: &FirebaseApp) -> Self {
        let base_url = FIRESTORE_V1_API.replace("{project_id}", &app.config().project_id);
        Self::new_with_url(app, base_url)
    }

    /// Creates a new `FirebaseFirestore` instance with a custom base URL (emulator, tests).
    pub fn new_with_url(app: &FirebaseApp, base_url: String) -> Self {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);

        let client = ClientBuilder::new(Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .with(app.middleware().with_session(app.session().clone()))
            .build();

        Self { client, base_url }
    }

    /// Gets a `CollectionReference` instance that refers to the collection at the specified path.
    ///
    /// # Arguments
    ///
    /// * `collection_id` - The ID of the collection (e.g., "quizzes").
    pub fn collection(&self, collection_id: &str) -> CollectionReference<'_> {
        CollectionReference {
            client: &self.client,
            base_url: &self.base_url,
            path: collection_id.trim_matches('/').to_string(),
        }
    }

    /// Gets a `DocumentReference` instance that refers to the document at the specified path.
    ///
    /// # Arguments
    ///
    /// * `document_path` - The slash-separated path to the document (e.g., "users/user1").
    pub fn doc(&self, document_path: &str) -> DocumentReference<'_> {
        DocumentReference {
            client: &self.client,
            base_url: &self.base_url,
            path: document_path.trim_matches('/').to_string(),
        }
    }

    /// Creates a write batch, used for performing multiple writes as a single atomic operation.
    pub fn batch(&self) -> WriteBatch<'_> {
        WriteBatch::new(&self.client, &self.base_url)
    }
}
