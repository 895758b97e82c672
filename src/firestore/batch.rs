use super::models::{CommitRequest, CommitResponse, Document, Precondition, Write, WriteResult};
use super::reference::{convert_serializable_to_fields, DocumentReference};
use super::FirestoreError;
use crate::core::parse_error_response;
use reqwest::header;
use reqwest_middleware::ClientWithMiddleware;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};

/// Represents a Firestore Write Batch.
///
/// Writes are staged locally and sent in a single `commit` request, which the
/// server applies atomically.
///
/// # Examples
///
/// ```rust,no_run
/// # use quiz_firebase::firestore::FirebaseFirestore;
/// # use serde_json::json;
/// # async fn run(firestore: FirebaseFirestore) -> Result<(), Box<dyn std::error::Error>> {
/// let quizzes = firestore.collection("quizzes");
/// let batch = firestore.batch();
///
/// batch.create(&quizzes.new_doc(), &json!({"title": "Rust"}))?;
/// batch.create(&quizzes.new_doc(), &json!({"title": "Go"}))?;
/// batch.commit().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct WriteBatch<'a> {
    client: &'a ClientWithMiddleware,
    base_url: &'a str,
    writes: Arc<Mutex<Vec<Write>>>,
}

impl<'a> WriteBatch<'a> {
    pub(crate) fn new(client: &'a ClientWithMiddleware, base_url: &'a str) -> Self {
        Self {
            client,
            base_url,
            writes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Stages the creation of the document referred to by `document`.
    ///
    /// The commit fails if the document already exists.
    pub fn create<T: Serialize + ?Sized>(
        &self,
        document: &DocumentReference<'_>,
        value: &T,
    ) -> Result<&Self, FirestoreError> {
        let fields = convert_serializable_to_fields(value)?;

        let write = Write {
            update: Document {
                name: document.resource_name(),
                fields,
                create_time: String::new(),
                update_time: String::new(),
            },
            current_document: Some(Precondition {
                exists: Some(false),
            }),
        };

        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(write);
        Ok(self)
    }

    /// Number of writes staged and not yet committed.
    pub fn len(&self) -> usize {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Commits the batch of writes.
    ///
    /// An empty batch sends nothing and returns no results.
    pub async fn commit(&self) -> Result<Vec<WriteResult>, FirestoreError> {
        let writes = std::mem::take(
            &mut *self
                .writes
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );

        if writes.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}:commit", self.base_url);
        let count = writes.len();
        let request = CommitRequest { writes };

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(&request)?)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FirestoreError::ApiError(
                parse_error_response(response, "Commit batch failed").await,
            ));
        }

        let result: CommitResponse = response.json().await?;
        tracing::debug!(writes = count, commit_time = ?result.commit_time, "batch committed");
        Ok(result.write_results)
    }
}
