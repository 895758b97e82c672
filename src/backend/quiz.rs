use super::Backend;
use crate::firestore::reference::DocumentReference;
use crate::firestore::snapshot::{DocumentSnapshot, QuerySnapshot};
use crate::firestore::FirestoreError;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

// Characters `encodeURI` leaves alone besides ASCII alphanumerics.
const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#');

/// Percent-encodes `input` the way a browser's `encodeURI` does.
pub fn encode_uri(input: &str) -> String {
    utf8_percent_encode(input, URI_ENCODE_SET).to_string()
}

/// A quiz as the app routes to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizCollection {
    pub route_name: String,
    pub id: String,
    pub title: String,
    pub questions: Value,
}

#[derive(Error, Debug)]
pub enum MalformedSnapshotError {
    #[error("Document {document_id} has no `{field}` field")]
    MissingField {
        document_id: String,
        field: &'static str,
    },
    #[error("Failed to read document data: {0}")]
    Firestore(#[from] FirestoreError),
}

fn quiz_from_document(doc: &DocumentSnapshot<'_>) -> Result<QuizCollection, MalformedSnapshotError> {
    let missing = |field| MalformedSnapshotError::MissingField {
        document_id: doc.id().to_string(),
        field,
    };

    let mut data: Map<String, Value> = doc.data()?.ok_or_else(|| missing("title"))?;
    let title = match data.remove("title") {
        Some(Value::String(title)) => title,
        _ => return Err(missing("title")),
    };
    let questions = data.remove("questions").ok_or_else(|| missing("questions"))?;

    Ok(QuizCollection {
        route_name: encode_uri(&title.to_lowercase()),
        id: doc.id().to_string(),
        title,
        questions,
    })
}

/// Indexes the quizzes of a snapshot by lowercased title.
///
/// When two documents share a lowercased title the later one wins.
pub fn convert_collections_snapshot_to_map(
    snapshot: &QuerySnapshot<'_>,
) -> Result<HashMap<String, QuizCollection>, MalformedSnapshotError> {
    snapshot.iter().try_fold(HashMap::new(), |mut quizzes, doc| {
        let quiz = quiz_from_document(doc)?;
        quizzes.insert(quiz.title.to_lowercase(), quiz);
        Ok(quizzes)
    })
}

impl Backend {
    /// Creates one document per record in `collection_key`, each under a new
    /// auto-generated id, and commits them as a single batch.
    ///
    /// Returns the created references in record order.
    pub async fn add_quizzes_and_documents<T: Serialize>(
        &self,
        collection_key: &str,
        records: &[T],
    ) -> Result<Vec<DocumentReference<'_>>, FirestoreError> {
        let collection = self.firestore.collection(collection_key);
        let batch = self.firestore.batch();

        let mut created = Vec::with_capacity(records.len());
        for record in records {
            let doc = collection.new_doc();
            batch.create(&doc, record)?;
            created.push(doc);
        }

        batch.commit().await?;
        tracing::info!(collection = collection_key, documents = created.len(), "added quiz documents");
        Ok(created)
    }
}
