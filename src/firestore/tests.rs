use super::models::Value;
use super::reference::auto_id;
use super::*;
use crate::auth::models::User;
use crate::FirebaseConfig;
use chrono::{TimeZone, Utc};
use httpmock::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;

const DOCUMENTS_PATH: &str = "/v1/projects/p/databases/(default)/documents";

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Quiz {
    title: String,
    questions: Vec<String>,
}

fn test_app() -> FirebaseApp {
    FirebaseApp::new(FirebaseConfig {
        api_key: "test-api-key".to_string(),
        auth_domain: "quiz-app.firebaseapp.com".to_string(),
        project_id: "p".to_string(),
        ..Default::default()
    })
}

fn firestore_for(app: &FirebaseApp, server: &MockServer) -> FirebaseFirestore {
    FirebaseFirestore::new_with_url(app, server.url(DOCUMENTS_PATH))
}

#[tokio::test]
async fn get_missing_document() {
    let server = MockServer::start();
    let app = test_app();
    let db = firestore_for(&app, &server);

    let mock = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{}/users/ghost", DOCUMENTS_PATH))
            .query_param("key", "test-api-key");
        then.status(404).json_body(json!({
            "error": { "code": 404, "message": "Document not found", "status": "NOT_FOUND" }
        }));
    });

    let snapshot = db.doc("users/ghost").get().await.unwrap();
    assert!(!snapshot.exists());
    assert_eq!(snapshot.id(), "ghost");
    assert_eq!(snapshot.data::<Quiz>().unwrap(), None);
    mock.assert();
}

#[tokio::test]
async fn get_existing_document() {
    let server = MockServer::start();
    let app = test_app();
    let db = firestore_for(&app, &server);

    let mock = server.mock(|when, then| {
        when.method(GET).path(format!("{}/collections/rust", DOCUMENTS_PATH));
        then.status(200).json_body(json!({
            "name": "projects/p/databases/(default)/documents/collections/rust",
            "fields": {
                "title": { "stringValue": "Rust" },
                "questions": { "arrayValue": { "values": [{ "stringValue": "What is a borrow?" }] } }
            },
            "createTime": "2024-01-01T00:00:00Z",
            "updateTime": "2024-01-02T00:00:00Z"
        }));
    });

    let snapshot = db.collection("collections").doc("rust").get().await.unwrap();
    assert!(snapshot.exists());
    assert_eq!(snapshot.update_time(), Some("2024-01-02T00:00:00Z"));
    assert_eq!(
        snapshot.data::<Quiz>().unwrap(),
        Some(Quiz {
            title: "Rust".to_string(),
            questions: vec!["What is a borrow?".to_string()],
        })
    );
    mock.assert();
}

#[tokio::test]
async fn get_surfaces_api_errors() {
    let server = MockServer::start();
    let app = test_app();
    let db = firestore_for(&app, &server);

    server.mock(|when, then| {
        when.method(GET).path(format!("{}/users/alice", DOCUMENTS_PATH));
        then.status(403).json_body(json!({
            "error": { "code": 403, "message": "Missing or insufficient permissions.", "status": "PERMISSION_DENIED" }
        }));
    });

    let err = db.doc("users/alice").get().await.unwrap_err();
    match err {
        FirestoreError::ApiError(msg) => {
            assert_eq!(msg, "Missing or insufficient permissions. (code: 403)")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn set_overwrites_document() {
    let server = MockServer::start();
    let app = test_app();
    let db = firestore_for(&app, &server);

    let mock = server.mock(|when, then| {
        when.method(PATCH)
            .path(format!("{}/collections/rust", DOCUMENTS_PATH))
            .body_includes(r#""title":{"stringValue":"Rust"}"#);
        then.status(200).json_body(json!({
            "name": "projects/p/databases/(default)/documents/collections/rust",
            "fields": {}
        }));
    });

    let quiz = Quiz {
        title: "Rust".to_string(),
        questions: vec![],
    };
    db.doc("collections/rust").set(&quiz).await.unwrap();
    mock.assert();
}

#[tokio::test]
async fn set_rejects_non_objects() {
    let app = test_app();
    let db = FirebaseFirestore::new_with_url(&app, "http://127.0.0.1:9/v1".to_string());

    let err = db.doc("collections/rust").set(&json!(["not", "a", "map"])).await.unwrap_err();
    assert!(matches!(err, FirestoreError::SerializationError(_)));
}

#[tokio::test]
async fn list_collection_documents() {
    let server = MockServer::start();
    let app = test_app();
    let db = firestore_for(&app, &server);

    let mock = server.mock(|when, then| {
        when.method(GET).path(format!("{}/collections", DOCUMENTS_PATH));
        then.status(200).json_body(json!({
            "documents": [
                {
                    "name": "projects/p/databases/(default)/documents/collections/a",
                    "fields": { "title": { "stringValue": "A" } }
                },
                {
                    "name": "projects/p/databases/(default)/documents/collections/b",
                    "fields": { "title": { "stringValue": "B" } }
                }
            ]
        }));
    });

    let snapshot = db.collection("collections").get().await.unwrap();
    assert_eq!(snapshot.size(), 2);
    let ids: Vec<&str> = snapshot.iter().map(|doc| doc.id()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(snapshot.documents()[1].reference().path(), "collections/b");
    mock.assert();
}

#[tokio::test]
async fn list_empty_collection() {
    let server = MockServer::start();
    let app = test_app();
    let db = firestore_for(&app, &server);

    server.mock(|when, then| {
        when.method(GET).path(format!("{}/collections", DOCUMENTS_PATH));
        then.status(200).json_body(json!({}));
    });

    let snapshot = db.collection("collections").get().await.unwrap();
    assert!(snapshot.empty());
}

#[tokio::test]
async fn batch_commits_creates_atomically() {
    let server = MockServer::start();
    let app = test_app();
    let db = firestore_for(&app, &server);

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path(format!("{}:commit", DOCUMENTS_PATH))
            .body_includes(r#""name":"projects/p/databases/(default)/documents/quizzes/first""#)
            .body_includes(r#""currentDocument":{"exists":false}"#);
        then.status(200).json_body(json!({
            "writeResults": [
                { "updateTime": "2024-01-01T00:00:01Z" },
                { "updateTime": "2024-01-01T00:00:01Z" }
            ],
            "commitTime": "2024-01-01T00:00:01Z"
        }));
    });

    let quizzes = db.collection("quizzes");
    let batch = db.batch();
    batch
        .create(&quizzes.doc("first"), &json!({ "title": "First" }))
        .unwrap()
        .create(&quizzes.doc("second"), &json!({ "title": "Second" }))
        .unwrap();
    assert_eq!(batch.len(), 2);

    let results = batch.commit().await.unwrap();
    assert_eq!(results.len(), 2);
    assert!(batch.is_empty());
    mock.assert();
}

#[tokio::test]
async fn empty_batch_sends_nothing() {
    let server = MockServer::start();
    let app = test_app();
    let db = firestore_for(&app, &server);

    let mock = server.mock(|when, then| {
        when.method(POST).path(format!("{}:commit", DOCUMENTS_PATH));
        then.status(200).json_body(json!({}));
    });

    let results = db.batch().commit().await.unwrap();
    assert!(results.is_empty());
    mock.assert_hits(0);
}

#[tokio::test]
async fn requests_carry_signed_in_token() {
    let server = MockServer::start();
    let app = test_app();
    let db = firestore_for(&app, &server);

    app.session()
        .set_user(User {
            uid: "alice".to_string(),
            id_token: Some("alice-id-token".to_string()),
            ..Default::default()
        })
        .await;

    let mock = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{}/users/alice", DOCUMENTS_PATH))
            .header("authorization", "Bearer alice-id-token");
        then.status(404).json_body(json!({}));
    });

    db.doc("users/alice").get().await.unwrap();
    mock.assert();
}

#[test]
fn auto_ids_are_alphanumeric() {
    let id = auto_id();
    assert_eq!(id.len(), 20);
    assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(id, auto_id());
}

#[test]
fn new_doc_lives_in_collection() {
    let app = test_app();
    let db = FirebaseFirestore::new(&app);
    let doc = db.collection("quizzes").new_doc();

    assert!(doc.path().starts_with("quizzes/"));
    assert_eq!(doc.id().len(), 20);
    assert_eq!(
        doc.resource_name(),
        format!("projects/p/databases/(default)/documents/quizzes/{}", doc.id())
    );
}

#[test]
fn timestamp_values_serialize_as_rfc3339() {
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
    let value = serde_json::to_value(Value::timestamp(at)).unwrap();
    assert_eq!(value, json!({ "timestampValue": "2024-03-01T12:30:00.000000Z" }));

    let missing = serde_json::to_value(Value::from(None)).unwrap();
    assert_eq!(missing, json!({ "nullValue": null }));
}

#[tokio::test]
async fn list_follows_next_page_token() {
    let server = MockServer::start();
    let app = test_app();
    let db = firestore_for(&app, &server);

    let first_page = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{}/collections", DOCUMENTS_PATH))
            .query_param_missing("pageToken");
        then.status(200).json_body(json!({
            "documents": [{
                "name": "projects/p/databases/(default)/documents/collections/one",
                "fields": { "title": { "stringValue": "One" } }
            }],
            "nextPageToken": "t2"
        }));
    });
    let second_page = server.mock(|when, then| {
        when.method(GET)
            .path(format!("{}/collections", DOCUMENTS_PATH))
            .query_param("pageToken", "t2");
        then.status(200).json_body(json!({
            "documents": [{
                "name": "projects/p/databases/(default)/documents/collections/two",
                "fields": { "title": { "stringValue": "Two" } }
            }]
        }));
    });

    let snapshot = db.collection("collections").get().await.unwrap();
    let ids: Vec<&str> = snapshot.iter().map(|doc| doc.id()).collect();
    assert_eq!(ids, vec!["one", "two"]);
    first_page.assert();
    second_page.assert();
}

#[test]
fn document_urls_encode_path_segments() {
    let app = test_app();
    let db = FirebaseFirestore::new_with_url(&app, "http://localhost/documents".to_string());

    let doc = db.doc("users/a?b#c%d e");
    assert_eq!(doc.url(), "http://localhost/documents/users/a%3Fb%23c%25d%20e");
    assert_eq!(doc.id(), "a?b#c%d e");
    assert_eq!(db.doc("users/alice").url(), "http://localhost/documents/users/alice");
}
