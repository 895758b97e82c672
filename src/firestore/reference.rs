use super::models::{ArrayValue, Document, ListDocumentsResponse, MapValue, Value, ValueType};
use super::snapshot::{DocumentSnapshot, QuerySnapshot};
use super::FirestoreError;
use crate::core::parse_error_response;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use rand::distr::Alphanumeric;
use rand::Rng;
use reqwest::header;
use reqwest_middleware::ClientWithMiddleware;
use serde::de::Error;
use serde::ser::Error as SerError;
use serde::Serialize;
use serde_json::map::Map;
use serde_json::Value as SerdeValue;
use std::collections::HashMap;
use std::fmt;
use url::Url;

const AUTO_ID_LENGTH: usize = 20;

// Characters that would end or split a URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encodes each segment of a slash-separated document path.
pub(crate) fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Generates a document id the way Firestore clients do: 20 random alphanumerics.
pub(crate) fn auto_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(AUTO_ID_LENGTH)
        .map(char::from)
        .collect()
}

// Helper to convert Firestore's value map to a standard serde_json::Value
pub(crate) fn convert_fields_to_serde_value(
    fields: HashMap<String, Value>,
) -> Result<SerdeValue, FirestoreError> {
    let mut map = Map::new();
    for (key, value) in fields {
        map.insert(key, convert_value_to_serde_value(value)?);
    }
    Ok(SerdeValue::Object(map))
}

pub(crate) fn convert_value_to_serde_value(value: Value) -> Result<SerdeValue, FirestoreError> {
    use serde_json::json;
    Ok(match value.value_type {
        ValueType::StringValue(s) => SerdeValue::String(s),
        ValueType::IntegerValue(s) => {
            let i: i64 = s.parse().map_err(|e| {
                <serde_json::Error as Error>::custom(format!(
                    "Failed to parse integer string '{}': {}",
                    s, e
                ))
            })?;
            SerdeValue::Number(i.into())
        }
        ValueType::DoubleValue(d) => SerdeValue::Number(
            serde_json::Number::from_f64(d).ok_or_else(|| {
                <serde_json::Error as Error>::custom(format!("Invalid f64 value: {}", d))
            })?,
        ),
        ValueType::BooleanValue(b) => SerdeValue::Bool(b),
        ValueType::MapValue(map_value) => convert_fields_to_serde_value(map_value.fields)?,
        ValueType::ArrayValue(array_value) => {
            let values = array_value
                .values
                .into_iter()
                .map(convert_value_to_serde_value)
                .collect::<Result<Vec<_>, _>>()?;
            SerdeValue::Array(values)
        }
        ValueType::NullValue(_) => SerdeValue::Null,
        ValueType::TimestampValue(s) => SerdeValue::String(s),
        ValueType::GeoPointValue(gp) => {
            json!({ "latitude": gp.latitude, "longitude": gp.longitude })
        }
        ValueType::BytesValue(s) => SerdeValue::String(s),
        ValueType::ReferenceValue(s) => SerdeValue::String(s),
    })
}

// Helper to convert a serializable Rust struct to Firestore's value map
pub(crate) fn convert_serializable_to_fields<T: Serialize + ?Sized>(
    value: &T,
) -> Result<HashMap<String, Value>, FirestoreError> {
    let serde_value = serde_json::to_value(value)?;
    if let SerdeValue::Object(map) = serde_value {
        let mut fields = HashMap::new();
        for (k, v) in map {
            fields.insert(k, convert_serde_value_to_firestore_value(v)?);
        }
        Ok(fields)
    } else {
        Err(FirestoreError::SerializationError(SerError::custom(
            "Can only set objects as documents",
        )))
    }
}

pub(crate) fn convert_serde_value_to_firestore_value(
    value: SerdeValue,
) -> Result<Value, FirestoreError> {
    let value_type = match value {
        SerdeValue::Null => ValueType::NullValue(()),
        SerdeValue::Bool(b) => ValueType::BooleanValue(b),
        SerdeValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                ValueType::IntegerValue(i.to_string())
            } else if let Some(f) = n.as_f64() {
                ValueType::DoubleValue(f)
            } else {
                return Err(FirestoreError::SerializationError(SerError::custom(format!(
                    "Unsupported number type: {}",
                    n
                ))));
            }
        }
        SerdeValue::String(s) => ValueType::StringValue(s),
        SerdeValue::Array(a) => {
            let values = a
                .into_iter()
                .map(convert_serde_value_to_firestore_value)
                .collect::<Result<Vec<_>, _>>()?;
            ValueType::ArrayValue(ArrayValue { values })
        }
        SerdeValue::Object(o) => {
            let mut fields = HashMap::new();
            for (k, v) in o {
                fields.insert(k, convert_serde_value_to_firestore_value(v)?);
            }
            ValueType::MapValue(MapValue { fields })
        }
    };
    Ok(Value { value_type })
}

/// Strips the scheme and host from a documents base URL, leaving the resource
/// name (`projects/{p}/databases/{d}/documents`).
pub(crate) fn database_resource_name(base_url: &str) -> &str {
    base_url
        .find("projects/")
        .map(|idx| &base_url[idx..])
        .unwrap_or(base_url)
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// A reference to a single document, e.g. `users/alice`.
#[derive(Clone)]
pub struct DocumentReference<'a> {
    pub(crate) client: &'a ClientWithMiddleware,
    pub(crate) base_url: &'a str,
    pub(crate) path: String,
}

impl fmt::Debug for DocumentReference<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentReference")
            .field("path", &self.path)
            .finish()
    }
}

impl PartialEq for DocumentReference<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.base_url == other.base_url && self.path == other.path
    }
}

impl<'a> DocumentReference<'a> {
    /// The last segment of the document path.
    pub fn id(&self) -> &str {
        last_segment(&self.path)
    }

    /// The slash-separated path relative to the database root.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn url(&self) -> String {
        format!("{}/{}", self.base_url, encode_path(&self.path))
    }

    /// The full resource name used in write requests.
    pub(crate) fn resource_name(&self) -> String {
        format!("{}/{}", database_resource_name(self.base_url), self.path)
    }

    /// Reads the document. A missing document yields a snapshot whose `exists()` is false.
    pub async fn get(&self) -> Result<DocumentSnapshot<'a>, FirestoreError> {
        let response = self.client.get(self.url()).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(DocumentSnapshot {
                id: self.id().to_string(),
                reference: self.clone(),
                document: None,
            });
        }

        if !response.status().is_success() {
            return Err(FirestoreError::ApiError(
                parse_error_response(response, "Get document failed").await,
            ));
        }

        let doc: Document = response.json().await?;
        Ok(DocumentSnapshot {
            id: self.id().to_string(),
            reference: self.clone(),
            document: Some(doc),
        })
    }

    /// Overwrites the document with `value`, creating it if needed.
    pub async fn set<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), FirestoreError> {
        let fields = convert_serializable_to_fields(value)?;
        self.set_fields(fields).await
    }

    /// Overwrites the document with already-converted Firestore fields.
    pub async fn set_fields(&self, fields: HashMap<String, Value>) -> Result<(), FirestoreError> {
        let body = serde_json::to_vec(&serde_json::json!({ "fields": fields }))?;

        let response = self
            .client
            .patch(self.url())
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FirestoreError::ApiError(
                parse_error_response(response, "Set document failed").await,
            ));
        }

        Ok(())
    }
}

/// A reference to a collection, e.g. `quizzes`.
#[derive(Clone)]
pub struct CollectionReference<'a> {
    pub(crate) client: &'a ClientWithMiddleware,
    pub(crate) base_url: &'a str,
    pub(crate) path: String,
}

impl<'a> CollectionReference<'a> {
    pub fn id(&self) -> &str {
        last_segment(&self.path)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn doc(&self, document_id: &str) -> DocumentReference<'a> {
        DocumentReference {
            client: self.client,
            base_url: self.base_url,
            path: format!("{}/{}", self.path, document_id),
        }
    }

    /// A reference to a new document with an auto-generated id. Nothing is written.
    pub fn new_doc(&self) -> DocumentReference<'a> {
        self.doc(&auto_id())
    }

    /// Lists every document in the collection, following pagination.
    pub async fn get(&self) -> Result<QuerySnapshot<'a>, FirestoreError> {
        let base = Url::parse(&format!("{}/{}", self.base_url, encode_path(&self.path)))?;
        let mut documents = Vec::new();
        let mut next_page_token: Option<String> = None;

        loop {
            let mut url = base.clone();
            if let Some(token) = next_page_token.take() {
                url.query_pairs_mut().append_pair("pageToken", &token);
            }

            let response = self.client.get(url).send().await?;

            if !response.status().is_success() {
                return Err(FirestoreError::ApiError(
                    parse_error_response(response, "List documents failed").await,
                ));
            }

            let page: ListDocumentsResponse = response.json().await?;
            for doc in page.documents {
                let id = last_segment(&doc.name).to_string();
                documents.push(DocumentSnapshot {
                    reference: self.doc(&id),
                    id,
                    document: Some(doc),
                });
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => next_page_token = Some(token),
                _ => break,
            }
        }

        Ok(QuerySnapshot { documents })
    }
}
