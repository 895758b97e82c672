use super::Backend;
use crate::auth::models::User;
use crate::firestore::models::Value;
use crate::firestore::reference::{convert_serializable_to_fields, DocumentReference};
use crate::firestore::FirestoreError;
use chrono::{DateTime, Utc};
use serde_json::Map;
use std::collections::HashMap;
use thiserror::Error;

pub const USERS_COLLECTION: &str = "users";

#[derive(Error, Debug)]
pub enum ProfileError {
    /// The existence check for the profile document failed.
    #[error("Failed to look up profile of user {uid}: {source}")]
    Lookup {
        uid: String,
        #[source]
        source: FirestoreError,
    },
    /// The profile did not exist and writing it failed.
    #[error("Error creating user {uid}: {source}")]
    Write {
        uid: String,
        #[source]
        source: FirestoreError,
    },
}

/// Fields of a fresh profile; `additional_fields` win over the defaults.
fn profile_fields(
    user: &User,
    additional_fields: &Map<String, serde_json::Value>,
    created_at: DateTime<Utc>,
) -> Result<HashMap<String, Value>, FirestoreError> {
    let mut fields = HashMap::from([
        ("displayName".to_string(), Value::from(user.display_name.clone())),
        ("email".to_string(), Value::from(user.email.clone())),
        ("createdAt".to_string(), Value::timestamp(created_at)),
    ]);
    fields.extend(convert_serializable_to_fields(additional_fields)?);
    Ok(fields)
}

impl Backend {
    /// Makes sure `users/{uid}` exists for the signed-in user.
    ///
    /// Returns `Ok(None)` without touching the store when there is no user, and
    /// the profile reference otherwise, whether or not it had to be written.
    /// The existence check and the write are separate requests, so two
    /// concurrent calls for the same user may both write.
    pub async fn create_user_profile_document(
        &self,
        user: Option<&User>,
        additional_fields: &Map<String, serde_json::Value>,
    ) -> Result<Option<DocumentReference<'_>>, ProfileError> {
        let Some(user) = user else {
            return Ok(None);
        };

        let user_ref = self
            .firestore
            .doc(&format!("{}/{}", USERS_COLLECTION, user.uid));
        let snapshot = user_ref.get().await.map_err(|source| ProfileError::Lookup {
            uid: user.uid.clone(),
            source,
        })?;

        if !snapshot.exists() {
            let written = match profile_fields(user, additional_fields, Utc::now()) {
                Ok(fields) => user_ref.set_fields(fields).await,
                Err(e) => Err(e),
            };

            if let Err(source) = written {
                tracing::warn!(uid = %user.uid, error = %source, "error creating user");
                return Err(ProfileError::Write {
                    uid: user.uid.clone(),
                    source,
                });
            }
            tracing::info!(uid = %user.uid, "created user profile");
        }

        Ok(Some(user_ref))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::models::ValueType;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn additional_fields_override_defaults() {
        let user = User {
            uid: "alice".to_string(),
            display_name: Some("Alice".to_string()),
            ..Default::default()
        };
        let additional = json!({ "displayName": "Captain Alice", "score": 3 });
        let additional = additional.as_object().unwrap();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();

        let fields = profile_fields(&user, additional, at).unwrap();
        assert_eq!(fields["displayName"], Value::string("Captain Alice"));
        assert_eq!(fields["email"], Value::null());
        assert_eq!(fields["createdAt"], Value::timestamp(at));
        assert_eq!(fields["score"].value_type, ValueType::IntegerValue("3".to_string()));
    }
}
