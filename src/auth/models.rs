use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The signed-in user as reported by the Identity Toolkit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub provider_id: Option<String>,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<String>,
}

/// A pending OAuth credential issued by an identity provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthCredential {
    pub provider_id: String,
    pub id_token: Option<String>,
    pub access_token: Option<String>,
    pub secret: Option<String>,
}

impl OAuthCredential {
    /// The `postBody` form understood by `accounts:signInWithIdp`.
    pub fn to_post_body(&self) -> String {
        let mut body = url::form_urlencoded::Serializer::new(String::new());
        if let Some(id_token) = &self.id_token {
            body.append_pair("id_token", id_token);
        }
        if let Some(access_token) = &self.access_token {
            body.append_pair("access_token", access_token);
        }
        if let Some(secret) = &self.secret {
            body.append_pair("oauth_token_secret", secret);
        }
        body.append_pair("providerId", &self.provider_id);
        body.finish()
    }
}

/// Result of a successful sign-in or link.
#[derive(Debug, Clone, PartialEq)]
pub struct UserCredential {
    pub user: User,
    pub provider_id: Option<String>,
    pub credential: Option<OAuthCredential>,
    pub is_new_user: bool,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthUriRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    pub continue_uri: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_parameter: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_scope: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthUriResponse {
    pub auth_uri: Option<String>,
    pub session_id: Option<String>,
    #[serde(default)]
    pub signin_methods: Vec<String>,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SignInWithIdpRequest {
    pub request_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    pub return_secure_token: bool,
    pub return_idp_credential: bool,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SignInWithIdpResponse {
    pub provider_id: Option<String>,
    pub local_id: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<String>,
    pub oauth_id_token: Option<String>,
    pub oauth_access_token: Option<String>,
    pub oauth_token_secret: Option<String>,
    #[serde(default)]
    pub need_confirmation: bool,
    #[serde(default)]
    pub is_new_user: bool,
    pub error_message: Option<String>,
}

impl SignInWithIdpResponse {
    /// The provider credential carried in the response, if the IdP returned any token.
    pub fn credential(&self) -> Option<OAuthCredential> {
        let provider_id = self.provider_id.clone()?;
        if self.oauth_id_token.is_none() && self.oauth_access_token.is_none() {
            return None;
        }
        Some(OAuthCredential {
            provider_id,
            id_token: self.oauth_id_token.clone(),
            access_token: self.oauth_access_token.clone(),
            secret: self.oauth_token_secret.clone(),
        })
    }

    pub fn user(&self) -> User {
        User {
            uid: self.local_id.clone().unwrap_or_default(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            photo_url: self.photo_url.clone(),
            provider_id: self.provider_id.clone(),
            id_token: self.id_token.clone(),
            refresh_token: self.refresh_token.clone(),
            expires_in: self.expires_in.clone(),
        }
    }
}
