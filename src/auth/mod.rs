//! Firebase Authentication, client side.
//!
//! Talks to the Identity Toolkit REST API with the project's API key: looking
//! up the sign-in methods of an email, running OAuth sign-ins through an
//! [`AuthDriver`](driver::AuthDriver), and linking a pending provider
//! credential to the signed-in account.

pub mod driver;
pub mod models;
pub mod provider;

#[cfg(test)]
pub(crate) mod testing;

use crate::auth::driver::{AuthDriver, AuthorizationRequest, SignInMode};
use crate::auth::models::{
    CreateAuthUriRequest, CreateAuthUriResponse, OAuthCredential, SignInWithIdpRequest,
    SignInWithIdpResponse, User, UserCredential,
};
use crate::auth::provider::{OAuthProvider, ProviderLookupError};
use crate::core::session::Session;
use crate::core::FirebaseErrorResponse;
use crate::FirebaseApp;
use reqwest::{header, Client};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

const IDENTITY_TOOLKIT_V1_API: &str = "https://identitytoolkit.googleapis.com/v1";

// requestUri for flows that carry their own credential instead of a callback.
const LOCAL_REQUEST_URI: &str = "http://localhost";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("HTTP Request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Middleware error: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    /// The email is already registered through another provider. Carries what
    /// is needed to sign in with that provider and link this credential.
    #[error("An account already exists with the same email address but different sign-in credentials")]
    AccountExistsWithDifferentCredential {
        email: Option<String>,
        credential: Option<OAuthCredential>,
    },
    #[error(transparent)]
    ProviderLookup(#[from] ProviderLookupError),
    #[error("No sign-in methods registered for {0}")]
    NoSignInMethods(String),
    #[error("Authorization step failed: {0:#}")]
    Driver(anyhow::Error),
    #[error("Identity Toolkit response is missing `{0}`")]
    InvalidResponse(&'static str),
    #[error("User has no ID token")]
    MissingIdToken,
}

impl AuthError {
    /// The Firebase `auth/...` error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::AccountExistsWithDifferentCredential { .. } => {
                "auth/account-exists-with-different-credential"
            }
            AuthError::ProviderLookup(_) => "auth/invalid-provider-id",
            AuthError::NoSignInMethods(_) => "auth/user-not-found",
            AuthError::Driver(_) => "auth/web-context-cancelled",
            AuthError::MissingIdToken => "auth/null-user",
            AuthError::RequestError(_) | AuthError::MiddlewareError(_) => {
                "auth/network-request-failed"
            }
            AuthError::ApiError(_)
            | AuthError::SerializationError(_)
            | AuthError::InvalidResponse(_) => "auth/internal-error",
        }
    }
}

#[derive(Clone)]
pub struct FirebaseAuth {
    client: ClientWithMiddleware,
    base_url: String,
    continue_uri: String,
    session: Arc<Session>,
    driver: Arc<dyn AuthDriver>,
}

impl FirebaseAuth {
    pub fn new(app: &FirebaseApp, driver: Arc<dyn AuthDriver>) -> Self {
        Self::new_with_url(app, driver, IDENTITY_TOOLKIT_V1_API.to_string())
    }

    /// Creates a client against a custom Identity Toolkit base URL (emulator, tests).
    pub fn new_with_url(app: &FirebaseApp, driver: Arc<dyn AuthDriver>, base_url: String) -> Self {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);

        let client = ClientBuilder::new(Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .with(app.middleware())
            .build();

        Self {
            client,
            base_url,
            continue_uri: app.config().auth_handler_url(),
            session: app.session().clone(),
            driver,
        }
    }

    async fn post<Req, Resp>(&self, endpoint: &str, request: &Req, default_msg: &str) -> Result<Resp, AuthError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self.client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(request)?)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(match response.json::<FirebaseErrorResponse>().await {
                Ok(error) if error.server_code() == "NEED_CONFIRMATION" => {
                    AuthError::AccountExistsWithDifferentCredential {
                        email: None,
                        credential: None,
                    }
                }
                Ok(error) => AuthError::ApiError(error.display_message()),
                Err(_) => AuthError::ApiError(format!("{}: {}", default_msg, status)),
            });
        }

        Ok(response.json().await?)
    }

    /// The provider ids the email can already sign in with, in server order
    /// (e.g. `["google.com", "password"]`).
    pub async fn fetch_sign_in_methods_for_email(&self, email: &str) -> Result<Vec<String>, AuthError> {
        let request = CreateAuthUriRequest {
            identifier: Some(email.to_string()),
            continue_uri: LOCAL_REQUEST_URI.to_string(),
            ..Default::default()
        };

        let response: CreateAuthUriResponse = self
            .post("accounts:createAuthUri", &request, "Fetch sign-in methods failed")
            .await?;

        tracing::debug!(email, methods = ?response.signin_methods, "fetched sign-in methods");
        Ok(response.signin_methods)
    }

    pub async fn sign_in_with_redirect(&self, provider: &OAuthProvider) -> Result<UserCredential, AuthError> {
        self.sign_in_with_provider(provider, SignInMode::Redirect).await
    }

    pub async fn sign_in_with_popup(&self, provider: &OAuthProvider) -> Result<UserCredential, AuthError> {
        self.sign_in_with_provider(provider, SignInMode::Popup).await
    }

    async fn sign_in_with_provider(
        &self,
        provider: &OAuthProvider,
        mode: SignInMode,
    ) -> Result<UserCredential, AuthError> {
        let scopes = provider.scopes();
        let request = CreateAuthUriRequest {
            provider_id: Some(provider.provider_id().to_string()),
            continue_uri: self.continue_uri.clone(),
            custom_parameter: provider.custom_parameters().clone(),
            oauth_scope: (!scopes.is_empty()).then(|| scopes.join(",")),
            ..Default::default()
        };

        let auth_uri: CreateAuthUriResponse = self
            .post("accounts:createAuthUri", &request, "Create auth URI failed")
            .await?;
        let authorization = AuthorizationRequest {
            mode,
            provider_id: provider.provider_id().to_string(),
            auth_uri: auth_uri.auth_uri.ok_or(AuthError::InvalidResponse("authUri"))?,
            session_id: auth_uri.session_id,
        };

        tracing::debug!(provider = provider.provider_id(), %mode, "starting provider sign-in");
        let session_id = authorization.session_id.clone();
        let callback = self
            .driver
            .authorize(authorization)
            .await
            .map_err(AuthError::Driver)?;

        let request = SignInWithIdpRequest {
            request_uri: callback,
            session_id,
            return_secure_token: true,
            return_idp_credential: true,
            ..Default::default()
        };

        let response: SignInWithIdpResponse = self
            .post("accounts:signInWithIdp", &request, "Sign in with IdP failed")
            .await?;
        self.finish_sign_in(response).await
    }

    /// Links `credential` to `user`'s account and makes the result the current user.
    pub async fn link_with_credential(
        &self,
        user: &User,
        credential: &OAuthCredential,
    ) -> Result<UserCredential, AuthError> {
        let id_token = user.id_token.clone().ok_or(AuthError::MissingIdToken)?;

        let request = SignInWithIdpRequest {
            request_uri: LOCAL_REQUEST_URI.to_string(),
            post_body: Some(credential.to_post_body()),
            id_token: Some(id_token),
            return_secure_token: true,
            return_idp_credential: true,
            ..Default::default()
        };

        let response: SignInWithIdpResponse = self
            .post("accounts:signInWithIdp", &request, "Link credential failed")
            .await?;
        let linked = self.finish_sign_in(response).await?;

        tracing::info!(uid = %linked.user.uid, provider = %credential.provider_id, "linked credential");
        Ok(linked)
    }

    async fn finish_sign_in(&self, response: SignInWithIdpResponse) -> Result<UserCredential, AuthError> {
        if response.need_confirmation {
            return Err(AuthError::AccountExistsWithDifferentCredential {
                email: response.email.clone(),
                credential: response.credential(),
            });
        }

        if let Some(message) = &response.error_message {
            return Err(AuthError::ApiError(message.clone()));
        }

        let user = response.user();
        if user.uid.is_empty() {
            return Err(AuthError::InvalidResponse("localId"));
        }

        self.session.set_user(user.clone()).await;
        tracing::info!(uid = %user.uid, provider = ?response.provider_id, "signed in");

        Ok(UserCredential {
            credential: response.credential(),
            provider_id: response.provider_id,
            is_new_user: response.is_new_user,
            user,
        })
    }

    pub async fn current_user(&self) -> Option<User> {
        self.session.current_user().await
    }

    pub async fn sign_out(&self) {
        self.session.clear().await;
    }
}
