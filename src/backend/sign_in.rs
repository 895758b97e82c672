use super::Backend;
use crate::auth::models::UserCredential;
use crate::auth::provider::ProviderKind;
use crate::auth::AuthError;

impl Backend {
    pub async fn sign_in_with_google(&self) -> Result<UserCredential, AuthError> {
        self.sign_in_with(ProviderKind::Google).await
    }

    pub async fn sign_in_with_facebook(&self) -> Result<UserCredential, AuthError> {
        self.sign_in_with(ProviderKind::Facebook).await
    }

    pub async fn sign_in_with_github(&self) -> Result<UserCredential, AuthError> {
        self.sign_in_with(ProviderKind::GitHub).await
    }

    async fn sign_in_with(&self, kind: ProviderKind) -> Result<UserCredential, AuthError> {
        let provider = self.providers.get(kind);
        match self.auth.sign_in_with_redirect(provider).await {
            Err(error @ AuthError::AccountExistsWithDifferentCredential { .. }) => {
                self.handle_duplicate_accounts(error).await
            }
            result => result,
        }
    }

    /// Recovers from a sign-in that hit an email already registered through
    /// another provider.
    ///
    /// Signs in (popup) with the first provider the email is registered with,
    /// then links the pending credential to that account. Any other error, or
    /// one without the email and pending credential, is returned unchanged.
    pub async fn handle_duplicate_accounts(&self, error: AuthError) -> Result<UserCredential, AuthError> {
        let (email, pending) = match error {
            AuthError::AccountExistsWithDifferentCredential {
                email: Some(email),
                credential: Some(credential),
            } => (email, credential),
            other => return Err(other),
        };

        tracing::warn!(%email, provider = %pending.provider_id, "account exists with different credential");

        let methods = self.auth.fetch_sign_in_methods_for_email(&email).await?;
        // List order decides; no preference between providers.
        let method = methods
            .first()
            .ok_or_else(|| AuthError::NoSignInMethods(email.clone()))?;
        let provider = self.providers.lookup(method)?;

        let signed_in = self.auth.sign_in_with_popup(provider).await?;
        self.auth.link_with_credential(&signed_in.user, &pending).await
    }
}
