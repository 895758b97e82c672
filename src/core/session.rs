use crate::auth::models::User;
use tokio::sync::RwLock;

/// The signed-in user, shared between the Auth and Firestore clients of one app.
#[derive(Debug, Default)]
pub struct Session {
    current: RwLock<Option<User>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.current.read().await.clone()
    }

    pub async fn id_token(&self) -> Option<String> {
        self.current
            .read()
            .await
            .as_ref()
            .and_then(|user| user.id_token.clone())
    }

    pub(crate) async fn set_user(&self, user: User) {
        *self.current.write().await = Some(user);
    }

    pub(crate) async fn clear(&self) {
        *self.current.write().await = None;
    }
}
