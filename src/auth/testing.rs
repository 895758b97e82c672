use crate::auth::driver::{AuthDriver, AuthorizationRequest};
use std::collections::HashMap;
use std::sync::Mutex;

/// Answers authorization requests with canned callback URLs and records them.
#[derive(Default)]
pub(crate) struct RecordingDriver {
    callbacks: HashMap<String, String>,
    requests: Mutex<Vec<AuthorizationRequest>>,
}

impl RecordingDriver {
    pub(crate) fn with_callback(mut self, provider_id: &str, callback: &str) -> Self {
        self.callbacks.insert(provider_id.to_string(), callback.to_string());
        self
    }

    pub(crate) fn requests(&self) -> Vec<AuthorizationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AuthDriver for RecordingDriver {
    async fn authorize(&self, request: AuthorizationRequest) -> anyhow::Result<String> {
        let callback = self.callbacks.get(&request.provider_id).cloned();
        let provider_id = request.provider_id.clone();
        self.requests.lock().unwrap().push(request);
        callback.ok_or_else(|| anyhow::anyhow!("window closed before {} answered", provider_id))
    }
}
