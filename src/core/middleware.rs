use crate::core::session::Session;
use http::Extensions;
use reqwest::{header, Request, Response};
use reqwest_middleware::{Middleware, Next};
use std::sync::Arc;

/// Attaches the project's API key to every request and, when bound to a
/// session, the signed-in user's ID token as a bearer token.
///
/// Identity Toolkit calls only take the key; Firestore calls carry the user's
/// token so security rules see the caller.
#[derive(Clone)]
pub struct ApiKeyMiddleware {
    api_key: String,
    session: Option<Arc<Session>>,
}

impl ApiKeyMiddleware {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            session: None,
        }
    }

    pub fn with_session(mut self, session: Arc<Session>) -> Self {
        self.session = Some(session);
        self
    }
}

#[async_trait::async_trait]
impl Middleware for ApiKeyMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        if !self.api_key.is_empty() {
            req.url_mut()
                .query_pairs_mut()
                .append_pair("key", &self.api_key);
        }

        if let Some(session) = &self.session {
            if let Some(token) = session.id_token().await {
                let value = header::HeaderValue::from_str(&format!("Bearer {}", token)).map_err(
                    |e| {
                        reqwest_middleware::Error::Middleware(anyhow::anyhow!(
                            "Invalid ID token header: {}",
                            e
                        ))
                    },
                )?;
                req.headers_mut().insert(header::AUTHORIZATION, value);
            }
        }

        tracing::debug!(method = %req.method(), url = %req.url().path(), "firebase request");

        next.run(req, extensions).await
    }
}
