pub mod config;
pub mod middleware;
pub mod session;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct FirebaseErrorResponse {
    pub error: FirebaseErrorDetails,
}

#[derive(Debug, Deserialize)]
pub struct FirebaseErrorDetails {
    pub code: u16,
    pub message: String,
}

impl FirebaseErrorResponse {
    pub fn display_message(&self) -> String {
        format!("{} (code: {})", self.error.message, self.error.code)
    }

    /// The leading error code of the message, e.g. `NEED_CONFIRMATION` for
    /// `"NEED_CONFIRMATION : Account exists"`.
    pub fn server_code(&self) -> &str {
        self.error
            .message
            .split(" : ")
            .next()
            .unwrap_or_default()
            .trim()
    }
}

pub async fn parse_error_response(response: reqwest::Response, default_msg: &str) -> String {
    let status = response.status();
    match response.json::<FirebaseErrorResponse>().await {
        Ok(error_resp) => error_resp.display_message(),
        Err(_) => format!("{}: {}", default_msg, status),
    }
}

#[cfg(test)]
mod tests {
    use super::FirebaseErrorResponse;

    #[test]
    fn server_code_strips_detail() {
        let body = serde_json::json!({
            "error": {
                "code": 400,
                "message": "NEED_CONFIRMATION : Another account uses this email",
                "errors": [{ "message": "NEED_CONFIRMATION", "domain": "global", "reason": "invalid" }]
            }
        });
        let parsed: FirebaseErrorResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.server_code(), "NEED_CONFIRMATION");
        assert_eq!(
            parsed.display_message(),
            "NEED_CONFIRMATION : Another account uses this email (code: 400)"
        );
    }

    #[test]
    fn server_code_without_detail() {
        let body = serde_json::json!({
            "error": { "code": 403, "message": "PERMISSION_DENIED", "status": "PERMISSION_DENIED" }
        });
        let parsed: FirebaseErrorResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.server_code(), "PERMISSION_DENIED");
    }
}
