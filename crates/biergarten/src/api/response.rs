//! Success envelope.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::auth::AuthContext;

/// `{message, status, payload?, newAccessToken?}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T = ()> {
    pub message: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_access_token: Option<String>,
}

impl ApiResponse<()> {
    pub fn ok(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, message)
    }

    pub fn created(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CREATED, message)
    }

    fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: status.as_u16(),
            payload: None,
            new_access_token: None,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn payload<U>(self, payload: U) -> ApiResponse<U> {
        ApiResponse {
            message: self.message,
            status: self.status,
            payload: Some(payload),
            new_access_token: self.new_access_token,
        }
    }

    /// Carry a regenerated access token back to the client.
    pub fn auth(mut self, ctx: &AuthContext) -> Self {
        self.new_access_token = ctx.new_access_token().map(str::to_owned);
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::ok("Fine.")).unwrap();
        assert_eq!(json, serde_json::json!({"message": "Fine.", "status": 200}));

        let response = ApiResponse::created("Made.").payload(vec![1, 2]);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], 201);
        assert_eq!(json["payload"], serde_json::json!([1, 2]));
        assert!(json.get("newAccessToken").is_none());
    }

    #[test]
    fn test_new_access_token_only_when_regenerated() {
        let ctx = AuthContext::authenticated("usr_abcdefghijkl");
        let json = serde_json::to_value(ApiResponse::ok("x").auth(&ctx)).unwrap();
        assert!(json.get("newAccessToken").is_none());
    }
}
