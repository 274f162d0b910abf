//! API response envelopes.
//!
//! The transport layer wraps every result in one of two shapes:
//! `{success: true, data, message?}` or
//! `{success: false, error: {code, message}}`.

use serde::{Deserialize, Serialize};

use crate::error::PanelError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn err(err: &PanelError) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(ApiError {
                code: err.code().to_string(),
                message: err.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_envelope_shape() {
        let resp = ApiResponse::<()>::err(&PanelError::RateLimited);
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            value,
            json!({
                "success": false,
                "error": { "code": "RATE_LIMIT_EXCEEDED", "message": "Rate limit exceeded" }
            })
        );
    }

    #[test]
    fn success_envelope_shape() {
        let resp = ApiResponse::ok_with_message(json!({ "id": 1 }), "created");
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            value,
            json!({ "success": true, "data": { "id": 1 }, "message": "created" })
        );
    }
}
