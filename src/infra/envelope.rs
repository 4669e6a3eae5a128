use axum::{
    Json,
    extract::FromRequest,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::ClientError;

/// Successful response body: `{ success: true, message, data }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// JSON body extractor whose rejections are reported as error envelopes.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ClientError))]
pub struct Payload<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_is_omitted_when_absent() {
        let body = serde_json::to_value(ApiResponse::message("Product deleted successfully")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": true, "message": "Product deleted successfully"})
        );

        let body = serde_json::to_value(ApiResponse::new("ok", vec![1, 2])).unwrap();
        assert_eq!(body["data"], serde_json::json!([1, 2]));
    }
}
