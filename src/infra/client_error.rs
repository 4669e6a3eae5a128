use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::domain::{ErrorKind, ShopError};
use crate::identity::IdentityError;

#[derive(Debug)]
pub enum ClientError {
    Domain(ShopError),
    Identity(IdentityError),
    Payload(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    TooManyRequests,
    Internal(anyhow::Error),
}

const INTERNAL_MESSAGE: &str = "Something went wrong. Please ask your system administrator to check the logs.";

impl ClientError {
    pub fn status_and_message(self) -> (StatusCode, String) {
        match self {
            ClientError::Domain(shop_error) => match shop_error.kind() {
                ErrorKind::Invalid => (StatusCode::BAD_REQUEST, shop_error.to_string()),
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, shop_error.to_string()),
                ErrorKind::Conflict => (StatusCode::CONFLICT, shop_error.to_string()),
                ErrorKind::Internal => {
                    error!("Domain operation failed: {shop_error:?}");
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_owned())
                }
            },
            ClientError::Identity(identity_error) => match identity_error {
                IdentityError::EmailAlreadyExists => {
                    (StatusCode::CONFLICT, identity_error.to_string())
                }
                IdentityError::InvalidEmail | IdentityError::WeakPassword => {
                    (StatusCode::BAD_REQUEST, identity_error.to_string())
                }
                IdentityError::InvalidCredentials
                | IdentityError::TokenExpired
                | IdentityError::TokenRevoked
                | IdentityError::InvalidToken => {
                    (StatusCode::UNAUTHORIZED, identity_error.to_string())
                }
                IdentityError::UserNotFound => (StatusCode::NOT_FOUND, identity_error.to_string()),
                IdentityError::Hashing(_) | IdentityError::Store(_) => {
                    error!("Identity provider failed: {identity_error:?}");
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_owned())
                }
            },
            ClientError::Payload(message) => (StatusCode::BAD_REQUEST, message),
            ClientError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            ClientError::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            ClientError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ClientError::TooManyRequests => {
                (StatusCode::TOO_MANY_REQUESTS, "Too many requests".to_owned())
            }
            ClientError::Internal(e) => {
                error!("Request failed: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_owned())
            }
        }
    }
}

impl IntoResponse for ClientError {
    fn into_response(self) -> Response {
        #[derive(serde::Serialize)]
        struct ErrorResponse {
            success: bool,
            message: String,
        }

        let (status, message) = self.status_and_message();
        (
            status,
            Json(ErrorResponse {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}

impl From<ShopError> for ClientError {
    fn from(shop_error: ShopError) -> Self {
        match shop_error {
            ShopError::Identity(identity_error) => ClientError::Identity(identity_error),
            shop_error => ClientError::Domain(shop_error),
        }
    }
}

impl From<IdentityError> for ClientError {
    fn from(identity_error: IdentityError) -> Self {
        ClientError::Identity(identity_error)
    }
}

impl From<JsonRejection> for ClientError {
    fn from(rejection: JsonRejection) -> Self {
        ClientError::Payload(rejection.body_text())
    }
}

impl From<anyhow::Error> for ClientError {
    fn from(value: anyhow::Error) -> Self {
        ClientError::Internal(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Entity;

    #[test]
    fn domain_errors_map_to_their_status_codes() {
        let cases = [
            (ShopError::invalid("Missing required fields"), StatusCode::BAD_REQUEST),
            (ShopError::NotFound(Entity::Order), StatusCode::NOT_FOUND),
            (ShopError::DuplicateCategory, StatusCode::CONFLICT),
            (ShopError::AlreadyInWishlist, StatusCode::BAD_REQUEST),
        ];
        for (shop_error, expected) in cases {
            let (status, _) = ClientError::from(shop_error).status_and_message();
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let (status, message) =
            ClientError::Internal(anyhow::anyhow!("connection refused on 10.0.0.3"))
                .status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!message.contains("10.0.0.3"));
    }

    #[test]
    fn token_failures_are_unauthorized() {
        let (status, message) =
            ClientError::from(IdentityError::TokenExpired).status_and_message();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message, "Token expired");
    }
}
