use crate::application_port::{AuthError, ChatError, RelationError};
use serde_json::json;
use std::convert::Infallible;
use tracing::warn;
use warp::http::StatusCode;
use warp::{Rejection, reject};

/// Domain failure mapped to an HTTP status and a caller-safe message.
/// Internal detail is logged at construction time and never leaves the
/// process.
#[derive(Debug, Clone)]
pub struct ApiReject {
    pub status: StatusCode,
    pub message: String,
}

impl reject::Reject for ApiReject {}

impl ApiReject {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiReject {
            status,
            message: message.into(),
        }
    }

    pub fn internal<E: std::fmt::Display>(error: E) -> Self {
        warn!("internal error: {error}");
        ApiReject::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiReject::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn into_rejection(self) -> Rejection {
        reject::custom(self)
    }
}

impl From<AuthError> for ApiReject {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Validation(msg) => ApiReject::new(StatusCode::BAD_REQUEST, msg),
            AuthError::EmailTaken => {
                ApiReject::new(StatusCode::BAD_REQUEST, error.to_string())
            }
            AuthError::InvalidCredentials => {
                ApiReject::new(StatusCode::UNAUTHORIZED, error.to_string())
            }
            AuthError::TokenInvalid | AuthError::TokenExpired => {
                ApiReject::unauthorized(error.to_string())
            }
            AuthError::UserNotFound => ApiReject::new(StatusCode::NOT_FOUND, error.to_string()),
            AuthError::Store(e) | AuthError::Internal(e) => ApiReject::internal(e),
        }
    }
}

impl From<RelationError> for ApiReject {
    fn from(error: RelationError) -> Self {
        match error {
            RelationError::InvalidIdentifier
            | RelationError::SelfRequest
            | RelationError::AlreadyFriends
            | RelationError::DuplicateRequest => {
                ApiReject::new(StatusCode::BAD_REQUEST, error.to_string())
            }
            RelationError::RecipientNotFound
            | RelationError::RequestNotFound
            | RelationError::UserNotFound => {
                ApiReject::new(StatusCode::NOT_FOUND, error.to_string())
            }
            RelationError::Forbidden => ApiReject::new(StatusCode::FORBIDDEN, error.to_string()),
            RelationError::Store(e) => ApiReject::internal(e),
        }
    }
}

impl From<ChatError> for ApiReject {
    fn from(error: ChatError) -> Self {
        match error {
            ChatError::Token(e) | ChatError::Provider(e) => ApiReject::internal(e),
        }
    }
}

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let (status, message) = if let Some(api) = err.find::<ApiReject>() {
        (api.status, api.message.clone())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found".to_string())
    } else if err
        .find::<warp::filters::body::BodyDeserializeError>()
        .is_some()
    {
        (StatusCode::BAD_REQUEST, "Invalid request body".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Method Not Allowed".to_string(),
        )
    } else {
        warn!("unhandled rejection: {err:?}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error".to_string(),
        )
    };

    let body = warp::reply::json(&json!({ "message": message }));
    Ok(warp::reply::with_status(body, status))
}
