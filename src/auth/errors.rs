use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::{
    dto::MessageResponse, jwt::TokenError, password::CredentialError, repo::StoreError,
};

/// Outcome of a failed account operation. Client-caused variants map to
/// 400, everything else to 500.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),

    #[error("Email already registered, please use another email")]
    DuplicateEmail,

    /// Unknown email and wrong password are deliberately the same variant.
    #[error("Email or Password invalid")]
    InvalidCredentials,

    #[error("Token empty/not found")]
    MissingToken,

    /// Bad signature, expired, superseded by a later login, or logged out.
    #[error("Token not valid")]
    InvalidToken,

    #[error("id is not a valid integer: {0}")]
    InvalidUserId(#[source] std::num::ParseIntError),

    #[error("email empty/not found")]
    MissingLookupKey,

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("token error: {0}")]
    Token(#[from] TokenError),
}

impl AccountError {
    pub fn status(&self) -> StatusCode {
        match self {
            AccountError::Validation(_)
            | AccountError::DuplicateEmail
            | AccountError::InvalidCredentials
            | AccountError::MissingToken
            | AccountError::InvalidToken
            | AccountError::InvalidUserId(_)
            | AccountError::MissingLookupKey => StatusCode::BAD_REQUEST,
            AccountError::Storage(_)
            | AccountError::Credential(_)
            | AccountError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text safe to hand back to the caller.
    pub fn client_message(&self) -> String {
        match self.status() {
            StatusCode::BAD_REQUEST => self.to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, error = %self, "request failed");
        } else {
            warn!(%status, reason = %self, "request rejected");
        }
        (status, Json(MessageResponse::new(self.client_message()))).into_response()
    }
}
