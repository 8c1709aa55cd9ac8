use async_graphql::{ErrorExtensionValues, ErrorExtensions, ServerError};
use thiserror::Error;
use tracing::error;

use crate::db::StoreError;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Message returned when a request carries an expired or forged token
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("This user already exists.")]
    UserExists,

    #[error("This user does not exist.")]
    UserNotFound,

    #[error("Incorrect password.")]
    InvalidPassword,

    #[error("Post not found.")]
    PostNotFound,

    #[error("{0}")]
    Authentication(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Error class reported to clients as `extensions.name`
    pub fn name(&self) -> &'static str {
        match self {
            ApiError::Authentication(_) => "AuthenticationError",
            ApiError::Validation(_) => "UserInputError",
            ApiError::Store(_) | ApiError::Internal(_) => "InternalServerError",
            ApiError::UserExists
            | ApiError::UserNotFound
            | ApiError::InvalidPassword
            | ApiError::PostNotFound => "Error",
        }
    }

    /// Message safe to send over the wire
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Store(_) | ApiError::Internal(_) => {
                // Don't leak internal details
                error!(error = %self, "Request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Standalone response error for failures outside resolver execution
    pub fn into_server_error(self) -> ServerError {
        let mut err = ServerError::new(self.public_message(), None);
        let mut extensions = ErrorExtensionValues::default();
        extensions.set("name", self.name());
        err.extensions = Some(extensions);
        err
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> async_graphql::Error {
        let name = self.name();
        async_graphql::Error::new(self.public_message()).extend_with(|_, e| e.set("name", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_names() {
        assert_eq!(
            ApiError::Authentication(SESSION_EXPIRED_MESSAGE.to_string()).name(),
            "AuthenticationError"
        );
        assert_eq!(ApiError::Validation("x".into()).name(), "UserInputError");
        assert_eq!(ApiError::UserExists.name(), "Error");
    }

    #[test]
    fn test_internal_details_not_leaked() {
        let err = ApiError::Internal("connection refused on 10.0.0.3".to_string());
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_server_error_carries_name() {
        let err = ApiError::Authentication(SESSION_EXPIRED_MESSAGE.to_string()).into_server_error();
        assert_eq!(err.message, SESSION_EXPIRED_MESSAGE);

        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["extensions"]["name"], "AuthenticationError");
    }
}
