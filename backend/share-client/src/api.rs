//! GraphQL transport and wire types

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

/// Endpoint the Share API binds by default
pub const DEFAULT_ENDPOINT: &str = "http://localhost:4000/graphql";

/// Error class the server attaches to rejected sessions
pub const AUTHENTICATION_ERROR: &str = "AuthenticationError";

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected the session token
    #[error("{0}")]
    Authentication(String),

    #[error("{message}")]
    GraphQL { name: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Response is missing '{0}'")]
    MissingData(String),
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ErrorExtensions {
    #[serde(default)]
    pub name: Option<String>,
}

/// One entry of a GraphQL `errors` array
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<ErrorExtensions>,
}

impl GraphQLError {
    pub fn name(&self) -> Option<&str> {
        self.extensions.as_ref()?.name.as_deref()
    }
}

/// Raw GraphQL response body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphQLResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<GraphQLError>,
}

impl GraphQLResponse {
    /// The `data` object, or the first error.
    /// An authentication error wins over any other error in the list.
    pub fn into_data(self) -> Result<Value, ClientError> {
        if let Some(auth) = self
            .errors
            .iter()
            .find(|e| e.name() == Some(AUTHENTICATION_ERROR))
        {
            return Err(ClientError::Authentication(auth.message.clone()));
        }

        if let Some(first) = self.errors.into_iter().next() {
            return Err(ClientError::GraphQL {
                name: first.name().unwrap_or("Error").to_string(),
                message: first.message,
            });
        }

        match self.data {
            Some(data) if !data.is_null() => Ok(data),
            _ => Err(ClientError::MissingData("data".to_string())),
        }
    }
}

/// Take `field` out of a `data` object and decode it
pub fn take_field<T: DeserializeOwned>(data: &mut Value, field: &str) -> Result<T, ClientError> {
    let value = data
        .get_mut(field)
        .map(Value::take)
        .ok_or_else(|| ClientError::MissingData(field.to_string()))?;
    Ok(serde_json::from_value(value)?)
}

/// Executes GraphQL operations against the Share API
#[async_trait]
pub trait Transport: Send + Sync {
    /// Run `query` with `variables`, sending `token` as the session.
    /// An empty token is sent as-is; the server treats it as anonymous.
    async fn execute(
        &self,
        query: &str,
        variables: Value,
        token: &str,
    ) -> Result<GraphQLResponse, ClientError>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(
        &self,
        query: &str,
        variables: Value,
        token: &str,
    ) -> Result<GraphQLResponse, ClientError> {
        debug!(endpoint = %self.endpoint, "Sending GraphQL request");

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<GraphQLResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: Value) -> GraphQLResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_data_returned_without_errors() {
        let data = response(json!({"data": {"health": "ok"}})).into_data().unwrap();
        assert_eq!(data["health"], "ok");
    }

    #[test]
    fn test_authentication_error_takes_precedence() {
        let err = response(json!({
            "data": null,
            "errors": [
                {"message": "Post not found.", "extensions": {"name": "Error"}},
                {"message": "Your session has expired. Please sign in again.",
                 "extensions": {"name": "AuthenticationError"}}
            ]
        }))
        .into_data()
        .unwrap_err();

        assert!(matches!(err, ClientError::Authentication(ref m) if m.starts_with("Your session")));
    }

    #[test]
    fn test_other_errors_keep_their_name() {
        let err = response(json!({
            "errors": [{"message": "Incorrect password.", "extensions": {"name": "Error"}}]
        }))
        .into_data()
        .unwrap_err();

        match err {
            ClientError::GraphQL { name, message } => {
                assert_eq!(name, "Error");
                assert_eq!(message, "Incorrect password.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_without_extensions() {
        let err = response(json!({"errors": [{"message": "boom"}]}))
            .into_data()
            .unwrap_err();
        assert!(matches!(err, ClientError::GraphQL { ref name, .. } if name == "Error"));
    }

    #[test]
    fn test_null_data_is_missing() {
        let err = response(json!({"data": null})).into_data().unwrap_err();
        assert!(matches!(err, ClientError::MissingData(_)));
    }

    #[test]
    fn test_take_field() {
        let mut data = json!({"signinUser": {"token": "abc"}});
        let token: String = {
            let mut inner: Value = take_field(&mut data, "signinUser").unwrap();
            take_field(&mut inner, "token").unwrap()
        };
        assert_eq!(token, "abc");

        let missing = take_field::<String>(&mut data, "signupUser");
        assert!(matches!(missing, Err(ClientError::MissingData(f)) if f == "signupUser"));
    }

    #[test]
    fn test_default_endpoint() {
        let transport = HttpTransport::default();
        assert_eq!(transport.endpoint(), "http://localhost:4000/graphql");
    }
}
