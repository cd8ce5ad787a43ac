//! error types
//!
//! structured errors for config, transport, http status, parsing, and
//! graphql responses. pipeline failures are folded into the response's
//! error list with [`Error::to_graphql_error`].

use crate::graphql::GraphQlError;
use serde_json::json;
use std::fmt;

/// message used for queries rejected before any network call
pub(crate) const INVALID_QUERY_MESSAGE: &str = "Invalid GraphQL query";

/// library result type
pub type Result<T> = std::result::Result<T, Error>;

/// error type for the client and its helpers
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// transport failure (connect, timeout, dns, body read)
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// malformed query shape, detected locally
    #[error("{0}")]
    Validation(String),

    /// non-2xx response
    #[error("http status {status}: {body}")]
    HttpStatus {
        /// http status code
        status: u16,
        /// raw response body
        body: String,
    },

    /// response body is not a json object
    #[error("invalid response body: {0}")]
    Parse(String),

    #[error("request failed after {attempts} attempts: {message}")]
    RetriesExhausted {
        /// transport attempts made
        attempts: u32,
        /// last transport failure
        message: String,
    },

    #[error("client is closed")]
    Closed,

    #[error("graphql error: {message}")]
    GraphQl {
        /// graphql error list
        errors: Vec<GraphQlError>,
        /// top-level message
        message: String,
    },

    #[error("field `{0}` missing from response data")]
    MissingField(String),
}

impl Error {
    /// true if another transport attempt may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Http(_))
    }

    /// true if the error looks like an auth failure
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::HttpStatus { status: 401 | 403, .. })
    }

    /// stable code placed in `extensions.code`
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "CONFIG_ERROR",
            Error::Http(_) => "TRANSPORT_ERROR",
            Error::Json(_) => "JSON_ERROR",
            Error::Validation(_) => "VALIDATION_FAILED",
            Error::HttpStatus { .. } => "HTTP_STATUS",
            Error::Parse(_) => "PARSE_ERROR",
            Error::RetriesExhausted { .. } => "RETRIES_EXHAUSTED",
            Error::Closed => "CLIENT_CLOSED",
            Error::GraphQl { .. } => "GRAPHQL_ERROR",
            Error::MissingField(_) => "MISSING_FIELD",
        }
    }

    /// build the graphql-level error entry for a pipeline failure
    pub fn to_graphql_error(&self) -> GraphQlError {
        let extensions = match self {
            Error::HttpStatus { status, body } => {
                json!({ "code": self.code(), "status": status, "body": body })
            }
            Error::RetriesExhausted { attempts, .. } => {
                json!({ "code": self.code(), "attempts": attempts })
            }
            _ => json!({ "code": self.code() }),
        };
        let mut error = GraphQlError::new(self.to_string());
        error.extensions = Some(extensions);
        error
    }

    /// error signalled by typed helpers when the response has errors
    pub(crate) fn from_graphql_errors(errors: Vec<GraphQlError>) -> Self {
        let message = errors
            .first()
            .map(|err| err.message.clone())
            .unwrap_or_else(|| "graphql error".to_string());
        Error::GraphQl { errors, message }
    }
}

impl fmt::Display for GraphQlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
