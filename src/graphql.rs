//! graphql types
//!
//! parsed responses and the normalized error list.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// graphql response
///
/// partial data with errors is valid graphql, so branch on
/// [`GraphQlResponse::is_success`] rather than on `data`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphQlResponse {
    /// response data, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// errors in server order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQlError>,
    /// top-level extensions payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphQlResponse {
    /// response carrying a single error and no data
    pub fn from_error(error: GraphQlError) -> Self {
        Self {
            data: None,
            errors: vec![error],
            extensions: None,
        }
    }

    /// true if the response has no errors
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// true if the response contains graphql errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// first error, if any
    pub fn first_error(&self) -> Option<&GraphQlError> {
        self.errors.first()
    }
}

/// graphql error entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    /// error message
    pub message: String,
    /// error locations in the query
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<GraphQlLocation>,
    /// response path, each segment stringified
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
    /// optional extensions payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphQlError {
    /// error with only a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: Vec::new(),
            extensions: None,
        }
    }

    /// `extensions.code`, if the server or pipeline set one
    pub fn code(&self) -> Option<&str> {
        self.extensions.as_ref()?.get("code")?.as_str()
    }
}

/// graphql error location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphQlLocation {
    /// line number (1-based)
    pub line: u64,
    /// column number (1-based)
    pub column: u64,
}
