//! graphql request values
//!
//! a request is built per call site and never validated at construction;
//! the client checks the query shape when it is executed.

use serde::Serialize;
use serde_json::{Map, Value};

/// a graphql operation: query document, variables, optional operation name
///
/// fields are read-only once built; the `with_*` builders consume and
/// return the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQlRequest {
    query: String,
    variables: Value,
    #[serde(rename = "operationName", skip_serializing_if = "Option::is_none")]
    operation_name: Option<String>,
}

impl GraphQlRequest {
    /// create a request with empty variables and no operation name
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: Value::Object(Map::new()),
            operation_name: None,
        }
    }

    /// set the variables document
    ///
    /// `null` is normalized to an empty object.
    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = match variables {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        self
    }

    /// set the operation name
    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// query document text
    pub fn query(&self) -> &str {
        &self.query
    }

    /// variables object (empty object by default)
    pub fn variables(&self) -> &Value {
        &self.variables
    }

    /// operation name to select inside the document
    pub fn operation_name(&self) -> Option<&str> {
        self.operation_name.as_deref()
    }

    /// json body sent over the wire
    pub(crate) fn to_payload(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".to_string(), Value::String(self.query.clone()));
        body.insert("variables".to_string(), self.variables.clone());
        if let Some(name) = &self.operation_name {
            body.insert("operationName".to_string(), Value::String(name.clone()));
        }
        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_defaults() {
        let request = GraphQlRequest::new("query { ok }");
        assert_eq!(request.query(), "query { ok }");
        assert_eq!(request.variables(), &json!({}));
        assert!(request.operation_name().is_none());
    }

    #[test]
    fn test_new_does_not_validate() {
        let request = GraphQlRequest::new("");
        assert!(request.query().is_empty());
    }

    #[test]
    fn test_null_variables_become_empty_object() {
        let request = GraphQlRequest::new("query { ok }").with_variables(Value::Null);
        assert_eq!(request.variables(), &json!({}));
    }

    #[test]
    fn test_payload_omits_missing_operation_name() {
        let payload = GraphQlRequest::new("query { ok }").to_payload();
        assert_eq!(payload, json!({"query": "query { ok }", "variables": {}}));
    }

    #[test]
    fn test_payload_matches_serialized_request() {
        let request = GraphQlRequest::new("query Account($id: ID!) { account(id: $id) { id } }")
            .with_variables(json!({"id": 1}))
            .with_operation_name("Account");
        let payload = request.to_payload();
        assert_eq!(payload["variables"]["id"], 1);
        assert_eq!(payload["operationName"], "Account");
        assert_eq!(payload, serde_json::to_value(&request).unwrap());
    }
}
