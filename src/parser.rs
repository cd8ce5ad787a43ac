//! response parsing
//!
//! lenient conversion of a response body into a [`GraphQlResponse`].
//! optional fields that are missing or malformed fall back to defaults;
//! only a body that is not a json object at all is rejected.

use crate::error::{Error, Result};
use crate::graphql::{GraphQlError, GraphQlLocation, GraphQlResponse};
use serde_json::{Map, Value};

const UNKNOWN_ERROR: &str = "Unknown error";

/// parse a raw response body
pub fn parse_response(text: &str) -> Result<GraphQlResponse> {
    let value: Value = serde_json::from_str(text).map_err(|err| Error::Parse(err.to_string()))?;
    let Value::Object(mut root) = value else {
        return Err(Error::Parse("expected a json object".to_string()));
    };

    let errors = match root.remove("errors") {
        Some(Value::Array(entries)) => entries.into_iter().map(parse_error).collect(),
        _ => Vec::new(),
    };

    Ok(GraphQlResponse {
        data: non_null(root.remove("data")),
        errors,
        extensions: non_null(root.remove("extensions")),
    })
}

fn parse_error(entry: Value) -> GraphQlError {
    let Value::Object(mut entry) = entry else {
        return GraphQlError::new(UNKNOWN_ERROR);
    };

    let message = match entry.remove("message") {
        Some(Value::String(message)) => message,
        _ => UNKNOWN_ERROR.to_string(),
    };

    let path = match entry.remove("path") {
        Some(Value::Array(segments)) => segments.into_iter().map(path_segment).collect(),
        _ => Vec::new(),
    };

    let locations = match entry.remove("locations") {
        Some(Value::Array(locations)) => locations.iter().filter_map(parse_location).collect(),
        _ => Vec::new(),
    };

    GraphQlError {
        message,
        locations,
        path,
        extensions: non_null(entry.remove("extensions")),
    }
}

fn path_segment(segment: Value) -> String {
    match segment {
        Value::String(key) => key,
        other => other.to_string(),
    }
}

fn parse_location(location: &Value) -> Option<GraphQlLocation> {
    let location: &Map<String, Value> = location.as_object()?;
    Some(GraphQlLocation {
        line: location.get("line")?.as_u64()?,
        column: location.get("column")?.as_u64()?,
    })
}

fn non_null(value: Option<Value>) -> Option<Value> {
    value.filter(|value| !value.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_data_only() {
        let response = parse_response("{\"data\": {\"account\": {\"id\": 1}}}").unwrap();
        assert!(response.is_success());
        assert_eq!(response.data.unwrap()["account"]["id"], 1);
        assert!(response.extensions.is_none());
    }

    #[test]
    fn test_parse_normalizes_errors() {
        let response = parse_response(
            "{\"errors\":[{\"message\":\"X\",\"path\":[\"a\",\"b\"],\"extensions\":{\"code\":\"E\"}}]}",
        )
        .unwrap();
        assert_eq!(response.errors.len(), 1);
        let error = &response.errors[0];
        assert_eq!(error.message, "X");
        assert_eq!(error.path, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(error.code(), Some("E"));
        assert!(response.data.is_none());
    }

    #[test]
    fn test_parse_stringifies_index_segments() {
        let response =
            parse_response("{\"errors\":[{\"message\":\"m\",\"path\":[\"items\",0,\"name\"]}]}")
                .unwrap();
        assert_eq!(response.errors[0].path, vec!["items", "0", "name"]);
    }

    #[test]
    fn test_parse_degrades_malformed_fields() {
        let response = parse_response(
            "{\"errors\":[{\"path\":\"nope\",\"locations\":[{\"line\":\"x\"},{\"line\":2,\"column\":5}]}, 7]}",
        )
        .unwrap();
        assert_eq!(response.errors.len(), 2);
        assert_eq!(response.errors[0].message, "Unknown error");
        assert!(response.errors[0].path.is_empty());
        assert_eq!(
            response.errors[0].locations,
            vec![GraphQlLocation { line: 2, column: 5 }]
        );
        assert_eq!(response.errors[1].message, "Unknown error");
    }

    #[test]
    fn test_parse_ignores_non_array_errors() {
        let response = parse_response("{\"data\": null, \"errors\": {\"message\": \"x\"}}").unwrap();
        assert!(response.is_success());
        assert!(response.data.is_none());
    }

    #[test]
    fn test_parse_preserves_error_order() {
        let response =
            parse_response("{\"errors\":[{\"message\":\"one\"},{\"message\":\"two\"}]}").unwrap();
        let messages: Vec<_> = response.errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["one", "two"]);
    }

    #[test]
    fn test_parse_extensions_passthrough() {
        let response =
            parse_response("{\"data\": {}, \"extensions\": {\"cost\": {\"requested\": 3}}}").unwrap();
        assert_eq!(response.extensions.unwrap()["cost"]["requested"], 3);
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let err = parse_response("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = parse_response("[1, 2]").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_serialized_success_parses_as_success() {
        let payloads = [
            json!(null),
            json!({"account": {"id": 1, "tags": ["a", "b"]}}),
            json!([1, 2, 3]),
            json!("text"),
        ];
        for data in payloads {
            let response = GraphQlResponse {
                data: Some(data),
                ..Default::default()
            };
            let text = serde_json::to_string(&response).unwrap();
            assert!(parse_response(&text).unwrap().is_success());
        }
    }
}
