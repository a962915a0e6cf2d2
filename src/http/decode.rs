use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, header};
use serde_json::Value;

use super::error::TransportError;
use crate::graphql::Operation;

/// Whether the request declares a JSON body. Parameters such as `charset` are ignored.
pub fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
}

/// Buffer the whole body, refusing anything over `limit` bytes.
pub async fn read_body(
    headers: &HeaderMap,
    body: Body,
    limit: usize,
) -> Result<Bytes, TransportError> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    if declared.is_some_and(|length| length > limit) {
        return Err(TransportError::BodyTooLarge(limit));
    }

    axum::body::to_bytes(body, limit).await.map_err(|err| {
        tracing::debug!(error = %err, "failed to buffer request body");
        TransportError::UnreadableBody
    })
}

/// Decode a JSON body into an [`Operation`], checking each field's shape.
pub fn decode_operation(body: &[u8]) -> Result<Operation, TransportError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|err| TransportError::MalformedJson(err.to_string()))?;
    let Value::Object(mut fields) = value else {
        return Err(TransportError::NotAnObject);
    };

    let query = match fields.remove("query") {
        Some(Value::String(query)) => query,
        Some(_) => return Err(TransportError::QueryNotString),
        None => return Err(TransportError::MissingQuery),
    };

    let operation_name = match fields.remove("operationName") {
        None | Some(Value::Null) => None,
        Some(Value::String(name)) => Some(name),
        Some(_) => return Err(TransportError::OperationNameNotString),
    };

    let variables = match fields.remove("variables") {
        None | Some(Value::Null) => None,
        Some(Value::Object(variables)) => Some(variables),
        Some(_) => return Err(TransportError::VariablesNotObject),
    };

    Ok(Operation {
        query,
        operation_name,
        variables,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn test_content_type_matching() {
        assert!(is_json_content_type(&headers_with("application/json")));
        assert!(is_json_content_type(&headers_with("application/json; charset=utf-8")));
        assert!(is_json_content_type(&headers_with("Application/JSON")));
        assert!(!is_json_content_type(&headers_with("text/plain")));
        assert!(!is_json_content_type(&headers_with("application/graphql")));
        assert!(!is_json_content_type(&HeaderMap::new()));
    }

    #[test]
    fn test_decode_full_operation() {
        let operation = decode_operation(
            br#"{"query":"query Q { books { title } }","operationName":"Q","variables":{"a":1}}"#,
        )
        .unwrap();
        assert_eq!(operation.query, "query Q { books { title } }");
        assert_eq!(operation.operation_name.as_deref(), Some("Q"));
        assert_eq!(operation.variables.unwrap()["a"], serde_json::json!(1));
    }

    #[test]
    fn test_decode_null_optionals() {
        let operation =
            decode_operation(br#"{"query":"{ books { title } }","operationName":null,"variables":null}"#)
                .unwrap();
        assert!(operation.operation_name.is_none());
        assert!(operation.variables.is_none());
    }

    #[test]
    fn test_decode_rejections() {
        assert!(matches!(
            decode_operation(b"not-json"),
            Err(TransportError::MalformedJson(_))
        ));
        assert_eq!(decode_operation(b"[1]"), Err(TransportError::NotAnObject));
        assert_eq!(decode_operation(b"{}"), Err(TransportError::MissingQuery));
        assert_eq!(
            decode_operation(br#"{"query":42}"#),
            Err(TransportError::QueryNotString)
        );
        assert_eq!(
            decode_operation(br#"{"query":"{ books { title } }","operationName":7}"#),
            Err(TransportError::OperationNameNotString)
        );
        assert_eq!(
            decode_operation(br#"{"query":"{ books { title } }","variables":[1,2]}"#),
            Err(TransportError::VariablesNotObject)
        );
    }

    #[tokio::test]
    async fn test_read_body_respects_declared_length() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("100"));
        let result = read_body(&headers, Body::from("x".repeat(100)), 10).await;
        assert_eq!(result, Err(TransportError::BodyTooLarge(10)));

        let bytes = read_body(&HeaderMap::new(), Body::from("hello"), 10)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"hello");
    }
}
