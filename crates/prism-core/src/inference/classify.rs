//! Response classification: image, model-still-loading, or fatal.
//!
//! The API signals a cold model only through an error message, not a
//! dedicated status code, and it occasionally labels a JSON error body as
//! `image/*` or `application/octet-stream`. The body is therefore checked for
//! a structured error before the content type is trusted. Only a failure
//! status can be retried; a 2xx that carries an error is final.

use serde::Deserialize;

use super::client::RawResponse;
use crate::error::GenerationError;
use crate::types::AttemptResult;

/// Substring in an error message that means the model is still warming up.
pub const MODEL_LOADING_MARKER: &str = "loading";

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorMessage,
    #[serde(default)]
    estimated_time: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessage {
    fn into_text(self) -> String {
        match self {
            ErrorMessage::One(s) => s,
            ErrorMessage::Many(v) => v.join("; "),
        }
    }
}

/// Try to read `{"error": ...}` out of a body.
fn parse_error_body(body: &[u8]) -> Option<(String, Option<f64>)> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    Some((parsed.error.into_text(), parsed.estimated_time))
}

/// Whether an error message means "model still initializing".
pub fn is_loading_message(message: &str) -> bool {
    message.to_lowercase().contains(MODEL_LOADING_MARKER)
}

/// Whether a content type denotes an image payload.
fn is_image_like(content_type: Option<&str>) -> bool {
    let Some(ct) = content_type else {
        return false;
    };
    let mime = ct.split(';').next().unwrap_or("").trim().to_lowercase();
    mime.starts_with("image/") || mime == "application/octet-stream"
}

/// Classify a single response. This is the only place that decides between
/// success, retry, and failure.
pub fn classify(response: RawResponse) -> AttemptResult {
    let status = response.status;
    let success = (200..300).contains(&status);

    if let Some((message, estimated_time)) = parse_error_body(&response.body) {
        if !success && is_loading_message(&message) {
            return AttemptResult::Transient {
                reason: message,
                estimated_time,
            };
        }
        return AttemptResult::Fatal(GenerationError::RemoteApi { status, message });
    }

    if success && is_image_like(response.content_type.as_deref()) && !response.body.is_empty() {
        return AttemptResult::Success {
            content_type: response
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            bytes: response.body,
        };
    }

    AttemptResult::Fatal(GenerationError::InvalidResponseFormat { status })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, content_type: Option<&str>, body: &[u8]) -> RawResponse {
        RawResponse {
            status,
            content_type: content_type.map(String::from),
            body: body.to_vec(),
        }
    }

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_image_content_type_is_success() {
        match classify(response(200, Some("image/jpeg"), PNG_MAGIC)) {
            AttemptResult::Success {
                bytes,
                content_type,
            } => {
                assert_eq!(bytes, PNG_MAGIC);
                assert_eq!(content_type, "image/jpeg");
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn test_octet_stream_is_success() {
        let result = classify(response(200, Some("application/octet-stream"), PNG_MAGIC));
        assert!(matches!(result, AttemptResult::Success { .. }));
    }

    #[test]
    fn test_loading_error_is_transient_with_estimate() {
        let body = br#"{"error":"Model stabilityai/sdxl is currently loading","estimated_time":20.5}"#;
        match classify(response(503, Some("application/json"), body)) {
            AttemptResult::Transient {
                reason,
                estimated_time,
            } => {
                assert!(reason.contains("currently loading"));
                assert_eq!(estimated_time, Some(20.5));
            }
            other => panic!("expected transient, got {other:?}"),
        }
    }

    #[test]
    fn test_loading_marker_is_case_insensitive() {
        let body = br#"{"error":"Model is Loading"}"#;
        let result = classify(response(503, None, body));
        assert!(matches!(result, AttemptResult::Transient { .. }));
    }

    #[test]
    fn test_other_structured_error_is_fatal_remote_api() {
        let body = br#"{"error":"Authorization header is correct, but the token seems invalid"}"#;
        match classify(response(401, Some("application/json"), body)) {
            AttemptResult::Fatal(GenerationError::RemoteApi { status, message }) => {
                assert_eq!(status, 401);
                assert!(message.contains("token seems invalid"));
            }
            other => panic!("expected remote api error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_array_is_joined() {
        let body = br#"{"error":["Input validation error","inputs must be non-empty"]}"#;
        match classify(response(422, Some("application/json"), body)) {
            AttemptResult::Fatal(GenerationError::RemoteApi { message, .. }) => {
                assert_eq!(message, "Input validation error; inputs must be non-empty");
            }
            other => panic!("expected remote api error, got {other:?}"),
        }
    }

    #[test]
    fn test_json_error_mislabelled_as_image_is_not_success() {
        let body = br#"{"error":"Model too busy, unable to get response in less than 60 second(s)"}"#;
        let result = classify(response(200, Some("image/png"), body));
        assert!(matches!(
            result,
            AttemptResult::Fatal(GenerationError::RemoteApi { status: 200, .. })
        ));
    }

    #[test]
    fn test_loading_error_mislabelled_as_octet_stream_is_transient() {
        let body = br#"{"error":"Model is currently loading"}"#;
        let result = classify(response(503, Some("application/octet-stream"), body));
        assert!(matches!(result, AttemptResult::Transient { .. }));
    }

    #[test]
    fn test_loading_error_with_success_status_is_fatal() {
        let body = br#"{"error":"Model is currently loading","estimated_time":4.0}"#;
        for content_type in ["application/json", "application/octet-stream"] {
            match classify(response(200, Some(content_type), body)) {
                AttemptResult::Fatal(GenerationError::RemoteApi { status, message }) => {
                    assert_eq!(status, 200);
                    assert_eq!(message, "Model is currently loading");
                }
                other => panic!("expected remote api error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_success_with_non_image_body_is_invalid_format() {
        let result = classify(response(200, Some("text/html"), b"<html>oops</html>"));
        assert!(matches!(
            result,
            AttemptResult::Fatal(GenerationError::InvalidResponseFormat { status: 200 })
        ));
    }

    #[test]
    fn test_malformed_failure_body_is_invalid_format() {
        let result = classify(response(502, Some("text/plain"), b"Bad Gateway"));
        assert!(matches!(
            result,
            AttemptResult::Fatal(GenerationError::InvalidResponseFormat { status: 502 })
        ));
    }

    #[test]
    fn test_json_without_error_field_is_invalid_format() {
        let result = classify(response(500, Some("application/json"), br#"{"detail":"x"}"#));
        assert!(matches!(
            result,
            AttemptResult::Fatal(GenerationError::InvalidResponseFormat { status: 500 })
        ));
    }

    #[test]
    fn test_missing_content_type_is_invalid_format() {
        let result = classify(response(200, None, PNG_MAGIC));
        assert!(matches!(
            result,
            AttemptResult::Fatal(GenerationError::InvalidResponseFormat { .. })
        ));
    }

    #[test]
    fn test_empty_image_body_is_invalid_format() {
        let result = classify(response(200, Some("image/png"), b""));
        assert!(matches!(
            result,
            AttemptResult::Fatal(GenerationError::InvalidResponseFormat { .. })
        ));
    }

    #[test]
    fn test_content_type_parameters_are_ignored() {
        let result = classify(response(200, Some("Image/JPEG; charset=binary"), PNG_MAGIC));
        assert!(matches!(result, AttemptResult::Success { .. }));
    }
}
