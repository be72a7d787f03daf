//! API response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use zonal_common::ZonalError;

/// Successful analysis response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResponse {
    /// Always `"success"`.
    pub status: String,

    /// The decorated result table: column name → per-group values.
    pub data: Value,
}

impl AnalysisResponse {
    /// Wrap a result payload in the success envelope.
    pub fn new(data: Value) -> Self {
        Self {
            status: "success".to_string(),
            data,
        }
    }
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExceptionResponse {
    /// Always `"failed"`.
    pub status: String,

    /// HTTP status code.
    #[serde(rename = "statusCode")]
    pub status_code: u16,

    /// Human-readable error message.
    pub message: String,
}

impl ExceptionResponse {
    /// Create a new exception response.
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status: "failed".to_string(),
            status_code,
            message: message.into(),
        }
    }

    /// Create a 400 Bad Request exception.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    /// Create a 404 Not Found exception.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(404, message)
    }

    /// Create a 413 Payload Too Large exception.
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(413, message)
    }

    /// Create a 500 Internal Server Error exception.
    ///
    /// Internal details stay server-side; the body is deliberately opaque.
    pub fn internal_error() -> Self {
        Self::new(500, "Internal server error")
    }
}

impl From<&ZonalError> for ExceptionResponse {
    fn from(err: &ZonalError) -> Self {
        let status = err.http_status_code();
        if status == 500 {
            Self::internal_error()
        } else {
            Self::new(status, err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let resp = AnalysisResponse::new(serde_json::json!({"count": [3, 2, 1]}));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"]["count"][0], 3);
    }

    #[test]
    fn test_exception_from_validation_error() {
        let err = ZonalError::MissingParameter("geostore_id".to_string());
        let exc = ExceptionResponse::from(&err);
        assert_eq!(exc.status_code, 400);
        assert!(exc.message.contains("geostore_id"));
    }

    #[test]
    fn test_exception_hides_internal_details() {
        let err = ZonalError::StorageError("s3 credentials rejected".to_string());
        let exc = ExceptionResponse::from(&err);
        assert_eq!(exc.status_code, 500);
        assert!(!exc.message.contains("s3"));
    }

    #[test]
    fn test_exception_serialization() {
        let exc = ExceptionResponse::payload_too_large("Geometry exceeds 5000000 ha");
        let json = serde_json::to_string(&exc).unwrap();
        assert!(json.contains("\"status\":\"failed\""));
        assert!(json.contains("\"statusCode\":413"));
    }
}
