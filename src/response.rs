// Response envelopes shared by every endpoint
//
//   { "success": true,  "data": ..., "timestamp": "..." }
//   { "success": false, "error": { "code": ..., "message": ... }, "timestamp": "..." }

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

pub const DEFAULT_ERROR_CODE: &str = "ERROR";

#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.error.details = Some(details);
        self
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn success_response<T>(data: T) -> SuccessResponse<T> {
    SuccessResponse {
        success: true,
        data,
        timestamp: timestamp(),
    }
}

/// Error envelope; `code` falls back to [`DEFAULT_ERROR_CODE`]
pub fn error_response(message: impl Into<String>, code: Option<&str>) -> ErrorResponse {
    ErrorResponse {
        success: false,
        error: ErrorBody {
            code: code.unwrap_or(DEFAULT_ERROR_CODE).to_string(),
            message: message.into(),
            details: None,
        },
        timestamp: timestamp(),
    }
}
