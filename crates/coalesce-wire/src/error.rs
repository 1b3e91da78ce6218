// Numan Thabit 2025
//! Structured errors serialized verbatim across the call boundary.
//!
//! The receiving side reconstructs exactly what the failing side raised;
//! no generic exception wrapping happens anywhere in between.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed taxonomy of failure kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Malformed request or arguments.
    BadRequest,
    /// Missing or invalid credentials.
    NotAuthenticated,
    /// Authenticated but not allowed.
    Forbidden,
    /// No such resource or service.
    NotFound,
    /// The target service does not implement the method.
    MethodNotAllowed,
    /// Structurally unacceptable request, e.g. a malformed batch tuple.
    NotAcceptable,
    /// The call did not complete in time.
    Timeout,
    /// Conflicting state on the server.
    Conflict,
    /// Understood but semantically invalid.
    Unprocessable,
    /// Unclassified handler failure.
    GeneralError,
    /// The operation is not implemented.
    NotImplemented,
    /// Transport or service unavailable.
    Unavailable,
}

impl ErrorKind {
    /// Numeric code carried on the wire for this kind.
    pub fn code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotAuthenticated => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::MethodNotAllowed => 405,
            ErrorKind::NotAcceptable => 406,
            ErrorKind::Timeout => 408,
            ErrorKind::Conflict => 409,
            ErrorKind::Unprocessable => 422,
            ErrorKind::GeneralError => 500,
            ErrorKind::NotImplemented => 501,
            ErrorKind::Unavailable => 503,
        }
    }

    /// Coarse class: `client-error` below 500, `server-error` otherwise.
    pub fn category(&self) -> &'static str {
        if self.code() < 500 {
            "client-error"
        } else {
            "server-error"
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Same kebab-case name the wire carries.
        let name = match self {
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::NotAuthenticated => "not-authenticated",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not-found",
            ErrorKind::MethodNotAllowed => "method-not-allowed",
            ErrorKind::NotAcceptable => "not-acceptable",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unprocessable => "unprocessable",
            ErrorKind::GeneralError => "general-error",
            ErrorKind::NotImplemented => "not-implemented",
            ErrorKind::Unavailable => "unavailable",
        };
        f.write_str(name)
    }
}

/// Structured error carried in a rejected settled result.
///
/// Field names are part of the wire format and must not change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    /// Which kind of failure this is.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
    /// Numeric code matching the kind.
    pub code: u16,
    /// Coarse class, `client-error` or `server-error`.
    pub category: String,
    /// Optional structured payload attached by the failing handler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Optional per-field validation errors.
    #[serde(rename = "fieldErrors", default, skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<Value>,
}

impl RpcError {
    /// Error of the given kind with code and category derived from it.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: kind.code(),
            category: kind.category().to_string(),
            data: None,
            field_errors: None,
        }
    }

    /// Attach a structured payload.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach per-field validation errors.
    pub fn with_field_errors(mut self, errors: Value) -> Self {
        self.field_errors = Some(errors);
        self
    }

    /// Malformed request or arguments.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    /// No such resource or service.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// The target service does not implement the method.
    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MethodNotAllowed, message)
    }

    /// Structurally unacceptable request.
    pub fn not_acceptable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotAcceptable, message)
    }

    /// Unclassified handler failure.
    pub fn general_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::GeneralError, message)
    }

    /// Transport or service unavailable.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unavailable, message)
    }

    /// The call did not complete in time.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.kind, self.code, self.message)
    }
}

impl std::error::Error for RpcError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn codes_and_categories_follow_the_kind() {
        assert_eq!(ErrorKind::NotAcceptable.code(), 406);
        assert_eq!(ErrorKind::NotAcceptable.category(), "client-error");
        assert_eq!(ErrorKind::GeneralError.code(), 500);
        assert_eq!(ErrorKind::GeneralError.category(), "server-error");

        let err = RpcError::not_acceptable("bad tuple");
        assert_eq!(err.code, 406);
        assert_eq!(err.category, "client-error");
    }

    #[test]
    fn serializes_verbatim() {
        let err = RpcError::bad_request("name is invalid")
            .with_data(json!({"attempt": 3}))
            .with_field_errors(json!({"name": "must not be empty"}));
        let encoded = serde_json::to_value(&err).expect("encode");
        assert_eq!(
            encoded,
            json!({
                "kind": "bad-request",
                "message": "name is invalid",
                "code": 400,
                "category": "client-error",
                "data": {"attempt": 3},
                "fieldErrors": {"name": "must not be empty"},
            })
        );
        let decoded: RpcError = serde_json::from_value(encoded).expect("decode");
        assert_eq!(decoded, err);
    }

    #[test]
    fn optional_payloads_are_omitted() {
        let encoded = serde_json::to_value(RpcError::timeout("too slow")).expect("encode");
        assert!(encoded.get("data").is_none());
        assert!(encoded.get("fieldErrors").is_none());
    }

    #[test]
    fn display_names_the_kind() {
        let err = RpcError::general_error("boom");
        assert_eq!(err.to_string(), "general-error (500): boom");
    }
}
