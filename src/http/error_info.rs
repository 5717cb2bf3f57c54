//! Protocol error classification.
//!
//! Home servers answer failures with `{"errcode": "...", "error": "..."}`,
//! but proxies in front of them often do not. A body that does not parse
//! simply yields no structured detail.

use serde::{Deserialize, Serialize};

/// Structured error body returned by a home server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorInfo {
    /// Machine-readable code, e.g. `M_NOT_FOUND`.
    pub errcode: String,

    /// Human-readable message.
    #[serde(default)]
    pub error: String,

    /// Server-provided delay hint on 429 responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
}

impl ErrorInfo {
    /// Parse a failure body. Returns `None` when the body is not a protocol error.
    pub fn classify(body: &str, status: u16) -> Option<ErrorInfo> {
        let parsed = serde_json::from_str::<serde_json::Value>(body).and_then(|value| {
            if value.is_object() {
                serde_json::from_value::<ErrorInfo>(value)
            } else {
                Err(serde::de::Error::custom("error body is not a JSON object"))
            }
        });
        match parsed {
            Ok(info) => {
                tracing::debug!(
                    status,
                    errcode = %info.errcode,
                    error = %info.error,
                    "Request returned with an error"
                );
                Some(info)
            }
            Err(e) => {
                tracing::debug!(status, error = %e, content = %body, "Unable to parse Matrix error info");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_protocol_error() {
        let info = ErrorInfo::classify(r#"{"errcode":"M_NOT_FOUND","error":"Room not found"}"#, 404)
            .unwrap();
        assert_eq!(info.errcode, "M_NOT_FOUND");
        assert_eq!(info.error, "Room not found");
        assert_eq!(info.retry_after_ms, None);
    }

    #[test]
    fn test_classify_reads_retry_hint() {
        let info = ErrorInfo::classify(
            r#"{"errcode":"M_LIMIT_EXCEEDED","error":"Too many requests","retry_after_ms":2000}"#,
            429,
        )
        .unwrap();
        assert_eq!(info.retry_after_ms, Some(2000));
    }

    #[test]
    fn test_classify_tolerates_garbage() {
        assert!(ErrorInfo::classify("<html><body>502 Bad Gateway</body></html>", 502).is_none());
        assert!(ErrorInfo::classify("", 500).is_none());
        assert!(ErrorInfo::classify(r#"{"message":"nope"}"#, 400).is_none());
        assert!(ErrorInfo::classify(r#"["M_FORBIDDEN"]"#, 403).is_none());
        assert!(ErrorInfo::classify(r#"["M_FORBIDDEN","nope"]"#, 403).is_none());
        assert!(ErrorInfo::classify(r#""M_FORBIDDEN""#, 403).is_none());
        assert!(ErrorInfo::classify(r#"{"errcode":42}"#, 400).is_none());
    }

    #[test]
    fn test_classify_missing_message() {
        let info = ErrorInfo::classify(r#"{"errcode":"M_UNKNOWN"}"#, 500).unwrap();
        assert_eq!(info.error, "");
    }
}
