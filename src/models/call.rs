//! Call record model
//!
//! One observed outbound request to the upstream API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// A single logged upstream call
///
/// Field names follow the JSON feed consumed by the log page's inspection modal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Completion time of the call
    #[serde(rename = "Timestamp")]
    pub timestamp: DateTime<Utc>,
    /// HTTP method
    #[serde(rename = "Method")]
    pub method: String,
    /// Target URL including the query string
    #[serde(rename = "URL")]
    pub url: String,
    /// Response status, 0 if no response was received
    #[serde(rename = "Status")]
    pub status: u16,
    /// Elapsed wall time, serialized as nanoseconds
    #[serde(rename = "Duration", with = "duration_nanos")]
    pub duration: Duration,
    /// Failure description, empty when the call completed
    #[serde(rename = "Error")]
    pub error: String,
    /// Raw request body
    #[serde(rename = "RequestBody")]
    pub request_body: String,
    /// Raw response body
    #[serde(rename = "ResponseBody")]
    pub response_body: String,
    /// Outbound headers, redacted for display
    ///
    /// `Authorization` holds a masked bearer value, not the token that was sent.
    #[serde(rename = "Headers")]
    pub headers: BTreeMap<String, String>,
}

impl CallRecord {
    /// Start a record for `method url`, stamped with the current time
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            method: method.into(),
            url: url.into(),
            status: 0,
            duration: Duration::ZERO,
            error: String::new(),
            request_body: String::new(),
            response_body: String::new(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = error.into();
        self
    }

    pub fn with_request_body(mut self, body: impl Into<String>) -> Self {
        self.request_body = body.into();
        self
    }

    pub fn with_response_body(mut self, body: impl Into<String>) -> Self {
        self.response_body = body.into();
        self
    }

    /// Set a header; a repeated name replaces the earlier value
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Whether the call failed before completing end to end
    pub fn is_error(&self) -> bool {
        !self.error.is_empty()
    }

    /// Elapsed time in whole milliseconds
    pub fn duration_ms(&self) -> u128 {
        self.duration.as_millis()
    }
}

/// `Duration` as an integer count of nanoseconds
mod duration_nanos {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        serializer.serialize_u64(nanos)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let nanos = u64::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_field_names() {
        let record = CallRecord::new("GET", "https://api.example.com/v2/products")
            .with_status(200)
            .with_duration(Duration::from_millis(42))
            .with_header("Authorization", "Bearer ****abcd");

        let value = serde_json::to_value(&record).unwrap();
        for key in [
            "Timestamp", "Method", "URL", "Status", "Duration", "Error",
            "RequestBody", "ResponseBody", "Headers",
        ] {
            assert!(value.get(key).is_some(), "missing field {}", key);
        }
        assert_eq!(value["Duration"], 42_000_000u64);
        assert_eq!(value["Duration"].as_u64().unwrap() / 1_000_000, 42);
        assert_eq!(value["Headers"]["Authorization"], "Bearer ****abcd");
        assert_eq!(value["Error"], "");
    }

    #[test]
    fn test_header_last_write_wins() {
        let record = CallRecord::new("POST", "http://localhost/")
            .with_header("Content-Type", "text/plain")
            .with_header("Content-Type", "application/x-www-form-urlencoded");

        assert_eq!(record.headers.len(), 1);
        assert_eq!(record.headers["Content-Type"], "application/x-www-form-urlencoded");
    }

    #[test]
    fn test_error_flag() {
        let ok = CallRecord::new("GET", "http://localhost/").with_status(200);
        assert!(!ok.is_error());

        let failed = CallRecord::new("GET", "http://localhost/").with_error("connection refused");
        assert!(failed.is_error());
        assert_eq!(failed.status, 0);
    }
}
