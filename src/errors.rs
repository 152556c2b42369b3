// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Luotain Error Types
 * Scanner error taxonomy with per-kind handling policy
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use std::time::Duration;
use thiserror::Error;

/// Scanner error taxonomy. Each kind maps to a fixed handling policy:
/// only `Cancelled` and `InvalidTarget` abort a scan, everything else is
/// surfaced as an event and the scan continues.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("URL out of scope: {url}")]
    OutOfScope { url: String },

    #[error("Request timed out after {timeout:?}: {url}")]
    Timeout { url: String, timeout: Duration },

    #[error("Connection error for {url}: {reason}")]
    Connection { url: String, reason: String },

    #[error("Parse error for {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("Headless browser unavailable: {reason}")]
    BrowserUnavailable { reason: String },

    #[error("Evidence store error: {reason}")]
    EvidenceStore { reason: String },

    #[error("Scan cancelled")]
    Cancelled,

    #[error("Invalid target URL {url}: {reason}")]
    InvalidTarget { url: String, reason: String },
}

impl ScanError {
    /// Errors that abort the scan. Everything else is logged and skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScanError::Cancelled | ScanError::InvalidTarget { .. })
    }

    /// A timeout while a timing-class payload is in flight is a candidate
    /// finding rather than a failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ScanError::Timeout { .. })
    }

    /// Event-log tag for this error kind
    pub fn event_kind(&self) -> &'static str {
        match self {
            ScanError::OutOfScope { .. } => "OUT_OF_SCOPE",
            ScanError::Timeout { .. } => "TIMEOUT",
            ScanError::Connection { .. } => "CONNECTION_ERROR",
            ScanError::Parse { .. } => "PARSE_ERROR",
            ScanError::BrowserUnavailable { .. } => "BROWSER_UNAVAILABLE",
            ScanError::EvidenceStore { .. } => "EVIDENCE_STORE_ERROR",
            ScanError::Cancelled => "CANCELLED",
            ScanError::InvalidTarget { .. } => "INVALID_TARGET",
        }
    }

    /// Classify a transport error against the URL it was sent to
    pub fn from_request_error(err: reqwest::Error, url: &str, timeout: Duration) -> Self {
        if err.is_timeout() {
            ScanError::Timeout {
                url: url.to_string(),
                timeout,
            }
        } else {
            ScanError::Connection {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

/// Result type for scanner operations
pub type ScanResult<T> = Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_cancellation_and_invalid_target_are_fatal() {
        assert!(ScanError::Cancelled.is_fatal());
        assert!(ScanError::InvalidTarget {
            url: "ftp://x".into(),
            reason: "scheme".into()
        }
        .is_fatal());

        assert!(!ScanError::OutOfScope { url: "http://evil.test".into() }.is_fatal());
        assert!(!ScanError::Timeout {
            url: "http://t.test".into(),
            timeout: Duration::from_secs(10)
        }
        .is_fatal());
        assert!(!ScanError::EvidenceStore { reason: "disk".into() }.is_fatal());
    }

    #[test]
    fn test_event_kind_tags() {
        assert_eq!(
            ScanError::OutOfScope { url: "http://evil.test".into() }.event_kind(),
            "OUT_OF_SCOPE"
        );
        assert_eq!(
            ScanError::BrowserUnavailable { reason: "no chrome".into() }.event_kind(),
            "BROWSER_UNAVAILABLE"
        );
    }
}
