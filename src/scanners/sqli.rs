// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - SQL Injection Attack Class
 * Error-based, boolean-based and time-based detection
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use super::{is_timing_payload, Detection, TIME_DELAY_SECS};

/// Error stems, boolean pairs, comment-suffixed closers and timing stubs
pub const PAYLOADS: &[&str] = &[
    "'",
    "' OR '1'='1",
    "' OR '1'='1' --",
    "' OR '1'='1' #",
    "admin'--",
    "' UNION SELECT NULL--",
    "1' AND '1'='1",
    "1' AND '1'='2",
    "'; WAITFOR DELAY '00:00:05'--",
    "' OR SLEEP(5)--",
];

/// Database error markers surfaced in response bodies
const ERROR_MARKERS: &[&str] = &[
    "SQL syntax", "mysql_", "mysqli_", "ORA-", "PostgreSQL",
    "SQLServer", "sqlite", "Database error", "SQLSTATE",
];

/// Payloads whose signal is a response-length delta rather than an error
const BOOLEAN_PAYLOADS: &[&str] = &[
    "' OR '1'='1",
    "' OR '1'='1' --",
    "' OR '1'='1' #",
    "1' AND '1'='1",
    "1' AND '1'='2",
];

/// Boolean detection threshold: body length delta vs baseline, bytes
const BOOLEAN_LENGTH_DELTA: i64 = 100;

pub fn detect(
    body: &str,
    payload: &str,
    elapsed_secs: f64,
    baseline_length: Option<usize>,
) -> Option<Detection> {
    // Error-based
    for marker in ERROR_MARKERS {
        if body.contains(marker) {
            return Some(Detection {
                technique: "Error-based",
                evidence: format!("SQL error detected: {}", marker),
                confidence: 95,
                literal: true,
            });
        }
    }

    // Time-based blind
    if is_timing_payload(payload) && elapsed_secs >= TIME_DELAY_SECS {
        return Some(Detection {
            technique: "Time-based blind",
            evidence: format!("Response delayed by {:.2} seconds", elapsed_secs),
            confidence: 90,
            literal: false,
        });
    }

    // Boolean-based blind
    if BOOLEAN_PAYLOADS.contains(&payload) {
        if let Some(baseline_length) = baseline_length {
            let delta = (body.len() as i64 - baseline_length as i64).abs();
            if delta > BOOLEAN_LENGTH_DELTA {
                return Some(Detection {
                    technique: "Boolean-based blind",
                    evidence: format!("Response length changed by {} bytes", delta),
                    confidence: 90,
                    literal: false,
                });
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_based_detection() {
        let body = "You have an error in your SQL syntax near ''' at line 1";
        let detection = detect(body, "'", 0.1, Some(1000)).unwrap();
        assert_eq!(detection.technique, "Error-based");
        assert_eq!(detection.confidence, 95);
        assert!(detection.literal);
    }

    #[test]
    fn test_time_based_detection() {
        let detection = detect("normal page", "' OR SLEEP(5)--", 5.3, Some(1000)).unwrap();
        assert_eq!(detection.technique, "Time-based blind");
        assert!(detection.evidence.contains("5.3"));
        assert!(detection.confidence >= 85);
    }

    #[test]
    fn test_timing_payload_below_delay_is_benign() {
        assert!(detect("normal page", "' OR SLEEP(5)--", 1.2, Some(11)).is_none());
    }

    #[test]
    fn test_boolean_detection_needs_large_delta() {
        let body = "x".repeat(1500);
        let detection = detect(&body, "' OR '1'='1", 0.1, Some(1000)).unwrap();
        assert_eq!(detection.technique, "Boolean-based blind");

        let near_baseline = "x".repeat(1050);
        assert!(detect(&near_baseline, "' OR '1'='1", 0.1, Some(1000)).is_none());
    }

    #[test]
    fn test_boolean_detection_requires_baseline() {
        let body = "x".repeat(1500);
        assert!(detect(&body, "' OR '1'='1", 0.1, None).is_none());
    }

    #[test]
    fn test_non_boolean_payload_ignores_length_delta() {
        let body = "x".repeat(1500);
        assert!(detect(&body, "admin'--", 0.1, Some(1000)).is_none());
    }
}
