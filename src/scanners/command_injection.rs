// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Command Injection Attack Class
 * Shell metacharacter payloads with output- and time-based detection
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use super::{Detection, TIME_DELAY_SECS};

/// Shell metacharacters combined with typical enumerators
pub const PAYLOADS: &[&str] = &[
    "; ls",
    "| ls",
    "& dir",
    "&& whoami",
    "`id`",
    "$(whoami)",
    "; sleep 5",
    "| sleep 5",
    "; ping -c 5 127.0.0.1",
    "& ping -n 5 127.0.0.1",
];

/// Output markers of executed enumerators (unix and windows)
const OUTPUT_MARKERS: &[&str] = &[
    "uid=", "gid=", "groups=", "root:", "bin:",
    "drwx", "total ", "Directory of", "Volume in drive",
];

pub fn detect(body: &str, payload: &str, elapsed_secs: f64) -> Option<Detection> {
    for marker in OUTPUT_MARKERS {
        if body.contains(marker) {
            return Some(Detection {
                technique: "Output-based",
                evidence: format!("Command output detected: {}", marker),
                confidence: 95,
                literal: true,
            });
        }
    }

    if payload.contains("sleep") && elapsed_secs >= TIME_DELAY_SECS {
        return Some(Detection {
            technique: "Time-based",
            evidence: format!("Response delayed by {:.2} seconds", elapsed_secs),
            confidence: 90,
            literal: false,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_output_detection() {
        let body = "uid=33(www-data) gid=33(www-data) groups=33(www-data)";
        let detection = detect(body, "`id`", 0.2).unwrap();
        assert_eq!(detection.technique, "Output-based");
        assert!(detection.literal);
    }

    #[test]
    fn test_windows_dir_output_detection() {
        let body = " Volume in drive C has no label.";
        assert!(detect(body, "& dir", 0.2).is_some());
    }

    #[test]
    fn test_sleep_delay_detection() {
        let detection = detect("ok", "; sleep 5", 5.4).unwrap();
        assert_eq!(detection.technique, "Time-based");
    }

    #[test]
    fn test_sleep_delay_detected_at_exact_threshold() {
        assert!(detect("ok", "; sleep 5", TIME_DELAY_SECS).is_some());
        assert!(detect("ok", "; sleep 5", TIME_DELAY_SECS - 0.1).is_none());
    }

    #[test]
    fn test_delay_without_sleep_payload_is_benign() {
        assert!(detect("ok", "&& whoami", 6.0).is_none());
    }

    #[test]
    fn test_clean_response_is_benign() {
        assert!(detect("<html>all good</html>", "; ls", 0.2).is_none());
    }
}
