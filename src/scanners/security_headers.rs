// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Security Headers Check
 * Audits the target root for missing browser security headers
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::evidence::HttpEvidence;
use crate::http_client::HttpClient;
use crate::types::{Severity, Vulnerability};
use tracing::{debug, info};

const CHECKED_HEADERS: &[(&str, &str)] = &[
    ("content-security-policy", "Content-Security-Policy"),
    ("x-frame-options", "X-Frame-Options"),
    ("x-content-type-options", "X-Content-Type-Options"),
];

/// Audit `target` for missing security headers. Emits at most one finding
/// aggregating everything that is absent, backed by one evidence record.
pub async fn scan(client: &HttpClient, target: &str) -> Vec<(Vulnerability, HttpEvidence)> {
    info!("[Security Headers] Checking: {}", target);

    let response = match client.get(target).await {
        Ok(r) => r,
        Err(e) => {
            debug!("Security header check failed to fetch {}: {}", target, e);
            return Vec::new();
        }
    };

    // Header posture on error pages and redirects is not meaningful
    if response.status_code == 404 || response.status_code >= 500 || response.is_redirect() {
        return Vec::new();
    }

    let mut missing: Vec<&str> = CHECKED_HEADERS
        .iter()
        .filter(|(lookup, _)| response.header(lookup).is_none())
        .map(|(_, display)| *display)
        .collect();

    if target.starts_with("https://") && response.header("strict-transport-security").is_none() {
        missing.push("Strict-Transport-Security");
    }

    if missing.is_empty() {
        return Vec::new();
    }

    let evidence_record =
        HttpEvidence::capture("GET", target, &client.standard_headers(), "", &response);

    let finding = Vulnerability {
        id: format!("headers_{}", uuid::Uuid::new_v4()),
        vuln_type: "Missing Security Headers".to_string(),
        title: format!("Missing security headers ({})", missing.join(", ")),
        severity: Severity::Low,
        confidence: 90,
        url: target.to_string(),
        method: "GET".to_string(),
        parameter: None,
        payload: String::new(),
        description: format!(
            "The response does not set the following security headers: {}. \
             Without them the application relies on browser defaults for \
             framing, content sniffing and script execution policy.",
            missing.join(", ")
        ),
        evidence: format!("Absent headers: {}", missing.join(", ")),
        cwe: "CWE-693".to_string(),
        cvss: Some(3.7),
        poc: format!("curl -sI {} | grep -iE 'content-security|frame-options|content-type-options'", target),
        remediation: "Set Content-Security-Policy, X-Frame-Options and \
                      X-Content-Type-Options on every HTML response. Enable \
                      Strict-Transport-Security on HTTPS origins."
            .to_string(),
        discovered_at: chrono::Utc::now().to_rfc3339(),
        evidence_ids: Vec::new(),
    };

    vec![(finding, evidence_record)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::HttpResponse;
    use std::collections::HashMap;

    #[test]
    fn test_checked_header_lookups_are_lowercase() {
        // HttpResponse::header expects lowercase storage; lookups must match
        let mut headers = HashMap::new();
        headers.insert(
            "content-security-policy".to_string(),
            "default-src 'self'".to_string(),
        );
        let response = HttpResponse {
            status_code: 200,
            body: String::new(),
            headers,
            duration_ms: 5,
            final_url: "https://t.test/".to_string(),
        };

        for (lookup, _) in CHECKED_HEADERS {
            assert_eq!(*lookup, lookup.to_lowercase());
        }
        assert!(response.header("content-security-policy").is_some());
    }
}
