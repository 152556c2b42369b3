// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Sensitive File Probe
 * Checks for exposed repository, environment and dump files at the origin
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::evidence::HttpEvidence;
use crate::http_client::HttpClient;
use crate::types::{Severity, Vulnerability};
use tracing::{debug, info};
use url::Url;

/// Path, content markers proving real disclosure, severity.
/// A bare 200 is not enough: catch-all routes answer 200 to everything.
const PROBES: &[(&str, &[&str], Severity)] = &[
    (
        "/.git/config",
        &["[core]", "repositoryformatversion"],
        Severity::High,
    ),
    (
        "/.env",
        &["APP_KEY=", "DB_PASSWORD=", "DATABASE_URL="],
        Severity::High,
    ),
    (
        "/backup.sql",
        &["INSERT INTO", "CREATE TABLE"],
        Severity::Medium,
    ),
    (
        "/phpinfo.php",
        &["phpinfo()", "PHP Version"],
        Severity::Medium,
    ),
];

/// Probe well-known sensitive paths relative to the target origin
pub async fn scan(client: &HttpClient, target: &str) -> Vec<(Vulnerability, HttpEvidence)> {
    let Ok(base) = Url::parse(target) else {
        return Vec::new();
    };
    let Some(host) = base.host_str() else {
        return Vec::new();
    };
    let origin = format!("{}://{}", base.scheme(), host);

    info!("[Sensitive Files] Probing {} paths on {}", PROBES.len(), origin);

    let mut findings = Vec::new();

    for (path, markers, severity) in PROBES {
        let probe_url = format!("{}{}", origin, path);

        let response = match client.get(&probe_url).await {
            Ok(r) => r,
            Err(e) => {
                debug!("Sensitive file probe failed for {}: {}", probe_url, e);
                continue;
            }
        };

        if response.status_code != 200 {
            continue;
        }

        let Some(marker) = markers.iter().find(|m| response.body.contains(**m)) else {
            continue;
        };

        let evidence_record =
            HttpEvidence::capture("GET", &probe_url, &client.standard_headers(), "", &response);

        findings.push((
            Vulnerability {
                id: format!("sensitive_file_{}", uuid::Uuid::new_v4()),
                vuln_type: "Sensitive File Exposure".to_string(),
                title: format!("Exposed sensitive file: {}", path),
                severity: *severity,
                confidence: 95,
                url: probe_url.clone(),
                method: "GET".to_string(),
                parameter: None,
                payload: String::new(),
                description: format!(
                    "The file {} is publicly readable and its content matches \
                     the marker '{}'. Files of this kind disclose credentials, \
                     configuration or source history.",
                    path, marker
                ),
                evidence: format!("Content marker found: {}", marker),
                cwe: "CWE-538".to_string(),
                cvss: Some(7.5),
                poc: format!("curl -s {}", probe_url),
                remediation: "Remove the file from the web root or deny access \
                              to it in the server configuration. Rotate any \
                              credentials it contained."
                    .to_string(),
                discovered_at: chrono::Utc::now().to_rfc3339(),
                evidence_ids: Vec::new(),
            },
            evidence_record,
        ));
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_paths_are_root_relative() {
        for (path, markers, _) in PROBES {
            assert!(path.starts_with('/'));
            assert!(!markers.is_empty());
        }
    }
}
