// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Luotain Evidence Store
 * Persistence interface for HTTP evidence, findings and scan statistics
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::errors::ScanError;
use crate::http_client::HttpResponse;
use crate::types::Vulnerability;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Request headers and body retained per evidence record
pub const REQUEST_BODY_CAP: usize = 10 * 1024;
/// Response headers retained per evidence record
pub const RESPONSE_HEADERS_CAP: usize = 10 * 1024;
/// Response body prefix retained per evidence record
pub const RESPONSE_BODY_CAP: usize = 50 * 1024;

/// Opaque evidence row id allocated by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvidenceId(pub i64);

/// Opaque finding row id allocated by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FindingId(pub i64);

/// Full request/response pair backing a finding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpEvidence {
    pub method: String,
    pub url: String,
    pub request_headers: String,
    pub request_body: String,
    pub response_code: u16,
    pub response_headers: String,
    pub response_body: String,
    pub response_time_ms: u64,
    /// Back-reference written by `link_http_evidence_to_vuln`
    #[serde(default)]
    pub finding: Option<FindingId>,
}

impl HttpEvidence {
    /// Capture an exchanged request/response pair, applying the retention caps
    pub fn capture(
        method: &str,
        url: &str,
        request_headers: &[(String, String)],
        request_body: &str,
        response: &HttpResponse,
    ) -> Self {
        let req_headers = request_headers
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("\n");

        let resp_headers = response
            .headers
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            method: method.to_string(),
            url: url.to_string(),
            request_headers: truncate_utf8(&req_headers, REQUEST_BODY_CAP),
            request_body: truncate_utf8(request_body, REQUEST_BODY_CAP),
            response_code: response.status_code,
            response_headers: truncate_utf8(&resp_headers, RESPONSE_HEADERS_CAP),
            response_body: truncate_utf8(&response.body, RESPONSE_BODY_CAP),
            response_time_ms: response.duration_ms,
            finding: None,
        }
    }

    /// Evidence for a request that never produced a response (timing
    /// fallback on timeout)
    pub fn timed_out(method: &str, url: &str, request_body: &str, elapsed_ms: u64) -> Self {
        Self {
            method: method.to_string(),
            url: url.to_string(),
            request_headers: String::new(),
            request_body: truncate_utf8(request_body, REQUEST_BODY_CAP),
            response_code: 0,
            response_headers: String::new(),
            response_body: String::new(),
            response_time_ms: elapsed_ms,
            finding: None,
        }
    }
}

/// Truncate at a char boundary at or below `max` bytes
fn truncate_utf8(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

/// Aggregate counters persisted per scan
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStatistics {
    pub endpoints_discovered: usize,
    pub payloads_sent: usize,
    pub vulnerabilities_found: usize,
}

/// Persistence boundary for scan output. Finding and evidence rows are
/// linked after both exist; the store allocates all ids.
#[async_trait]
pub trait EvidenceStore: Send + Sync {
    async fn add_http_request(
        &self,
        scan_id: &str,
        evidence: HttpEvidence,
    ) -> Result<EvidenceId, ScanError>;

    async fn add_vulnerability(
        &self,
        scan_id: &str,
        finding: &Vulnerability,
    ) -> Result<FindingId, ScanError>;

    async fn link_http_evidence_to_vuln(
        &self,
        evidence_id: EvidenceId,
        finding_id: FindingId,
    ) -> Result<(), ScanError>;

    async fn update_scan_statistics(
        &self,
        scan_id: &str,
        stats: ScanStatistics,
    ) -> Result<(), ScanError>;
}

#[derive(Default)]
struct MemoryTables {
    next_id: i64,
    evidence: HashMap<i64, (String, HttpEvidence)>,
    findings: HashMap<i64, (String, Vulnerability)>,
    statistics: HashMap<String, ScanStatistics>,
}

/// In-memory evidence store used by tests and as the default sink when no
/// external persistence is wired in.
#[derive(Default)]
pub struct MemoryEvidenceStore {
    tables: Mutex<MemoryTables>,
}

impl MemoryEvidenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn evidence_for_scan(&self, scan_id: &str) -> Vec<(EvidenceId, HttpEvidence)> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<_> = tables
            .evidence
            .iter()
            .filter(|(_, (sid, _))| sid == scan_id)
            .map(|(id, (_, ev))| (EvidenceId(*id), ev.clone()))
            .collect();
        rows.sort_by_key(|(id, _)| id.0);
        rows
    }

    pub async fn findings_for_scan(&self, scan_id: &str) -> Vec<(FindingId, Vulnerability)> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<_> = tables
            .findings
            .iter()
            .filter(|(_, (sid, _))| sid == scan_id)
            .map(|(id, (_, vuln))| (FindingId(*id), vuln.clone()))
            .collect();
        rows.sort_by_key(|(id, _)| id.0);
        rows
    }

    pub async fn statistics(&self, scan_id: &str) -> Option<ScanStatistics> {
        self.tables.lock().await.statistics.get(scan_id).copied()
    }
}

#[async_trait]
impl EvidenceStore for MemoryEvidenceStore {
    async fn add_http_request(
        &self,
        scan_id: &str,
        evidence: HttpEvidence,
    ) -> Result<EvidenceId, ScanError> {
        let mut tables = self.tables.lock().await;
        tables.next_id += 1;
        let id = tables.next_id;
        tables.evidence.insert(id, (scan_id.to_string(), evidence));
        Ok(EvidenceId(id))
    }

    async fn add_vulnerability(
        &self,
        scan_id: &str,
        finding: &Vulnerability,
    ) -> Result<FindingId, ScanError> {
        let mut tables = self.tables.lock().await;
        tables.next_id += 1;
        let id = tables.next_id;
        tables
            .findings
            .insert(id, (scan_id.to_string(), finding.clone()));
        Ok(FindingId(id))
    }

    async fn link_http_evidence_to_vuln(
        &self,
        evidence_id: EvidenceId,
        finding_id: FindingId,
    ) -> Result<(), ScanError> {
        let mut tables = self.tables.lock().await;
        match tables.evidence.get_mut(&evidence_id.0) {
            Some((_, evidence)) => {
                evidence.finding = Some(finding_id);
                Ok(())
            }
            None => Err(ScanError::EvidenceStore {
                reason: format!("unknown evidence id {}", evidence_id.0),
            }),
        }
    }

    async fn update_scan_statistics(
        &self,
        scan_id: &str,
        stats: ScanStatistics,
    ) -> Result<(), ScanError> {
        let mut tables = self.tables.lock().await;
        tables.statistics.insert(scan_id.to_string(), stats);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    fn sample_response(body: &str) -> HttpResponse {
        HttpResponse {
            status_code: 200,
            body: body.to_string(),
            headers: HashMap::from([("server".to_string(), "nginx".to_string())]),
            duration_ms: 42,
            final_url: "http://t.test/".to_string(),
        }
    }

    fn sample_finding() -> Vulnerability {
        Vulnerability {
            id: "v1".to_string(),
            vuln_type: "SQL Injection".to_string(),
            title: "SQLi in id".to_string(),
            severity: Severity::Critical,
            confidence: 95,
            url: "http://t.test/user?id=1".to_string(),
            method: "GET".to_string(),
            parameter: Some("id".to_string()),
            payload: "'".to_string(),
            description: String::new(),
            evidence: String::new(),
            cwe: "CWE-89".to_string(),
            cvss: Some(9.8),
            poc: String::new(),
            remediation: String::new(),
            discovered_at: String::new(),
            evidence_ids: Vec::new(),
        }
    }

    #[test]
    fn test_capture_applies_caps() {
        let big_body = "x".repeat(200 * 1024);
        let response = sample_response(&big_body);
        let evidence = HttpEvidence::capture("GET", "http://t.test/", &[], &"b".repeat(64 * 1024), &response);

        assert_eq!(evidence.response_body.len(), RESPONSE_BODY_CAP);
        assert_eq!(evidence.request_body.len(), REQUEST_BODY_CAP);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        // multi-byte characters; a naive byte slice would panic
        let s = "ä".repeat(10_000);
        let truncated = truncate_utf8(&s, 13);
        assert!(truncated.len() <= 13);
        assert!(truncated.chars().all(|c| c == 'ä'));
    }

    #[tokio::test]
    async fn test_memory_store_links_evidence_to_finding() {
        let store = MemoryEvidenceStore::new();
        let response = sample_response("hello");

        let evidence_id = store
            .add_http_request(
                "scan1",
                HttpEvidence::capture("GET", "http://t.test/", &[], "", &response),
            )
            .await
            .unwrap();
        let finding_id = store.add_vulnerability("scan1", &sample_finding()).await.unwrap();

        store
            .link_http_evidence_to_vuln(evidence_id, finding_id)
            .await
            .unwrap();

        let rows = store.evidence_for_scan("scan1").await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1.finding, Some(finding_id));
    }

    #[tokio::test]
    async fn test_link_unknown_evidence_fails() {
        let store = MemoryEvidenceStore::new();
        let finding_id = store.add_vulnerability("scan1", &sample_finding()).await.unwrap();
        assert!(store
            .link_http_evidence_to_vuln(EvidenceId(999), finding_id)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_statistics_roundtrip() {
        let store = MemoryEvidenceStore::new();
        store
            .update_scan_statistics(
                "scan1",
                ScanStatistics {
                    endpoints_discovered: 4,
                    payloads_sent: 200,
                    vulnerabilities_found: 2,
                },
            )
            .await
            .unwrap();

        let stats = store.statistics("scan1").await.unwrap();
        assert_eq!(stats.endpoints_discovered, 4);
        assert_eq!(stats.payloads_sent, 200);
    }
}
