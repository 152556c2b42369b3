// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Luotain Active Scanner
 * Drives attack payloads against every discovered injection point and
 * classifies responses per attack class
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

pub mod command_injection;
pub mod path_traversal;
pub mod security_headers;
pub mod sensitive_files;
pub mod sqli;
pub mod xss;
pub mod xxe;

use crate::crawler::CrawlReport;
use crate::differential::DifferentialAnalyzer;
use crate::errors::ScanError;
use crate::events::EventSink;
use crate::evidence::{EvidenceStore, HttpEvidence, ScanStatistics};
use crate::http_client::{HttpClient, HttpResponse};
use crate::scope::{self, ScopePolicy};
use crate::types::{Parameter, ParameterLocation, Severity, Vulnerability};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

/// Bounded injection-point fan-out
const SCANNER_CONCURRENCY: usize = 16;
/// Timeout for ordinary attack requests
const ATTACK_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for timing-class payloads
const TIMING_TIMEOUT: Duration = Duration::from_secs(15);
/// Injected delay that timing detections must reach, seconds
pub const TIME_DELAY_SECS: f64 = 5.0;

/// Budget estimate inputs, used for progress reporting only
const PAYLOAD_CATEGORIES: usize = 5;
const PAYLOADS_PER_CATEGORY: usize = 10;

/// Attack classes in the fixed order they are tried per injection point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackClass {
    Xss,
    Sqli,
    Command,
    PathTraversal,
    Xxe,
}

impl AttackClass {
    pub const ORDER: [AttackClass; 5] = [
        AttackClass::Xss,
        AttackClass::Sqli,
        AttackClass::Command,
        AttackClass::PathTraversal,
        AttackClass::Xxe,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AttackClass::Xss => "XSS",
            AttackClass::Sqli => "SQLi",
            AttackClass::Command => "Command",
            AttackClass::PathTraversal => "Path Traversal",
            AttackClass::Xxe => "XXE",
        }
    }

    pub fn vuln_type(&self) -> &'static str {
        match self {
            AttackClass::Xss => "Cross-Site Scripting (XSS)",
            AttackClass::Sqli => "SQL Injection",
            AttackClass::Command => "Command Injection",
            AttackClass::PathTraversal => "Path Traversal",
            AttackClass::Xxe => "XML External Entity (XXE)",
        }
    }

    pub fn cwe(&self) -> &'static str {
        match self {
            AttackClass::Xss => "CWE-79",
            AttackClass::Sqli => "CWE-89",
            AttackClass::Command => "CWE-78",
            AttackClass::PathTraversal => "CWE-22",
            AttackClass::Xxe => "CWE-611",
        }
    }

    pub fn cvss(&self) -> f32 {
        match self {
            AttackClass::Xss => 7.1,
            AttackClass::Sqli => 9.8,
            AttackClass::Command => 9.8,
            AttackClass::PathTraversal => 7.5,
            AttackClass::Xxe => 8.2,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            AttackClass::Xss => Severity::High,
            AttackClass::Sqli | AttackClass::Command => Severity::Critical,
            AttackClass::PathTraversal | AttackClass::Xxe => Severity::High,
        }
    }

    pub fn payloads(&self) -> &'static [&'static str] {
        match self {
            AttackClass::Xss => xss::PAYLOADS,
            AttackClass::Sqli => sqli::PAYLOADS,
            AttackClass::Command => command_injection::PAYLOADS,
            AttackClass::PathTraversal => path_traversal::PAYLOADS,
            AttackClass::Xxe => xxe::PAYLOADS,
        }
    }

    fn id_slug(&self) -> &'static str {
        match self {
            AttackClass::Xss => "xss",
            AttackClass::Sqli => "sqli",
            AttackClass::Command => "cmdi",
            AttackClass::PathTraversal => "traversal",
            AttackClass::Xxe => "xxe",
        }
    }

    fn remediation(&self) -> &'static str {
        match self {
            AttackClass::Xss => {
                "Encode all user input for its output context (HTML entity, \
                 attribute or JavaScript encoding). Deploy a Content Security \
                 Policy and set HTTPOnly on session cookies."
            }
            AttackClass::Sqli => {
                "Use parameterized queries (prepared statements) exclusively. \
                 Never concatenate user input into SQL. Apply least privilege \
                 to database accounts and disable verbose SQL errors."
            }
            AttackClass::Command => {
                "Never pass user input to a shell. Use exec-style APIs with \
                 argument arrays, allow-list the permitted values and run \
                 workers with minimal privileges."
            }
            AttackClass::PathTraversal => {
                "Canonicalize paths before use and reject any path escaping \
                 the content root. Serve files by identifier, not by \
                 user-supplied filename."
            }
            AttackClass::Xxe => {
                "Disable DTD processing and external entity resolution in the \
                 XML parser. Prefer JSON for data interchange where possible."
            }
        }
    }
}

/// Outcome of a class-specific detection check
#[derive(Debug, Clone)]
pub struct Detection {
    pub technique: &'static str,
    pub evidence: String,
    pub confidence: u8,
    /// Literal proof (marker or reflection) present in the body
    pub literal: bool,
}

/// A payload whose detection depends on observed response time
pub fn is_timing_payload(payload: &str) -> bool {
    let lower = payload.to_lowercase();
    lower.contains("sleep") || lower.contains("waitfor")
}

/// One attack surface entry prepared from the crawl report
#[derive(Debug, Clone)]
pub struct ScanTarget {
    pub url: String,
    pub method: String,
    pub parameters: Vec<Parameter>,
}

/// A single (URL, method, parameter) attack location
#[derive(Debug, Clone)]
pub struct InjectionPoint {
    pub url: String,
    pub method: String,
    pub parameter: String,
    pub baseline_value: String,
    pub siblings: Vec<Parameter>,
}

impl ScanTarget {
    fn dedup_key(&self) -> String {
        let mut names: Vec<&str> = self.parameters.iter().map(|p| p.name.as_str()).collect();
        names.sort();
        format!(
            "{}:{}:{}",
            scope::without_query(&self.url),
            self.method,
            names.join(",")
        )
    }

    fn injection_points(&self) -> Vec<InjectionPoint> {
        self.parameters
            .iter()
            .map(|parameter| InjectionPoint {
                url: self.url.clone(),
                method: self.method.clone(),
                parameter: parameter.name.clone(),
                baseline_value: parameter.baseline_value(),
                siblings: self.parameters.clone(),
            })
            .collect()
    }
}

/// Translate the crawl report into deduplicated scan targets: one per
/// parameterized URL, one per form, one per API endpoint.
pub fn prepare_targets(report: &CrawlReport) -> Vec<ScanTarget> {
    let mut targets = Vec::new();
    let mut seen = HashSet::new();

    for (url, parameters) in &report.parameters {
        let target = ScanTarget {
            url: url.clone(),
            method: "GET".to_string(),
            parameters: parameters.clone(),
        };
        if seen.insert(target.dedup_key()) {
            targets.push(target);
        }
    }

    for form in &report.forms {
        let parameters: Vec<Parameter> = form
            .inputs
            .iter()
            .map(|input| {
                let location = if input.input_type == "hidden" {
                    ParameterLocation::FormHidden
                } else {
                    ParameterLocation::FormVisible
                };
                Parameter::new(
                    &input.name,
                    input.value.as_deref().unwrap_or(""),
                    location,
                    Some(&input.input_type),
                )
            })
            .collect();

        let target = ScanTarget {
            url: scope::normalize_url(&form.action).unwrap_or_else(|| form.action.clone()),
            method: form.method.clone(),
            parameters,
        };
        if seen.insert(target.dedup_key()) {
            targets.push(target);
        }
    }

    for api in &report.api_endpoints {
        let target = ScanTarget {
            url: api.url.clone(),
            method: api.method.clone(),
            parameters: Vec::new(),
        };
        if seen.insert(target.dedup_key()) {
            targets.push(target);
        }
    }

    targets
}

#[derive(Default)]
struct Progress {
    tests_total: AtomicUsize,
    tests_completed: AtomicUsize,
    vulnerabilities_found: AtomicUsize,
    payloads_sent: AtomicUsize,
}

pub struct ActiveScanner {
    http_client: Arc<HttpClient>,
    scope: ScopePolicy,
    analyzer: Arc<DifferentialAnalyzer>,
    store: Arc<dyn EvidenceStore>,
    sink: Arc<dyn EventSink>,
    scan_id: String,
    target: String,
    cancelled: Arc<RwLock<bool>>,
    progress: Progress,
}

impl ActiveScanner {
    /// `http_client` must be a non-redirecting client: redirect targets
    /// are scope-checked before anything is followed.
    pub fn new(
        scan_id: &str,
        target: &str,
        http_client: Arc<HttpClient>,
        scope: ScopePolicy,
        store: Arc<dyn EvidenceStore>,
        sink: Arc<dyn EventSink>,
        cancelled: Arc<RwLock<bool>>,
    ) -> Self {
        Self {
            http_client,
            scope,
            analyzer: Arc::new(DifferentialAnalyzer::new()),
            store,
            sink,
            scan_id: scan_id.to_string(),
            target: target.to_string(),
            cancelled,
            progress: Progress::default(),
        }
    }

    pub fn statistics(&self) -> ScanStatistics {
        ScanStatistics {
            endpoints_discovered: 0,
            payloads_sent: self.progress.payloads_sent.load(Ordering::Relaxed),
            vulnerabilities_found: self.progress.vulnerabilities_found.load(Ordering::Relaxed),
        }
    }

    pub fn tests_completed(&self) -> usize {
        self.progress.tests_completed.load(Ordering::Relaxed)
    }

    /// Scan every injection point in the crawl report. Classes run in a
    /// fixed order per point; points fan out on a bounded pool.
    pub async fn scan(&self, report: &CrawlReport) -> Result<Vec<Vulnerability>, ScanError> {
        let targets = prepare_targets(report);

        let estimated: usize = targets
            .iter()
            .map(|t| t.parameters.len().max(1))
            .sum::<usize>()
            * PAYLOAD_CATEGORIES
            * PAYLOADS_PER_CATEGORY;
        self.progress.tests_total.store(estimated, Ordering::Relaxed);

        self.sink
            .send_log(&format!("[Scanner] Starting detailed scan of {} targets", targets.len()))
            .await;
        self.sink
            .send_log(&format!("[Scanner] Total tests to perform: {}", estimated))
            .await;

        let results: Vec<Vec<Vulnerability>> = stream::iter(targets)
            .map(|target| self.scan_target(target))
            .buffer_unordered(SCANNER_CONCURRENCY)
            .collect()
            .await;

        let mut vulnerabilities: Vec<Vulnerability> = results.into_iter().flatten().collect();

        if !*self.cancelled.read().await {
            vulnerabilities.extend(self.run_auxiliary_checks().await);
        }

        self.sink
            .send_log(&format!(
                "[Scanner] Scan complete: {} tests performed, {} vulnerabilities",
                self.tests_completed(),
                vulnerabilities.len()
            ))
            .await;

        Ok(vulnerabilities)
    }

    /// Security-header audit and sensitive-file probe of the target origin
    async fn run_auxiliary_checks(&self) -> Vec<Vulnerability> {
        let mut vulnerabilities = Vec::new();

        self.sink
            .broadcast_tool_started(&self.scan_id, "Security Headers Check", &self.target)
            .await;
        let header_findings = security_headers::scan(&self.http_client, &self.target).await;
        let header_count = header_findings.len();
        for (mut finding, evidence) in header_findings {
            self.persist_finding(&mut finding, evidence).await;
            self.record_vulnerability(&finding).await;
            vulnerabilities.push(finding);
        }
        self.sink
            .broadcast_tool_completed(&self.scan_id, "Security Headers Check", "success", header_count)
            .await;

        self.sink
            .broadcast_tool_started(&self.scan_id, "Sensitive File Scanner", &self.target)
            .await;
        let file_findings = sensitive_files::scan(&self.http_client, &self.target).await;
        let file_count = file_findings.len();
        for (mut finding, evidence) in file_findings {
            self.persist_finding(&mut finding, evidence).await;
            self.record_vulnerability(&finding).await;
            vulnerabilities.push(finding);
        }
        self.sink
            .broadcast_tool_completed(&self.scan_id, "Sensitive File Scanner", "success", file_count)
            .await;

        vulnerabilities
    }

    async fn scan_target(&self, target: ScanTarget) -> Vec<Vulnerability> {
        let mut vulnerabilities = Vec::new();

        if *self.cancelled.read().await {
            return vulnerabilities;
        }

        if !self.scope.is_in_scope(&target.url) {
            self.sink
                .send_log(&format!("[Scanner] Skipping out-of-scope target: {}", target.url))
                .await;
            return vulnerabilities;
        }

        self.sink
            .send_log(&format!(
                "[Scanner] Scanning: {} ({} parameters)",
                target.url,
                target.parameters.len()
            ))
            .await;

        if target.parameters.is_empty() {
            debug!("No injectable parameters on {}", target.url);
            return vulnerabilities;
        }

        'points: for point in target.injection_points() {
            for class in AttackClass::ORDER {
                if *self.cancelled.read().await {
                    break 'points;
                }
                if class == AttackClass::Xxe && point.method != "POST" {
                    continue;
                }

                for payload in class.payloads() {
                    match self.execute_attack(&point, class, payload).await {
                        Ok(Some(vulnerability)) => {
                            vulnerabilities.push(vulnerability);
                            // A parameter that produced a finding in this
                            // class needs no further payloads of the class
                            break;
                        }
                        Ok(None) => {}
                        Err(e) if e.is_fatal() => break 'points,
                        Err(_) => {}
                    }
                }
            }
        }

        vulnerabilities
    }

    /// Send one payload at one injection point and classify the response
    async fn execute_attack(
        &self,
        point: &InjectionPoint,
        class: AttackClass,
        payload: &str,
    ) -> Result<Option<Vulnerability>, ScanError> {
        if *self.cancelled.read().await {
            return Err(ScanError::Cancelled);
        }

        let completed = self.progress.tests_completed.fetch_add(1, Ordering::Relaxed) + 1;
        self.progress.payloads_sent.fetch_add(1, Ordering::Relaxed);
        let total = self.progress.tests_total.load(Ordering::Relaxed);
        let percent = if total > 0 {
            (completed as f64 / total as f64 * 100.0).min(100.0)
        } else {
            0.0
        };

        self.sink
            .send_log(&format!(
                "[Attack {}/{}] ({:.1}%) {} -> {} @ {}",
                completed,
                total,
                percent,
                class.name(),
                point.parameter,
                truncate_display(&point.url, 50)
            ))
            .await;
        self.sink
            .send_log(&format!("  Payload: {}", truncate_display(payload, 100)))
            .await;

        // Baseline created lazily, once per URL, before the first test
        let baseline = self
            .analyzer
            .ensure_baseline(&point.url, || self.fetch_baseline(point))
            .await
            .ok();

        let timing = is_timing_payload(payload);
        let timeout = if timing { TIMING_TIMEOUT } else { ATTACK_TIMEOUT };

        let (request_url, request_body, result) = if point.method == "GET" {
            let Some(test_url) =
                build_test_url(&point.url, &point.siblings, &point.parameter, payload)
            else {
                return Ok(None);
            };
            if !self.scope.is_in_scope(&test_url) {
                self.sink
                    .send_log(&format!("[Scanner] BLOCKED payload escaping scope: {}", test_url))
                    .await;
                return Ok(None);
            }
            let result = self.http_client.get_with_timeout(&test_url, timeout).await;
            (test_url, String::new(), result)
        } else if class == AttackClass::Xxe {
            let headers = vec![("Content-Type".to_string(), xxe::CONTENT_TYPE.to_string())];
            let result = self
                .http_client
                .post_with_headers(&point.url, payload, &headers, timeout)
                .await;
            (point.url.clone(), payload.to_string(), result)
        } else {
            let body = build_form_body(&point.siblings, &point.parameter, payload);
            let result = self.http_client.post_form(&point.url, &body, timeout).await;
            (point.url.clone(), body, result)
        };

        let response = match result {
            Ok(response) => response,
            Err(ScanError::Timeout { .. }) if timing => {
                // The injected delay plausibly exceeded the client timeout
                return Ok(Some(
                    self.report_timing_fallback(point, class, payload, &request_url, &request_body, timeout)
                        .await,
                ));
            }
            Err(e) => {
                debug!("Attack request failed for {}: {}", request_url, e);
                self.sink
                    .send_log(&format!("[Scanner] {} {}", e.event_kind(), request_url))
                    .await;
                return Ok(None);
            }
        };

        // Refuse redirects that escape scope
        if response.is_redirect() {
            if let Some(location) = response.header("location") {
                let resolved = scope::resolve_url(&point.url, location);
                if !self.scope.is_in_scope(&resolved) {
                    self.sink
                        .send_log(&format!(
                            "[Scanner] REDIRECT_BLOCKED {} -> {}",
                            point.url, resolved
                        ))
                        .await;
                    return Ok(None);
                }
            }
        }

        let detection = match class {
            AttackClass::Xss => xss::detect(&response.body, payload),
            AttackClass::Sqli => sqli::detect(
                &response.body,
                payload,
                response.elapsed_secs(),
                baseline.as_ref().map(|b| b.content_length),
            ),
            AttackClass::Command => {
                command_injection::detect(&response.body, payload, response.elapsed_secs())
            }
            AttackClass::PathTraversal => path_traversal::detect(&response.body),
            AttackClass::Xxe => xxe::detect(&response.body),
        };

        let Some(detection) = detection else {
            return Ok(None);
        };

        // Literal evidence pins confidence at 95; otherwise the
        // differential verdict moderates the detector's score.
        let mut confidence = detection.confidence;
        if detection.literal {
            confidence = 95;
        } else if let Some(baseline) = &baseline {
            if let Some(outcome) = self
                .analyzer
                .analyze_against(baseline, &response, Some(payload))
            {
                if outcome.confidence < confidence {
                    confidence = (confidence + outcome.confidence) / 2;
                }
            }
        }

        info!(
            "{} detected in '{}' at {} ({})",
            class.vuln_type(),
            point.parameter,
            point.url,
            detection.technique
        );

        let evidence_record = HttpEvidence::capture(
            &point.method,
            &request_url,
            &self.http_client.standard_headers(),
            &request_body,
            &response,
        );

        let mut finding = self.build_finding(
            point,
            class,
            payload,
            detection.technique,
            &detection.evidence,
            confidence,
            class.severity(),
        );

        self.persist_finding(&mut finding, evidence_record).await;
        self.record_vulnerability(&finding).await;

        Ok(Some(finding))
    }

    async fn fetch_baseline(&self, point: &InjectionPoint) -> Result<HttpResponse, ScanError> {
        if point.method == "GET" {
            self.http_client
                .get_with_timeout(&point.url, ATTACK_TIMEOUT)
                .await
        } else {
            let body = build_form_body(&point.siblings, "", "");
            self.http_client
                .post_form(&point.url, &body, ATTACK_TIMEOUT)
                .await
        }
    }

    /// A timeout while a sleep/waitfor payload is in flight is reported as
    /// a time-based finding at reduced confidence.
    async fn report_timing_fallback(
        &self,
        point: &InjectionPoint,
        class: AttackClass,
        payload: &str,
        request_url: &str,
        request_body: &str,
        timeout: Duration,
    ) -> Vulnerability {
        self.sink
            .send_log(&format!(
                "[Scanner] Timing candidate: {} timed out with delay payload",
                request_url
            ))
            .await;

        let evidence_record = HttpEvidence::timed_out(
            &point.method,
            request_url,
            request_body,
            timeout.as_millis() as u64,
        );

        let mut finding = self.build_finding(
            point,
            class,
            payload,
            "Time-based",
            "Request timed out",
            80,
            Severity::High,
        );

        self.persist_finding(&mut finding, evidence_record).await;
        self.record_vulnerability(&finding).await;
        finding
    }

    fn build_finding(
        &self,
        point: &InjectionPoint,
        class: AttackClass,
        payload: &str,
        technique: &str,
        evidence: &str,
        confidence: u8,
        severity: Severity,
    ) -> Vulnerability {
        Vulnerability {
            id: format!("{}_{}", class.id_slug(), uuid::Uuid::new_v4()),
            vuln_type: class.vuln_type().to_string(),
            title: format!("{} in {} ({})", class.vuln_type(), point.parameter, technique),
            severity,
            confidence,
            url: point.url.clone(),
            method: point.method.clone(),
            parameter: Some(point.parameter.clone()),
            payload: payload.to_string(),
            description: format!(
                "The parameter '{}' is vulnerable to {} ({}). {}.",
                point.parameter,
                class.vuln_type(),
                technique,
                evidence
            ),
            evidence: evidence.to_string(),
            cwe: class.cwe().to_string(),
            cvss: Some(class.cvss()),
            poc: generate_poc(class, point, payload, evidence),
            remediation: class.remediation().to_string(),
            discovered_at: chrono::Utc::now().to_rfc3339(),
            evidence_ids: Vec::new(),
        }
    }

    /// Persist evidence + finding and back-link them. Store failures are
    /// retried once, then logged; the scan continues either way and the
    /// finding is still surfaced through the event sink.
    async fn persist_finding(&self, finding: &mut Vulnerability, evidence: HttpEvidence) {
        let evidence_id = {
            let mut stored = None;
            for attempt in 0..2 {
                match self
                    .store
                    .add_http_request(&self.scan_id, evidence.clone())
                    .await
                {
                    Ok(id) => {
                        stored = Some(id);
                        break;
                    }
                    Err(e) => {
                        warn!("Evidence write failed (attempt {}): {}", attempt + 1, e);
                    }
                }
            }
            stored
        };

        let Some(evidence_id) = evidence_id else {
            self.sink
                .send_log(&format!(
                    "[WARNING] Evidence store unavailable; finding {} kept in-memory only",
                    finding.id
                ))
                .await;
            return;
        };

        finding.evidence_ids.push(evidence_id);

        match self.store.add_vulnerability(&self.scan_id, finding).await {
            Ok(finding_id) => {
                if let Err(e) = self
                    .store
                    .link_http_evidence_to_vuln(evidence_id, finding_id)
                    .await
                {
                    warn!("Failed to link evidence {:?} to finding {:?}: {}", evidence_id, finding_id, e);
                }
            }
            Err(e) => {
                warn!("Finding write failed: {}", e);
                self.sink
                    .send_log(&format!(
                        "[WARNING] Evidence store rejected finding {}; continuing",
                        finding.id
                    ))
                    .await;
            }
        }
    }

    async fn record_vulnerability(&self, finding: &Vulnerability) {
        self.progress
            .vulnerabilities_found
            .fetch_add(1, Ordering::Relaxed);
        self.sink
            .send_log(&format!(
                "[VULNERABILITY] {} found in {} at {}",
                finding.vuln_type,
                finding.parameter.as_deref().unwrap_or("-"),
                finding.url
            ))
            .await;
        self.sink
            .broadcast_vulnerability_found(&self.scan_id, finding)
            .await;
    }
}

/// Rebuild a GET URL with the payload in the target parameter, leaving
/// sibling values intact. Missing siblings are added at their baselines.
fn build_test_url(
    url: &str,
    siblings: &[Parameter],
    target_parameter: &str,
    payload: &str,
) -> Option<String> {
    let parsed = Url::parse(url).ok()?;

    let mut pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    for sibling in siblings {
        if !pairs.iter().any(|(name, _)| name == &sibling.name) {
            pairs.push((sibling.name.clone(), sibling.baseline_value()));
        }
    }

    match pairs.iter_mut().find(|(name, _)| name == target_parameter) {
        Some((_, value)) => *value = payload.to_string(),
        None => pairs.push((target_parameter.to_string(), payload.to_string())),
    }

    let query = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let mut rebuilt = parsed;
    rebuilt.set_query(Some(&query));
    Some(rebuilt.to_string())
}

/// Form-encoded POST body with the payload substituted for the target
/// parameter. An empty target name yields the all-baselines body.
fn build_form_body(siblings: &[Parameter], target_parameter: &str, payload: &str) -> String {
    let mut pairs: Vec<(String, String)> = siblings
        .iter()
        .map(|p| {
            if p.name == target_parameter {
                (p.name.clone(), payload.to_string())
            } else {
                (p.name.clone(), p.baseline_value())
            }
        })
        .collect();

    if !target_parameter.is_empty() && !pairs.iter().any(|(name, _)| name == target_parameter) {
        pairs.push((target_parameter.to_string(), payload.to_string()));
    }

    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn truncate_display(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let prefix: String = s.chars().take(max).collect();
        format!("{}...", prefix)
    } else {
        s.to_string()
    }
}

fn generate_poc(class: AttackClass, point: &InjectionPoint, payload: &str, evidence: &str) -> String {
    let submit_hint = if point.method == "POST" {
        "Submit the form with"
    } else {
        "Add the parameter"
    };

    format!(
        "{} Proof of Concept:\n\n\
         Endpoint: {}\n\
         Method: {}\n\
         Parameter: {}\n\
         Payload: {}\n\n\
         Detection: {}\n\n\
         Reproduction Steps:\n\
         1. Navigate to: {}\n\
         2. {}:\n   {}={}\n\
         3. Observe the response described above",
        class.vuln_type(),
        point.url,
        point.method,
        point.parameter,
        payload,
        evidence,
        point.url,
        submit_hint,
        point.parameter,
        payload
    )
}
