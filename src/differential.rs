// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Luotain Differential Analyzer
 * Compares test responses against per-URL baselines and scores anomalies
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::errors::ScanError;
use crate::http_client::HttpResponse;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use similar::TextDiff;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

/// Body prefix retained for similarity comparison (characters)
const BODY_PREFIX_CHARS: usize = 10_000;

/// Content length change that counts as anomalous, percent
const LENGTH_CHANGE_THRESHOLD: f64 = 20.0;
/// Similarity below which a hash mismatch counts as a content change
const SIMILARITY_THRESHOLD: f64 = 80.0;
/// Response time difference that counts as anomalous, seconds
const TIME_DIFF_THRESHOLD: f64 = 3.0;

/// Confidence scoring: base, weights and cap
const BASE_CONFIDENCE: u32 = 50;
const CONFIDENCE_CAP: u32 = 95;

const ERROR_TOKENS: &[&str] = &[
    "error", "exception", "fatal", "warning", "failed",
    "stack trace", "traceback", "syntax error", "undefined",
    "null pointer", "division by zero", "timeout", "denied",
    "unauthorized", "forbidden", "not found", "bad request",
    "internal server", "service unavailable", "panic",
];

const DEBUG_HEADERS: &[&str] = &["x-error", "x-exception", "x-debug", "x-stacktrace"];

const SECURITY_HEADERS: &[&str] = &[
    "x-frame-options", "x-xss-protection", "content-security-policy",
];

const WATCHED_HEADERS: &[&str] = &["content-type", "location", "set-cookie"];

static LINE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)at line \d+").expect("invalid line-number pattern"));

static SOURCE_FILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)in file .+\.(?:php|py|js|java|rb)").expect("invalid source-file pattern"));

static SQL_ERROR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)SQL.*error|ORA-\d+|MySQL.*error").expect("invalid SQL-error pattern"));

static DOM_TAG_RES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        ("forms", Regex::new(r"(?i)<form").unwrap()),
        ("inputs", Regex::new(r"(?i)<input").unwrap()),
        ("links", Regex::new(r"(?i)<a\s+href").unwrap()),
        ("scripts", Regex::new(r"(?i)<script").unwrap()),
        ("divs", Regex::new(r"(?i)<div").unwrap()),
    ]
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Significance {
    Low,
    Medium,
    High,
    Critical,
}

/// Immutable per-URL snapshot taken before fuzzing
#[derive(Debug, Clone)]
pub struct Baseline {
    pub status_code: u16,
    pub content_length: usize,
    pub content_hash: String,
    pub headers: HashMap<String, String>,
    pub response_time: f64,
    pub body_prefix: String,
    pub error_indicators: HashSet<String>,
    pub dom_counts: HashMap<&'static str, usize>,
}

impl Baseline {
    pub fn from_response(response: &HttpResponse) -> Self {
        Self {
            status_code: response.status_code,
            content_length: response.body.len(),
            content_hash: format!("{:x}", md5::compute(response.body.as_bytes())),
            headers: response.headers.clone(),
            response_time: response.elapsed_secs(),
            body_prefix: body_prefix(&response.body),
            error_indicators: extract_error_indicators(&response.body),
            dom_counts: extract_dom_counts(&response.body),
        }
    }
}

/// A single detected deviation from the baseline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    StatusChange {
        baseline: u16,
        current: u16,
        significance: Significance,
    },
    LengthChange {
        change_percent: f64,
        baseline: usize,
        current: usize,
        significance: Significance,
    },
    ContentChange {
        similarity: f64,
        significance: Significance,
    },
    TimingAnomaly {
        baseline_secs: f64,
        current_secs: f64,
        difference: f64,
        significance: Significance,
    },
    NewErrors {
        indicators: Vec<String>,
        significance: Significance,
    },
    DomStructureChange {
        significance: Significance,
    },
    NewDebugHeader {
        header: String,
        value: String,
        significance: Significance,
    },
    RemovedSecurityHeader {
        header: String,
        significance: Significance,
    },
    HeaderValueChange {
        header: String,
        baseline: String,
        current: String,
        significance: Significance,
    },
    PayloadReflection {
        payload: String,
        significance: Significance,
    },
}

impl Anomaly {
    pub fn significance(&self) -> Significance {
        match self {
            Anomaly::StatusChange { significance, .. }
            | Anomaly::LengthChange { significance, .. }
            | Anomaly::ContentChange { significance, .. }
            | Anomaly::TimingAnomaly { significance, .. }
            | Anomaly::NewErrors { significance, .. }
            | Anomaly::DomStructureChange { significance }
            | Anomaly::NewDebugHeader { significance, .. }
            | Anomaly::RemovedSecurityHeader { significance, .. }
            | Anomaly::HeaderValueChange { significance, .. }
            | Anomaly::PayloadReflection { significance, .. } => *significance,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Anomaly::StatusChange { .. } => "status_change",
            Anomaly::LengthChange { .. } => "length_change",
            Anomaly::ContentChange { .. } => "content_change",
            Anomaly::TimingAnomaly { .. } => "timing_anomaly",
            Anomaly::NewErrors { .. } => "new_errors",
            Anomaly::DomStructureChange { .. } => "dom_structure_change",
            Anomaly::NewDebugHeader { .. } => "new_debug_header",
            Anomaly::RemovedSecurityHeader { .. } => "removed_security_header",
            Anomaly::HeaderValueChange { .. } => "header_value_change",
            Anomaly::PayloadReflection { .. } => "payload_reflection",
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Anomaly::StatusChange { baseline, current, .. } => {
                format!("Status code changed from {} to {}", baseline, current)
            }
            Anomaly::LengthChange { change_percent, .. } => {
                format!("Content length changed by {:.1}%", change_percent)
            }
            Anomaly::ContentChange { similarity, .. } => {
                format!("Content similarity only {:.1}%", similarity)
            }
            Anomaly::TimingAnomaly { difference, .. } => {
                format!("Response time changed by {:.2} seconds", difference)
            }
            Anomaly::NewErrors { indicators, .. } => {
                format!("New error indicators: {}", indicators.join(", "))
            }
            Anomaly::DomStructureChange { .. } => "DOM structure changed significantly".to_string(),
            Anomaly::NewDebugHeader { header, .. } => format!("New debug header: {}", header),
            Anomaly::RemovedSecurityHeader { header, .. } => {
                format!("Security header removed: {}", header)
            }
            Anomaly::HeaderValueChange { header, .. } => format!("Header value changed: {}", header),
            Anomaly::PayloadReflection { .. } => "Payload reflected in response".to_string(),
        }
    }
}

/// Result of a differential comparison
#[derive(Debug, Clone)]
pub struct DifferentialOutcome {
    pub anomalies: Vec<Anomaly>,
    pub confidence: u8,
    pub severity: Significance,
}

impl DifferentialOutcome {
    pub fn summary(&self) -> String {
        self.anomalies
            .iter()
            .map(|a| format!("[{}] {}", a.kind().to_uppercase(), a.describe()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Per-URL baseline store plus the differential rules. Baseline creation
/// is serialised per URL: the first caller initialises the cell, every
/// other worker awaits and reuses it.
#[derive(Default)]
pub struct DifferentialAnalyzer {
    baselines: Mutex<HashMap<String, Arc<OnceCell<Arc<Baseline>>>>>,
}

impl DifferentialAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, url: &str) -> Arc<OnceCell<Arc<Baseline>>> {
        let mut baselines = self.baselines.lock().unwrap();
        baselines.entry(url.to_string()).or_default().clone()
    }

    /// Get or create the baseline for a URL. `fetch` runs at most once per
    /// URL for the scan's lifetime.
    pub async fn ensure_baseline<F, Fut>(
        &self,
        url: &str,
        fetch: F,
    ) -> Result<Arc<Baseline>, ScanError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<HttpResponse, ScanError>>,
    {
        let cell = self.cell(url);
        cell.get_or_try_init(|| async move {
            let response = fetch().await?;
            Ok(Arc::new(Baseline::from_response(&response)))
        })
        .await
        .map(Arc::clone)
    }

    /// Seed a baseline directly from an already-fetched response
    pub fn store_baseline(&self, url: &str, response: &HttpResponse) -> Arc<Baseline> {
        let cell = self.cell(url);
        let baseline = Arc::new(Baseline::from_response(response));
        let _ = cell.set(baseline.clone());
        cell.get().cloned().unwrap_or(baseline)
    }

    pub fn baseline_for(&self, url: &str) -> Option<Arc<Baseline>> {
        let baselines = self.baselines.lock().unwrap();
        baselines.get(url).and_then(|cell| cell.get().cloned())
    }

    /// Analyze a test response against the stored baseline for `url`.
    /// Returns `None` when no baseline exists or nothing deviates.
    pub fn analyze_response(
        &self,
        url: &str,
        response: &HttpResponse,
        payload: Option<&str>,
    ) -> Option<DifferentialOutcome> {
        let baseline = self.baseline_for(url)?;
        self.analyze_against(&baseline, response, payload)
    }

    /// The differential rules themselves, decoupled from the store
    pub fn analyze_against(
        &self,
        baseline: &Baseline,
        response: &HttpResponse,
        payload: Option<&str>,
    ) -> Option<DifferentialOutcome> {
        let mut anomalies = Vec::new();
        let mut confidence = BASE_CONFIDENCE;

        // 1. Status code
        if response.status_code != baseline.status_code {
            anomalies.push(Anomaly::StatusChange {
                baseline: baseline.status_code,
                current: response.status_code,
                significance: if response.status_code >= 500 {
                    Significance::High
                } else {
                    Significance::Medium
                },
            });
            confidence += 15;
        }

        // 2. Content length (suppressed for empty baselines)
        let current_length = response.body.len();
        if baseline.content_length > 0 {
            let change_percent = (current_length as f64 - baseline.content_length as f64).abs()
                / baseline.content_length as f64
                * 100.0;

            if change_percent > LENGTH_CHANGE_THRESHOLD {
                anomalies.push(Anomaly::LengthChange {
                    change_percent,
                    baseline: baseline.content_length,
                    current: current_length,
                    significance: if change_percent > 50.0 {
                        Significance::High
                    } else {
                        Significance::Medium
                    },
                });
                confidence += 10;
            }
        }

        // 3. Content hash + similarity
        let current_hash = format!("{:x}", md5::compute(response.body.as_bytes()));
        if current_hash != baseline.content_hash {
            let similarity = similarity_percent(&body_prefix(&response.body), &baseline.body_prefix);
            if similarity < SIMILARITY_THRESHOLD {
                anomalies.push(Anomaly::ContentChange {
                    similarity,
                    significance: if similarity < 50.0 {
                        Significance::High
                    } else {
                        Significance::Medium
                    },
                });
                confidence += 20;
            }
        }

        // 4. Response time
        let current_time = response.elapsed_secs();
        let time_diff = (current_time - baseline.response_time).abs();
        if time_diff > TIME_DIFF_THRESHOLD {
            anomalies.push(Anomaly::TimingAnomaly {
                baseline_secs: baseline.response_time,
                current_secs: current_time,
                difference: time_diff,
                significance: if time_diff > 5.0 {
                    Significance::Critical
                } else {
                    Significance::High
                },
            });
            confidence += 25;
        }

        // 5. New error indicators
        let current_errors = extract_error_indicators(&response.body);
        let new_errors: Vec<String> = current_errors
            .difference(&baseline.error_indicators)
            .cloned()
            .collect();
        if !new_errors.is_empty() {
            let critical = new_errors
                .iter()
                .any(|e| matches!(e.as_str(), "exception" | "fatal" | "panic"));
            anomalies.push(Anomaly::NewErrors {
                indicators: new_errors,
                significance: if critical {
                    Significance::Critical
                } else {
                    Significance::High
                },
            });
            confidence += 30;
        }

        // 6. DOM structure
        let current_dom = extract_dom_counts(&response.body);
        if significant_dom_change(&baseline.dom_counts, &current_dom) {
            anomalies.push(Anomaly::DomStructureChange {
                significance: Significance::Medium,
            });
            confidence += 10;
        }

        // 7. Headers
        let header_anomalies = analyze_headers(&baseline.headers, &response.headers);
        confidence += 5 * header_anomalies.len() as u32;
        anomalies.extend(header_anomalies);

        // 8. Payload reflection. A payload the baseline already carried
        // (e.g. the parameter's own value) is not a reflection signal.
        if let Some(payload) = payload {
            if !payload.is_empty()
                && !baseline.body_prefix.contains(payload)
                && (response.body.contains(payload)
                    || response.body.contains(urlencoding::encode(payload).as_ref()))
            {
                anomalies.push(Anomaly::PayloadReflection {
                    payload: payload.chars().take(100).collect(),
                    significance: Significance::Critical,
                });
                confidence += 30;
            }
        }

        if anomalies.is_empty() {
            return None;
        }

        let severity = overall_severity(&anomalies);
        Some(DifferentialOutcome {
            anomalies,
            confidence: confidence.min(CONFIDENCE_CAP) as u8,
            severity,
        })
    }
}

fn body_prefix(body: &str) -> String {
    body.chars().take(BODY_PREFIX_CHARS).collect()
}

/// Longest-matching-block similarity over the body prefixes, percent
fn similarity_percent(text1: &str, text2: &str) -> f64 {
    if text1.is_empty() || text2.is_empty() {
        return 0.0;
    }
    let diff = TextDiff::from_chars(text1, text2);
    f64::from(diff.ratio()) * 100.0
}

fn extract_error_indicators(body: &str) -> HashSet<String> {
    let mut indicators = HashSet::new();
    let body_lower = body.to_lowercase();

    for token in ERROR_TOKENS {
        if body_lower.contains(token) {
            indicators.insert(token.to_string());
        }
    }

    if LINE_NUMBER_RE.is_match(body) {
        indicators.insert("line_number_error".to_string());
    }
    if SOURCE_FILE_RE.is_match(body) {
        indicators.insert("file_path_error".to_string());
    }
    if SQL_ERROR_RE.is_match(body) {
        indicators.insert("sql_error".to_string());
    }

    indicators
}

fn extract_dom_counts(body: &str) -> HashMap<&'static str, usize> {
    DOM_TAG_RES
        .iter()
        .map(|(name, re)| (*name, re.find_iter(body).count()))
        .collect()
}

fn significant_dom_change(
    baseline: &HashMap<&'static str, usize>,
    current: &HashMap<&'static str, usize>,
) -> bool {
    for (element, &baseline_count) in baseline {
        let current_count = current.get(element).copied().unwrap_or(0);

        if baseline_count > 0 {
            let change_percent = (current_count as f64 - baseline_count as f64).abs()
                / baseline_count as f64
                * 100.0;
            if change_percent > 30.0 {
                return true;
            }
        } else if current_count > 5 {
            return true;
        }
    }
    false
}

fn analyze_headers(
    baseline: &HashMap<String, String>,
    current: &HashMap<String, String>,
) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();

    for (header, value) in current {
        let name = header.to_lowercase();
        if DEBUG_HEADERS.contains(&name.as_str()) && !baseline.contains_key(header) {
            anomalies.push(Anomaly::NewDebugHeader {
                header: header.clone(),
                value: value.chars().take(100).collect(),
                significance: Significance::High,
            });
        }
    }

    for header in baseline.keys() {
        let name = header.to_lowercase();
        if SECURITY_HEADERS.contains(&name.as_str()) && !current.contains_key(header) {
            anomalies.push(Anomaly::RemovedSecurityHeader {
                header: header.clone(),
                significance: Significance::Medium,
            });
        }
    }

    for header in WATCHED_HEADERS {
        if let (Some(base_value), Some(current_value)) = (baseline.get(*header), current.get(*header))
        {
            if base_value != current_value {
                anomalies.push(Anomaly::HeaderValueChange {
                    header: header.to_string(),
                    baseline: base_value.chars().take(50).collect(),
                    current: current_value.chars().take(50).collect(),
                    significance: Significance::Medium,
                });
            }
        }
    }

    anomalies
}

fn overall_severity(anomalies: &[Anomaly]) -> Significance {
    let max = anomalies
        .iter()
        .map(|a| a.significance())
        .max()
        .unwrap_or(Significance::Low);

    if anomalies.len() >= 5 {
        Significance::Critical
    } else if anomalies.len() >= 3 && max == Significance::Medium {
        Significance::High
    } else {
        max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str, duration_ms: u64) -> HttpResponse {
        HttpResponse {
            status_code: status,
            body: body.to_string(),
            headers: HashMap::new(),
            duration_ms,
            final_url: "http://t.test/".to_string(),
        }
    }

    fn analyzer_with_baseline(base: &HttpResponse) -> DifferentialAnalyzer {
        let analyzer = DifferentialAnalyzer::new();
        analyzer.store_baseline("http://t.test/", base);
        analyzer
    }

    #[test]
    fn test_identical_response_yields_none() {
        let base = response(200, "<html><body>hello</body></html>", 100);
        let analyzer = analyzer_with_baseline(&base);

        assert!(analyzer
            .analyze_response("http://t.test/", &base, None)
            .is_none());
    }

    #[test]
    fn test_missing_baseline_yields_none() {
        let analyzer = DifferentialAnalyzer::new();
        let resp = response(500, "boom", 100);
        assert!(analyzer
            .analyze_response("http://t.test/", &resp, None)
            .is_none());
    }

    #[test]
    fn test_status_change_503_is_high() {
        let base = response(200, "ok", 100);
        let analyzer = analyzer_with_baseline(&base);

        let outcome = analyzer
            .analyze_response("http://t.test/", &response(503, "ok", 100), None)
            .unwrap();

        let status = outcome
            .anomalies
            .iter()
            .find(|a| a.kind() == "status_change")
            .unwrap();
        assert_eq!(status.significance(), Significance::High);
    }

    #[test]
    fn test_status_change_404_is_medium() {
        let base = response(200, "ok", 100);
        let analyzer = analyzer_with_baseline(&base);

        let outcome = analyzer
            .analyze_response("http://t.test/", &response(404, "ok", 100), None)
            .unwrap();
        let status = outcome
            .anomalies
            .iter()
            .find(|a| a.kind() == "status_change")
            .unwrap();
        assert_eq!(status.significance(), Significance::Medium);
    }

    #[test]
    fn test_slow_response_is_high_timing_anomaly() {
        // baseline 0.1s, test 5.1s: difference of 5.0s is high, not critical
        let base = response(200, "ok", 100);
        let analyzer = analyzer_with_baseline(&base);

        let outcome = analyzer
            .analyze_response("http://t.test/", &response(200, "ok", 5100), None)
            .unwrap();

        let timing = outcome
            .anomalies
            .iter()
            .find(|a| a.kind() == "timing_anomaly")
            .unwrap();
        assert_eq!(timing.significance(), Significance::High);
    }

    #[test]
    fn test_very_slow_response_is_critical() {
        let base = response(200, "ok", 100);
        let analyzer = analyzer_with_baseline(&base);

        let outcome = analyzer
            .analyze_response("http://t.test/", &response(200, "ok", 5300), None)
            .unwrap();
        let timing = outcome
            .anomalies
            .iter()
            .find(|a| a.kind() == "timing_anomaly")
            .unwrap();
        assert_eq!(timing.significance(), Significance::Critical);
    }

    #[test]
    fn test_new_error_tokens() {
        let base = response(200, "<html>fine</html>", 100);
        let analyzer = analyzer_with_baseline(&base);

        let outcome = analyzer
            .analyze_response(
                "http://t.test/",
                &response(500, "Traceback (most recent call last): exception", 100),
                None,
            )
            .unwrap();

        let errors = outcome
            .anomalies
            .iter()
            .find(|a| a.kind() == "new_errors")
            .unwrap();
        assert_eq!(errors.significance(), Significance::Critical);
        assert!(outcome.confidence >= 80);
    }

    #[test]
    fn test_empty_baseline_suppresses_length_change() {
        let base = response(200, "", 100);
        let analyzer = analyzer_with_baseline(&base);

        let outcome = analyzer.analyze_response("http://t.test/", &response(200, "", 100), None);
        assert!(outcome.is_none());
    }

    #[test]
    fn test_payload_reflection_is_critical() {
        let base = response(200, "welcome", 100);
        let analyzer = analyzer_with_baseline(&base);

        let outcome = analyzer
            .analyze_response(
                "http://t.test/",
                &response(200, "welcome <script>alert(1)</script>", 100),
                Some("<script>alert(1)</script>"),
            )
            .unwrap();

        assert!(outcome
            .anomalies
            .iter()
            .any(|a| a.kind() == "payload_reflection" && a.significance() == Significance::Critical));
    }

    #[test]
    fn test_payload_equal_to_baseline_value_yields_no_anomalies() {
        // Sending the parameter's own value back: the body is identical
        // and the "reflection" is just the baseline echo
        let base = response(200, "Results for hello", 100);
        let analyzer = analyzer_with_baseline(&base);

        let outcome = analyzer.analyze_response(
            "http://t.test/",
            &response(200, "Results for hello", 100),
            Some("hello"),
        );
        assert!(outcome.is_none());
    }

    #[test]
    fn test_removed_security_header() {
        let mut base = response(200, "ok", 100);
        base.headers
            .insert("x-frame-options".to_string(), "DENY".to_string());
        let analyzer = analyzer_with_baseline(&base);

        let outcome = analyzer
            .analyze_response("http://t.test/", &response(200, "ok", 100), None)
            .unwrap();
        assert!(outcome
            .anomalies
            .iter()
            .any(|a| a.kind() == "removed_security_header"));
    }

    #[test]
    fn test_new_debug_header() {
        let base = response(200, "ok", 100);
        let analyzer = analyzer_with_baseline(&base);

        let mut test = response(200, "ok", 100);
        test.headers
            .insert("x-debug".to_string(), "trace-id 123".to_string());

        let outcome = analyzer
            .analyze_response("http://t.test/", &test, None)
            .unwrap();
        let header = outcome
            .anomalies
            .iter()
            .find(|a| a.kind() == "new_debug_header")
            .unwrap();
        assert_eq!(header.significance(), Significance::High);
    }

    #[test]
    fn test_severity_escalation_many_anomalies() {
        let anomalies = vec![
            Anomaly::DomStructureChange { significance: Significance::Medium },
            Anomaly::HeaderValueChange {
                header: "content-type".into(),
                baseline: "a".into(),
                current: "b".into(),
                significance: Significance::Medium,
            },
            Anomaly::LengthChange {
                change_percent: 25.0,
                baseline: 100,
                current: 125,
                significance: Significance::Medium,
            },
        ];
        assert_eq!(overall_severity(&anomalies), Significance::High);

        let five = vec![
            Anomaly::DomStructureChange { significance: Significance::Low },
            Anomaly::DomStructureChange { significance: Significance::Low },
            Anomaly::DomStructureChange { significance: Significance::Low },
            Anomaly::DomStructureChange { significance: Significance::Low },
            Anomaly::DomStructureChange { significance: Significance::Low },
        ];
        assert_eq!(overall_severity(&five), Significance::Critical);
    }

    #[test]
    fn test_content_change_requires_low_similarity() {
        let base = response(200, &"lorem ipsum dolor sit amet ".repeat(50), 100);
        let analyzer = analyzer_with_baseline(&base);

        // One character difference: hash changes, similarity stays high
        let mut body = base.body.clone();
        body.push('x');
        let outcome = analyzer.analyze_response("http://t.test/", &response(200, &body, 100), None);
        if let Some(outcome) = outcome {
            assert!(!outcome.anomalies.iter().any(|a| a.kind() == "content_change"));
        }
    }

    #[tokio::test]
    async fn test_ensure_baseline_runs_fetch_once() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let analyzer = Arc::new(DifferentialAnalyzer::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let analyzer = Arc::clone(&analyzer);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                analyzer
                    .ensure_baseline("http://t.test/page", || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(response(200, "baseline", 50))
                    })
                    .await
                    .unwrap()
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(analyzer.baseline_for("http://t.test/page").is_some());
    }
}
