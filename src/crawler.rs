// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Luotain Web Crawler
 * Breadth-first attack surface discovery: links, forms, parameters, APIs
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::errors::ScanError;
use crate::events::EventSink;
use crate::headless_crawler;
use crate::http_client::{HttpClient, HttpResponse};
use crate::scope::{self, ScopePolicy};
use crate::types::{Parameter, ParameterLocation};
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

/// Per-page fetch timeout
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
/// Bounded fetch fan-out per BFS wave
const FETCH_CONCURRENCY: usize = 8;
/// Crawl events retained in the report
const MAX_EVENT_LOG: usize = 100;

/// URL literals inside inline event handlers
static HANDLER_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"['"]([^'"\s]+\.(?:php|asp|jsp|html|htm|do|action))['"]"#).unwrap()
});

/// API endpoint patterns matched against response bodies
static API_PATH_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r#"['"](/api/[^'"\s]+)['"]"#).unwrap(),
        Regex::new(r#"['"](/v\d+/[^'"\s]+)['"]"#).unwrap(),
        Regex::new(r#"['"](/rest/[^'"\s]+)['"]"#).unwrap(),
        Regex::new(r#"['"](/graphql[^'"\s]*)['"]"#).unwrap(),
        Regex::new(r#"['"](/ws/[^'"\s]+)['"]"#).unwrap(),
        Regex::new(r#"(?i)fetch\s*\(\s*['"]([^'"\s]+)['"]"#).unwrap(),
        Regex::new(r#"(?i)axios\.\w+\s*\(\s*['"]([^'"\s]+)['"]"#).unwrap(),
        Regex::new(r#"(?i)XMLHttpRequest.*open\s*\(\s*['"](?:GET|POST|PUT|DELETE)['"],\s*['"]([^'"\s]+)['"]"#)
            .unwrap(),
    ]
});

/// Absolute and root-relative URL literals inside inline scripts
static SCRIPT_URL_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r#"['"]((?:https?:)?//[^'"\s]+)['"]"#).unwrap(),
        Regex::new(r#"['"](/[^'"\s]+)['"]"#).unwrap(),
    ]
});

/// Form input field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    pub name: String,
    pub input_type: String,
    pub value: Option<String>,
    pub required: bool,
}

/// Discovered form on a webpage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredForm {
    pub action: String,
    pub method: String,
    pub inputs: Vec<FormInput>,
    pub form_id: Option<String>,
    pub form_name: Option<String>,
    pub discovered_at: String,
}

impl DiscoveredForm {
    /// Hash signature for deduplication: action + method + sorted input names
    pub fn signature(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.action.hash(&mut hasher);
        self.method.hash(&mut hasher);

        let mut names: Vec<_> = self.inputs.iter().map(|i| &i.name).collect();
        names.sort();
        for name in names {
            name.hash(&mut hasher);
        }

        hasher.finish()
    }
}

/// A discovered API call site
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEndpoint {
    pub url: String,
    pub method: String,
}

/// Timestamped crawl event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlEvent {
    pub timestamp: String,
    pub kind: String,
    pub message: String,
    pub depth: usize,
}

/// Everything the crawler discovered, handed to the active scanner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlReport {
    pub scope_domain: String,
    pub crawled_urls: HashSet<String>,
    pub forms: Vec<DiscoveredForm>,
    /// Normalized URL -> parameters discovered on that page
    pub parameters: HashMap<String, Vec<Parameter>>,
    pub api_endpoints: Vec<ApiEndpoint>,
    pub javascript_urls: HashSet<String>,
    /// Ordered event log, last 100 retained
    pub events: Vec<CrawlEvent>,
}

impl CrawlReport {
    fn new(scope_domain: &str) -> Self {
        Self {
            scope_domain: scope_domain.to_string(),
            ..Default::default()
        }
    }

    pub fn total_parameters(&self) -> usize {
        self.parameters.values().map(|p| p.len()).sum()
    }

    /// Drop duplicate forms sharing a signature
    pub fn deduplicate_forms(&mut self) {
        let mut seen = HashSet::new();
        let before = self.forms.len();
        self.forms.retain(|form| seen.insert(form.signature()));

        let removed = before - self.forms.len();
        if removed > 0 {
            info!("Deduplicated {} duplicate forms", removed);
        }
    }

    fn record_event(&mut self, kind: &str, message: String, depth: usize) {
        debug!("[{}] {}", kind, message);
        self.events.push(CrawlEvent {
            timestamp: chrono::Utc::now().to_rfc3339(),
            kind: kind.to_string(),
            message,
            depth,
        });
    }

    fn trim_events(&mut self) {
        if self.events.len() > MAX_EVENT_LOG {
            self.events.drain(..self.events.len() - MAX_EVENT_LOG);
        }
    }

    pub fn has_event(&self, kind: &str) -> bool {
        self.events.iter().any(|e| e.kind == kind)
    }
}

pub struct WebCrawler {
    http_client: Arc<HttpClient>,
    max_depth: usize,
    max_pages: usize,
    event_sink: Arc<dyn EventSink>,
    cancelled: Arc<RwLock<bool>>,
}

impl WebCrawler {
    pub fn new(
        http_client: Arc<HttpClient>,
        max_depth: usize,
        max_pages: usize,
        event_sink: Arc<dyn EventSink>,
        cancelled: Arc<RwLock<bool>>,
    ) -> Self {
        Self {
            http_client,
            max_depth,
            max_pages,
            event_sink,
            cancelled,
        }
    }

    /// Crawl the target breadth-first and assemble the crawl report.
    /// Per-URL failures are logged events; only an invalid start URL fails
    /// the crawl.
    pub async fn crawl(
        &self,
        start_url: &str,
        enable_dynamic: bool,
    ) -> Result<CrawlReport, ScanError> {
        let scope = ScopePolicy::from_target(start_url)?;
        let mut report = CrawlReport::new(scope.primary_domain());

        report.record_event("CRAWL_START", format!("Starting crawl of {}", start_url), 0);
        report.record_event(
            "SCOPE_SET",
            format!("Domain: {}", scope.primary_domain()),
            0,
        );
        self.event_sink
            .send_log(&format!("[Crawler] Scope set to: {}", scope.primary_domain()))
            .await;

        let mut queue: VecDeque<(String, usize)> = VecDeque::new();
        let mut visited: HashSet<String> = HashSet::new();

        let start = scope::normalize_url(start_url).unwrap_or_else(|| start_url.to_string());
        queue.push_back((start, 0));

        for url in self.discover_sitemap(start_url, &scope).await {
            queue.push_back((url, 0));
        }

        while !queue.is_empty() && visited.len() < self.max_pages {
            if *self.cancelled.read().await {
                report.record_event("CANCELLED", "Crawl cancelled".to_string(), 0);
                break;
            }

            // Assemble one fetch wave; queue/visited mutation stays here
            let mut batch = Vec::new();
            while batch.len() < FETCH_CONCURRENCY && visited.len() + batch.len() < self.max_pages {
                let Some((url, depth)) = queue.pop_front() else {
                    break;
                };
                if depth > self.max_depth || visited.contains(&url) {
                    continue;
                }
                visited.insert(url.clone());
                batch.push((url, depth));
            }

            if batch.is_empty() {
                continue;
            }

            for (url, depth) in &batch {
                report.record_event("CRAWLING", format!("Depth {}: {}", depth, url), *depth);
                self.event_sink
                    .send_log(&format!(
                        "[Crawler] Crawling ({}/{}): {}",
                        depth, self.max_depth, url
                    ))
                    .await;
            }

            let responses: Vec<(String, usize, Result<HttpResponse, ScanError>)> =
                stream::iter(batch)
                    .map(|(url, depth)| {
                        let client = Arc::clone(&self.http_client);
                        async move {
                            let result = client.get_with_timeout(&url, FETCH_TIMEOUT).await;
                            (url, depth, result)
                        }
                    })
                    .buffer_unordered(FETCH_CONCURRENCY)
                    .collect()
                    .await;

            for (url, depth, result) in responses {
                match result {
                    Ok(response) => {
                        if !scope.is_in_scope(&response.final_url) {
                            report.record_event(
                                "REDIRECT_OUT_OF_SCOPE",
                                format!("{} -> {}", url, response.final_url),
                                depth,
                            );
                            continue;
                        }
                        report.crawled_urls.insert(url.clone());
                        self.process_page(&url, depth, &response, &scope, &mut report, &mut queue, &visited);
                        report.record_event("CRAWLED", format!("Successfully crawled: {}", url), depth);
                    }
                    Err(e) => {
                        warn!("Failed to fetch {}: {}", url, e);
                        report.record_event(e.event_kind(), format!("{}: {}", url, e), depth);
                    }
                }
            }
        }

        if visited.len() >= self.max_pages {
            report.record_event(
                "PAGE_CAP",
                format!("Reached max pages limit ({})", self.max_pages),
                0,
            );
        }

        if enable_dynamic {
            self.run_dynamic_phase(start_url, &scope, &mut report).await;
        }

        report.deduplicate_forms();
        report.record_event(
            "CRAWL_COMPLETE",
            format!(
                "{} pages, {} forms, {} parameters, {} API endpoints",
                report.crawled_urls.len(),
                report.forms.len(),
                report.total_parameters(),
                report.api_endpoints.len()
            ),
            0,
        );
        report.trim_events();

        self.event_sink
            .send_log(&format!(
                "[Crawler] Crawl complete: {} URLs, {} forms, {} API endpoints",
                report.crawled_urls.len(),
                report.forms.len(),
                report.api_endpoints.len()
            ))
            .await;

        Ok(report)
    }

    /// Parse one fetched page and fold its surface into the report
    fn process_page(
        &self,
        page_url: &str,
        depth: usize,
        response: &HttpResponse,
        scope: &ScopePolicy,
        report: &mut CrawlReport,
        queue: &mut VecDeque<(String, usize)>,
        visited: &HashSet<String>,
    ) {
        let (links, forms, mut parameters, javascript_urls) = {
            let document = Html::parse_document(&response.body);
            (
                extract_links(&document, page_url),
                extract_forms(&document, page_url),
                extract_page_parameters(&document, page_url),
                extract_inline_script_urls(&document, page_url),
            )
        };

        for link in links {
            let Some(normalized) = scope::normalize_url(&link) else {
                continue;
            };
            if !scope.is_in_scope(&normalized) {
                report.record_event("OUT_OF_SCOPE", format!("Skipping: {}", normalized), depth);
                continue;
            }
            if ScopePolicy::is_blocked_extension(&normalized) {
                continue;
            }
            if depth < self.max_depth && !visited.contains(&normalized) {
                report.record_event("FOUND_LINK", format!("Found: {}", normalized), depth);
                queue.push_back((normalized, depth + 1));
            }
        }

        if !forms.is_empty() {
            report.record_event(
                "FOUND_FORMS",
                format!("Found {} forms on {}", forms.len(), page_url),
                depth,
            );
            report.forms.extend(forms);
        }

        // Query parameters of the page URL itself
        if let Ok(url) = Url::parse(page_url) {
            for (name, value) in url.query_pairs() {
                push_parameter(
                    &mut parameters,
                    Parameter::new(&name, &value, ParameterLocation::Query, None),
                );
            }
        }

        if !parameters.is_empty() {
            report.record_event(
                "FOUND_PARAMS",
                format!(
                    "Found parameters: {:?}",
                    parameters.iter().map(|p| p.name.as_str()).collect::<Vec<_>>()
                ),
                depth,
            );
            let key = scope::normalize_url(page_url).unwrap_or_else(|| page_url.to_string());
            let entry = report.parameters.entry(key).or_default();
            for parameter in parameters {
                if !entry.iter().any(|p| p.name == parameter.name) {
                    entry.push(parameter);
                }
            }
        }

        let apis = extract_api_endpoints(&response.body, page_url, scope);
        if !apis.is_empty() {
            report.record_event("FOUND_API", format!("Found {} API endpoints", apis.len()), depth);
            for api in apis {
                if !report.api_endpoints.contains(&api) {
                    report.api_endpoints.push(api);
                }
            }
        }

        for js_url in javascript_urls {
            if scope.is_in_scope(&js_url) {
                report.javascript_urls.insert(js_url);
            }
        }
    }

    /// Headless-browser discovery. Browser failure downgrades to
    /// static-only and is never fatal.
    async fn run_dynamic_phase(
        &self,
        start_url: &str,
        scope: &ScopePolicy,
        report: &mut CrawlReport,
    ) {
        report.record_event("AJAX_SPIDER_START", format!("Dynamic discovery on {}", start_url), 0);
        self.event_sink
            .send_log("[Crawler] Starting dynamic discovery for JavaScript content")
            .await;

        match headless_crawler::discover(start_url, scope).await {
            Ok(dynamic) => {
                report.record_event(
                    "AJAX_SPIDER_COMPLETE",
                    format!(
                        "{} links, {} forms, {} API endpoints",
                        dynamic.links.len(),
                        dynamic.forms.len(),
                        dynamic.api_endpoints.len()
                    ),
                    0,
                );
                for link in dynamic.links {
                    report.javascript_urls.insert(link);
                }
                report.forms.extend(dynamic.forms);
                for api in dynamic.api_endpoints {
                    if !report.api_endpoints.contains(&api) {
                        report.api_endpoints.push(api);
                    }
                }
            }
            Err(e) => {
                warn!("Dynamic discovery unavailable: {}", e);
                report.record_event(e.event_kind(), e.to_string(), 0);
                self.event_sink
                    .send_log("[Crawler] Headless browser unavailable, continuing static-only")
                    .await;
            }
        }
    }

    /// Seed the queue from sitemap.xml when the target publishes one
    async fn discover_sitemap(&self, start_url: &str, scope: &ScopePolicy) -> Vec<String> {
        let Ok(base) = Url::parse(start_url) else {
            return Vec::new();
        };
        let Some(host) = base.host_str() else {
            return Vec::new();
        };
        let sitemap_url = format!("{}://{}/sitemap.xml", base.scheme(), host);

        let mut urls = Vec::new();
        if let Ok(resp) = self.http_client.get_with_timeout(&sitemap_url, FETCH_TIMEOUT).await {
            if resp.status_code == 200 {
                for line in resp.body.lines() {
                    let trimmed = line.trim();
                    if let Some(start) = trimmed.find("<loc>") {
                        if let Some(end) = trimmed.find("</loc>") {
                            if start + 5 <= end {
                                let loc = &trimmed[start + 5..end];
                                if let Some(normalized) = scope::normalize_url(loc) {
                                    if scope.is_in_scope(&normalized)
                                        && !ScopePolicy::is_blocked_extension(&normalized)
                                    {
                                        urls.push(normalized);
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        if !urls.is_empty() {
            info!("Discovered {} URLs from sitemap.xml", urls.len());
        }
        urls
    }
}

/// Anchor hrefs, form actions, frame sources and handler-embedded URLs
fn extract_links(document: &Html, page_url: &str) -> Vec<String> {
    let mut links = Vec::new();

    let anchor_selector = Selector::parse("a[href]").unwrap();
    for element in document.select(&anchor_selector) {
        if let Some(href) = element.value().attr("href") {
            if href.starts_with('#') || href.starts_with("javascript:") {
                continue;
            }
            links.push(scope::resolve_url(page_url, href));
        }
    }

    let action_selector = Selector::parse("form[action]").unwrap();
    for element in document.select(&action_selector) {
        if let Some(action) = element.value().attr("action") {
            if !action.is_empty() {
                links.push(scope::resolve_url(page_url, action));
            }
        }
    }

    let frame_selector = Selector::parse("iframe[src], frame[src]").unwrap();
    for element in document.select(&frame_selector) {
        if let Some(src) = element.value().attr("src") {
            links.push(scope::resolve_url(page_url, src));
        }
    }

    let handler_selector = Selector::parse("[onclick], [onsubmit], [onchange]").unwrap();
    for element in document.select(&handler_selector) {
        for attr in ["onclick", "onsubmit", "onchange"] {
            if let Some(code) = element.value().attr(attr) {
                for capture in HANDLER_URL_RE.captures_iter(code) {
                    links.push(scope::resolve_url(page_url, &capture[1]));
                }
            }
        }
    }

    links
}

/// Forms with their input metadata; submit/button/reset inputs excluded
fn extract_forms(document: &Html, page_url: &str) -> Vec<DiscoveredForm> {
    let mut forms = Vec::new();

    let form_selector = Selector::parse("form").unwrap();
    let input_selector = Selector::parse("input, textarea, select").unwrap();

    for form_element in document.select(&form_selector) {
        let action = form_element.value().attr("action").unwrap_or("");
        let action_url = if action.is_empty() {
            page_url.to_string()
        } else {
            scope::resolve_url(page_url, action)
        };

        let method = match form_element
            .value()
            .attr("method")
            .unwrap_or("GET")
            .to_uppercase()
            .as_str()
        {
            "POST" => "POST".to_string(),
            _ => "GET".to_string(),
        };

        let mut inputs = Vec::new();
        for input_element in form_element.select(&input_selector) {
            let Some(name) = input_element
                .value()
                .attr("name")
                .or_else(|| input_element.value().attr("id"))
            else {
                continue;
            };
            if name.is_empty() {
                continue;
            }

            let tag = input_element.value().name();
            let input_type = input_element
                .value()
                .attr("type")
                .unwrap_or(if tag == "textarea" {
                    "textarea"
                } else if tag == "select" {
                    "select"
                } else {
                    "text"
                })
                .to_lowercase();

            if matches!(input_type.as_str(), "submit" | "button" | "reset" | "image") {
                continue;
            }

            inputs.push(FormInput {
                name: name.to_string(),
                input_type,
                value: input_element.value().attr("value").map(|v| v.to_string()),
                required: input_element.value().attr("required").is_some(),
            });
        }

        if inputs.is_empty() {
            continue;
        }

        debug!("Found form: {} with {} inputs", action_url, inputs.len());
        forms.push(DiscoveredForm {
            action: action_url,
            method,
            inputs,
            form_id: form_element.value().attr("id").map(|s| s.to_string()),
            form_name: form_element.value().attr("name").map(|s| s.to_string()),
            discovered_at: page_url.to_string(),
        });
    }

    forms
}

/// Hidden inputs and data-* attributes found on the page
fn extract_page_parameters(document: &Html, _page_url: &str) -> Vec<Parameter> {
    let mut parameters = Vec::new();

    let hidden_selector = Selector::parse("input[type=hidden]").unwrap();
    for element in document.select(&hidden_selector) {
        if let Some(name) = element.value().attr("name") {
            if !name.is_empty() {
                push_parameter(
                    &mut parameters,
                    Parameter::new(
                        name,
                        element.value().attr("value").unwrap_or(""),
                        ParameterLocation::FormHidden,
                        Some("hidden"),
                    ),
                );
            }
        }
    }

    let all_selector = Selector::parse("*").unwrap();
    for element in document.select(&all_selector) {
        for (attr_name, attr_value) in element.value().attrs() {
            if let Some(param_name) = attr_name.strip_prefix("data-") {
                if !param_name.is_empty() {
                    push_parameter(
                        &mut parameters,
                        Parameter::new(
                            param_name,
                            attr_value,
                            ParameterLocation::DataAttribute,
                            None,
                        ),
                    );
                }
            }
        }
    }

    parameters
}

fn push_parameter(parameters: &mut Vec<Parameter>, parameter: Parameter) {
    if !parameters.iter().any(|p| p.name == parameter.name) {
        parameters.push(parameter);
    }
}

/// API endpoints referenced from page markup and inline scripts
fn extract_api_endpoints(body: &str, page_url: &str, scope: &ScopePolicy) -> Vec<ApiEndpoint> {
    let mut endpoints = Vec::new();

    for re in API_PATH_RES.iter() {
        for capture in re.captures_iter(body) {
            let raw = &capture[1];
            let resolved = if raw.starts_with('/') {
                scope::resolve_url(page_url, raw)
            } else {
                raw.to_string()
            };

            let Some(normalized) = scope::normalize_url(&resolved) else {
                continue;
            };
            if !scope.is_in_scope(&normalized) {
                continue;
            }

            let endpoint = ApiEndpoint {
                url: normalized,
                method: "GET".to_string(),
            };
            if !endpoints.contains(&endpoint) {
                endpoints.push(endpoint);
            }
        }
    }

    endpoints
}

/// URL literals inside inline <script> blocks
fn extract_inline_script_urls(document: &Html, page_url: &str) -> HashSet<String> {
    let mut urls = HashSet::new();

    let script_selector = Selector::parse("script:not([src])").unwrap();
    for script in document.select(&script_selector) {
        let code: String = script.text().collect();
        if code.is_empty() {
            continue;
        }

        for re in SCRIPT_URL_RES.iter() {
            for capture in re.captures_iter(&code) {
                let raw = &capture[1];
                let resolved = if raw.starts_with('/') && !raw.starts_with("//") {
                    scope::resolve_url(page_url, raw)
                } else if raw.starts_with("//") {
                    format!("https:{}", raw)
                } else {
                    raw.to_string()
                };
                if let Some(normalized) = scope::normalize_url(&resolved) {
                    urls.insert(normalized);
                }
            }
        }
    }

    urls
}
