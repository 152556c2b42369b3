// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Headless browser discovery for JavaScript-rendered pages
//! Loads the target in Chrome/Chromium, interacts with it, and records the
//! XHR/fetch traffic the page generates

use crate::crawler::{ApiEndpoint, DiscoveredForm, FormInput};
use crate::errors::ScanError;
use crate::scope::{self, ScopePolicy};
use headless_chrome::{Browser, LaunchOptions};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

/// Settle time after initial page load
const PAGE_LOAD_WAIT: Duration = Duration::from_secs(3);
/// Settle time after scrolling to the bottom
const SCROLL_WAIT: Duration = Duration::from_secs(2);
/// Settle time after each button click
const CLICK_WAIT: Duration = Duration::from_secs(1);
/// Time for intercepted XHR/fetch traffic to accumulate
const INTERCEPT_WAIT: Duration = Duration::from_secs(3);
/// Buttons clicked per page
const MAX_BUTTON_CLICKS: usize = 5;

/// Records (method, url) tuples for every XHR/fetch the page issues
const INTERCEPTOR_JS: &str = r#"
window.__luotainRequests = window.__luotainRequests || [];
(function() {
    if (window.__luotainHooked) { return; }
    window.__luotainHooked = true;
    var originalOpen = XMLHttpRequest.prototype.open;
    XMLHttpRequest.prototype.open = function(method, url) {
        window.__luotainRequests.push({method: String(method), url: String(url)});
        return originalOpen.apply(this, arguments);
    };
    var originalFetch = window.fetch;
    window.fetch = function(input, init) {
        var url = (typeof input === 'string') ? input : (input && input.url) || '';
        var method = (init && init.method) || 'GET';
        window.__luotainRequests.push({method: String(method), url: String(url)});
        return originalFetch.apply(this, arguments);
    };
})();
"#;

const ANCHORS_JS: &str =
    "JSON.stringify(Array.from(document.querySelectorAll('a[href]')).map(a => a.href))";

const FORMS_JS: &str = r#"
JSON.stringify(Array.from(document.querySelectorAll('form')).map(f => ({
    action: f.action || '',
    method: (f.method || 'GET'),
    inputs: Array.from(f.querySelectorAll('input, textarea, select')).map(i => ({
        name: i.name || i.id || '',
        type: i.type || 'text',
        value: i.value || ''
    }))
})))
"#;

const READBACK_JS: &str = "JSON.stringify(window.__luotainRequests || [])";

/// Per-element guard: only visible, enabled buttons are worth clicking
const BUTTON_CLICKABLE_JS: &str = r#"
function() {
    if (this.disabled) { return false; }
    var rect = this.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
}
"#;

/// Surface discovered by the dynamic phase
#[derive(Debug, Clone, Default)]
pub struct DynamicResults {
    pub links: HashSet<String>,
    pub forms: Vec<DiscoveredForm>,
    pub api_endpoints: Vec<ApiEndpoint>,
}

#[derive(Debug, Deserialize)]
struct JsFormInput {
    name: String,
    #[serde(rename = "type")]
    input_type: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct JsForm {
    action: String,
    method: String,
    inputs: Vec<JsFormInput>,
}

#[derive(Debug, Deserialize)]
struct JsRequest {
    method: String,
    url: String,
}

/// Run dynamic discovery against the start URL. The browser driver is not
/// thread-safe, so the whole phase runs single-task on the blocking pool
/// and the browser is torn down before returning.
pub async fn discover(start_url: &str, scope: &ScopePolicy) -> Result<DynamicResults, ScanError> {
    let url = start_url.to_string();
    let scope = scope.clone();

    tokio::task::spawn_blocking(move || discover_blocking(&url, &scope))
        .await
        .map_err(|e| ScanError::BrowserUnavailable {
            reason: format!("browser task failed: {}", e),
        })?
}

fn discover_blocking(start_url: &str, scope: &ScopePolicy) -> Result<DynamicResults, ScanError> {
    let browser_unavailable = |e: anyhow::Error| ScanError::BrowserUnavailable {
        reason: e.to_string(),
    };

    let options = LaunchOptions::default_builder()
        .headless(true)
        .sandbox(false)
        .window_size(Some((1920, 1080)))
        .idle_browser_timeout(Duration::from_secs(60))
        .build()
        .map_err(|e| ScanError::BrowserUnavailable {
            reason: e.to_string(),
        })?;

    let browser = Browser::new(options).map_err(browser_unavailable)?;
    let tab = browser.new_tab().map_err(browser_unavailable)?;

    tab.navigate_to(start_url).map_err(browser_unavailable)?;
    let _ = tab.wait_until_navigated();
    std::thread::sleep(PAGE_LOAD_WAIT);

    // Install the traffic interceptor before interacting with the page
    let _ = tab.evaluate(INTERCEPTOR_JS, false);

    // Scroll to trigger lazy loading
    let _ = tab.evaluate("window.scrollTo(0, document.body.scrollHeight);", false);
    std::thread::sleep(SCROLL_WAIT);

    let mut results = DynamicResults::default();
    collect_dom_surface(&tab, start_url, scope, &mut results);

    // Click through visible, enabled buttons, re-enumerating after each
    if let Ok(buttons) = tab.find_elements("button") {
        let mut clicks = 0;
        for button in buttons {
            if clicks >= MAX_BUTTON_CLICKS {
                break;
            }

            let clickable = button
                .call_js_fn(BUTTON_CLICKABLE_JS, Vec::new(), false)
                .ok()
                .and_then(|remote| remote.value)
                .and_then(|value| value.as_bool())
                .unwrap_or(false);
            if !clickable {
                continue;
            }

            if button.click().is_err() {
                continue;
            }
            clicks += 1;
            std::thread::sleep(CLICK_WAIT);
            collect_dom_surface(&tab, start_url, scope, &mut results);
        }
    }

    // Let intercepted traffic accumulate, then read it back
    std::thread::sleep(INTERCEPT_WAIT);
    if let Ok(remote) = tab.evaluate(READBACK_JS, false) {
        if let Some(serde_json::Value::String(json)) = remote.value {
            if let Ok(requests) = serde_json::from_str::<Vec<JsRequest>>(&json) {
                for request in requests {
                    let resolved = scope::resolve_url(start_url, &request.url);
                    let Some(normalized) = scope::normalize_url(&resolved) else {
                        continue;
                    };
                    if !scope.is_in_scope(&normalized) {
                        continue;
                    }
                    let endpoint = ApiEndpoint {
                        url: normalized,
                        method: request.method.to_uppercase(),
                    };
                    if !results.api_endpoints.contains(&endpoint) {
                        debug!("Captured dynamic request: {} {}", endpoint.method, endpoint.url);
                        results.api_endpoints.push(endpoint);
                    }
                }
            }
        }
    }

    // Browser and its child process shut down here, before the phase returns
    drop(tab);
    drop(browser);

    Ok(results)
}

/// Enumerate the rendered DOM's anchors and forms
fn collect_dom_surface(
    tab: &headless_chrome::Tab,
    page_url: &str,
    scope: &ScopePolicy,
    results: &mut DynamicResults,
) {
    match tab.evaluate(ANCHORS_JS, false) {
        Ok(remote) => {
            if let Some(serde_json::Value::String(json)) = remote.value {
                if let Ok(hrefs) = serde_json::from_str::<Vec<String>>(&json) {
                    for href in hrefs {
                        if let Some(normalized) = scope::normalize_url(&href) {
                            if scope.is_in_scope(&normalized)
                                && !ScopePolicy::is_blocked_extension(&normalized)
                            {
                                results.links.insert(normalized);
                            }
                        }
                    }
                }
            }
        }
        Err(e) => warn!("Anchor enumeration failed: {}", e),
    }

    if let Ok(remote) = tab.evaluate(FORMS_JS, false) {
        if let Some(serde_json::Value::String(json)) = remote.value {
            if let Ok(js_forms) = serde_json::from_str::<Vec<JsForm>>(&json) {
                for js_form in js_forms {
                    let action = if js_form.action.is_empty() {
                        page_url.to_string()
                    } else {
                        scope::resolve_url(page_url, &js_form.action)
                    };
                    if !scope.is_in_scope(&action) {
                        continue;
                    }

                    let inputs: Vec<FormInput> = js_form
                        .inputs
                        .into_iter()
                        .filter(|i| !i.name.is_empty())
                        .filter(|i| {
                            !matches!(i.input_type.as_str(), "submit" | "button" | "reset" | "image")
                        })
                        .map(|i| FormInput {
                            name: i.name,
                            input_type: i.input_type,
                            value: if i.value.is_empty() { None } else { Some(i.value) },
                            required: false,
                        })
                        .collect();

                    if inputs.is_empty() {
                        continue;
                    }

                    let form = DiscoveredForm {
                        action,
                        method: if js_form.method.eq_ignore_ascii_case("post") {
                            "POST".to_string()
                        } else {
                            "GET".to_string()
                        },
                        inputs,
                        form_id: None,
                        form_name: None,
                        discovered_at: format!("{} (dynamic)", page_url),
                    };

                    if !results.forms.iter().any(|f| f.signature() == form.signature()) {
                        results.forms.push(form);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interceptor_script_hooks_both_transports() {
        assert!(INTERCEPTOR_JS.contains("XMLHttpRequest.prototype.open"));
        assert!(INTERCEPTOR_JS.contains("window.fetch"));
        // Re-injection must not stack hooks
        assert!(INTERCEPTOR_JS.contains("__luotainHooked"));
    }

    #[test]
    fn test_button_guard_checks_visibility_and_enabled_state() {
        assert!(BUTTON_CLICKABLE_JS.contains("getBoundingClientRect"));
        assert!(BUTTON_CLICKABLE_JS.contains("disabled"));
    }

    #[test]
    fn test_js_form_deserialization() {
        let json = r#"[{"action":"http://t.test/send","method":"post",
            "inputs":[{"name":"q","type":"text","value":"x"},{"name":"","type":"text","value":""}]}]"#;
        let forms: Vec<JsForm> = serde_json::from_str(json).unwrap();
        assert_eq!(forms[0].method, "post");
        assert_eq!(forms[0].inputs.len(), 2);
    }

    #[test]
    fn test_js_request_deserialization() {
        let json = r#"[{"method":"POST","url":"/api/save"}]"#;
        let requests: Vec<JsRequest> = serde_json::from_str(json).unwrap();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].url, "/api/save");
    }
}
