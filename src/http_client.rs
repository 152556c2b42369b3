// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Luotain HTTP Client
 * Shared transport wrapper over a pooled reqwest client
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::errors::ScanError;
use anyhow::{Context, Result};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Luotain/1.4";

/// Maximum response body size (10MB) to prevent memory exhaustion
const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

const DEFAULT_POOL_IDLE_PER_HOST: usize = 32;

#[derive(Clone)]
pub struct HttpClient {
    client: Arc<Client>,
    timeout: Duration,
    max_retries: u32,
}

impl HttpClient {
    /// Client for crawling: follows redirects (the caller re-checks scope
    /// on the final URL).
    pub fn new(timeout_secs: u64, max_retries: u32) -> Result<Self> {
        Self::build(timeout_secs, max_retries, reqwest::redirect::Policy::limited(5))
    }

    /// Client for attack requests: never follows redirects so the scanner
    /// can inspect Location headers before anything leaves scope.
    pub fn new_no_redirect(timeout_secs: u64) -> Result<Self> {
        Self::build(timeout_secs, 0, reqwest::redirect::Policy::none())
    }

    fn build(
        timeout_secs: u64,
        max_retries: u32,
        redirect: reqwest::redirect::Policy,
    ) -> Result<Self> {
        // Certificate validation is intentionally disabled: scan targets
        // routinely run self-signed or otherwise broken TLS.
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .danger_accept_invalid_certs(true)
            .redirect(redirect)
            .user_agent(USER_AGENT)
            .pool_max_idle_per_host(DEFAULT_POOL_IDLE_PER_HOST)
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .cookie_store(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client: Arc::new(client),
            timeout: Duration::from_secs(timeout_secs),
            max_retries,
        })
    }

    /// Request headers this client sends, for evidence records
    pub fn standard_headers(&self) -> Vec<(String, String)> {
        vec![("User-Agent".to_string(), USER_AGENT.to_string())]
    }

    pub async fn get(&self, url: &str) -> Result<HttpResponse, ScanError> {
        self.get_with_timeout(url, self.timeout).await
    }

    pub async fn get_with_timeout(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<HttpResponse, ScanError> {
        let mut attempts = 0;
        loop {
            let started = Instant::now();
            let result = self.client.get(url).timeout(timeout).send().await;

            match result {
                Ok(response) => return Self::read_response(response, started).await,
                Err(e) => {
                    attempts += 1;
                    let err = ScanError::from_request_error(e, url, timeout);
                    // Timeouts are never retried: for timing payloads the
                    // timeout itself is the signal.
                    if err.is_timeout() || attempts > self.max_retries {
                        return Err(err);
                    }
                    debug!("Retrying GET {} (attempt {}): {}", url, attempts, err);
                    tokio::time::sleep(Duration::from_millis(100 * attempts as u64)).await;
                }
            }
        }
    }

    /// POST a form-encoded body
    pub async fn post_form(
        &self,
        url: &str,
        body: &str,
        timeout: Duration,
    ) -> Result<HttpResponse, ScanError> {
        self.post_with_headers(
            url,
            body,
            &[(
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            )],
            timeout,
        )
        .await
    }

    pub async fn post_with_headers(
        &self,
        url: &str,
        body: &str,
        headers: &[(String, String)],
        timeout: Duration,
    ) -> Result<HttpResponse, ScanError> {
        let mut attempts = 0;
        loop {
            let mut request = self.client.post(url).timeout(timeout);
            for (key, value) in headers {
                request = request.header(key, value);
            }

            let started = Instant::now();
            match request.body(body.to_string()).send().await {
                Ok(response) => return Self::read_response(response, started).await,
                Err(e) => {
                    attempts += 1;
                    let err = ScanError::from_request_error(e, url, timeout);
                    if err.is_timeout() || attempts > self.max_retries {
                        return Err(err);
                    }
                    debug!("Retrying POST {} (attempt {}): {}", url, attempts, err);
                    tokio::time::sleep(Duration::from_millis(100 * attempts as u64)).await;
                }
            }
        }
    }

    async fn read_response(
        response: reqwest::Response,
        started: Instant,
    ) -> Result<HttpResponse, ScanError> {
        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();

        let mut headers = HashMap::with_capacity(response.headers().len());
        for (k, v) in response.headers().iter() {
            if let Ok(value) = v.to_str() {
                headers.insert(k.as_str().to_string(), value.to_string());
            }
        }

        let body_bytes = response.bytes().await.unwrap_or_default();
        let body = if body_bytes.len() > MAX_BODY_SIZE {
            String::from_utf8_lossy(&body_bytes[..MAX_BODY_SIZE]).to_string()
        } else {
            String::from_utf8_lossy(&body_bytes).to_string()
        };

        Ok(HttpResponse {
            status_code,
            body,
            headers,
            duration_ms: started.elapsed().as_millis() as u64,
            final_url,
        })
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: String,
    /// Header names are lowercase (hyper normalizes on receipt)
    pub headers: HashMap<String, String>,
    pub duration_ms: u64,
    /// URL after any redirects the client followed
    pub final_url: String,
}

impl HttpResponse {
    pub fn contains(&self, pattern: &str) -> bool {
        self.body.contains(pattern)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|v| v.as_str())
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.duration_ms as f64 / 1000.0
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self.status_code, 301 | 302 | 303 | 307 | 308)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with_header(name: &str, value: &str) -> HttpResponse {
        let mut headers = HashMap::new();
        headers.insert(name.to_string(), value.to_string());
        HttpResponse {
            status_code: 302,
            body: String::new(),
            headers,
            duration_ms: 12,
            final_url: "http://t.test/go".to_string(),
        }
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let resp = response_with_header("location", "http://evil.test/");
        assert_eq!(resp.header("Location"), Some("http://evil.test/"));
        assert_eq!(resp.header("LOCATION"), Some("http://evil.test/"));
    }

    #[test]
    fn test_redirect_statuses() {
        for code in [301u16, 302, 303, 307, 308] {
            let mut resp = response_with_header("location", "/next");
            resp.status_code = code;
            assert!(resp.is_redirect());
        }
        let mut resp = response_with_header("location", "/next");
        resp.status_code = 200;
        assert!(!resp.is_redirect());
    }
}
