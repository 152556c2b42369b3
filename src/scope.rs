// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Luotain Scope Policy
 * Decides whether a URL is in-scope and crawlable, and owns the
 * canonical URL normalization used for deduplication
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::errors::ScanError;
use std::collections::HashSet;
use url::Url;

/// File extensions that never enter the crawl queue
const BLOCKED_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg", ".ico",
    ".css", ".js", ".woff", ".woff2", ".ttf", ".eot",
    ".mp4", ".mp3", ".avi", ".mov", ".wmv", ".flv",
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
    ".zip", ".rar", ".tar", ".gz", ".7z",
];

/// Common two-part public suffixes; everything else falls back to the
/// last two host labels.
const TWO_PART_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "ac.uk", "gov.uk", "com.au", "net.au", "org.au",
    "co.jp", "co.nz", "co.za", "com.br", "com.mx", "co.in", "com.cn",
];

/// Loopback and private IPv4 prefixes admitted by the policy
const PRIVATE_PREFIXES: &[&str] = &["127.", "10.", "172.", "192.168."];

/// Scope decision function derived from the scan target. Admits the target
/// host (with and without a `www.` prefix), any host sharing the target's
/// registered domain, relative URLs, and loopback/private IPv4 addresses.
#[derive(Debug, Clone)]
pub struct ScopePolicy {
    primary_domain: String,
    allowed_hosts: HashSet<String>,
}

impl ScopePolicy {
    /// Derive scope from the scan target. Fails on non-http schemes and
    /// host-less URLs; this is the only crawl-fatal validation.
    pub fn from_target(target: &str) -> Result<Self, ScanError> {
        let url = Url::parse(target).map_err(|e| ScanError::InvalidTarget {
            url: target.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ScanError::InvalidTarget {
                url: target.to_string(),
                reason: format!("disallowed scheme: {}", url.scheme()),
            });
        }

        let host = url
            .host_str()
            .ok_or_else(|| ScanError::InvalidTarget {
                url: target.to_string(),
                reason: "URL has no host".to_string(),
            })?
            .to_lowercase();

        let primary_domain = registered_domain(&host);

        let mut allowed_hosts = HashSet::new();
        allowed_hosts.insert(host.clone());
        allowed_hosts.insert(primary_domain.clone());
        if let Some(stripped) = host.strip_prefix("www.") {
            allowed_hosts.insert(stripped.to_string());
        } else {
            allowed_hosts.insert(format!("www.{}", host));
        }

        Ok(Self {
            primary_domain,
            allowed_hosts,
        })
    }

    /// Registered domain of the scan target
    pub fn primary_domain(&self) -> &str {
        &self.primary_domain
    }

    /// Scope check. Relative URLs are always in scope (they resolve
    /// against an in-scope base).
    pub fn is_in_scope(&self, url_str: &str) -> bool {
        let host = match Url::parse(url_str) {
            Ok(url) => match url.host_str() {
                Some(h) => h.to_lowercase(),
                None => return true,
            },
            Err(url::ParseError::RelativeUrlWithoutBase) => return true,
            Err(_) => return false,
        };

        if self.allowed_hosts.contains(&host) {
            return true;
        }

        // IPv4 literals: only loopback/private ranges are admitted
        if host.chars().all(|c| c.is_ascii_digit() || c == '.')
            && host.split('.').count() == 4
        {
            return PRIVATE_PREFIXES.iter().any(|p| host.starts_with(p));
        }

        registered_domain(&host) == self.primary_domain
    }

    /// Whether the URL's path carries a blocked (static asset) extension
    pub fn is_blocked_extension(url_str: &str) -> bool {
        let path = match Url::parse(url_str) {
            Ok(url) => url.path().to_lowercase(),
            Err(_) => url_str.to_lowercase(),
        };
        BLOCKED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
    }
}

/// Registered domain of a host: last two labels, or last three when the
/// host ends in a known two-part public suffix. IP literals are returned
/// unchanged.
pub fn registered_domain(host: &str) -> String {
    if host.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return host.to_string();
    }

    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() <= 2 {
        return labels.join(".");
    }

    let last_two = labels[labels.len() - 2..].join(".");
    if TWO_PART_SUFFIXES.contains(&last_two.as_str()) {
        labels[labels.len() - 3..].join(".")
    } else {
        last_two
    }
}

/// Canonical URL form: scheme + host + path + sorted query, no fragment,
/// no trailing slash except at the root. Idempotent, and the identity used
/// by every deduplication set.
pub fn normalize_url(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw).ok()?;
    url.host_str()?;

    url.set_fragment(None);

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        pairs.sort();
        let query = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        url.set_query(Some(&query));
    }

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    Some(url.to_string())
}

/// Strip the query string from a normalized URL (injection-point dedup key)
pub fn without_query(normalized: &str) -> String {
    match normalized.split_once('?') {
        Some((base, _)) => base.to_string(),
        None => normalized.to_string(),
    }
}

/// Resolve a possibly-relative URL against a base page URL
pub fn resolve_url(base: &str, relative: &str) -> String {
    if relative.starts_with("http://") || relative.starts_with("https://") {
        return relative.to_string();
    }

    if let Ok(base_url) = Url::parse(base) {
        if let Ok(resolved) = base_url.join(relative) {
            return resolved.to_string();
        }
    }

    relative.to_string()
}
