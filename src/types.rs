// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Luotain Shared Types
 * Scan options, parameter model, findings and scan results
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::evidence::EvidenceId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options controlling a full scan pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOptions {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Enable headless-browser-assisted discovery
    #[serde(default)]
    pub enable_dynamic: bool,

    /// Optional wall-clock budget for the whole scan, in seconds
    #[serde(default)]
    pub max_duration_secs: Option<u64>,
}

fn default_max_depth() -> usize {
    5
}

fn default_max_pages() -> usize {
    500
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: 5,
            max_pages: 500,
            enable_dynamic: false,
            max_duration_secs: None,
        }
    }
}

impl ScanOptions {
    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::High => write!(f, "high"),
            Severity::Medium => write!(f, "medium"),
            Severity::Low => write!(f, "low"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Where a parameter was discovered on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParameterLocation {
    Query,
    FormHidden,
    FormVisible,
    DataAttribute,
}

/// Inferred shape of a parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Text,
    Number,
    Email,
    Password,
    Hidden,
    Identifier,
}

impl ParameterKind {
    /// Infer from an input element's declared type, falling back to
    /// name heuristics and value shape.
    pub fn infer(input_type: Option<&str>, name: &str, value: &str) -> Self {
        if let Some(t) = input_type {
            match t.to_lowercase().as_str() {
                "email" => return ParameterKind::Email,
                "number" => return ParameterKind::Number,
                "password" => return ParameterKind::Password,
                "hidden" => return ParameterKind::Hidden,
                _ => {}
            }
        }

        let name_lower = name.to_lowercase();
        if name_lower.contains("email") || name_lower.contains("e-mail") {
            ParameterKind::Email
        } else if name_lower.contains("pass") || name_lower.contains("pwd") {
            ParameterKind::Password
        } else if name_lower.contains("id") || name_lower.contains("key") {
            ParameterKind::Identifier
        } else if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
            ParameterKind::Number
        } else {
            ParameterKind::Text
        }
    }

    /// Placeholder value used when a form field has no preset value
    pub fn placeholder_value(&self) -> &'static str {
        match self {
            ParameterKind::Email => "test@example.com",
            ParameterKind::Number => "123",
            ParameterKind::Password => "test123",
            _ => "test",
        }
    }
}

/// A discovered injection parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    pub value: String,
    pub location: ParameterLocation,
    pub kind: ParameterKind,
}

impl Parameter {
    pub fn new(name: &str, value: &str, location: ParameterLocation, input_type: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            location,
            kind: ParameterKind::infer(input_type, name, value),
        }
    }

    /// Baseline value sent when exercising sibling parameters
    pub fn baseline_value(&self) -> String {
        if self.value.is_empty() {
            self.kind.placeholder_value().to_string()
        } else {
            self.value.clone()
        }
    }
}

/// A confirmed vulnerability finding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    pub id: String,
    #[serde(rename = "type")]
    pub vuln_type: String,
    pub title: String,
    pub severity: Severity,
    /// 0-100 detection confidence
    pub confidence: u8,
    pub url: String,
    pub method: String,
    pub parameter: Option<String>,
    pub payload: String,
    pub description: String,
    pub evidence: String,
    pub cwe: String,
    pub cvss: Option<f32>,
    pub poc: String,
    pub remediation: String,
    pub discovered_at: String,
    /// HTTP evidence records backing this finding
    #[serde(default)]
    pub evidence_ids: Vec<EvidenceId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Completed,
    Cancelled,
}

/// Final scan report returned by the controller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResults {
    pub scan_id: String,
    pub target: String,
    pub status: ScanStatus,
    pub tests_run: usize,
    pub endpoints_discovered: usize,
    pub vulnerabilities: Vec<Vulnerability>,
    pub started_at: String,
    pub completed_at: String,
    pub duration_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_kind_from_input_type() {
        assert_eq!(ParameterKind::infer(Some("email"), "x", ""), ParameterKind::Email);
        assert_eq!(ParameterKind::infer(Some("number"), "x", ""), ParameterKind::Number);
        assert_eq!(ParameterKind::infer(Some("hidden"), "csrf", "tok"), ParameterKind::Hidden);
        assert_eq!(ParameterKind::infer(Some("password"), "x", ""), ParameterKind::Password);
    }

    #[test]
    fn test_parameter_kind_from_name_heuristics() {
        assert_eq!(ParameterKind::infer(None, "user_email", ""), ParameterKind::Email);
        assert_eq!(ParameterKind::infer(None, "pwd", ""), ParameterKind::Password);
        assert_eq!(ParameterKind::infer(None, "user_id", ""), ParameterKind::Identifier);
        assert_eq!(ParameterKind::infer(None, "page", "42"), ParameterKind::Number);
        assert_eq!(ParameterKind::infer(None, "q", "hello"), ParameterKind::Text);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Low > Severity::Info);
    }
}
