// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Luotain Event Sink
 * Streams log lines and structured scan events to a consumer
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::types::{Severity, Vulnerability};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

/// A structured event emitted during a scan. Lines are self-describing;
/// no total ordering across workers is guaranteed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScanEvent {
    Log {
        line: String,
    },
    ToolStarted {
        scan_id: String,
        tool: String,
        target: String,
    },
    ToolCompleted {
        scan_id: String,
        tool: String,
        status: String,
        findings_count: usize,
    },
    VulnerabilityFound {
        scan_id: String,
        vuln_type: String,
        severity: Severity,
        title: String,
        confidence: u8,
        url: String,
    },
}

/// Consumer-facing broadcast interface
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn send_log(&self, line: &str);

    async fn broadcast_tool_started(&self, scan_id: &str, tool: &str, target: &str);

    async fn broadcast_tool_completed(
        &self,
        scan_id: &str,
        tool: &str,
        status: &str,
        findings_count: usize,
    );

    async fn broadcast_vulnerability_found(&self, scan_id: &str, finding: &Vulnerability);
}

/// Sink backed by an unbounded channel; the receiving side belongs to the
/// embedding application (UI bridge, websocket fan-out, ...).
pub struct ChannelEventSink {
    tx: mpsc::UnboundedSender<ScanEvent>,
}

impl ChannelEventSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ScanEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl EventSink for ChannelEventSink {
    async fn send_log(&self, line: &str) {
        info!("{}", line);
        let _ = self.tx.send(ScanEvent::Log {
            line: line.to_string(),
        });
    }

    async fn broadcast_tool_started(&self, scan_id: &str, tool: &str, target: &str) {
        let _ = self.tx.send(ScanEvent::ToolStarted {
            scan_id: scan_id.to_string(),
            tool: tool.to_string(),
            target: target.to_string(),
        });
    }

    async fn broadcast_tool_completed(
        &self,
        scan_id: &str,
        tool: &str,
        status: &str,
        findings_count: usize,
    ) {
        let _ = self.tx.send(ScanEvent::ToolCompleted {
            scan_id: scan_id.to_string(),
            tool: tool.to_string(),
            status: status.to_string(),
            findings_count,
        });
    }

    async fn broadcast_vulnerability_found(&self, scan_id: &str, finding: &Vulnerability) {
        let _ = self.tx.send(ScanEvent::VulnerabilityFound {
            scan_id: scan_id.to_string(),
            vuln_type: finding.vuln_type.clone(),
            severity: finding.severity,
            title: finding.title.clone(),
            confidence: finding.confidence,
            url: finding.url.clone(),
        });
    }
}

/// Discards everything; used by tests that only care about return values
#[derive(Default)]
pub struct NullEventSink;

#[async_trait]
impl EventSink for NullEventSink {
    async fn send_log(&self, _line: &str) {}

    async fn broadcast_tool_started(&self, _scan_id: &str, _tool: &str, _target: &str) {}

    async fn broadcast_tool_completed(
        &self,
        _scan_id: &str,
        _tool: &str,
        _status: &str,
        _findings_count: usize,
    ) {
    }

    async fn broadcast_vulnerability_found(&self, _scan_id: &str, _finding: &Vulnerability) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_sink_delivers_events() {
        let (sink, mut rx) = ChannelEventSink::new();

        sink.send_log("[Crawler] starting").await;
        sink.broadcast_tool_started("scan1", "Crawler", "http://t.test").await;
        sink.broadcast_tool_completed("scan1", "Crawler", "success", 3).await;

        match rx.recv().await.unwrap() {
            ScanEvent::Log { line } => assert_eq!(line, "[Crawler] starting"),
            other => panic!("unexpected event: {:?}", other),
        }
        match rx.recv().await.unwrap() {
            ScanEvent::ToolStarted { tool, .. } => assert_eq!(tool, "Crawler"),
            other => panic!("unexpected event: {:?}", other),
        }
        match rx.recv().await.unwrap() {
            ScanEvent::ToolCompleted { findings_count, .. } => assert_eq!(findings_count, 3),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_survives_dropped_receiver() {
        let (sink, rx) = ChannelEventSink::new();
        drop(rx);
        // Must not panic or error out the scan
        sink.send_log("receiver is gone").await;
    }
}
