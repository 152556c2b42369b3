// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Luotain Scan Controller
 * Top-level pipeline: crawl, scan, persist statistics, report
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::crawler::WebCrawler;
use crate::errors::ScanError;
use crate::events::EventSink;
use crate::evidence::EvidenceStore;
use crate::http_client::HttpClient;
use crate::scanners::ActiveScanner;
use crate::scope::ScopePolicy;
use crate::types::{ScanOptions, ScanResults, ScanStatus};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

const HTTP_TIMEOUT_SECS: u64 = 10;
const HTTP_RETRIES: u32 = 2;

pub struct ScanController {
    store: Arc<dyn EvidenceStore>,
    sink: Arc<dyn EventSink>,
    cancelled: Arc<RwLock<bool>>,
}

impl ScanController {
    pub fn new(store: Arc<dyn EvidenceStore>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            store,
            sink,
            cancelled: Arc::new(RwLock::new(false)),
        }
    }

    /// Shared cancellation flag; setting it stops new work at the next
    /// suspension point while in-flight requests drain.
    pub fn cancel_handle(&self) -> Arc<RwLock<bool>> {
        Arc::clone(&self.cancelled)
    }

    pub async fn cancel(&self) {
        *self.cancelled.write().await = true;
        info!("Scan cancellation requested");
    }

    /// Run the full pipeline against a target. Only an invalid target URL
    /// or cancellation abort the run; everything else degrades to events.
    pub async fn run_scan(
        &self,
        scan_id: &str,
        target_url: &str,
        options: &ScanOptions,
    ) -> Result<ScanResults, ScanError> {
        let scope = ScopePolicy::from_target(target_url)?;

        let started = chrono::Utc::now();
        let started_instant = std::time::Instant::now();

        // Wall-clock budget flips the shared cancellation flag
        let watchdog = options.max_duration().map(|budget| {
            let cancelled = Arc::clone(&self.cancelled);
            tokio::spawn(async move {
                tokio::time::sleep(budget).await;
                *cancelled.write().await = true;
                warn!("Wall-clock budget exhausted, cancelling scan");
            })
        });

        self.sink
            .send_log(&format!("[Controller] Starting scan {} of {}", scan_id, target_url))
            .await;

        // Phase 1: crawl
        let crawl_client = Arc::new(
            HttpClient::new(HTTP_TIMEOUT_SECS, HTTP_RETRIES).map_err(|e| ScanError::Connection {
                url: target_url.to_string(),
                reason: e.to_string(),
            })?,
        );

        self.sink
            .broadcast_tool_started(scan_id, "Crawler", target_url)
            .await;
        let crawler = WebCrawler::new(
            crawl_client,
            options.max_depth,
            options.max_pages,
            Arc::clone(&self.sink),
            Arc::clone(&self.cancelled),
        );
        let report = crawler.crawl(target_url, options.enable_dynamic).await?;
        self.sink
            .broadcast_tool_completed(scan_id, "Crawler", "success", report.crawled_urls.len())
            .await;

        // Phase 2: active scan
        let attack_client = Arc::new(HttpClient::new_no_redirect(HTTP_TIMEOUT_SECS).map_err(|e| {
            ScanError::Connection {
                url: target_url.to_string(),
                reason: e.to_string(),
            }
        })?);

        self.sink
            .broadcast_tool_started(scan_id, "Active Scanner", target_url)
            .await;
        let scanner = ActiveScanner::new(
            scan_id,
            target_url,
            attack_client,
            scope,
            Arc::clone(&self.store),
            Arc::clone(&self.sink),
            Arc::clone(&self.cancelled),
        );
        let vulnerabilities = scanner.scan(&report).await?;
        self.sink
            .broadcast_tool_completed(scan_id, "Active Scanner", "success", vulnerabilities.len())
            .await;

        // Phase 3: statistics. Persistence failures never abort the scan.
        let mut statistics = scanner.statistics();
        statistics.endpoints_discovered = report.crawled_urls.len() + report.api_endpoints.len();
        for attempt in 0..2 {
            match self
                .store
                .update_scan_statistics(scan_id, statistics)
                .await
            {
                Ok(()) => break,
                Err(e) => warn!("Statistics write failed (attempt {}): {}", attempt + 1, e),
            }
        }

        if let Some(watchdog) = watchdog {
            watchdog.abort();
        }

        let was_cancelled = *self.cancelled.read().await;
        let completed = chrono::Utc::now();

        let results = ScanResults {
            scan_id: scan_id.to_string(),
            target: target_url.to_string(),
            status: if was_cancelled {
                ScanStatus::Cancelled
            } else {
                ScanStatus::Completed
            },
            tests_run: scanner.tests_completed(),
            endpoints_discovered: statistics.endpoints_discovered,
            vulnerabilities,
            started_at: started.to_rfc3339(),
            completed_at: completed.to_rfc3339(),
            duration_seconds: started_instant.elapsed().as_secs_f64(),
        };

        self.sink
            .send_log(&format!(
                "[Controller] Scan {} {}: {} tests, {} vulnerabilities",
                scan_id,
                if was_cancelled { "cancelled" } else { "complete" },
                results.tests_run,
                results.vulnerabilities.len()
            ))
            .await;

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullEventSink;
    use crate::evidence::MemoryEvidenceStore;

    #[tokio::test]
    async fn test_invalid_target_is_fatal() {
        let controller = ScanController::new(
            Arc::new(MemoryEvidenceStore::new()),
            Arc::new(NullEventSink),
        );

        let result = controller
            .run_scan("scan1", "ftp://example.com", &ScanOptions::default())
            .await;
        assert!(matches!(result, Err(ScanError::InvalidTarget { .. })));

        let result = controller
            .run_scan("scan2", "no scheme at all", &ScanOptions::default())
            .await;
        assert!(matches!(result, Err(ScanError::InvalidTarget { .. })));
    }

    #[tokio::test]
    async fn test_cancel_sets_shared_flag() {
        let controller = ScanController::new(
            Arc::new(MemoryEvidenceStore::new()),
            Arc::new(NullEventSink),
        );

        let handle = controller.cancel_handle();
        assert!(!*handle.read().await);
        controller.cancel().await;
        assert!(*handle.read().await);
    }
}
