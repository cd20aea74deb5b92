use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::element_finder::extract_entries;
use crate::models::{NormalizedEntry, PriceOrigin, SeenRecord, WatchDefinition, evaluate};
use crate::plugins::traits::{NotificationMessage, NotifierPlugin};
use crate::plugins::trackers::PriceTracker;
use crate::scraper::PageFetcher;
use crate::store::SeenStore;

/// Stage at which a watch was abandoned for the cycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WatchStage {
    Fetching,
    Extracting,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchRunReport {
    pub watch: String,
    pub success: bool,
    pub failed_at: Option<WatchStage>,
    pub entries_found: usize,
    /// Entries without a parseable price.
    pub discarded: usize,
    pub already_seen: usize,
    /// Entries that missed a threshold.
    pub rejected: usize,
    pub notifications_sent: usize,
    pub notification_failures: usize,
    pub error: Option<String>,
    pub total_time_ms: u64,
}

impl WatchRunReport {
    fn new(watch: &WatchDefinition) -> Self {
        Self {
            watch: watch.label().to_string(),
            success: true,
            failed_at: None,
            entries_found: 0,
            discarded: 0,
            already_seen: 0,
            rejected: 0,
            notifications_sent: 0,
            notification_failures: 0,
            error: None,
            total_time_ms: 0,
        }
    }

    fn fail(&mut self, stage: WatchStage, error: String) {
        self.success = false;
        self.failed_at = Some(stage);
        self.error = Some(error);
    }
}

enum EntryOutcome {
    AlreadySeen,
    Rejected,
    Notified,
    Failed,
}

/// Runs one watch through fetch, extraction and per-entry handling.
pub struct WatchRunner {
    fetcher: Arc<dyn PageFetcher>,
    notifier: Arc<dyn NotifierPlugin>,
    store: Arc<dyn SeenStore>,
    prices: PriceTracker,
    pacing: Duration,
}

impl WatchRunner {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        notifier: Arc<dyn NotifierPlugin>,
        store: Arc<dyn SeenStore>,
    ) -> Self {
        Self {
            fetcher,
            notifier,
            store,
            prices: PriceTracker::new(),
            pacing: Duration::from_secs(1),
        }
    }

    /// Pause after each delivered notification.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Process one watch for this cycle. Never fails: problems end up in the
    /// report and the log.
    pub async fn run_watch(&self, watch: &WatchDefinition) -> WatchRunReport {
        let start_time = Instant::now();
        let mut report = WatchRunReport::new(watch);

        debug!(watch = %report.watch, url = %watch.url, "Fetching");
        let markup = match self.fetcher.fetch(&watch.url).await {
            Ok(markup) => markup,
            Err(e) => {
                warn!(watch = %report.watch, url = %watch.url, error = %e, "Fetch failed, skipping watch this cycle");
                report.fail(WatchStage::Fetching, e.to_string());
                report.total_time_ms = start_time.elapsed().as_millis() as u64;
                return report;
            }
        };

        let entries = match extract_entries(&markup, watch, &self.prices) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(watch = %report.watch, error = %e, "Extraction failed, skipping watch this cycle");
                report.fail(WatchStage::Extracting, e.to_string());
                report.total_time_ms = start_time.elapsed().as_millis() as u64;
                return report;
            }
        };
        report.entries_found = entries.len();

        for raw in entries {
            if raw.price_origin == PriceOrigin::TextScan {
                debug!(watch = %report.watch, title = %raw.title, "Price taken from item text scan");
            }

            let Some(entry) = raw.normalize(&self.prices) else {
                report.discarded += 1;
                continue;
            };

            match self.process_entry(watch, entry).await {
                EntryOutcome::AlreadySeen => report.already_seen += 1,
                EntryOutcome::Rejected => report.rejected += 1,
                EntryOutcome::Failed => report.notification_failures += 1,
                EntryOutcome::Notified => {
                    report.notifications_sent += 1;
                    if !self.pacing.is_zero() {
                        tokio::time::sleep(self.pacing).await;
                    }
                }
            }
        }

        report.total_time_ms = start_time.elapsed().as_millis() as u64;
        info!(
            watch = %report.watch,
            found = report.entries_found,
            notified = report.notifications_sent,
            seen = report.already_seen,
            rejected = report.rejected,
            discarded = report.discarded,
            "Watch checked"
        );
        report
    }

    async fn process_entry(&self, watch: &WatchDefinition, entry: NormalizedEntry) -> EntryOutcome {
        let identity = entry.identity();

        match self.store.is_seen(&identity).await {
            Ok(true) => return EntryOutcome::AlreadySeen,
            Ok(false) => {}
            Err(e) => {
                error!(watch = %watch.label(), identity = %identity, error = %e, "Seen lookup failed");
                return EntryOutcome::Failed;
            }
        }

        let evaluation = evaluate(&entry, watch);
        if !evaluation.passed() {
            return EntryOutcome::Rejected;
        }

        let record = SeenRecord::new(&entry, Utc::now());
        let message = NotificationMessage::for_entry(&entry, watch, &evaluation, record.notified_at);

        if let Err(e) = self.notifier.notify(&message).await {
            error!(
                watch = %watch.label(),
                notifier = self.notifier.name(),
                identity = %identity,
                error = %e,
                "Notification failed, entry will be retried next cycle"
            );
            return EntryOutcome::Failed;
        }
        info!(watch = %watch.label(), title = %entry.title, price = entry.price, link = %entry.link, "Notification sent");

        // Delivered; a persistence failure here must not count as undelivered.
        if let Err(e) = self.store.record(identity.clone(), record).await {
            error!(identity = %identity, error = %e, "Failed to persist seen state");
        }

        EntryOutcome::Notified
    }
}
