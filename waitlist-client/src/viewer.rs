//! Polling live-waitlist viewer.
//!
//! Initial fetch plus a fixed-interval schedule plus manual refresh. Each
//! successful poll is diffed against the previous snapshot so freshly
//! appeared names can get a distinct treatment. A failed poll surfaces an
//! error state but never stops the schedule.

use std::collections::HashSet;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::api::ApiClient;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryView {
    pub name: String,
    pub is_new: bool,
}

pub struct LiveWaitlistViewer {
    api: ApiClient,
    entries: Vec<EntryView>,
    error: Option<String>,
    has_loaded: bool,
}

impl LiveWaitlistViewer {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            entries: Vec::new(),
            error: None,
            has_loaded: false,
        }
    }

    pub fn entries(&self) -> &[EntryView] {
        &self.entries
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// One poll of the listing. On success the snapshot is replaced and
    /// names absent from the previous snapshot are flagged; the initial
    /// load flags nothing. On failure the previous snapshot is kept and
    /// the error becomes visible until the next successful poll.
    pub async fn poll_once(&mut self) {
        match self.api.fetch_names().await {
            Ok(names) => {
                let known: HashSet<String> =
                    self.entries.iter().map(|e| e.name.clone()).collect();
                let has_loaded = self.has_loaded;

                self.entries = names
                    .into_iter()
                    .map(|name| {
                        let is_new = has_loaded && !known.contains(&name);
                        EntryView { name, is_new }
                    })
                    .collect();
                self.error = None;
                self.has_loaded = true;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Waitlist poll failed");
                self.error = Some(format!("Failed to fetch waitlist: {}", e));
            }
        }
    }

    /// Manual refresh, same as a scheduled poll.
    pub async fn refresh(&mut self) {
        self.poll_once().await;
    }

    /// Initial fetch plus the fixed-interval schedule, until cancelled.
    /// Cancellation stops the timer; an in-flight poll is not aborted.
    pub async fn run(&mut self, period: Duration, shutdown: CancellationToken) {
        self.poll_once().await;

        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        interval.tick().await; // the immediate first tick

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => self.poll_once().await,
            }
        }
    }
}
