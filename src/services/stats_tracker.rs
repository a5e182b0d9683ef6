//! Foreground stats tracker.
//!
//! Lives in the viewer's context, keeps the working copy of the stats
//! record, and pushes every change to the background owner through the
//! Stats Store Protocol. Failed round trips are logged and otherwise
//! ignored: the in-memory copy stays authoritative for this view.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::host::Clock;
use crate::messaging::{StatsClient, StatsRequest, StatsResponse};
use crate::types::stats::StatsRecord;

/// Trait defining the viewer-facing stats operations.
#[allow(async_fn_in_trait)]
pub trait StatsTrackerTrait {
    async fn load(&mut self) -> &StatsRecord;
    async fn record_view(&mut self) -> bool;
    async fn record_skip(&mut self) -> bool;
    async fn record_satisfaction(&mut self, satisfied: bool) -> bool;
    fn stats(&self) -> &StatsRecord;
    fn satisfaction_rate(&self) -> Option<f64>;
    fn is_loaded(&self) -> bool;
}

pub struct StatsTracker<C> {
    client: StatsClient,
    clock: Arc<C>,
    stats: StatsRecord,
    loaded: bool,
}

impl<C: Clock> StatsTracker<C> {
    pub fn new(client: StatsClient, clock: Arc<C>) -> Self {
        let stats = StatsRecord::new(clock.today());
        Self {
            client,
            clock,
            stats,
            loaded: false,
        }
    }

    /// Pushes the working copy to the owner. Returns whether it was stored.
    async fn save(&self) -> bool {
        match self
            .client
            .request(StatsRequest::Set {
                record: self.stats.clone(),
            })
            .await
        {
            Ok(StatsResponse::Ack { success: true, .. }) => true,
            Ok(response) => {
                warn!(error = ?response.error_kind(), "stats were not persisted");
                false
            }
            Err(e) => {
                warn!(error = %e, "failed to save stats");
                false
            }
        }
    }
}

impl<C: Clock> StatsTrackerTrait for StatsTracker<C> {
    /// Fetches the stored record and applies the daily rollover. Any
    /// failure leaves a fresh record dated today.
    async fn load(&mut self) -> &StatsRecord {
        let today = self.clock.today();
        match self.client.request(StatsRequest::Get).await {
            Ok(StatsResponse::Record {
                record: Some(stored),
                ..
            }) => {
                self.stats = stored;
                if self.stats.roll_over(today) {
                    info!(%today, "new day, daily stats reset");
                }
            }
            Ok(response) => {
                if let Some(kind) = response.error_kind() {
                    warn!(error = ?kind, "failed to load stats from storage");
                } else {
                    debug!("no stored stats yet");
                }
                self.stats = StatsRecord::new(today);
            }
            Err(e) => {
                warn!(error = %e, "failed to load stats from storage");
                self.stats = StatsRecord::new(today);
            }
        }
        self.loaded = true;
        &self.stats
    }

    async fn record_view(&mut self) -> bool {
        self.stats.record_view(self.clock.today());
        self.save().await
    }

    async fn record_skip(&mut self) -> bool {
        self.stats.record_skip(self.clock.today());
        self.save().await
    }

    async fn record_satisfaction(&mut self, satisfied: bool) -> bool {
        self.stats.record_satisfaction(satisfied);
        self.save().await
    }

    fn stats(&self) -> &StatsRecord {
        &self.stats
    }

    fn satisfaction_rate(&self) -> Option<f64> {
        self.stats.satisfaction_rate()
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }
}
