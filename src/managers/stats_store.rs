//! Background owner of the persisted stats record.
//!
//! Handles Stats Store Protocol requests one at a time, so an acknowledged
//! `set` is always visible to any `get` issued after it. Concurrent writers
//! are last-write-wins; records are replaced whole, never merged.

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::host::KeyValueStorage;
use crate::messaging::{stats_channel, Envelope, StatsClient, StatsRequest, StatsResponse};
use crate::types::errors::StorageError;
use crate::types::stats::StatsRecord;

pub struct StatsStore<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> StatsStore<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the stored record, `None` if nothing was ever written.
    pub async fn load(&self) -> Result<Option<StatsRecord>, StorageError> {
        let Some(raw) = self.storage.get(&self.key).await? else {
            return Ok(None);
        };
        serde_json::from_value(raw)
            .map(Some)
            .map_err(|e| StorageError::Corrupt(e.to_string()))
    }

    /// Replaces the stored record.
    pub async fn save(&self, record: &StatsRecord) -> Result<(), StorageError> {
        let value: Value =
            serde_json::to_value(record).map_err(|e| StorageError::Write(e.to_string()))?;
        self.storage.set(&self.key, value).await
    }

    /// Answers one request. Never fails: storage errors become
    /// `record: null` / `success: false` with the error kind attached.
    pub async fn handle(&self, request: StatsRequest) -> StatsResponse {
        match request {
            StatsRequest::Get => match self.load().await {
                Ok(record) => StatsResponse::record(record),
                Err(e) => {
                    warn!(error = %e, "failed to read stats");
                    StatsResponse::Record {
                        record: None,
                        error: Some(e.kind()),
                    }
                }
            },
            StatsRequest::Set { record } => match self.save(&record).await {
                Ok(()) => StatsResponse::ack(true),
                Err(e) => {
                    warn!(error = %e, "failed to write stats");
                    StatsResponse::Ack {
                        success: false,
                        error: Some(e.kind()),
                    }
                }
            },
        }
    }

    /// Serves requests until every [`StatsClient`] is dropped.
    pub async fn serve(self, mut inbox: mpsc::Receiver<Envelope>) {
        while let Some(Envelope { request, reply }) = inbox.recv().await {
            let response = self.handle(request).await;
            reply.resolve(response);
        }
        debug!("stats service stopped");
    }

    /// Starts the service on the current runtime and returns a client for it.
    pub fn spawn(self, depth: usize) -> (StatsClient, JoinHandle<()>) {
        let (client, inbox) = stats_channel(depth);
        let handle = tokio::spawn(self.serve(inbox));
        (client, handle)
    }
}
