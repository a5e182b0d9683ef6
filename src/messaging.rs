//! Stats Store Protocol transport.
//!
//! Foreground contexts talk to the stats owner through [`StatsClient`].
//! Every request travels in an [`Envelope`] together with a [`Reply`]
//! handle; the owner answers by consuming that handle, so each request is
//! answered at most once and the requester's future stays pending until
//! then.
//!
//! Wire shapes (JSON):
//!
//! | Request                          | Response                       |
//! |----------------------------------|--------------------------------|
//! | `{"kind":"get"}`                 | `{"record": {...} \| null}`    |
//! | `{"kind":"set","record":{...}}`  | `{"success": bool}`            |
//!
//! Either response may carry `"error": "read" | "write" | "corrupt"` when
//! storage degraded.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::types::errors::{MessagingError, StorageErrorKind};
use crate::types::stats::StatsRecord;

/// Default depth of the request queue in front of the stats owner.
pub const DEFAULT_QUEUE_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StatsRequest {
    Get,
    Set { record: StatsRecord },
}

/// Reply to a [`StatsRequest`].
///
/// `Ack` is listed first so that untagged decoding does not read
/// `{"success":..}` as a record reply with a missing record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatsResponse {
    Ack {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<StorageErrorKind>,
    },
    Record {
        record: Option<StatsRecord>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<StorageErrorKind>,
    },
}

impl StatsResponse {
    pub fn record(record: Option<StatsRecord>) -> Self {
        StatsResponse::Record {
            record,
            error: None,
        }
    }

    pub fn ack(success: bool) -> Self {
        StatsResponse::Ack {
            success,
            error: None,
        }
    }

    pub fn error_kind(&self) -> Option<StorageErrorKind> {
        match self {
            StatsResponse::Ack { error, .. } | StatsResponse::Record { error, .. } => *error,
        }
    }
}

/// One-shot reply handle. Consumed on use.
#[derive(Debug)]
pub struct Reply(oneshot::Sender<StatsResponse>);

impl Reply {
    pub fn resolve(self, response: StatsResponse) {
        if self.0.send(response).is_err() {
            debug!("stats requester went away before the reply");
        }
    }
}

/// A request paired with the handle that answers it.
#[derive(Debug)]
pub struct Envelope {
    pub request: StatsRequest,
    pub reply: Reply,
}

/// Creates the queue between foreground requesters and the stats owner.
pub fn stats_channel(depth: usize) -> (StatsClient, mpsc::Receiver<Envelope>) {
    let (tx, rx) = mpsc::channel(depth);
    (StatsClient { tx }, rx)
}

/// Requester side of the protocol. Cheap to clone; one per foreground view.
#[derive(Debug, Clone)]
pub struct StatsClient {
    tx: mpsc::Sender<Envelope>,
}

impl StatsClient {
    /// Sends `request` and waits for the owner's reply.
    pub async fn request(&self, request: StatsRequest) -> Result<StatsResponse, MessagingError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Envelope {
                request,
                reply: Reply(reply_tx),
            })
            .await
            .map_err(|_| MessagingError::ServiceClosed)?;
        reply_rx.await.map_err(|_| MessagingError::ReplyDropped)
    }

    /// Reads the stored record. Storage failures read as `None`.
    pub async fn get(&self) -> Result<Option<StatsRecord>, MessagingError> {
        match self.request(StatsRequest::Get).await? {
            StatsResponse::Record { record, .. } => Ok(record),
            other => Err(MessagingError::UnexpectedReply(format!("{:?}", other))),
        }
    }

    /// Overwrites the stored record. Returns the owner's `success` flag.
    pub async fn set(&self, record: StatsRecord) -> Result<bool, MessagingError> {
        match self.request(StatsRequest::Set { record }).await? {
            StatsResponse::Ack { success, .. } => Ok(success),
            other => Err(MessagingError::UnexpectedReply(format!("{:?}", other))),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
