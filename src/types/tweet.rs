use serde::{Deserialize, Serialize};

/// Upstream API the viewer fetches status content from.
pub const FXTWITTER_API_BASE: &str = "https://api.fxtwitter.com";

/// Canonical identity of a single status, derived from its URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetIdentity {
    pub handle: String,
    pub status_id: String,
}

impl TweetIdentity {
    /// Fetch target for this status on the upstream content API.
    pub fn api_url(&self) -> String {
        format!(
            "{}/{}/status/{}",
            FXTWITTER_API_BASE, self.handle, self.status_id
        )
    }
}

/// Failure categories of the viewer's content fetch. Nothing in this
/// crate performs the fetch; the type fixes the boundary contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchErrorKind {
    Network,
    Api,
    Parse,
}
