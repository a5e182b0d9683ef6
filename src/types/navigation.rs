use serde::{Deserialize, Serialize};

/// Tab id the host uses for navigations with no real tab behind them
/// (prerender, speculative loads).
pub const NO_TAB: i64 = -1;

/// Which frame of a tab a navigation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    #[serde(alias = "main_frame")]
    Main,
    #[serde(alias = "sub_frame")]
    Sub,
}

/// One navigation attempt as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEvent {
    pub url: String,
    pub tab_id: i64,
    pub frame_kind: FrameKind,
}

impl NavigationEvent {
    pub fn main_frame(url: impl Into<String>, tab_id: i64) -> Self {
        Self {
            url: url.into(),
            tab_id,
            frame_kind: FrameKind::Main,
        }
    }

    pub fn sub_frame(url: impl Into<String>, tab_id: i64) -> Self {
        Self {
            url: url.into(),
            tab_id,
            frame_kind: FrameKind::Sub,
        }
    }

    /// Whether the host can address this navigation's tab.
    pub fn has_tab(&self) -> bool {
        self.tab_id != NO_TAB
    }
}

/// Why a navigation was allowed to proceed untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassReason {
    Disabled,
    SubFrame,
    NotStatusUrl,
    /// The tab is inside its redirect-suppression window.
    Suppressed,
}

/// The synchronous verdict handed back to the host, serialized as
/// `{"cancel": bool}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingResponse {
    pub cancel: bool,
}

/// How an issued redirect ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// The host navigated the tab to the viewer.
    Landed,
    /// The host rejected the navigation; the tab stays where it was.
    Failed(String),
}
