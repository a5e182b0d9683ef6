//! Navigation Interceptor for X Eyes.
//!
//! Sees every navigation attempt the host reports, decides synchronously
//! whether to cancel it, and for cancelled status navigations sends the
//! tab to the internal viewer on a spawned task.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::host::TabNavigator;
use crate::managers::redirect_guard::{Generation, RedirectGuardTrait};
use crate::services::url_matcher::{build_viewer_url, match_status};
use crate::types::navigation::{
    BlockingResponse, FrameKind, NavigationEvent, PassReason, RedirectOutcome,
};
use crate::types::settings::RedirectSettings;

/// Verdict for one navigation event.
#[derive(Debug)]
pub enum Decision {
    /// Let the navigation proceed.
    Pass(PassReason),
    /// The navigation is cancelled. `redirect` is `None` when there is no
    /// addressable tab or the redirect could not be started.
    Cancel { redirect: Option<PendingRedirect> },
}

impl Decision {
    pub fn is_cancel(&self) -> bool {
        matches!(self, Decision::Cancel { .. })
    }

    pub fn blocking_response(&self) -> BlockingResponse {
        BlockingResponse {
            cancel: self.is_cancel(),
        }
    }

    pub fn pass_reason(&self) -> Option<PassReason> {
        match self {
            Decision::Pass(reason) => Some(*reason),
            Decision::Cancel { .. } => None,
        }
    }

    pub fn into_redirect(self) -> Option<PendingRedirect> {
        match self {
            Decision::Cancel { redirect } => redirect,
            Decision::Pass(_) => None,
        }
    }
}

/// A replacement navigation in flight.
#[derive(Debug)]
pub struct PendingRedirect {
    pub tab_id: i64,
    pub viewer_url: String,
    /// Token the host hands back when it reports the redirect settled.
    pub generation: Generation,
    handle: JoinHandle<RedirectOutcome>,
}

impl PendingRedirect {
    /// Waits for the host to settle the replacement navigation.
    pub async fn outcome(self) -> RedirectOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => RedirectOutcome::Failed(e.to_string()),
        }
    }
}

/// Trait defining the interceptor entry points the host calls.
pub trait NavigationInterceptorTrait {
    fn on_before_navigate(&self, event: &NavigationEvent) -> Decision;
    /// The host reports the tab finished (or abandoned) its redirect.
    /// With `redirect` set, only that redirect's tracking is ended; a late
    /// report for an earlier redirect leaves a newer one in place.
    fn on_redirect_settled(&self, tab_id: i64, redirect: Option<Generation>) -> bool;
}

pub struct NavigationInterceptor<G, N> {
    guard: G,
    navigator: Arc<N>,
    settings: RedirectSettings,
}

impl<G, N> NavigationInterceptor<G, N>
where
    G: RedirectGuardTrait,
    N: TabNavigator,
{
    pub fn new(guard: G, navigator: Arc<N>, settings: RedirectSettings) -> Self {
        Self {
            guard,
            navigator,
            settings,
        }
    }

    pub fn guard(&self) -> &G {
        &self.guard
    }

    pub fn settings(&self) -> &RedirectSettings {
        &self.settings
    }

    pub fn update_settings(&mut self, settings: RedirectSettings) {
        self.settings = settings;
    }

    pub fn viewer_url_for(&self, original: &str) -> String {
        build_viewer_url(&self.settings.viewer_url, &self.settings.url_param, original)
    }

    /// Issues the replacement navigation on the current runtime.
    fn start_redirect(&self, tab_id: i64, viewer_url: String) -> Option<PendingRedirect> {
        let Some(generation) = self.guard.mark_redirecting(tab_id) else {
            return None;
        };

        let Ok(runtime) = Handle::try_current() else {
            warn!(tab_id, "no runtime to issue redirect, leaving tab in place");
            self.guard.clear_generation(tab_id, generation);
            return None;
        };

        let guard = self.guard.clone();
        let navigator = Arc::clone(&self.navigator);
        let settle = Duration::from_millis(self.settings.settle_ms);
        let target = viewer_url.clone();

        let handle = runtime.spawn(async move {
            match navigator.navigate_tab(tab_id, &target, generation).await {
                Ok(()) => {
                    debug!(tab_id, "redirect landed");
                    guard.schedule_clear(tab_id, generation, settle);
                    RedirectOutcome::Landed
                }
                Err(e) => {
                    warn!(tab_id, error = %e, "redirect navigation failed");
                    guard.clear_generation(tab_id, generation);
                    RedirectOutcome::Failed(e.to_string())
                }
            }
        });

        Some(PendingRedirect {
            tab_id,
            viewer_url,
            generation,
            handle,
        })
    }
}

impl<G, N> NavigationInterceptorTrait for NavigationInterceptor<G, N>
where
    G: RedirectGuardTrait,
    N: TabNavigator,
{
    fn on_before_navigate(&self, event: &NavigationEvent) -> Decision {
        if !self.settings.enabled {
            return Decision::Pass(PassReason::Disabled);
        }
        if event.frame_kind != FrameKind::Main {
            return Decision::Pass(PassReason::SubFrame);
        }
        let Some(identity) = match_status(&event.url) else {
            return Decision::Pass(PassReason::NotStatusUrl);
        };
        if self.guard.should_suppress(event.tab_id) {
            debug!(tab_id = event.tab_id, "tab is redirecting, letting navigation through");
            return Decision::Pass(PassReason::Suppressed);
        }

        let viewer_url = self.viewer_url_for(&event.url);
        info!(
            tab_id = event.tab_id,
            handle = %identity.handle,
            status_id = %identity.status_id,
            "intercepted status navigation"
        );

        if !event.has_tab() {
            return Decision::Cancel { redirect: None };
        }
        Decision::Cancel {
            redirect: self.start_redirect(event.tab_id, viewer_url),
        }
    }

    fn on_redirect_settled(&self, tab_id: i64, redirect: Option<Generation>) -> bool {
        match redirect {
            Some(generation) => {
                let cleared = self.guard.clear_generation(tab_id, generation);
                if !cleared {
                    debug!(tab_id, ?generation, "stale settle report ignored");
                }
                cleared
            }
            None => {
                let tracked = self.guard.should_suppress(tab_id);
                self.guard.clear(tab_id);
                tracked
            }
        }
    }
}
