use serde::{Deserialize, Serialize};

/// Top-level extension settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ExtensionSettings {
    pub redirect: RedirectSettings,
    pub storage: StorageSettings,
}

/// Controls how status navigations are intercepted and redirected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RedirectSettings {
    pub enabled: bool,
    /// Internal viewer page the original URL is handed to.
    pub viewer_url: String,
    /// Query parameter carrying the percent-encoded original URL.
    pub url_param: String,
    /// Upper bound on how long a tab stays tracked if nothing clears it.
    pub safety_net_ms: u64,
    /// Quiescence window kept after a redirect navigation succeeds.
    pub settle_ms: u64,
}

impl Default for RedirectSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            viewer_url: "moz-extension://x-eyes/src/viewer/x-eyes.html".to_string(),
            url_param: "url".to_string(),
            safety_net_ms: 1000,
            settle_ms: 1000,
        }
    }
}

/// Persistent storage settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageSettings {
    /// The single key holding the whole stats record.
    pub stats_key: String,
    /// SQLite file name, resolved inside the data directory.
    pub database_file: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            stats_key: "stats".to_string(),
            database_file: "xeyes.db".to_string(),
        }
    }
}
