//! RPC method handler for the X Eyes host bridge.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` dispatches JSON-RPC calls to the background [`App`].

use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::App;
use crate::host::TabNavigator;
use crate::managers::redirect_guard::Generation;
use crate::messaging::StatsRequest;
use crate::services::url_matcher::match_status;
use crate::types::navigation::NavigationEvent;
use crate::types::stats::StatsRecord;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettledParams {
    tab_id: i64,
    /// The `redirect` token of the `navigate` event being answered.
    #[serde(default)]
    redirect: Option<Generation>,
}

#[derive(Deserialize)]
struct RecordParams {
    record: StatsRecord,
}

fn parse<T: for<'de> Deserialize<'de>>(params: &Value) -> Result<T, String> {
    T::deserialize(params).map_err(|e| format!("invalid params: {}", e))
}

/// Dispatch a JSON-RPC method call.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub async fn handle_method<N: TabNavigator>(
    app: &mut App<N>,
    method: &str,
    params: &Value,
) -> Result<Value, String> {
    match method {
        // ─── Navigation ───
        "navigation.before" => {
            let event: NavigationEvent = parse(params)?;
            // The redirect task keeps running after its handle is dropped.
            let decision = app.on_before_navigate(&event);
            serde_json::to_value(decision.blocking_response()).map_err(|e| e.to_string())
        }
        "navigation.settled" => {
            let SettledParams { tab_id, redirect } = parse(params)?;
            let cleared = app.on_redirect_settled(tab_id, redirect);
            Ok(json!({"ok": true, "cleared": cleared}))
        }
        "status.match" => {
            let url = params.get("url").and_then(|v| v.as_str()).ok_or("missing url")?;
            Ok(match match_status(url) {
                Some(identity) => json!({
                    "handle": identity.handle,
                    "statusId": identity.status_id,
                    "apiUrl": identity.api_url(),
                    "viewerUrl": app.interceptor.viewer_url_for(url),
                }),
                None => Value::Null,
            })
        }

        // ─── Stats ───
        "stats.message" => {
            let request: StatsRequest = parse(params)?;
            stats_call(app, request).await
        }
        "stats.get" => stats_call(app, StatsRequest::Get).await,
        "stats.set" => {
            let RecordParams { record } = parse(params)?;
            stats_call(app, StatsRequest::Set { record }).await
        }

        // ─── Settings ───
        "settings.get" => {
            use crate::services::settings_engine::SettingsEngineTrait;
            serde_json::to_value(app.settings_engine.get_settings()).map_err(|e| e.to_string())
        }
        "settings.set" => {
            let key = params.get("key").and_then(|v| v.as_str()).ok_or("missing key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            app.set_setting(key, value).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Ping ───
        "ping" => Ok(json!({"pong": true})),

        _ => Err(format!("unknown method: {}", method)),
    }
}

async fn stats_call<N: TabNavigator>(app: &App<N>, request: StatsRequest) -> Result<Value, String> {
    let response = app
        .stats_client()
        .request(request)
        .await
        .map_err(|e| e.to_string())?;
    serde_json::to_value(response).map_err(|e| e.to_string())
}
