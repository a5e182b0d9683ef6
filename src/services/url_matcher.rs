//! Status URL matching and viewer link construction.
//!
//! Recognizes `http(s)://x.com/<handle>/status/<digits>` and its
//! `twitter.com` twin. Matching is anchored at the start of the URL and
//! only requires the status id to end at a path, query or fragment
//! boundary, so links the site decorates with `?s=20`, `/photo/1` or
//! `#m` still match.

use once_cell::sync::Lazy;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;

use crate::types::tweet::TweetIdentity;

static STATUS_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(?:x|twitter)\.com/([^/]+)/status/(\d+)(?:[/?#]|$)")
        .expect("status url pattern is valid")
});

/// Characters `encodeURIComponent` leaves alone; everything else is escaped.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Extracts the status identity from a navigation URL.
///
/// Returns `None` for anything that is not a status URL on a known host.
/// Never panics, whatever the input.
pub fn match_status(url: &str) -> Option<TweetIdentity> {
    let caps = STATUS_URL_RE.captures(url)?;
    Some(TweetIdentity {
        handle: caps.get(1)?.as_str().to_string(),
        status_id: caps.get(2)?.as_str().to_string(),
    })
}

/// Whether `url` is a status URL at all.
pub fn is_status_url(url: &str) -> bool {
    STATUS_URL_RE.is_match(url)
}

/// Builds the internal viewer URL carrying `original` as the single
/// `param` query value.
pub fn build_viewer_url(viewer_url: &str, param: &str, original: &str) -> String {
    let separator = if viewer_url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}{}={}",
        viewer_url,
        separator,
        param,
        utf8_percent_encode(original, URI_COMPONENT)
    )
}

/// Recovers the original status URL from a viewer URL built by
/// [`build_viewer_url`].
///
/// Returns `None` if `url` is not under `viewer_url`, lacks `param`, or the
/// value does not decode to UTF-8.
pub fn viewer_target(url: &str, viewer_url: &str, param: &str) -> Option<String> {
    let rest = url.strip_prefix(viewer_url)?;
    let query = rest.strip_prefix('?').or_else(|| {
        // The viewer URL may itself carry a query, in which case ours was appended with '&'.
        viewer_url.contains('?').then(|| rest.strip_prefix('&')).flatten()
    })?;
    let query = query.split('#').next().unwrap_or_default();
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == param)
        .and_then(|(_, value)| percent_decode_str(value).decode_utf8().ok())
        .map(|decoded| decoded.into_owned())
}
