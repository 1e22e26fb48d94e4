//! Activation addresses of the form `barcodekb://scan?mode=<single|multi>`.
//!
//! The keyboard opens one of these to bring the capture surface up in a given
//! mode. Anything with another scheme or host is not ours and parses to `None`.

use crate::model::ScanMode;
use serde::Serialize;
use url::Url;

pub const SCHEME: &str = "barcodekb";
pub const SCAN_HOST: &str = "scan";
pub const MODE_PARAM: &str = "mode";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activation {
    pub action: String,
    pub mode: ScanMode,
}

pub fn scan_address(mode: ScanMode) -> String {
    let base = format!("{}://{}", SCHEME, SCAN_HOST);
    match Url::parse(&base) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair(MODE_PARAM, mode.as_str());
            url.into()
        }
        Err(_) => format!("{}?{}={}", base, MODE_PARAM, mode.as_str()),
    }
}

/// Parse an activation address.
///
/// A missing or unrecognized `mode` falls back to `last_mode`, then to single.
/// Query values are percent-decoded.
pub fn parse(address: &str, last_mode: Option<ScanMode>) -> Option<Activation> {
    let url = Url::parse(address.trim()).ok()?;
    if url.scheme() != SCHEME {
        return None;
    }
    let host = url.host_str()?;
    if host != SCAN_HOST {
        return None;
    }

    // Only the first `mode` counts, as with any query-item lookup
    let mode = url
        .query_pairs()
        .find(|(name, _)| name.as_ref() == MODE_PARAM)
        .and_then(|(_, value)| value.parse::<ScanMode>().ok())
        .or(last_mode)
        .unwrap_or(ScanMode::Single);

    Some(Activation {
        action: host.to_string(),
        mode,
    })
}
