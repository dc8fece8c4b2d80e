//! Debugbar Common - Shared stream types for the toolbar client
//!
//! This crate contains the `new_request` payload types, the event stream
//! parser and the constants (cookie names, endpoint paths) shared by every
//! consumer of the debug toolbar.

pub mod sse;

use serde::Deserialize;
use thiserror::Error;

pub use sse::{SseFrame, SseParser};

/// Protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected event type: {0}")]
    UnexpectedEvent(String),
}

/// Per-request details as reported by the toolbar
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RequestDetails {
    /// HTTP method (GET, POST, etc.)
    pub method: String,

    /// Request path
    pub path: String,

    /// Host the request was addressed to
    #[serde(default)]
    pub host: String,

    /// URL scheme, `http` or `https`
    #[serde(default)]
    pub scheme: String,

    /// Response status code
    pub status_code: u16,
}

impl RequestDetails {
    /// Check whether the request came in over TLS
    pub fn is_secure(&self) -> bool {
        self.scheme.eq_ignore_ascii_case("https")
    }
}

/// One entry of a `new_request` batch
///
/// On the wire this is a `[request_id, details, active_marker]` triple.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "SummaryTriple")]
pub struct RequestSummary {
    pub request_id: String,
    pub details: RequestDetails,
    /// Styling marker, `"active"` for the request the page belongs to
    pub active_marker: String,
}

#[derive(Deserialize)]
struct SummaryTriple(String, RequestDetails, String);

impl From<SummaryTriple> for RequestSummary {
    fn from(SummaryTriple(request_id, details, active_marker): SummaryTriple) -> Self {
        Self {
            request_id,
            details,
            active_marker,
        }
    }
}

impl RequestSummary {
    /// Decode the JSON payload of a `new_request` event, keeping stream order
    pub fn decode_batch(data: &str) -> Result<Vec<Self>, ProtocolError> {
        Ok(serde_json::from_str(data)?)
    }
}

/// Decode a named event, rejecting anything but `new_request`
pub fn decode_new_request(event: &str, data: &str) -> Result<Vec<RequestSummary>, ProtocolError> {
    if event != constants::NEW_REQUEST_EVENT {
        return Err(ProtocolError::UnexpectedEvent(event.to_string()));
    }
    RequestSummary::decode_batch(data)
}

/// Constants shared with the toolbar
pub mod constants {
    /// Cookie holding the last panel the user selected
    pub const STICKY_PANEL_COOKIE: &str = "pdtb_sticky_panel_selected";

    /// Cookie holding the panels opted into persistent display
    pub const ACTIVE_PANELS_COOKIE: &str = "pdtb_active";

    /// Cookie set to `hide` while the toolbar is minimised
    pub const TOOLBAR_COOKIE: &str = "pdtb";

    /// Value stored in the toolbar cookie when hidden
    pub const TOOLBAR_HIDDEN_VALUE: &str = "hide";

    /// Separator for the active panels list
    pub const PANEL_LIST_DELIMITER: char = ',';

    /// Lifetime of persistent toolbar cookies, in days
    pub const COOKIE_LIFETIME_DAYS: i64 = 10;

    /// Event stream path, relative to the toolbar root
    pub const SSE_PATH: &str = "sse";

    /// Query parameter carrying the current request id
    pub const REQUEST_ID_PARAM: &str = "request_id";

    /// Event name announcing a refreshed request list
    pub const NEW_REQUEST_EVENT: &str = "new_request";

    /// Suffix of a panel's content region id
    pub const CONTENT_SUFFIX: &str = "-content";

    /// Delay before a hovered toolbar handle reveals the toolbar
    pub const HOVER_DELAY_MS: u64 = 1000;

    /// Default toolbar mount point
    pub const DEFAULT_ROOT_URL: &str = "http://localhost:6543/_debug_toolbar/";
}
