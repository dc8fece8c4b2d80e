//! Live list of recent requests, fed by the toolbar's event stream
//!
//! The controller owns at most one push subscription. Every `new_request`
//! event carries the full list, so rows are rebuilt from scratch each time.

use debugbar_common::{constants, decode_new_request, RequestSummary, SseFrame};
use reqwest::Url;
use std::sync::Arc;

/// Message delivered by a push subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushMessage {
    Frame(SseFrame),
    /// The stream ended; carries the error when it failed
    Closed(Option<String>),
}

/// A push message tagged with the connection it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushEvent {
    pub connection: u64,
    pub message: PushMessage,
}

/// Callback a push channel invokes for each message
pub type EventHandler = Box<dyn Fn(PushMessage) + Send + Sync>;

/// Where push events end up; usually forwards into the UI loop's channel
pub type EventSink = Arc<dyn Fn(PushEvent) + Send + Sync>;

/// Handle to one open push connection
pub trait Subscription: Send {
    fn close(&mut self);
    fn is_open(&self) -> bool;
}

/// A one-way server push transport
pub trait PushChannel: Send {
    fn open(&self, url: &str, handler: EventHandler) -> Box<dyn Subscription>;
}

/// One rendered line of the request list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRow {
    pub request_id: String,
    pub href: String,
    pub title: String,
    pub status: u16,
    pub method: String,
    pub secure: bool,
    pub path: String,
    pub host: String,
    /// Styling class, `active` for the current request
    pub class: String,
}

impl RequestRow {
    pub fn from_summary(root: &str, summary: &RequestSummary) -> Self {
        let details = &summary.details;
        Self {
            request_id: summary.request_id.clone(),
            href: format!("{}{}", root, summary.request_id),
            title: format!("{}{}", details.host, details.path),
            status: details.status_code,
            method: details.method.clone(),
            secure: details.is_secure(),
            path: details.path.clone(),
            host: details.host.clone(),
            class: summary.active_marker.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.class.split_whitespace().any(|c| c == "active")
    }
}

/// Hover text attached to a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub row: usize,
    pub text: String,
}

/// Connection state of the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// No push transport available; the list stays static
    Unsupported,
    Idle,
    Connected,
    Closed,
}

impl FeedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedStatus::Unsupported => "unsupported",
            FeedStatus::Idle => "idle",
            FeedStatus::Connected => "live",
            FeedStatus::Closed => "closed",
        }
    }
}

/// What handling an event did to the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedUpdate {
    /// Rows were replaced
    Replaced(usize),
    /// Event ignored (stale connection, other event type, bad payload)
    Ignored,
    /// The live connection ended
    Disconnected,
}

pub struct RequestFeedController {
    root: Url,
    request_id: String,
    channel: Option<Box<dyn PushChannel>>,
    sink: EventSink,
    subscription: Option<Box<dyn Subscription>>,
    connection: u64,
    status: FeedStatus,
    rows: Vec<RequestRow>,
    tooltips: Vec<Tooltip>,
}

impl RequestFeedController {
    /// `channel` is `None` when the runtime cannot do server push
    pub fn new(
        root: Url,
        request_id: String,
        channel: Option<Box<dyn PushChannel>>,
        sink: EventSink,
    ) -> Self {
        let status = if channel.is_some() {
            FeedStatus::Idle
        } else {
            FeedStatus::Unsupported
        };

        Self {
            root,
            request_id,
            channel,
            sink,
            subscription: None,
            connection: 0,
            status,
            rows: Vec::new(),
            tooltips: Vec::new(),
        }
    }

    /// Endpoint for this page's event stream
    pub fn feed_url(&self) -> String {
        let mut url = self.root.clone();
        let path = format!("{}{}", url.path(), constants::SSE_PATH);
        url.set_path(&path);
        url.query_pairs_mut()
            .clear()
            .append_pair(constants::REQUEST_ID_PARAM, &self.request_id);
        url.to_string()
    }

    /// (Re)open the push connection, closing any live one first
    pub fn connect(&mut self) -> bool {
        let Some(channel) = &self.channel else {
            tracing::debug!("Server push unavailable, request list stays static");
            return false;
        };

        if let Some(mut previous) = self.subscription.take() {
            previous.close();
        }

        self.connection += 1;
        let connection = self.connection;
        let sink = Arc::clone(&self.sink);
        let handler: EventHandler = Box::new(move |message: PushMessage| {
            sink(PushEvent {
                connection,
                message,
            })
        });

        let url = self.feed_url();
        tracing::debug!("Opening request feed {} (connection {})", url, connection);
        self.subscription = Some(channel.open(&url, handler));
        self.status = FeedStatus::Connected;
        true
    }

    /// Close the live connection, if any
    pub fn disconnect(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.close();
            self.status = FeedStatus::Closed;
        }
    }

    /// Whether a connection is currently open
    pub fn is_connected(&self) -> bool {
        self.subscription.as_ref().is_some_and(|s| s.is_open())
    }

    pub fn status(&self) -> FeedStatus {
        self.status
    }

    pub fn rows(&self) -> &[RequestRow] {
        &self.rows
    }

    pub fn tooltips(&self) -> &[Tooltip] {
        &self.tooltips
    }

    pub fn root(&self) -> &str {
        self.root.as_str()
    }

    /// Apply one push event
    pub fn handle_event(&mut self, event: PushEvent) -> FeedUpdate {
        if event.connection != self.connection || self.subscription.is_none() {
            return FeedUpdate::Ignored;
        }

        match event.message {
            PushMessage::Frame(frame) => self.handle_frame(&frame),
            PushMessage::Closed(error) => {
                match error {
                    Some(e) => tracing::warn!("Request feed closed: {}", e),
                    None => tracing::debug!("Request feed ended"),
                }
                self.subscription = None;
                self.status = FeedStatus::Closed;
                FeedUpdate::Disconnected
            }
        }
    }

    fn handle_frame(&mut self, frame: &SseFrame) -> FeedUpdate {
        if frame.event != constants::NEW_REQUEST_EVENT {
            return FeedUpdate::Ignored;
        }

        match decode_new_request(&frame.event, &frame.data) {
            Ok(batch) => {
                self.replace_rows(&batch);
                FeedUpdate::Replaced(self.rows.len())
            }
            Err(e) => {
                tracing::warn!("Dropping malformed {} event: {}", frame.event, e);
                FeedUpdate::Ignored
            }
        }
    }

    /// Replace the whole list and re-attach tooltips to the new rows
    pub fn replace_rows(&mut self, batch: &[RequestSummary]) {
        self.tooltips.clear();
        let root = self.root.as_str();
        self.rows = batch
            .iter()
            .map(|summary| RequestRow::from_summary(root, summary))
            .collect();
        self.attach_tooltips();
    }

    fn attach_tooltips(&mut self) {
        self.tooltips = self
            .rows
            .iter()
            .enumerate()
            .map(|(row, r)| Tooltip {
                row,
                text: r.title.clone(),
            })
            .collect();
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render rows as the toolbar's request list markup
pub fn render_html(rows: &[RequestRow]) -> String {
    let mut html = String::from("<li><h4>Requests</h4></li>");

    for row in rows {
        html.push_str(&format!(
            "<li class=\"{}\"><a href=\"{}\" title=\"{}\">",
            html_escape(&row.class),
            html_escape(&row.href),
            html_escape(&row.title)
        ));
        html.push_str(&format!(
            "<span class=\"badge pull-right _{status}\">{status}</span>",
            status = row.status
        ));
        html.push_str(&html_escape(&row.method));
        if row.secure {
            html.push_str(
                "&nbsp;<span class=\"badge\"><span class=\"glyphicon glyphicon-lock\" aria-hidden=\"true\"></span></span>",
            );
        }
        html.push_str("<br>");
        html.push_str(&html_escape(&row.path));
        html.push_str("</a></li>");
    }

    html
}
