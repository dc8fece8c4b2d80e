//! Print the live request list as it changes

use super::ToolbarOptions;
use crate::config::Config;
use crate::sse::SseChannel;
use crate::toolbar::{
    render_html, EventSink, FeedUpdate, PushEvent, RequestFeedController, RequestRow,
};
use anyhow::Result;
use console::style;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Output format for each list update
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FeedFormat {
    /// One line per request
    Text,
    /// The toolbar's request list markup
    Html,
}

/// Stream request list updates to stdout until the feed closes
pub async fn run(opts: ToolbarOptions, format: FeedFormat) -> Result<()> {
    let config = Config::load()?;
    let root = opts.root_url(&config)?;

    if opts.no_push {
        println!("Server push disabled; there is no live request list to follow.");
        return Ok(());
    }

    let (push_tx, mut push_rx) = mpsc::unbounded_channel::<PushEvent>();
    let sink: EventSink = Arc::new(move |event: PushEvent| {
        let _ = push_tx.send(event);
    });

    let channel = SseChannel::new()?;
    let mut feed = RequestFeedController::new(root, opts.request_id.clone(), Some(Box::new(channel)), sink);
    feed.connect();

    cliclack::log::info(format!("Following {}", style(feed.feed_url()).cyan()))?;

    loop {
        tokio::select! {
            Some(event) = push_rx.recv() => {
                match feed.handle_event(event) {
                    FeedUpdate::Replaced(_) => print_rows(feed.rows(), format),
                    FeedUpdate::Disconnected => {
                        cliclack::log::warning("Request feed closed")?;
                        return Ok(());
                    }
                    FeedUpdate::Ignored => {}
                }
            }

            _ = tokio::signal::ctrl_c() => {
                feed.disconnect();
                return Ok(());
            }
        }
    }
}

fn print_rows(rows: &[RequestRow], format: FeedFormat) {
    match format {
        FeedFormat::Html => println!("{}", render_html(rows)),
        FeedFormat::Text => {
            println!("{}", style(format!("── {} requests ──", rows.len())).dim());
            for row in rows {
                println!("{}", format_row(row));
            }
        }
    }
}

fn format_row(row: &RequestRow) -> String {
    let status = match row.status {
        500..=u16::MAX => style(row.status).red(),
        400..=499 => style(row.status).yellow(),
        300..=399 => style(row.status).cyan(),
        _ => style(row.status).green(),
    };
    let marker = if row.is_active() { "▶" } else { " " };
    let lock = if row.secure { "🔒" } else { "  " };

    format!(
        "{} {} {:>7} {} {}  {}",
        marker,
        status,
        row.method,
        lock,
        row.title,
        style(&row.href).dim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(secure: bool, class: &str) -> RequestRow {
        RequestRow {
            request_id: "7".to_string(),
            href: "http://localhost:6543/_debug_toolbar/7".to_string(),
            title: "example.com/cart".to_string(),
            status: 302,
            method: "POST".to_string(),
            secure,
            path: "/cart".to_string(),
            host: "example.com".to_string(),
            class: class.to_string(),
        }
    }

    #[test]
    fn test_format_row_marks_active_and_secure() {
        console::set_colors_enabled(false);

        let line = format_row(&row(true, "active"));
        assert!(line.starts_with("▶ 302    POST 🔒 example.com/cart"));
        assert!(line.ends_with("/_debug_toolbar/7"));

        let line = format_row(&row(false, ""));
        assert!(line.starts_with("  302"));
        assert!(!line.contains('🔒'));
    }
}
