//! Server-sent events transport for the request feed

use crate::toolbar::{EventHandler, PushChannel, PushMessage, Subscription};
use anyhow::{Context, Result};
use bytes::Bytes;
use debugbar_common::SseParser;
use futures_util::{Stream, StreamExt};
use reqwest::{header, Client};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Push channel backed by a streaming HTTP GET
pub struct SseChannel {
    client: Client,
}

impl SseChannel {
    pub fn new() -> Result<Self> {
        // No overall timeout: the stream stays open indefinitely
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }
}

/// One streaming request; dropping it closes the stream
pub struct SseSubscription {
    task: Option<JoinHandle<()>>,
    open: Arc<AtomicBool>,
}

impl Subscription for SseSubscription {
    fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.open.store(false, Ordering::SeqCst);
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

impl Drop for SseSubscription {
    fn drop(&mut self) {
        self.close();
    }
}

impl PushChannel for SseChannel {
    fn open(&self, url: &str, handler: EventHandler) -> Box<dyn Subscription> {
        let open = Arc::new(AtomicBool::new(true));
        let client = self.client.clone();
        let url = url.to_string();
        let task_open = open.clone();

        let task = tokio::spawn(async move {
            let result = read_stream(&client, &url, &handler).await;
            task_open.store(false, Ordering::SeqCst);

            let error = result.err().map(|e| format!("{:#}", e));
            handler(PushMessage::Closed(error));
        });

        Box::new(SseSubscription {
            task: Some(task),
            open,
        })
    }
}

async fn read_stream(client: &Client, url: &str, handler: &EventHandler) -> Result<()> {
    let response = client
        .get(url)
        .header(header::ACCEPT, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .send()
        .await
        .context("Failed to connect to event stream")?;

    if !response.status().is_success() {
        anyhow::bail!("Event stream returned {}", response.status());
    }

    tracing::debug!("Event stream open: {}", url);
    forward_frames(response.bytes_stream(), handler).await
}

/// Parse a body stream and hand every complete frame to `handler`
async fn forward_frames<S, E>(body: S, handler: &EventHandler) -> Result<()>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let mut parser = SseParser::new();
    let mut body = std::pin::pin!(body);

    while let Some(chunk) = body.next().await {
        let chunk = chunk.context("Event stream read failed")?;
        for frame in parser.feed(&chunk) {
            handler(PushMessage::Frame(frame));
        }
    }

    Ok(())
}
