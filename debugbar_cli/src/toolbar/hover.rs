//! Hover-intent timer for the minimised toolbar handle
//!
//! Entering the handle starts a timer; leaving before it fires cancels it.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Sent when the pointer stayed on the handle for the full delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverFired;

pub struct HoverIntent {
    delay: Duration,
    tx: mpsc::Sender<HoverFired>,
    pending: Option<JoinHandle<()>>,
}

impl HoverIntent {
    pub fn new(delay: Duration, tx: mpsc::Sender<HoverFired>) -> Self {
        Self {
            delay,
            tx,
            pending: None,
        }
    }

    /// Pointer entered the handle; restarts the timer
    pub fn enter(&mut self) {
        self.leave();

        let delay = self.delay;
        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(HoverFired).await;
        }));
    }

    /// Pointer left the handle
    pub fn leave(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for HoverIntent {
    fn drop(&mut self) {
        self.leave();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut hover = HoverIntent::new(Duration::from_millis(1000), tx);

        hover.enter();
        assert!(hover.is_pending());
        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(rx.recv().await, Some(HoverFired));
    }

    #[tokio::test(start_paused = true)]
    async fn test_leave_cancels() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut hover = HoverIntent::new(Duration::from_millis(1000), tx);

        hover.enter();
        tokio::time::sleep(Duration::from_millis(500)).await;
        hover.leave();
        assert!(!hover.is_pending());

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reenter_restarts_timer() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut hover = HoverIntent::new(Duration::from_millis(1000), tx);

        hover.enter();
        tokio::time::sleep(Duration::from_millis(800)).await;
        hover.enter();
        tokio::time::sleep(Duration::from_millis(800)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(rx.recv().await, Some(HoverFired));
        assert!(rx.try_recv().is_err());
    }
}
