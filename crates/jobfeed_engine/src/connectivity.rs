use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use feed_logging::{feed_debug, feed_info};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Platform reachability signal.
#[async_trait]
pub trait Connectivity: Send + Sync {
    /// Point-in-time check.
    async fn is_connected(&self) -> bool;

    /// Receiver of connectivity changes. Dropping it unsubscribes.
    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// Connectivity flipped by hand: tests, `--offline`, or a host app that
/// already owns a reachability listener.
#[derive(Debug)]
pub struct ManualConnectivity {
    tx: watch::Sender<bool>,
}

impl ManualConnectivity {
    pub fn new(connected: bool) -> Self {
        let (tx, _rx) = watch::channel(connected);
        Self { tx }
    }

    pub fn set_connected(&self, connected: bool) {
        let previous = self.tx.send_replace(connected);
        if previous != connected {
            feed_info!("Connectivity set to connected={}", connected);
        }
    }
}

impl Default for ManualConnectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl Connectivity for ManualConnectivity {
    async fn is_connected(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Treats any HTTP answer from a probe url as "connected".
#[derive(Debug)]
pub struct ProbeConnectivity {
    probe_url: String,
    client: reqwest::Client,
    tx: watch::Sender<bool>,
}

impl ProbeConnectivity {
    pub fn new(probe_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let (tx, _rx) = watch::channel(true);
        Ok(Self {
            probe_url: probe_url.into(),
            client,
            tx,
        })
    }

    /// Re-checks every `interval` until the handle is dropped.
    pub fn spawn_polling(self: &Arc<Self>, interval: Duration) -> MonitorHandle {
        let probe = Arc::clone(self);
        MonitorHandle::new(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                probe.is_connected().await;
            }
        }))
    }
}

#[async_trait]
impl Connectivity for ProbeConnectivity {
    async fn is_connected(&self) -> bool {
        let connected = match self.client.head(&self.probe_url).send().await {
            Ok(_) => true,
            Err(err) => {
                feed_debug!("Connectivity probe to {} failed: {}", self.probe_url, err);
                false
            }
        };
        self.tx.send_if_modified(|current| {
            if *current == connected {
                return false;
            }
            *current = connected;
            true
        });
        connected
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Background task that is aborted when the handle is dropped.
#[derive(Debug)]
pub struct MonitorHandle {
    task: JoinHandle<()>,
}

impl MonitorHandle {
    pub(crate) fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
