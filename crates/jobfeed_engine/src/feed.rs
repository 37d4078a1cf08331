use std::sync::{Arc, Mutex, PoisonError};

use feed_logging::{feed_debug, feed_error, feed_info, feed_trace, feed_warn};
use jobfeed_core::{
    update, Effect, FeedError, FeedSettings, FeedState, FeedView, FetchPurpose, JobId, JobPosting,
    Msg,
};
use tokio::sync::watch;

use crate::{ApiError, Connectivity, JobsApi, MonitorHandle};

/// Drives the paginated job feed.
///
/// The state machine lives in [`jobfeed_core::update`]; this type performs
/// the reachability checks and page fetches it asks for. The state lock is
/// never held across an `.await`, so every transition is applied atomically
/// between suspension points.
pub struct FeedController {
    api: Arc<dyn JobsApi>,
    connectivity: Arc<dyn Connectivity>,
    state: Mutex<FeedState>,
    view_tx: watch::Sender<FeedView>,
}

impl FeedController {
    pub fn new(
        api: Arc<dyn JobsApi>,
        connectivity: Arc<dyn Connectivity>,
        settings: FeedSettings,
    ) -> Self {
        let state = FeedState::new(settings);
        let (view_tx, _rx) = watch::channel(state.view());
        Self {
            api,
            connectivity,
            state: Mutex::new(state),
            view_tx,
        }
    }

    /// Loads page 1, replacing the current items.
    ///
    /// On failure the previous items stay visible and the error is also
    /// recorded in the view.
    pub async fn load(&self, refresh: bool) -> Result<(), FeedError> {
        let reachable = self.connectivity.is_connected().await;
        if !reachable {
            feed_warn!("Load skipped: no connectivity");
        }
        let effects = self.dispatch(Msg::LoadRequested { refresh, reachable });
        self.run_effects(effects).await;
        match self.with_state(|state| state.error().cloned()) {
            Some(err) => {
                if err.is_network() {
                    self.resync_connectivity().await;
                }
                Err(err)
            }
            None => Ok(()),
        }
    }

    pub async fn refresh(&self) -> Result<(), FeedError> {
        self.load(true).await
    }

    /// Fetches the next page and appends it. Failures are logged, never
    /// returned.
    pub async fn load_more(&self) {
        let skip = self.with_state(|state| {
            state.load_more_blocked().then(|| {
                format!(
                    "status={:?} offline={} end_reached={}",
                    state.status(),
                    state.is_offline(),
                    state.end_reached()
                )
            })
        });
        if let Some(reason) = skip {
            feed_debug!("Skipping load_more: {}", reason);
            return;
        }

        let reachable = self.connectivity.is_connected().await;
        let effects = self.dispatch(Msg::LoadMoreRequested { reachable });
        self.run_effects(effects).await;
    }

    /// Makes the next `load` or `load_more` fail once with a synthetic error.
    pub fn force_next_failure(&self) {
        feed_info!("Next feed fetch will fail on purpose");
        self.dispatch(Msg::ForceNextFailure);
    }

    pub fn view(&self) -> FeedView {
        self.view_tx.borrow().clone()
    }

    /// Receives a fresh snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<FeedView> {
        self.view_tx.subscribe()
    }

    pub async fn fetch_detail(&self, id: JobId) -> Result<JobPosting, ApiError> {
        self.api.fetch_job(id).await.inspect_err(|err| {
            feed_error!("Error fetching job details for ID {}: {}", id, err);
        })
    }

    /// Feeds connectivity changes into the state machine until the handle is
    /// dropped or the controller goes away.
    pub fn spawn_connectivity_monitor(self: &Arc<Self>) -> MonitorHandle {
        let weak = Arc::downgrade(self);
        let connectivity = Arc::clone(&self.connectivity);
        let mut rx = connectivity.subscribe();
        MonitorHandle::new(tokio::spawn(async move {
            let connected = connectivity.is_connected().await;
            match weak.upgrade() {
                Some(controller) => {
                    controller.dispatch(Msg::ConnectivityChanged { connected });
                }
                None => return,
            }
            while rx.changed().await.is_ok() {
                let connected = *rx.borrow_and_update();
                let Some(controller) = weak.upgrade() else {
                    break;
                };
                feed_info!("Connectivity changed: connected={}", connected);
                controller.dispatch(Msg::ConnectivityChanged { connected });
            }
        }))
    }

    // A network-classified failure marks the feed offline without consulting
    // the signal, and the signal only publishes changes.
    async fn resync_connectivity(&self) {
        let connected = self.connectivity.is_connected().await;
        if connected {
            feed_info!("Still connected after a network failure; clearing offline state");
        }
        self.dispatch(Msg::ConnectivityChanged { connected });
    }

    fn with_state<R>(&self, f: impl FnOnce(&FeedState) -> R) -> R {
        let guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn dispatch(&self, msg: Msg) -> Vec<Effect> {
        feed_trace!("Feed message: {:?}", msg);
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let (next, effects) = update(std::mem::take(&mut *guard), msg);
        *guard = next;
        self.view_tx.send_replace(guard.view());
        effects
    }

    async fn run_effects(&self, mut effects: Vec<Effect>) {
        while !effects.is_empty() {
            let mut follow_up = Vec::new();
            for effect in effects {
                match effect {
                    Effect::FetchPage { page, purpose } => {
                        let msg = self.fetch_page(page, purpose).await;
                        follow_up.extend(self.dispatch(msg));
                    }
                    Effect::SimulatedFailure { message } => {
                        feed_warn!("Simulated failure: {}", message);
                    }
                }
            }
            effects = follow_up;
        }
    }

    async fn fetch_page(&self, page: u32, purpose: FetchPurpose) -> Msg {
        let limit = self.with_state(|state| state.settings().page_size);
        feed_info!("Fetching page {} ({:?}, limit {})", page, purpose, limit);

        match self.api.fetch_jobs(page, limit).await {
            Ok(response) => {
                feed_info!(
                    "Received {} jobs, next page: {:?}",
                    response.results.len(),
                    response.next_page
                );
                match purpose {
                    FetchPurpose::Reload => Msg::FirstPageFetched(response),
                    FetchPurpose::NextPage => {
                        if response.results.is_empty() {
                            feed_info!("Page {} is empty", page);
                        }
                        Msg::NextPageFetched { page, response }
                    }
                    FetchPurpose::WrapAround => {
                        feed_info!("No more jobs from API, looped back to page 1");
                        Msg::WrapPageFetched(response)
                    }
                }
            }
            Err(err) => {
                let message = err.to_string();
                match purpose {
                    FetchPurpose::Reload => {
                        feed_error!("Failed to load jobs: {}", message);
                        Msg::LoadFailed {
                            error: err.to_feed_error(),
                        }
                    }
                    FetchPurpose::NextPage | FetchPurpose::WrapAround => {
                        feed_warn!("Error loading more jobs: {}", message);
                        Msg::LoadMoreFailed { message }
                    }
                }
            }
        }
    }
}
