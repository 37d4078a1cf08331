use serde::{Deserialize, Serialize};

use crate::view_model::FeedView;
use crate::{append_unique, dedup_by_id, FeedError, JobPosting};

pub const DEFAULT_PAGE_SIZE: u32 = 15;

/// Tunables for pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    pub page_size: u32,
    /// Loop back to page 1 when a page comes back empty instead of stopping.
    pub wrap_at_end: bool,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            wrap_at_end: true,
        }
    }
}

/// What the feed is doing right now. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedStatus {
    Idle,
    #[default]
    Loading,
    Refreshing,
    LoadingMore,
}

/// Paginated feed state. Only [`crate::update`] mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    items: Vec<JobPosting>,
    page: u32,
    status: FeedStatus,
    error: Option<FeedError>,
    is_offline: bool,
    end_reached: bool,
    force_failure_armed: bool,
    settings: FeedSettings,
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new(FeedSettings::default())
    }
}

impl FeedState {
    pub fn new(settings: FeedSettings) -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            status: FeedStatus::Loading,
            error: None,
            is_offline: false,
            end_reached: false,
            force_failure_armed: false,
            settings,
        }
    }

    pub fn view(&self) -> FeedView {
        FeedView {
            items: self.items.clone(),
            page: self.page,
            loading: self.status == FeedStatus::Loading,
            refreshing: self.status == FeedStatus::Refreshing,
            loading_more: self.status == FeedStatus::LoadingMore,
            error: self.error.as_ref().map(ToString::to_string),
            is_offline: self.is_offline,
            end_reached: self.end_reached,
        }
    }

    pub fn items(&self) -> &[JobPosting] {
        &self.items
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn status(&self) -> FeedStatus {
        self.status
    }

    pub fn error(&self) -> Option<&FeedError> {
        self.error.as_ref()
    }

    pub fn is_offline(&self) -> bool {
        self.is_offline
    }

    pub fn end_reached(&self) -> bool {
        self.end_reached
    }

    pub fn settings(&self) -> &FeedSettings {
        &self.settings
    }

    pub fn forced_failure_armed(&self) -> bool {
        self.force_failure_armed
    }

    /// A load-more request would be ignored in this state.
    pub fn load_more_blocked(&self) -> bool {
        self.status != FeedStatus::Idle || self.is_offline || self.end_reached
    }

    pub(crate) fn begin_load(&mut self, refresh: bool) {
        if refresh {
            self.page = 1;
            self.status = FeedStatus::Refreshing;
        } else if self.status != FeedStatus::Refreshing {
            self.status = FeedStatus::Loading;
        }
        self.error = None;
    }

    pub(crate) fn begin_load_more(&mut self) {
        self.status = FeedStatus::LoadingMore;
    }

    pub(crate) fn replace_items(&mut self, results: Vec<JobPosting>) -> usize {
        let fetched = results.len();
        self.items = dedup_by_id(results);
        self.page = 1;
        self.is_offline = false;
        self.end_reached = false;
        self.finish(&[FeedStatus::Loading, FeedStatus::Refreshing]);
        fetched - self.items.len()
    }

    pub(crate) fn fail_load(&mut self, error: FeedError) {
        if error.is_network() {
            self.is_offline = true;
        }
        self.error = Some(error);
        self.page = 1;
        self.finish(&[FeedStatus::Loading, FeedStatus::Refreshing]);
    }

    /// Appends a fetched page and moves the cursor to `page`.
    pub(crate) fn append_page(&mut self, page: u32, results: Vec<JobPosting>) -> usize {
        let appended = append_unique(&mut self.items, results);
        self.page = page;
        self.is_offline = false;
        self.finish(&[FeedStatus::LoadingMore]);
        appended
    }

    pub(crate) fn mark_end_reached(&mut self) {
        self.end_reached = true;
        self.finish(&[FeedStatus::LoadingMore]);
    }

    pub(crate) fn fail_load_more(&mut self) {
        self.finish(&[FeedStatus::LoadingMore]);
    }

    pub(crate) fn set_offline(&mut self, offline: bool) {
        self.is_offline = offline;
    }

    pub(crate) fn connectivity_changed(&mut self, connected: bool) {
        self.is_offline = !connected;
        if connected && self.error.as_ref().is_some_and(FeedError::is_network) {
            self.error = None;
        }
    }

    pub(crate) fn arm_forced_failure(&mut self) {
        self.force_failure_armed = true;
    }

    pub(crate) fn take_forced_failure(&mut self) -> bool {
        std::mem::take(&mut self.force_failure_armed)
    }

    // A completion only settles the status its own attempt set; a refresh
    // started while a load-more was in flight keeps `Refreshing`.
    fn finish(&mut self, owned: &[FeedStatus]) {
        if owned.contains(&self.status) {
            self.status = FeedStatus::Idle;
        }
    }
}
