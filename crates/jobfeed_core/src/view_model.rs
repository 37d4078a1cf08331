use crate::JobPosting;

/// Owned snapshot of the feed handed to the UI layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedView {
    pub items: Vec<JobPosting>,
    pub page: u32,
    pub loading: bool,
    pub refreshing: bool,
    pub loading_more: bool,
    pub error: Option<String>,
    pub is_offline: bool,
    pub end_reached: bool,
}

impl FeedView {
    pub fn is_busy(&self) -> bool {
        self.loading || self.refreshing || self.loading_more
    }
}
