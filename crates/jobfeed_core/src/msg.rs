use crate::{FeedError, JobsPage};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Caller asked for a full load; `reachable` is the point-in-time check.
    LoadRequested { refresh: bool, reachable: bool },
    /// Page 1 arrived for a full load.
    FirstPageFetched(JobsPage),
    /// A full load failed.
    LoadFailed { error: FeedError },
    /// Caller scrolled near the end of the list.
    LoadMoreRequested { reachable: bool },
    /// The page after the cursor arrived.
    NextPageFetched { page: u32, response: JobsPage },
    /// Page 1 arrived after the feed ran dry.
    WrapPageFetched(JobsPage),
    /// A load-more attempt failed. Never shown to the user.
    LoadMoreFailed { message: String },
    /// Reachability notification from the platform.
    ConnectivityChanged { connected: bool },
    /// Make the next load or load-more attempt fail once.
    ForceNextFailure,
}
