//! Job feed core: data model, pure feed state machine and bookmark set.
mod bookmarks;
mod effect;
mod error;
mod feed;
mod job;
mod msg;
mod update;
mod view_model;

pub use bookmarks::{BookmarkSet, BookmarkView};
pub use effect::{Effect, FetchPurpose};
pub use error::FeedError;
pub use feed::{FeedSettings, FeedState, FeedStatus, DEFAULT_PAGE_SIZE};
pub use job::{append_unique, dedup_by_id, JobId, JobPosting, JobsPage};
pub use msg::Msg;
pub use update::{update, SIMULATED_LOAD_FAILURE, SIMULATED_PAGINATION_FAILURE};
pub use view_model::FeedView;
