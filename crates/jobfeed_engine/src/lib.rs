//! Job feed engine: HTTP client, storage and the async controllers.
mod api;
mod bookmarks;
mod connectivity;
mod feed;
mod storage;
mod types;

pub use api::{ApiSettings, JobsApi, ReqwestJobsApi};
pub use bookmarks::{BookmarkStore, BOOKMARKS_KEY};
pub use connectivity::{Connectivity, ManualConnectivity, MonitorHandle, ProbeConnectivity};
pub use feed::FeedController;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use types::{ApiError, ApiErrorKind};
