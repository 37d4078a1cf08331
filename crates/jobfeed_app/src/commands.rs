use std::sync::Arc;

use anyhow::{bail, Context, Result};
use feed_logging::feed_debug;
use jobfeed_core::{FeedView, JobId, JobPosting};
use jobfeed_engine::{
    BookmarkStore, Connectivity, FeedController, FileStore, ManualConnectivity,
    ProbeConnectivity, ReqwestJobsApi,
};

use crate::config::AppConfig;

/// Wires the controller and the bookmark store for one command.
pub struct App {
    feed: Arc<FeedController>,
    bookmarks: BookmarkStore,
}

impl App {
    pub fn new(config: &AppConfig, offline: bool) -> Result<Self> {
        let api = ReqwestJobsApi::new(config.api_settings())
            .with_context(|| format!("invalid API base url {:?}", config.base_url))?;
        let connectivity: Arc<dyn Connectivity> = if offline {
            Arc::new(ManualConnectivity::new(false))
        } else {
            Arc::new(
                ProbeConnectivity::new(config.base_url.clone(), config.probe_timeout())
                    .context("failed to build connectivity probe")?,
            )
        };
        let feed = Arc::new(FeedController::new(
            Arc::new(api),
            connectivity,
            config.feed.clone(),
        ));
        feed_debug!("Bookmarks stored under {:?}", config.storage_dir);
        let bookmarks = BookmarkStore::open(Arc::new(FileStore::new(config.storage_dir.clone())));
        Ok(Self { feed, bookmarks })
    }

    pub async fn feed(&self, pages: u32, refresh: bool, simulate_failure: bool) -> Result<()> {
        let _monitor = self.feed.spawn_connectivity_monitor();
        if simulate_failure {
            self.feed.force_next_failure();
        }
        if let Err(err) = self.feed.load(refresh).await {
            bail!("{err}");
        }
        for _ in 1..pages {
            self.feed.load_more().await;
        }

        self.bookmarks.wait_until_hydrated().await;
        let view = self.feed.view();
        for job in &view.items {
            println!("{}", self.render_row(job));
        }
        println!("{}", summary(&view));
        Ok(())
    }

    pub async fn detail(&self, id: JobId) -> Result<()> {
        let job = self
            .feed
            .fetch_detail(id)
            .await
            .with_context(|| format!("failed to fetch job {id}"))?;
        println!("{}", serde_json::to_string_pretty(&job)?);
        Ok(())
    }

    pub async fn bookmark_add(&self, id: JobId) -> Result<()> {
        let job = self
            .feed
            .fetch_detail(id)
            .await
            .with_context(|| format!("failed to fetch job {id}"))?;
        self.bookmarks.wait_until_hydrated().await;
        if self.bookmarks.add(job) {
            println!("Bookmarked job {id}");
        } else {
            println!("Job {id} was already bookmarked");
        }
        self.bookmarks.flush().await;
        Ok(())
    }

    pub async fn bookmark_remove(&self, id: &str) -> Result<()> {
        self.bookmarks.wait_until_hydrated().await;
        if self.bookmarks.remove(id) {
            println!("Removed bookmark {id}");
        } else {
            println!("Job {id} was not bookmarked");
        }
        self.bookmarks.flush().await;
        Ok(())
    }

    pub async fn bookmark_list(&self) -> Result<()> {
        self.bookmarks.wait_until_hydrated().await;
        let bookmarks = self.bookmarks.bookmarks();
        if bookmarks.is_empty() {
            println!("No bookmarks yet");
        }
        for job in &bookmarks {
            println!("{}", describe(job));
        }
        Ok(())
    }

    pub async fn bookmark_clear(&self) -> Result<()> {
        self.bookmarks.wait_until_hydrated().await;
        self.bookmarks.clear_all();
        self.bookmarks.flush().await;
        println!("Cleared all bookmarks");
        Ok(())
    }

    fn render_row(&self, job: &JobPosting) -> String {
        let mark = if self.bookmarks.is_bookmarked(job.id) {
            "*"
        } else {
            " "
        };
        format!("{mark} {}", describe(job))
    }
}

fn describe(job: &JobPosting) -> String {
    let title = job.title().unwrap_or("(untitled)");
    match job.company_name() {
        Some(company) => format!("#{:<6} {title} - {company}", job.id),
        None => format!("#{:<6} {title}", job.id),
    }
}

fn summary(view: &FeedView) -> String {
    let mut line = format!("{} jobs, page {}", view.items.len(), view.page);
    if view.is_offline {
        line.push_str(", offline");
    }
    if view.end_reached {
        line.push_str(", end of feed");
    }
    line
}
