mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use feed_logging::{LevelFilter, LogDestination};
use jobfeed_core::JobId;

use crate::config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "jobfeed", version, about = "Browse and bookmark job postings")]
struct Cli {
    /// RON configuration file (defaults to ./jobfeed.ron when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Job API base url; overrides the config file and API_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Act as if the device had no connectivity
    #[arg(long, global = true)]
    offline: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the job feed
    Feed {
        /// Number of pages to scroll through
        #[arg(long, default_value_t = 1)]
        pages: u32,
        /// Load as a pull-to-refresh
        #[arg(long)]
        refresh: bool,
        /// Make the first fetch fail on purpose
        #[arg(long)]
        simulate_failure: bool,
    },
    /// Print one job posting as JSON
    Detail { id: JobId },
    /// Manage local bookmarks
    Bookmark {
        #[command(subcommand)]
        action: BookmarkAction,
    },
}

#[derive(Debug, Subcommand)]
enum BookmarkAction {
    /// Fetch a job and bookmark it
    Add { id: JobId },
    /// Remove a bookmark
    Remove { id: String },
    /// List bookmarked jobs
    List,
    /// Remove every bookmark
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let destination = match cli.log_file.clone() {
        Some(path) => LogDestination::Both(path),
        None => LogDestination::Terminal,
    };
    feed_logging::initialize(destination, level);

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url.clone() {
        config.base_url = base_url;
    }

    let app = commands::App::new(&config, cli.offline)?;
    match cli.command {
        Command::Feed {
            pages,
            refresh,
            simulate_failure,
        } => app.feed(pages, refresh, simulate_failure).await,
        Command::Detail { id } => app.detail(id).await,
        Command::Bookmark { action } => match action {
            BookmarkAction::Add { id } => app.bookmark_add(id).await,
            BookmarkAction::Remove { id } => app.bookmark_remove(&id).await,
            BookmarkAction::List => app.bookmark_list().await,
            BookmarkAction::Clear => app.bookmark_clear().await,
        },
    }
}
