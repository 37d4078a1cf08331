use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use feed_logging::{feed_debug, feed_error, feed_info, feed_warn};
use jobfeed_core::{BookmarkSet, BookmarkView, JobPosting};
use tokio::sync::{mpsc, oneshot, watch};

use crate::KeyValueStore;

/// Storage key holding the whole bookmark set as a JSON array.
pub const BOOKMARKS_KEY: &str = "bookmarked_jobs";

enum PersistCommand {
    /// Overwrite the stored record with the set as it is now.
    Persist,
    /// Delete the stored record.
    Clear,
    Flush(oneshot::Sender<()>),
}

enum PendingOp {
    Add(JobPosting),
    Remove(String),
    Clear,
}

struct Shared {
    set: BookmarkSet,
    hydrated: bool,
    // Mutations made before hydration, replayed over the stored set.
    pending: Vec<PendingOp>,
}

struct Inner {
    state: Mutex<Shared>,
    view_tx: watch::Sender<BookmarkView>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, shared: &Shared) {
        self.view_tx.send_replace(BookmarkView {
            bookmarks: shared.set.to_vec(),
            is_loading: !shared.hydrated,
        });
    }

    /// Returns true if early mutations were replayed.
    fn finish_hydration(&self, stored: BookmarkSet) -> bool {
        let mut shared = self.lock();
        let replayed = !shared.pending.is_empty();
        let mut set = stored;
        for op in shared.pending.drain(..) {
            match op {
                PendingOp::Add(job) => {
                    set.insert(job);
                }
                PendingOp::Remove(id) => {
                    set.remove(id);
                }
                PendingOp::Clear => set.clear(),
            }
        }
        shared.set = set;
        shared.hydrated = true;
        self.publish(&shared);
        replayed
    }
}

/// Locally persisted bookmarks.
///
/// Mutations apply to memory immediately and return; a single worker task
/// writes the full set to storage in the order the mutations happened.
/// Nothing is written until the stored record has been read once.
pub struct BookmarkStore {
    inner: Arc<Inner>,
    cmd_tx: mpsc::UnboundedSender<PersistCommand>,
}

impl BookmarkStore {
    /// Starts hydration from `storage` in the background.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let shared = Shared {
            set: BookmarkSet::new(),
            hydrated: false,
            pending: Vec::new(),
        };
        let (view_tx, _rx) = watch::channel(BookmarkView {
            bookmarks: Vec::new(),
            is_loading: true,
        });
        let inner = Arc::new(Inner {
            state: Mutex::new(shared),
            view_tx,
        });
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_worker(storage, Arc::clone(&inner), cmd_rx));

        Self { inner, cmd_tx }
    }

    /// True until the stored record has been read.
    pub fn is_loading(&self) -> bool {
        !self.inner.lock().hydrated
    }

    pub async fn wait_until_hydrated(&self) {
        let mut rx = self.subscribe();
        let _ = rx.wait_for(|view| !view.is_loading).await;
    }

    pub fn is_bookmarked(&self, id: impl Display) -> bool {
        self.inner.lock().set.contains(id)
    }

    /// Bookmarks a snapshot of `job`. Returns false if it was already there.
    pub fn add(&self, job: JobPosting) -> bool {
        let id = job.id;
        let added = self.mutate(|shared| {
            let added = shared.set.insert(job.clone());
            if !shared.hydrated {
                shared.pending.push(PendingOp::Add(job));
            }
            added
        });
        if added {
            feed_debug!("Bookmarked job {}", id);
            self.schedule(PersistCommand::Persist);
        }
        added
    }

    /// Returns false if `id` was not bookmarked.
    pub fn remove(&self, id: impl Display) -> bool {
        let key = id.to_string();
        let removed = self.mutate(|shared| {
            let removed = shared.set.remove(&key);
            if !shared.hydrated {
                shared.pending.push(PendingOp::Remove(key.clone()));
            }
            removed
        });
        if removed {
            feed_debug!("Removed bookmark {}", key);
            self.schedule(PersistCommand::Persist);
        }
        removed
    }

    /// Empties the set and deletes the stored record.
    pub fn clear_all(&self) {
        self.mutate(|shared| {
            shared.set.clear();
            if !shared.hydrated {
                shared.pending.push(PendingOp::Clear);
            }
        });
        feed_info!("Cleared all bookmarks");
        self.schedule(PersistCommand::Clear);
    }

    pub fn bookmarks(&self) -> Vec<JobPosting> {
        self.inner.lock().set.to_vec()
    }

    pub fn view(&self) -> BookmarkView {
        self.inner.view_tx.borrow().clone()
    }

    /// Receives a fresh snapshot after every change. Dropping it unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<BookmarkView> {
        self.inner.view_tx.subscribe()
    }

    /// Waits until every storage operation scheduled so far has run.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.cmd_tx.send(PersistCommand::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut Shared) -> R) -> R {
        let mut shared = self.inner.lock();
        let result = f(&mut shared);
        self.inner.publish(&shared);
        result
    }

    fn schedule(&self, command: PersistCommand) {
        if self.cmd_tx.send(command).is_err() {
            feed_error!("Bookmark persistence worker is gone; change kept in memory only");
        }
    }
}

async fn run_worker(
    storage: Arc<dyn KeyValueStore>,
    inner: Arc<Inner>,
    mut cmd_rx: mpsc::UnboundedReceiver<PersistCommand>,
) {
    let stored = hydrate(storage.as_ref()).await;
    if inner.finish_hydration(stored) {
        persist(storage.as_ref(), &inner).await;
    }

    while let Some(command) = cmd_rx.recv().await {
        match command {
            PersistCommand::Persist => persist(storage.as_ref(), &inner).await,
            PersistCommand::Clear => {
                if let Err(err) = storage.remove(BOOKMARKS_KEY).await {
                    feed_error!("Error clearing bookmarks: {}", err);
                }
            }
            PersistCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

async fn persist(storage: &dyn KeyValueStore, inner: &Inner) {
    let serialized = inner.lock().set.to_json();
    match serialized {
        Ok(json) => {
            if let Err(err) = storage.set(BOOKMARKS_KEY, json).await {
                feed_error!("Error saving bookmarks: {}", err);
            }
        }
        Err(err) => feed_error!("Error serializing bookmarks: {}", err),
    }
}

async fn hydrate(storage: &dyn KeyValueStore) -> BookmarkSet {
    match storage.get(BOOKMARKS_KEY).await {
        Ok(Some(raw)) => match BookmarkSet::from_json(&raw) {
            Ok(set) => {
                feed_info!("Loaded {} bookmarks", set.len());
                set
            }
            Err(err) => {
                feed_warn!("Stored bookmarks are unreadable, starting empty: {}", err);
                BookmarkSet::new()
            }
        },
        Ok(None) => BookmarkSet::new(),
        Err(err) => {
            feed_warn!("Error loading bookmarks: {}", err);
            BookmarkSet::new()
        }
    }
}
