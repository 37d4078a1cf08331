use std::fmt::Display;

use crate::JobPosting;

/// Bookmarked postings, unique by id, in the order they were added.
///
/// Each entry is a snapshot taken when the job was bookmarked. Ids are
/// compared in their decimal string form so callers holding a route
/// parameter and callers holding a [`crate::JobId`] agree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookmarkSet {
    entries: Vec<JobPosting>,
}

impl BookmarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: impl Display) -> bool {
        let key = normalize(id);
        self.entries.iter().any(|job| job.id.to_string() == key)
    }

    /// Adds a snapshot of `job`. Returns false if it was already present.
    pub fn insert(&mut self, job: JobPosting) -> bool {
        if self.contains(job.id) {
            return false;
        }
        self.entries.push(job);
        true
    }

    /// Removes the entry with `id`. Returns false if there was none.
    pub fn remove(&mut self, id: impl Display) -> bool {
        let key = normalize(id);
        let before = self.entries.len();
        self.entries.retain(|job| job.id.to_string() != key);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &JobPosting> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_vec(&self) -> Vec<JobPosting> {
        self.entries.clone()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }

    /// Parses a persisted record. Duplicate ids collapse to the first entry.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let parsed: Vec<JobPosting> = serde_json::from_str(raw)?;
        Ok(parsed.into_iter().collect())
    }
}

impl FromIterator<JobPosting> for BookmarkSet {
    fn from_iter<I: IntoIterator<Item = JobPosting>>(iter: I) -> Self {
        let mut set = BookmarkSet::new();
        for job in iter {
            set.insert(job);
        }
        set
    }
}

/// Snapshot of the bookmark store handed to the UI layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookmarkView {
    pub bookmarks: Vec<JobPosting>,
    /// True until the persisted record has been read.
    pub is_loading: bool,
}

fn normalize(id: impl Display) -> String {
    id.to_string().trim().to_string()
}
