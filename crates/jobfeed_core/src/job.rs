use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Identity of a job posting; the dedup and bookmark key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct JobId(pub i64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for JobId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(JobId)
    }
}

impl From<i64> for JobId {
    fn from(value: i64) -> Self {
        JobId(value)
    }
}

impl From<i32> for JobId {
    fn from(value: i32) -> Self {
        JobId(value.into())
    }
}

impl From<u32> for JobId {
    fn from(value: u32) -> Self {
        JobId(value.into())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

// Older bookmark records carry the id as a string.
impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawId::deserialize(deserializer)? {
            RawId::Number(value) => Ok(JobId(value)),
            RawId::Text(text) => text
                .parse()
                .map_err(|err| D::Error::custom(format!("invalid job id {text:?}: {err}"))),
        }
    }
}

/// A job posting as returned by the API.
///
/// Only `id` is interpreted; everything else is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: JobId,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl JobPosting {
    pub fn new(id: impl Into<JobId>) -> Self {
        Self {
            id: id.into(),
            payload: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.payload.get("title").and_then(Value::as_str)
    }

    pub fn company_name(&self) -> Option<&str> {
        self.payload.get("company_name").and_then(Value::as_str)
    }
}

/// One page of the `/jobs` listing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobsPage {
    pub results: Vec<JobPosting>,
    #[serde(default)]
    pub next_page: Option<u32>,
}

impl JobsPage {
    pub fn new(results: Vec<JobPosting>) -> Self {
        Self {
            results,
            next_page: None,
        }
    }
}

/// Drops later postings sharing an id with an earlier one. Order is kept.
pub fn dedup_by_id(items: Vec<JobPosting>) -> Vec<JobPosting> {
    let mut seen = HashSet::with_capacity(items.len());
    items.into_iter().filter(|job| seen.insert(job.id)).collect()
}

/// Appends the postings of `incoming` whose id is not yet in `existing`.
///
/// Returns how many were appended.
pub fn append_unique(existing: &mut Vec<JobPosting>, incoming: Vec<JobPosting>) -> usize {
    let mut seen: HashSet<JobId> = existing.iter().map(|job| job.id).collect();
    let before = existing.len();
    existing.extend(incoming.into_iter().filter(|job| seen.insert(job.id)));
    existing.len() - before
}
