use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("document unavailable: {0}")]
    Document(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Competition,
    Activity,
    Entertainment,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Competition => "competition",
            Category::Activity => "activity",
            Category::Entertainment => "entertainment",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Competition => "Competitions",
            Category::Activity => "Activities",
            Category::Entertainment => "Entertainment",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "competition" | "competitions" => Ok(Category::Competition),
            "activity" | "activities" => Ok(Category::Activity),
            "entertainment" => Ok(Category::Entertainment),
            other => Err(Error::InvalidInput(format!("unknown category: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Date value used for events that run the whole festival week.
pub const ALL_WEEK: &str = "all-week";

/// One festival event. Loaded once from a static list and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: String,
    /// Display title; also the search anchor inside the schedule document.
    pub title: String,
    /// Short static description, always available as a fallback.
    pub description: String,
    /// ISO date (`YYYY-MM-DD`) or [`ALL_WEEK`].
    pub date: String,
    pub time: String,
    pub location: String,
    pub category: Category,
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_restriction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Event {
    pub fn is_all_week(&self) -> bool {
        self.date == ALL_WEEK
    }
}

/// Something that can produce the flattened text of the schedule document.
///
/// Implementations join page texts in document order with a blank line
/// (`"\n\n"`) between pages.
#[async_trait::async_trait]
pub trait DocumentSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn flattened_text(&self) -> Result<String>;
}

/// Durable string key/value storage scoped to one profile.
pub trait TextStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
}

/// Tuning knobs for the title/boundary heuristic.
///
/// The defaults were tuned against one schedule document; retune them for a
/// different source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocatorConfig {
    /// Max characters between a title occurrence and its location for the
    /// occurrence to count as "near".
    pub location_window: usize,
    /// Characters after the title end that are never scanned for the next title.
    pub title_skip: usize,
    /// A next-title boundary closer than this (in characters) is ignored.
    pub min_segment_len: usize,
    /// A next-title boundary further than this (in characters) is ignored.
    pub max_title_distance: usize,
    /// Phrases that start the administrative trailer of an event record.
    pub sentinels: Vec<String>,
    /// Phrases that close a description; the phrase itself is kept.
    pub terminators: Vec<String>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            location_window: 500,
            title_skip: 12,
            min_segment_len: 24,
            max_title_distance: 2500,
            sentinels: vec!["EVENT COORDINATOR".to_string(), "ENTRY COST".to_string()],
            terminators: vec!["ALL AGES WELCOME".to_string()],
        }
    }
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
}

impl LocatorConfig {
    /// Defaults, overridden by `SNOWDOWN_*` environment variables when set.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(n) = env_usize("SNOWDOWN_LOCATION_WINDOW") {
            cfg.location_window = n;
        }
        if let Some(n) = env_usize("SNOWDOWN_TITLE_SKIP") {
            cfg.title_skip = n;
        }
        if let Some(n) = env_usize("SNOWDOWN_MIN_SEGMENT") {
            cfg.min_segment_len = n;
        }
        if let Some(n) = env_usize("SNOWDOWN_MAX_TITLE_DISTANCE") {
            cfg.max_title_distance = n;
        }
        cfg
    }
}
