//! Long-form description lookup: override table, then the session cache, then
//! live extraction from the schedule text.

use crate::catalog;
use crate::clean::clean_segment;
use crate::locate::Locator;
use crate::overrides::{self, OverrideTable};
use crate::schedule_text::ScheduleText;
use crate::textprep::FoldedText;
use snowdown_core::{Event, LocatorConfig, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

type Slot = Arc<OnceCell<Option<String>>>;

pub struct DescriptionResolver {
    text: ScheduleText,
    locator: Locator,
    overrides: OverrideTable,
    folded: OnceCell<Arc<FoldedText>>,
    /// Per-key session cache. A slot is shared by concurrent callers, so each
    /// key is resolved at most once; document failures leave the slot empty.
    sessions: Mutex<HashMap<String, Slot>>,
}

impl DescriptionResolver {
    /// Resolver over the built-in catalog titles and override table.
    pub fn new(text: ScheduleText, cfg: LocatorConfig) -> Self {
        Self {
            text,
            locator: Locator::new(cfg, catalog::titles()),
            overrides: overrides::builtin(),
            folded: OnceCell::new(),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the titles used as next-event boundaries.
    pub fn with_titles<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.locator = Locator::new(self.locator.config().clone(), titles);
        self
    }

    pub fn with_overrides(mut self, overrides: OverrideTable) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn schedule_text(&self) -> &ScheduleText {
        &self.text
    }

    /// Best available long description for `(title, location)`, or `None`.
    ///
    /// Never fails: a missing document, a title that is not in the text, and
    /// a title without a usable boundary all come back as `None`, and callers
    /// show the short description instead.
    ///
    /// The session cache is keyed by the `(title, location)` pair; the location
    /// picks the occurrence and is stripped from the result.
    pub async fn resolve(&self, title: &str, location: &str) -> Option<String> {
        let key = format!("{title}\u{0}{location}");
        self.resolve_keyed(&key, title, location).await
    }

    /// Same as [`resolve`](Self::resolve), with the session cache keyed by event id.
    pub async fn resolve_event(&self, event: &Event) -> Option<String> {
        self.resolve_keyed(&event.id, &event.title, &event.location)
            .await
    }

    async fn resolve_keyed(&self, key: &str, title: &str, location: &str) -> Option<String> {
        if let Some(desc) = self.overrides.get(title) {
            return Some(desc.clone());
        }

        let slot = {
            let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(sessions.entry(key.to_string()).or_default())
        };

        match slot
            .get_or_try_init(|| self.extract(title, location))
            .await
        {
            Ok(desc) => desc.clone(),
            Err(e) => {
                tracing::warn!(title, error = %e, "description extraction failed");
                None
            }
        }
    }

    async fn extract(&self, title: &str, location: &str) -> Result<Option<String>> {
        let text = self.text.load_text().await?;
        let folded = self
            .folded
            .get_or_init(|| async { Arc::new(FoldedText::new(&text)) })
            .await;

        let Some(seg) = self.locator.best(folded, title, location) else {
            tracing::debug!(title, "no description segment found");
            return Ok(None);
        };
        tracing::debug!(
            title,
            start = seg.start,
            end = seg.end,
            near_location = seg.near_location,
            "description segment selected"
        );
        Ok(clean_segment(seg.slice(&text), location))
    }
}
