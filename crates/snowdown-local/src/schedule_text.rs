//! Versioned, single-flight cache for the flattened schedule text.

use snowdown_core::{DocumentSource, Error, Result, TextStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

pub const DEFAULT_KEY_PREFIX: &str = "snowdown_schedule_text";
pub const DEFAULT_VERSION: &str = "1";

/// Storage key for a given prefix and version, e.g. `snowdown_schedule_text_v1`.
pub fn storage_key(prefix: &str, version: &str) -> String {
    format!("{prefix}_v{version}")
}

/// Loads the flattened text at most once per instance and at most once per
/// storage version across instances sharing a store.
///
/// Concurrent `load_text` calls share a single in-flight extraction. A failed
/// extraction is not memoized, so the next call tries again.
pub struct ScheduleText {
    source: Arc<dyn DocumentSource>,
    store: Arc<dyn TextStore>,
    key: String,
    text: OnceCell<Arc<str>>,
    extractions: AtomicUsize,
}

impl ScheduleText {
    pub fn new(source: Arc<dyn DocumentSource>, store: Arc<dyn TextStore>, version: &str) -> Self {
        Self::with_prefix(source, store, DEFAULT_KEY_PREFIX, version)
    }

    pub fn with_prefix(
        source: Arc<dyn DocumentSource>,
        store: Arc<dyn TextStore>,
        prefix: &str,
        version: &str,
    ) -> Self {
        Self {
            source,
            store,
            key: storage_key(prefix, version),
            text: OnceCell::new(),
            extractions: AtomicUsize::new(0),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Number of document extractions this instance has run.
    pub fn extractions(&self) -> usize {
        self.extractions.load(Ordering::SeqCst)
    }

    pub async fn load_text(&self) -> Result<Arc<str>> {
        let text = self
            .text
            .get_or_try_init(|| async {
                match self.store.get(&self.key) {
                    Ok(Some(cached)) if !cached.is_empty() => {
                        tracing::debug!(key = %self.key, chars = cached.len(), "schedule text store hit");
                        return Ok(Arc::<str>::from(cached));
                    }
                    Ok(_) => {
                        tracing::debug!(key = %self.key, "schedule text store miss");
                    }
                    Err(e) => {
                        tracing::warn!(key = %self.key, error = %e, "schedule text store read failed");
                    }
                }

                self.extractions.fetch_add(1, Ordering::SeqCst);
                let extracted = self.source.flattened_text().await?;
                tracing::debug!(
                    source = self.source.name(),
                    chars = extracted.len(),
                    "extracted schedule text"
                );
                // Persistence is best-effort: the text is still good for this session.
                if let Err(e) = self.store.put(&self.key, &extracted) {
                    tracing::warn!(key = %self.key, error = %e, "schedule text store write failed");
                }
                Ok::<_, Error>(Arc::<str>::from(extracted))
            })
            .await?;
        Ok(Arc::clone(text))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::test_support::ReadOnlyStore;
    use crate::MemoryStore;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    /// Source that counts calls, optionally fails, and yields once so
    /// concurrent callers overlap.
    pub(crate) struct CountingSource {
        pub text: String,
        pub calls: AtomicUsize,
        pub fail: AtomicBool,
    }

    impl CountingSource {
        pub fn new(text: &str) -> Self {
            Self {
                text: text.to_string(),
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            }
        }
    }

    #[async_trait::async_trait]
    impl DocumentSource for CountingSource {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn flattened_text(&self) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.fail.load(Ordering::SeqCst) {
                return Err(Error::Document("broken pdf".to_string()));
            }
            Ok(self.text.clone())
        }
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_extraction() {
        let src = Arc::new(CountingSource::new("POLAR PLUNGE"));
        let cache = ScheduleText::new(src.clone(), Arc::new(MemoryStore::new()), "1");
        let (a, b, c) = tokio::join!(cache.load_text(), cache.load_text(), cache.load_text());
        assert_eq!(&*a.unwrap(), "POLAR PLUNGE");
        assert_eq!(&*b.unwrap(), "POLAR PLUNGE");
        assert_eq!(&*c.unwrap(), "POLAR PLUNGE");
        assert_eq!(src.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.extractions(), 1);
    }

    #[tokio::test]
    async fn stored_text_skips_extraction() {
        let store = Arc::new(MemoryStore::new());
        store
            .put(&storage_key(DEFAULT_KEY_PREFIX, "1"), "from storage")
            .unwrap();
        let src = Arc::new(CountingSource::new("from pdf"));
        let cache = ScheduleText::new(src.clone(), store, "1");
        assert_eq!(&*cache.load_text().await.unwrap(), "from storage");
        assert_eq!(src.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn version_bump_extracts_once_more() {
        let store: Arc<dyn TextStore> = Arc::new(MemoryStore::new());
        let src = Arc::new(CountingSource::new("v1 text"));

        let v1 = ScheduleText::new(src.clone(), store.clone(), "1");
        v1.load_text().await.unwrap();
        let v1_again = ScheduleText::new(src.clone(), store.clone(), "1");
        v1_again.load_text().await.unwrap();
        assert_eq!(src.calls.load(Ordering::SeqCst), 1);

        let v2 = ScheduleText::new(src.clone(), store.clone(), "2");
        v2.load_text().await.unwrap();
        assert_eq!(src.calls.load(Ordering::SeqCst), 2);
        assert_eq!(v2.key(), "snowdown_schedule_text_v2");
    }

    #[tokio::test]
    async fn failed_extraction_writes_nothing_and_can_retry() {
        let store = Arc::new(MemoryStore::new());
        let src = Arc::new(CountingSource::new("recovered"));
        src.fail.store(true, Ordering::SeqCst);
        let cache = ScheduleText::new(src.clone(), store.clone(), "1");

        assert!(matches!(cache.load_text().await, Err(Error::Document(_))));
        assert!(store.is_empty());

        src.fail.store(false, Ordering::SeqCst);
        assert_eq!(&*cache.load_text().await.unwrap(), "recovered");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn store_write_failure_does_not_fail_the_caller() {
        let src = Arc::new(CountingSource::new("session only"));
        let cache = ScheduleText::new(src.clone(), Arc::new(ReadOnlyStore), "1");
        assert_eq!(&*cache.load_text().await.unwrap(), "session only");
        // Memoized in memory even though nothing was persisted.
        assert_eq!(&*cache.load_text().await.unwrap(), "session only");
        assert_eq!(src.calls.load(Ordering::SeqCst), 1);
    }
}
