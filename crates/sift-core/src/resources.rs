use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::error::ResourceError;
use crate::language::{Lemmatizer, Segmenter};

/// Stopwords, lemmatizer and segmentation rules for one language.
///
/// Built once and never mutated afterwards; share it behind an `Arc` across
/// every worker that normalizes text.
pub struct LanguageResources {
    language: String,
    stopwords: HashSet<String>,
    lemmatizer: Box<dyn Lemmatizer>,
    segmenter: Box<dyn Segmenter>,
}

impl LanguageResources {
    pub fn new<I, S>(
        language: impl Into<String>,
        stopwords: I,
        lemmatizer: impl Lemmatizer + 'static,
        segmenter: impl Segmenter + 'static,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stopwords = stopwords
            .into_iter()
            .map(|word| word.as_ref().trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();

        Self {
            language: language.into(),
            stopwords,
            lemmatizer: Box::new(lemmatizer),
            segmenter: Box::new(segmenter),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn stopwords(&self) -> &HashSet<String> {
        &self.stopwords
    }

    /// Stopword check on the case-folded form of `word`
    pub fn is_stopword(&self, word: &str) -> bool {
        if word.chars().any(char::is_uppercase) {
            self.stopwords.contains(&word.to_lowercase())
        } else {
            self.stopwords.contains(word)
        }
    }

    pub fn lemmatizer(&self) -> &dyn Lemmatizer {
        self.lemmatizer.as_ref()
    }

    pub fn segmenter(&self) -> &dyn Segmenter {
        self.segmenter.as_ref()
    }
}

impl fmt::Debug for LanguageResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageResources")
            .field("language", &self.language)
            .field("stopwords", &self.stopwords.len())
            .finish_non_exhaustive()
    }
}

/// Source of language resources (embedded data, a resource directory, ...)
pub trait ResourceProvider: Send + Sync {
    /// Load all three artifacts for `language`. Fails if any one is missing.
    fn load(&self, language: &str) -> Result<LanguageResources, ResourceError>;

    /// Key under which resources for `language` are cached. Tags that load the
    /// same resources must map to the same key.
    fn canonical_tag(&self, language: &str) -> String {
        language.trim().to_ascii_lowercase()
    }
}

/// Loads resources at most once per language.
///
/// Concurrent first calls for the same tag wait on a single load instead of
/// racing. A failed load leaves the slot empty so a later call can try again.
pub struct ResourceCache<P> {
    provider: P,
    slots: Mutex<HashMap<String, Arc<OnceCell<Arc<LanguageResources>>>>>,
}

impl<P: ResourceProvider> ResourceCache<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Resources for `language`, loading them on first use
    pub fn get(&self, language: &str) -> Result<Arc<LanguageResources>, ResourceError> {
        let key = self.provider.canonical_tag(language);

        // Only the slot lookup holds the map lock; the load itself runs on the slot
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(key.clone()).or_default())
        };

        slot.get_or_try_init(|| {
            tracing::info!("Loading language resources for '{}'", key);
            let resources = self.provider.load(&key)?;
            tracing::info!(
                "Loaded resources for '{}': {} stopwords",
                key,
                resources.stopwords().len()
            );
            Ok(Arc::new(resources))
        })
        .map(Arc::clone)
    }

    /// Whether resources for `language` are already loaded
    pub fn is_loaded(&self, language: &str) -> bool {
        let key = self.provider.canonical_tag(language);
        self.slots
            .lock()
            .get(&key)
            .is_some_and(|slot| slot.get().is_some())
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}
