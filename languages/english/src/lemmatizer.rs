use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use sift_core::{Lemmatizer, NormalizationError};

/// Noun inflection suffixes and their replacements, tried when a word is not
/// in the dictionary. A candidate is only accepted if it is a known base form.
const NOUN_SUFFIXES: &[(&str, &str)] = &[
    ("s", ""),
    ("ses", "s"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

/// Dictionary lemmatizer with noun suffix detachment.
///
/// Lookup order: known base forms map to themselves, then irregular forms,
/// then suffix rules. Anything else is returned unchanged.
#[derive(Debug, Clone, Default)]
pub struct DictionaryLemmatizer {
    irregular: HashMap<String, String>,
    lemmas: HashSet<String>,
}

/// Result of parsing a lemma dictionary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub accepted: usize,
    pub rejected: usize,
}

impl DictionaryLemmatizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `inflected<TAB>lemma` rows. A row with one column declares a known
    /// base form. Lines starting with `#` are comments.
    ///
    /// Rows whose words are not single lowercase words are skipped and counted
    /// in the returned stats.
    pub fn from_tsv(content: &str) -> (Self, ParseStats) {
        let mut lemmatizer = Self::new();
        let mut stats = ParseStats::default();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let columns: Vec<&str> = line.split('\t').map(str::trim).collect();
            let accepted = match columns.as_slice() {
                [lemma] if is_clean_word(lemma) => {
                    lemmatizer.lemmas.insert(lemma.to_string());
                    true
                }
                [inflected, lemma] if is_clean_word(inflected) && is_clean_word(lemma) => {
                    lemmatizer.insert(inflected, lemma);
                    true
                }
                _ => false,
            };

            if accepted {
                stats.accepted += 1;
            } else {
                stats.rejected += 1;
                tracing::warn!("Skipping lemma entry on line {}: {:?}", line_no + 1, line);
            }
        }

        (lemmatizer, stats)
    }

    pub fn insert(&mut self, inflected: &str, lemma: &str) {
        self.lemmas.insert(lemma.to_string());
        if inflected != lemma {
            self.irregular.insert(inflected.to_string(), lemma.to_string());
        }
    }

    /// Merge another dictionary into this one; its irregular forms win on conflict
    pub fn merge(mut self, other: DictionaryLemmatizer) -> Self {
        self.lemmas.extend(other.lemmas);
        self.irregular.extend(other.irregular);
        self
    }

    pub fn is_known(&self, word: &str) -> bool {
        self.lemmas.contains(word)
    }

    fn detach_suffix(&self, word: &str) -> Option<String> {
        NOUN_SUFFIXES
            .iter()
            .filter(|(suffix, _)| word.len() > suffix.len() && word.ends_with(suffix))
            .map(|(suffix, replacement)| {
                format!("{}{}", &word[..word.len() - suffix.len()], replacement)
            })
            .filter(|candidate| self.lemmas.contains(candidate))
            .min_by_key(|candidate| candidate.len())
    }
}

impl Lemmatizer for DictionaryLemmatizer {
    fn lemmatize<'a>(&self, word: &'a str) -> Result<Cow<'a, str>, NormalizationError> {
        if self.lemmas.contains(word) {
            return Ok(Cow::Borrowed(word));
        }

        if let Some(lemma) = self.irregular.get(word) {
            return Ok(Cow::Owned(lemma.clone()));
        }

        Ok(self
            .detach_suffix(word)
            .map(Cow::Owned)
            .unwrap_or(Cow::Borrowed(word)))
    }
}

/// A single lowercase word made of letters (and underscores)
fn is_clean_word(word: &str) -> bool {
    !word.is_empty()
        && word.chars().all(|c| c.is_alphabetic() || c == '_')
        && !word.chars().any(char::is_uppercase)
}
