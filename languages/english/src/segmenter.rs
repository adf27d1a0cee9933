use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use sift_core::{NormalizationError, Segmenter};
use unicode_segmentation::UnicodeSegmentation;

/// Language rules layered over Unicode sentence and word boundaries
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SegmentationRules {
    /// Words that end in a period without ending the sentence ("dr", "u.s")
    pub abbreviations: HashSet<String>,
    /// Whole words split into several tokens ("cannot" -> "can", "not")
    pub splits: HashMap<String, Vec<String>>,
    /// Suffixes split off as their own token ("n't", "'s")
    pub clitics: Vec<String>,
}

impl SegmentationRules {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: SegmentationRules = serde_json::from_str(json)?;
        Ok(raw.sanitized())
    }

    /// Lowercase keys and drop splits that would split again on their own output
    fn sanitized(self) -> Self {
        let abbreviations = self
            .abbreviations
            .into_iter()
            .map(|a| a.trim().trim_end_matches('.').to_lowercase())
            .filter(|a| !a.is_empty())
            .collect();

        let keys: HashSet<String> = self.splits.keys().map(|k| k.to_lowercase()).collect();
        let splits = self
            .splits
            .into_iter()
            .filter(|(word, parts)| {
                let valid = !parts.is_empty()
                    && parts.iter().all(|p| !p.is_empty() && !keys.contains(&p.to_lowercase()));
                if !valid {
                    tracing::warn!("Ignoring split rule for {:?}: {:?}", word, parts);
                }
                valid
            })
            .map(|(word, parts)| (word.to_lowercase(), parts))
            .collect();

        let mut clitics: Vec<String> = self
            .clitics
            .into_iter()
            .map(|c| c.to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        // Longest first so "n't" wins over "'t"-style overlaps
        clitics.sort_by_key(|c| std::cmp::Reverse(c.chars().count()));

        Self {
            abbreviations,
            splits,
            clitics,
        }
    }
}

/// Sentence and word segmentation for English text.
///
/// Sentence spans come from Unicode sentence boundaries; a boundary right
/// after an abbreviation or a single-letter initial is not a sentence end.
/// Words come from Unicode word boundaries, then split and clitic rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSegmenter {
    rules: SegmentationRules,
}

impl RuleSegmenter {
    pub fn new(rules: SegmentationRules) -> Self {
        Self { rules }
    }

    fn ends_with_abbreviation(&self, span: &str) -> bool {
        let span = span.trim_end();
        if !span.ends_with('.') {
            return false;
        }

        let Some(last) = span.split_whitespace().next_back() else {
            return false;
        };
        let word = last
            .trim_end_matches('.')
            .trim_start_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();

        let is_initial = word.chars().count() == 1 && word.chars().all(char::is_alphabetic);
        is_initial || self.rules.abbreviations.contains(&word)
    }

    fn push_word(&self, word: &str, tokens: &mut Vec<String>) {
        let lowered = word.to_lowercase();

        if let Some(parts) = self.rules.splits.get(&lowered) {
            tokens.extend(parts.iter().cloned());
            return;
        }

        for clitic in &self.rules.clitics {
            if lowered.len() > clitic.len() && lowered.ends_with(clitic.as_str()) {
                let cut = word.len() - clitic.len();
                // Lowercasing can shift byte offsets; fall back to the whole word
                if lowered.len() == word.len() && word.is_char_boundary(cut) {
                    tokens.push(word[..cut].to_string());
                    tokens.push(word[cut..].to_string());
                    return;
                }
            }
        }

        tokens.push(word.to_string());
    }
}

impl Segmenter for RuleSegmenter {
    fn sentences<'a>(&self, text: &'a str) -> Result<Vec<&'a str>, NormalizationError> {
        let mut spans = Vec::new();
        let mut pending: Option<usize> = None;

        for (offset, piece) in text.split_sentence_bound_indices() {
            let start = pending.unwrap_or(offset);
            if self.ends_with_abbreviation(piece) {
                pending = Some(start);
                continue;
            }

            let span = text[start..offset + piece.len()].trim();
            if !span.is_empty() {
                spans.push(span);
            }
            pending = None;
        }

        if let Some(start) = pending {
            let span = text[start..].trim();
            if !span.is_empty() {
                spans.push(span);
            }
        }

        Ok(spans)
    }

    fn words(&self, sentence: &str) -> Result<Vec<String>, NormalizationError> {
        let mut tokens = Vec::new();
        // A mark right after a space is grouped with the space; keep the pieces holding letters
        for word in sentence.unicode_words().flat_map(str::split_whitespace) {
            if word.chars().any(char::is_alphanumeric) {
                self.push_word(word, &mut tokens);
            }
        }
        Ok(tokens)
    }
}
