use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::NormalizationError;
use crate::resources::LanguageResources;
use crate::value::FieldValue;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digit pattern"));
static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid punctuation pattern"));

/// What to do with a title/text cell that is not text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonTextPolicy {
    /// Treat the cell as missing and produce an empty string
    #[default]
    Empty,
    /// Coerce the cell to its string form (`nan`, `True`, `42`, ...) and normalize that
    Stringify,
}

impl NonTextPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "empty" => Some(NonTextPolicy::Empty),
            "stringify" => Some(NonTextPolicy::Stringify),
            _ => None,
        }
    }
}

/// Turns raw article text into a space-separated sequence of lemmas.
///
/// The steps always run in the same order: lowercase, strip digits, strip
/// punctuation, split into sentences, split into words, drop stopwords,
/// lemmatize, rejoin. Normalizing already normalized text returns it unchanged.
#[derive(Debug, Clone, Copy)]
pub struct TextNormalizer<'r> {
    resources: &'r LanguageResources,
    non_text: NonTextPolicy,
}

impl<'r> TextNormalizer<'r> {
    pub fn new(resources: &'r LanguageResources) -> Self {
        Self {
            resources,
            non_text: NonTextPolicy::default(),
        }
    }

    pub fn with_non_text_policy(mut self, policy: NonTextPolicy) -> Self {
        self.non_text = policy;
        self
    }

    pub fn non_text_policy(&self) -> NonTextPolicy {
        self.non_text
    }

    /// Normalize any cell. Never fails: errors degrade to an empty string.
    pub fn normalize(&self, input: &FieldValue) -> String {
        self.try_normalize(input).unwrap_or_else(|e| {
            tracing::warn!("Normalization failed, using empty text: {}", e);
            String::new()
        })
    }

    /// Normalize a string. Never fails: errors degrade to an empty string.
    pub fn normalize_text(&self, text: &str) -> String {
        self.try_normalize_text(text).unwrap_or_else(|e| {
            tracing::warn!("Normalization failed, using empty text: {}", e);
            String::new()
        })
    }

    pub fn try_normalize(&self, input: &FieldValue) -> Result<String, NormalizationError> {
        match (input, self.non_text) {
            (FieldValue::Text(text), _) => self.try_normalize_text(text),
            (_, NonTextPolicy::Empty) => Ok(String::new()),
            (other, NonTextPolicy::Stringify) => {
                self.try_normalize_text(&other.to_coerced_string())
            }
        }
    }

    pub fn try_normalize_text(&self, text: &str) -> Result<String, NormalizationError> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let cleaned = clean(text);
        if cleaned.trim().is_empty() {
            return Ok(String::new());
        }

        // Segmenters and lemmatizers are pluggable; a panic in one must stay with this call
        panic::catch_unwind(AssertUnwindSafe(|| self.segment_and_lemmatize(&cleaned)))
            .unwrap_or_else(|payload| Err(NormalizationError::Panicked(panic_message(payload))))
    }

    fn segment_and_lemmatize(&self, cleaned: &str) -> Result<String, NormalizationError> {
        let tokens = self.resources.segmenter().tokenize(cleaned)?;
        let lemmatizer = self.resources.lemmatizer();

        // Tokens and lemmas are re-split on whitespace so the output is one space per gap
        let words = tokens.iter().flat_map(|t| t.split_whitespace());

        let mut output = String::with_capacity(cleaned.len());
        for word in words.filter(|w| !self.resources.is_stopword(w)) {
            let lemma = lemmatizer.lemmatize(word)?;
            for piece in lemma.split_whitespace() {
                if self.resources.is_stopword(piece) {
                    continue;
                }
                if !output.is_empty() {
                    output.push(' ');
                }
                output.push_str(piece);
            }
        }

        Ok(output)
    }
}

/// Lowercase, drop digit runs and punctuation, then compose (NFC)
pub fn clean(text: &str) -> String {
    let lowered = text.to_lowercase();
    let without_digits = DIGITS.replace_all(&lowered, "");
    let without_punctuation = PUNCTUATION.replace_all(&without_digits, "");
    without_punctuation.nfc().collect()
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use proptest::prelude::*;

    use super::*;
    use crate::language::{IdentityLemmatizer, Lemmatizer, Segmenter};
    use crate::testing::{WhitespaceSegmenter, test_resources};

    const STOPWORDS: &[&str] = &["the", "and", "a", "of", "be", "today"];

    struct PanickingSegmenter;

    impl Segmenter for PanickingSegmenter {
        fn sentences<'a>(&self, _text: &'a str) -> Result<Vec<&'a str>, NormalizationError> {
            panic!("corrupt segmentation table");
        }

        fn words(&self, _sentence: &str) -> Result<Vec<String>, NormalizationError> {
            Ok(Vec::new())
        }
    }

    /// Emits every word with surrounding padding
    struct PaddedSegmenter;

    impl Segmenter for PaddedSegmenter {
        fn sentences<'a>(&self, text: &'a str) -> Result<Vec<&'a str>, NormalizationError> {
            Ok(vec![text])
        }

        fn words(&self, sentence: &str) -> Result<Vec<String>, NormalizationError> {
            let mut words: Vec<String> =
                sentence.split_whitespace().map(|w| format!(" {w}\t")).collect();
            words.push("  ".to_string());
            Ok(words)
        }
    }

    struct FailingLemmatizer;

    impl Lemmatizer for FailingLemmatizer {
        fn lemmatize<'a>(&self, _word: &'a str) -> Result<Cow<'a, str>, NormalizationError> {
            Err(NormalizationError::Lemmatization("dictionary offline".to_string()))
        }
    }

    #[test]
    fn strips_digits_and_punctuation() {
        let resources = test_resources(STOPWORDS);
        let normalizer = TextNormalizer::new(&resources);

        let output = normalizer.normalize_text("Covid19!! cases rose 42%.");

        assert_eq!(output, "covid case rise");
        assert!(!output.chars().any(|c| c.is_ascii_digit()));
        assert!(!output.chars().any(|c| c.is_ascii_punctuation()));
    }

    #[test]
    fn drops_stopwords_regardless_of_case() {
        let resources = test_resources(STOPWORDS);
        let normalizer = TextNormalizer::new(&resources);

        let output = normalizer.normalize_text("THE Market AND The Stocks");

        assert_eq!(output, "market stock");
    }

    #[test]
    fn drops_lemmas_that_are_stopwords() {
        let resources = test_resources(STOPWORDS);
        let normalizer = TextNormalizer::new(&resources);

        assert_eq!(normalizer.normalize_text("Stocks are up"), "stock up");
    }

    #[test]
    fn padded_tokens_are_joined_by_single_spaces() {
        let resources = LanguageResources::new(
            "en",
            STOPWORDS.iter().copied(),
            IdentityLemmatizer,
            PaddedSegmenter,
        );
        let normalizer = TextNormalizer::new(&resources);

        let once = normalizer.normalize_text("Markets and bonds");

        assert_eq!(once, "markets bonds");
        assert_eq!(normalizer.normalize_text(&once), once);
    }

    #[test]
    fn keeps_sentence_order() {
        let resources = test_resources(STOPWORDS);
        let normalizer = TextNormalizer::new(&resources);

        let output =
            normalizer.normalize_text("Markets fell.\nInvestors panicked.\nBonds rallied!");

        assert_eq!(output, "markets fell investors panicked bonds rallied");
    }

    #[test]
    fn empty_and_noise_only_input_is_empty() {
        let resources = test_resources(STOPWORDS);
        let normalizer = TextNormalizer::new(&resources);

        assert_eq!(normalizer.normalize_text(""), "");
        assert_eq!(normalizer.normalize_text(" \n\t "), "");
        assert_eq!(normalizer.normalize_text("!!! 123 ... 4,5%"), "");
        assert_eq!(normalizer.normalize_text("The and a of"), "");
    }

    #[test]
    fn keeps_underscores_and_composes_accents() {
        let resources = test_resources(STOPWORDS);
        let normalizer = TextNormalizer::new(&resources);

        assert_eq!(normalizer.normalize_text("snake_case Value"), "snake_case value");
        assert_eq!(normalizer.normalize_text("Cafe\u{301}"), "caf\u{e9}");
    }

    #[test]
    fn non_text_is_empty_by_default() {
        let resources = test_resources(STOPWORDS);
        let normalizer = TextNormalizer::new(&resources);

        assert_eq!(normalizer.normalize(&FieldValue::Null), "");
        assert_eq!(normalizer.normalize(&FieldValue::Integer(7)), "");
        assert_eq!(normalizer.normalize(&FieldValue::Bool(true)), "");
        assert_eq!(normalizer.normalize(&FieldValue::Other(serde_json::json!({"a": 1}))), "");
    }

    #[test]
    fn stringify_policy_normalizes_the_string_form() {
        let resources = test_resources(STOPWORDS);
        let normalizer =
            TextNormalizer::new(&resources).with_non_text_policy(NonTextPolicy::Stringify);

        assert_eq!(normalizer.normalize(&FieldValue::Null), "nan");
        assert_eq!(normalizer.normalize(&FieldValue::Bool(true)), "true");
        assert_eq!(normalizer.normalize(&FieldValue::Integer(42)), "");
    }

    #[test]
    fn panicking_segmenter_degrades_to_empty() {
        let resources = LanguageResources::new(
            "en",
            STOPWORDS.iter().copied(),
            IdentityLemmatizer,
            PanickingSegmenter,
        );
        let normalizer = TextNormalizer::new(&resources);

        assert!(matches!(
            normalizer.try_normalize_text("some words"),
            Err(NormalizationError::Panicked(message)) if message.contains("corrupt")
        ));
        assert_eq!(normalizer.normalize_text("some words"), "");
    }

    #[test]
    fn lemmatizer_errors_degrade_to_empty() {
        let resources = LanguageResources::new(
            "en",
            STOPWORDS.iter().copied(),
            FailingLemmatizer,
            WhitespaceSegmenter,
        );
        let normalizer = TextNormalizer::new(&resources);

        assert!(matches!(
            normalizer.try_normalize_text("some words"),
            Err(NormalizationError::Lemmatization(_))
        ));
        assert_eq!(normalizer.normalize(&FieldValue::from("some words")), "");
    }

    #[test]
    fn parses_non_text_policy_names() {
        assert_eq!(NonTextPolicy::parse("Stringify"), Some(NonTextPolicy::Stringify));
        assert_eq!(NonTextPolicy::parse(" empty "), Some(NonTextPolicy::Empty));
        assert_eq!(NonTextPolicy::parse("drop"), None);
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(input in "[A-Za-z0-9 ,.!?'_\n-]{0,80}") {
            let resources = test_resources(STOPWORDS);
            let normalizer = TextNormalizer::new(&resources);

            let once = normalizer.normalize_text(&input);
            let twice = normalizer.normalize_text(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn output_has_no_stopwords(input in "(The|the|AND|and|Stocks|Market|A|of|be|are)( (The|the|AND|and|Stocks|Market|A|of|be|are)){0,12}") {
            let resources = test_resources(STOPWORDS);
            let normalizer = TextNormalizer::new(&resources);

            let output = normalizer.normalize_text(&input);
            for token in output.split(' ').filter(|t| !t.is_empty()) {
                prop_assert!(!resources.is_stopword(token));
            }
        }
    }
}
