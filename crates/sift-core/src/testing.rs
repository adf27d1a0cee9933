use std::borrow::Cow;
use std::collections::HashMap;

use crate::error::NormalizationError;
use crate::language::{Lemmatizer, Segmenter};
use crate::resources::LanguageResources;

/// Newline-delimited sentences, whitespace-delimited words
pub(crate) struct WhitespaceSegmenter;

impl Segmenter for WhitespaceSegmenter {
    fn sentences<'a>(&self, text: &'a str) -> Result<Vec<&'a str>, NormalizationError> {
        Ok(text.lines().filter(|line| !line.trim().is_empty()).collect())
    }

    fn words(&self, sentence: &str) -> Result<Vec<String>, NormalizationError> {
        Ok(sentence.split_whitespace().map(str::to_string).collect())
    }
}

pub(crate) struct MapLemmatizer(pub HashMap<String, String>);

impl Lemmatizer for MapLemmatizer {
    fn lemmatize<'a>(&self, word: &'a str) -> Result<Cow<'a, str>, NormalizationError> {
        Ok(self
            .0
            .get(word)
            .map(|lemma| Cow::Owned(lemma.clone()))
            .unwrap_or(Cow::Borrowed(word)))
    }
}

pub(crate) fn test_resources(stopwords: &[&str]) -> LanguageResources {
    let lemmas = [("stocks", "stock"), ("rose", "rise"), ("cases", "case"), ("are", "be")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    LanguageResources::new(
        "en",
        stopwords.iter().copied(),
        MapLemmatizer(lemmas),
        WhitespaceSegmenter,
    )
}
