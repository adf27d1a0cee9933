use std::borrow::Cow;

use crate::error::NormalizationError;

/// Sentence and word boundary rules for one language
pub trait Segmenter: Send + Sync {
    /// Split text into sentence spans, in order
    fn sentences<'a>(&self, text: &'a str) -> Result<Vec<&'a str>, NormalizationError>;

    /// Split one sentence span into word tokens, in order
    fn words(&self, sentence: &str) -> Result<Vec<String>, NormalizationError>;

    /// Sentence-then-word segmentation, flattened across sentence boundaries
    fn tokenize(&self, text: &str) -> Result<Vec<String>, NormalizationError> {
        let mut tokens = Vec::new();
        for sentence in self.sentences(text)? {
            tokens.extend(self.words(sentence)?);
        }
        Ok(tokens)
    }
}

/// Maps a word to its dictionary base form
pub trait Lemmatizer: Send + Sync {
    /// Base form of `word`; words the lemmatizer does not know come back unchanged
    fn lemmatize<'a>(&self, word: &'a str) -> Result<Cow<'a, str>, NormalizationError>;
}

/// Lemmatizer that leaves every word as is
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityLemmatizer;

impl Lemmatizer for IdentityLemmatizer {
    fn lemmatize<'a>(&self, word: &'a str) -> Result<Cow<'a, str>, NormalizationError> {
        Ok(Cow::Borrowed(word))
    }
}
