use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use sift_core::{Artifact, LanguageResources, ResourceError, ResourceProvider};

use crate::lemmatizer::DictionaryLemmatizer;
use crate::segmenter::{RuleSegmenter, SegmentationRules};

const STOPWORDS_FILE: &str = "stopwords.txt";
const LEMMAS_FILE: &str = "lemmas.tsv";
const SEGMENTATION_FILE: &str = "segmentation.json";

#[derive(Debug, Clone)]
enum Source {
    Embedded,
    Directory(PathBuf),
}

/// English stopwords, lemma dictionary and segmentation rules
#[derive(Debug, Clone)]
pub struct EnglishResourceProvider {
    source: Source,
    additional_lemmas: Vec<PathBuf>,
}

impl EnglishResourceProvider {
    /// Use the data files compiled into the binary
    pub fn embedded() -> Self {
        Self {
            source: Source::Embedded,
            additional_lemmas: Vec::new(),
        }
    }

    /// Read `stopwords.txt`, `lemmas.tsv` and `segmentation.json` from `dir`
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::Directory(dir.into()),
            additional_lemmas: Vec::new(),
        }
    }

    /// Lemma dictionaries merged over the base one, later files winning
    pub fn with_additional_lemmas(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.additional_lemmas.extend(paths);
        self
    }

    pub fn supports(language: &str) -> bool {
        let tag = language.trim().to_ascii_lowercase();
        tag == "en" || tag == "english" || tag.starts_with("en-") || tag.starts_with("en_")
    }

    /// `"en"` for every supported tag; anything else is trimmed and lowercased
    pub fn canonical(language: &str) -> String {
        if Self::supports(language) {
            "en".to_string()
        } else {
            language.trim().to_ascii_lowercase()
        }
    }

    fn read_artifact(
        &self,
        language: &str,
        artifact: Artifact,
        file_name: &str,
        embedded: &'static str,
    ) -> Result<(Cow<'static, str>, String), ResourceError> {
        match &self.source {
            Source::Embedded => Ok((Cow::Borrowed(embedded), format!("embedded {file_name}"))),
            Source::Directory(dir) => {
                let path = dir.join(file_name);
                let content = read_file(language, artifact, &path)?;
                Ok((Cow::Owned(content), path.display().to_string()))
            }
        }
    }

    fn load_stopwords(&self, language: &str) -> Result<Vec<String>, ResourceError> {
        let (content, location) = self.read_artifact(
            language,
            Artifact::Stopwords,
            STOPWORDS_FILE,
            include_str!("../data/stopwords.txt"),
        )?;

        let stopwords = parse_stopwords(&content);
        if stopwords.is_empty() {
            return Err(ResourceError::unavailable(
                Artifact::Stopwords,
                language,
                location,
                "no stopwords found",
            ));
        }

        tracing::info!("Loaded {} stopwords from {}", stopwords.len(), location);
        Ok(stopwords)
    }

    fn load_lemmas(&self, language: &str) -> Result<DictionaryLemmatizer, ResourceError> {
        let (content, location) = self.read_artifact(
            language,
            Artifact::LemmaDictionary,
            LEMMAS_FILE,
            include_str!("../data/lemmas.tsv"),
        )?;
        let mut lemmatizer = parse_lemmas(language, &content, &location)?;

        for path in &self.additional_lemmas {
            let content = read_file(language, Artifact::LemmaDictionary, path)?;
            let additional = parse_lemmas(language, &content, &path.display().to_string())?;
            tracing::info!("Merging additional lemma dictionary from: {}", path.display());
            lemmatizer = lemmatizer.merge(additional);
        }

        Ok(lemmatizer)
    }

    fn load_segmentation(&self, language: &str) -> Result<SegmentationRules, ResourceError> {
        let (content, location) = self.read_artifact(
            language,
            Artifact::SegmentationRules,
            SEGMENTATION_FILE,
            include_str!("../data/segmentation.json"),
        )?;

        let rules = SegmentationRules::from_json(&content).map_err(|e| {
            ResourceError::unavailable(Artifact::SegmentationRules, language, &location, e)
        })?;
        tracing::info!(
            "Loaded segmentation rules from {}: {} abbreviations, {} splits",
            location,
            rules.abbreviations.len(),
            rules.splits.len()
        );
        Ok(rules)
    }
}

impl Default for EnglishResourceProvider {
    fn default() -> Self {
        Self::embedded()
    }
}

impl ResourceProvider for EnglishResourceProvider {
    fn canonical_tag(&self, language: &str) -> String {
        Self::canonical(language)
    }

    fn load(&self, language: &str) -> Result<LanguageResources, ResourceError> {
        if !Self::supports(language) {
            return Err(ResourceError::UnsupportedLanguage(language.to_string()));
        }

        let stopwords = self.load_stopwords(language)?;
        let lemmatizer = self.load_lemmas(language)?;
        let rules = self.load_segmentation(language)?;

        Ok(LanguageResources::new(
            "en",
            stopwords,
            lemmatizer,
            RuleSegmenter::new(rules),
        ))
    }
}

fn read_file(language: &str, artifact: Artifact, path: &Path) -> Result<String, ResourceError> {
    fs::read_to_string(path).map_err(|e| {
        ResourceError::unavailable(artifact, language, path.display().to_string(), e)
    })
}

/// One word per line; blank lines and `#` comments are ignored
fn parse_stopwords(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_lowercase)
        .collect()
}

fn parse_lemmas(
    language: &str,
    content: &str,
    location: &str,
) -> Result<DictionaryLemmatizer, ResourceError> {
    let (lemmatizer, stats) = DictionaryLemmatizer::from_tsv(content);
    if stats.accepted == 0 {
        return Err(ResourceError::unavailable(
            Artifact::LemmaDictionary,
            language,
            location,
            "no valid lemma entries",
        ));
    }
    if stats.rejected > 0 {
        tracing::warn!("{} lemma entries rejected in {}", stats.rejected, location);
    }
    tracing::info!("Loaded {} lemma entries from {}", stats.accepted, location);
    Ok(lemmatizer)
}
