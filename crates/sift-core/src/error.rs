use std::fmt;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One of the three artifacts a language needs before normalization can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    Stopwords,
    LemmaDictionary,
    SegmentationRules,
}

impl Artifact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Artifact::Stopwords => "stopword list",
            Artifact::LemmaDictionary => "lemma dictionary",
            Artifact::SegmentationRules => "segmentation rules",
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to obtain language resources. Fatal for the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("{artifact} unavailable for language '{language}' ({location}): {source}")]
    Unavailable {
        artifact: Artifact,
        language: String,
        location: String,
        #[source]
        source: BoxError,
    },

    #[error("No resources for language '{0}'")]
    UnsupportedLanguage(String),
}

impl ResourceError {
    pub fn unavailable(
        artifact: Artifact,
        language: impl Into<String>,
        location: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        ResourceError::Unavailable {
            artifact,
            language: language.into(),
            location: location.into(),
            source: source.into(),
        }
    }

    /// The artifact that could not be loaded, if the failure is artifact-specific
    pub fn artifact(&self) -> Option<Artifact> {
        match self {
            ResourceError::Unavailable { artifact, .. } => Some(*artifact),
            ResourceError::UnsupportedLanguage(_) => None,
        }
    }
}

/// Unexpected failure inside segmentation or lemmatization of a single string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizationError {
    #[error("Segmentation failed: {0}")]
    Segmentation(String),

    #[error("Lemmatization failed: {0}")]
    Lemmatization(String),

    #[error("Normalization panicked: {0}")]
    Panicked(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_message_names_the_artifact() {
        let err = ResourceError::unavailable(
            Artifact::LemmaDictionary,
            "en",
            "/data/lemmas.tsv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );

        let message = err.to_string();
        assert!(message.contains("lemma dictionary"));
        assert!(message.contains("/data/lemmas.tsv"));
        assert_eq!(err.artifact(), Some(Artifact::LemmaDictionary));
    }
}
