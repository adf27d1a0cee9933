use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ResourceConfig {
    #[serde(default = "default_language")]
    pub language: String,
    /// Directory holding stopwords.txt, lemmas.tsv and segmentation.json.
    /// Embedded data is used when unset.
    #[serde(default)]
    pub resource_dir: Option<PathBuf>,
    /// Extra lemma dictionaries merged over the base one, in order
    #[serde(default)]
    pub additional_lemma_paths: Vec<PathBuf>,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            resource_dir: None,
            additional_lemma_paths: vec![],
        }
    }
}
