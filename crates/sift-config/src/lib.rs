use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sift_core::NonTextPolicy;

use self::pipeline::PipelineConfig;
use self::resources::ResourceConfig;

pub mod pipeline;
pub mod resources;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub resources: ResourceConfig,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Defaults overridden by `SIFT_*` environment variables
    pub fn new() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read a JSON config file; missing sections and fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build from defaults plus whatever `lookup` returns for each `SIFT_*` key
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();
        config.apply_overrides(lookup);
        config
    }

    /// Apply `SIFT_*` overrides on top of this config. Unparsable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(language) = lookup("SIFT_LANGUAGE").filter(|v| !v.trim().is_empty()) {
            self.resources.language = language.trim().to_string();
        }

        if let Some(dir) = lookup("SIFT_RESOURCE_DIR").filter(|v| !v.trim().is_empty()) {
            self.resources.resource_dir = Some(PathBuf::from(dir.trim()));
        }

        if let Some(paths) = lookup("SIFT_EXTRA_LEMMAS") {
            self.resources
                .additional_lemma_paths
                .extend(env::split_paths(&paths).filter(|p| !p.as_os_str().is_empty()));
        }

        if let Some(workers) = lookup("SIFT_WORKERS").and_then(|v| v.trim().parse().ok()) {
            self.pipeline.workers = workers;
        }

        if let Some(chunk_size) = lookup("SIFT_CHUNK_SIZE")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
        {
            self.pipeline.chunk_size = chunk_size;
        }

        if let Some(policy) = lookup("SIFT_NON_TEXT").and_then(|v| NonTextPolicy::parse(&v)) {
            self.pipeline.non_text = policy;
        }
    }
}
