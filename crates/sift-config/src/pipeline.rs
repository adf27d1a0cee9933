use serde::{Deserialize, Serialize};
use sift_core::NonTextPolicy;

fn default_chunk_size() -> usize {
    256
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    /// Worker threads; 0 uses one per available core
    #[serde(default)]
    pub workers: usize,
    /// Records handed to a worker at a time
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default)]
    pub non_text: NonTextPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            chunk_size: default_chunk_size(),
            non_text: NonTextPolicy::default(),
        }
    }
}
