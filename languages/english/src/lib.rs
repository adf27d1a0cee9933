pub mod lemmatizer;
pub mod loader;
pub mod segmenter;

pub use lemmatizer::DictionaryLemmatizer;
pub use loader::EnglishResourceProvider;
pub use segmenter::{RuleSegmenter, SegmentationRules};
