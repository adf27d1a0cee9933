pub mod error;
pub mod language;
pub mod preprocess;
pub mod resources;
pub mod value;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Artifact, NormalizationError, ResourceError};
pub use language::{IdentityLemmatizer, Lemmatizer, Segmenter};
pub use preprocess::{NonTextPolicy, TextNormalizer};
pub use resources::{LanguageResources, ResourceCache, ResourceProvider};
pub use value::FieldValue;
