use derive_more::Display;
use objgraph_types::types::{StreamKind, Version};
use thiserror::Error;

/// Failures with a well known cause. They travel inside [`anyhow::Error`];
/// use `downcast_ref::<PersistError>()` to classify one.
///
/// Malformed input (truncated bytes, unknown tags, invalid UTF-8) is reported as a plain
/// [`anyhow::Error`] instead.
#[derive(Error, PartialEq, Eq, Clone, Debug)]
pub enum PersistError {
    #[error("Nesting depth exceeds {max} at '{innermost}'. Persisted data should be shallow; look for a cycle or a non-data type")]
    NestingTooDeep { max: usize, innermost: String },

    #[error("'{0}' cannot be created without constructor arguments")]
    MissingAccessibleConstructor(String),

    #[error("Type name '{0}' does not resolve to any known type")]
    TypeResolutionFailure(String),

    #[error("Only memory streams can be saved, not {0:?} streams")]
    UnsupportedStreamKind(StreamKind),

    #[error("Unable to save '{ty}': {reason}")]
    UnableToSave { ty: String, reason: String },

    #[error("Dictionary keys must be present and share one type, but found '{first}' and '{other}'")]
    MixedDictionaryKeys { first: String, other: String },

    #[error("Value of type '{actual}' does not fit declared type '{declared}'")]
    ValueMismatch { declared: String, actual: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Warning that the loaded data was written by another version of the module.
/// Loading still succeeds; the content may be outdated rather than broken.
#[derive(Display, PartialEq, Eq, Clone, Debug)]
#[display(
    fmt = "Data version {} differs from module version {}",
    data_version,
    module_version
)]
pub struct VersionMismatch {
    pub data_version: Version,
    pub module_version: Version,
}
