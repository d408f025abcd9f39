use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration errors raised while loading the term dictionary.
#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("Failed to read term dictionary {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed term dictionary: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Term dictionary entry #{index} has an empty phrase")]
    EmptyPhrase { index: usize },

    #[error("Duplicate phrase in term dictionary: {0:?}")]
    DuplicatePhrase(String),

    #[error("Failed to build phrase matcher: {0}")]
    Matcher(String),

    #[error("Failed to compile rewrite pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Non-fatal analysis conditions reported back to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Insufficient data for topic {topic:?}: found {found} item(s), need at least 2")]
    InsufficientData { topic: String, found: usize },
}
