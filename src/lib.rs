//! Content-type classification, loaded-language scoring, story clustering and
//! cross-lean triangulation over a backlog of harvested news items.
//!
//! The analysis functions are synchronous and take every input explicitly;
//! the only shared state is the read-only [`TermDictionary`].

pub mod classify;
pub mod cluster;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod models;
pub mod narrative;
pub mod orchestrator;
pub mod render;
pub mod similarity;
pub mod store;
pub mod triangulate;

pub use classify::{classify, Classification, ClassifierInput};
pub use cluster::{cluster_articles, ClusterParams};
pub use config::AppConfig;
pub use dictionary::{TermDictionary, TermEntry};
pub use error::{AnalysisError, DictionaryError};
pub use narrative::{analyze_narrative, count_sources, is_primary_source, NarrativeAnalysis, SourceCounts};
pub use triangulate::{triangulate, triangulate_cluster, TriangulationParams};
