use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Political orientation of the outlet that published an item.
/// Ordered left to right so it can key a `BTreeMap` in spectrum order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PoliticalLean {
    Left,
    LeanLeft,
    Center,
    LeanRight,
    Right,
}

impl PoliticalLean {
    pub const ALL: [PoliticalLean; 5] = [
        PoliticalLean::Left,
        PoliticalLean::LeanLeft,
        PoliticalLean::Center,
        PoliticalLean::LeanRight,
        PoliticalLean::Right,
    ];

    /// Collapse adjacent categories into the three triangulation buckets.
    pub fn bucket(self) -> Bucket {
        match self {
            PoliticalLean::Left | PoliticalLean::LeanLeft => Bucket::Left,
            PoliticalLean::Center => Bucket::Center,
            PoliticalLean::LeanRight | PoliticalLean::Right => Bucket::Right,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PoliticalLean::Left => "left",
            PoliticalLean::LeanLeft => "lean-left",
            PoliticalLean::Center => "center",
            PoliticalLean::LeanRight => "lean-right",
            PoliticalLean::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Left,
    Center,
    Right,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Left, Bucket::Center, Bucket::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Left => "left",
            Bucket::Center => "center",
            Bucket::Right => "right",
        }
    }
}

/// How much interpretive framing an item carries, from `Wire` (least) to `Editorial`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Wire,
    Reporting,
    Analysis,
    Opinion,
    Editorial,
    #[default]
    Unknown,
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Wire => "wire",
            ContentType::Reporting => "reporting",
            ContentType::Analysis => "analysis",
            ContentType::Opinion => "opinion",
            ContentType::Editorial => "editorial",
            ContentType::Unknown => "unknown",
        }
    }
}

/// Lean tag carried by a loaded term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermLean {
    Left,
    Right,
    Sensational,
}

impl TermLean {
    pub fn as_str(self) -> &'static str {
        match self {
            TermLean::Left => "left",
            TermLean::Right => "right",
            TermLean::Sensational => "sensational",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedTermMatch {
    pub term: String,
    pub neutral: String,
    pub lean: TermLean,
}

/// Fields written back by a classification pass. Recomputed wholesale on every pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub content_type_confidence: f64, // [0.0, 1.0]
    #[serde(default)]
    pub emotional_score: f64, // [0.0, 1.0]
    #[serde(default)]
    pub loaded_terms: Vec<LoadedTermMatch>,
    #[serde(default)]
    pub named_source_count: u32,
    #[serde(default)]
    pub anonymous_source_count: u32,
    #[serde(default)]
    pub is_primary_source: bool,
}

impl Annotations {
    pub fn is_classified(&self) -> bool {
        self.content_type != ContentType::Unknown
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub url: String, // canonical, unique
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    pub source: String,
    pub lean: PoliticalLean,
    pub published_at: DateTime<Utc>,
    pub fetched_at: DateTime<Utc>,
    #[serde(default)]
    pub annotations: Annotations,
}

/// Wedge/bridge reading of a cluster's left-vs-right coverage volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicBalance {
    Wedge,
    Bridge,
    Mixed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryCluster {
    pub cluster_id: String,
    pub topic: String,
    pub members: Vec<Article>,
    pub lean_counts: BTreeMap<PoliticalLean, usize>,
    pub has_competing_narratives: bool,
    pub balance: TopicBalance,
}

impl StoryCluster {
    pub fn distinct_leans(&self) -> usize {
        self.lean_counts.values().filter(|&&n| n > 0).count()
    }

    pub fn distinct_sources(&self) -> usize {
        let mut sources: Vec<&str> = self.members.iter().map(|a| a.source.as_str()).collect();
        sources.sort_unstable();
        sources.dedup();
        sources.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoveredItem {
    pub id: String,
    pub title: String,
    pub url: String,
    pub annotations: Annotations,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceCoverage {
    pub source: String,
    pub lean: PoliticalLean,
    pub bucket: Bucket,
    pub items: Vec<CoveredItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FramingDifference {
    pub aspect: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Significance {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Omission {
    pub fact: String,
    pub included_by: Vec<Bucket>,
    pub omitted_by: Vec<Bucket>,
    pub significance: Significance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangulationResult {
    pub event_id: String,
    pub event: String,
    pub sources: Vec<SourceCoverage>,
    pub agreed_facts: Vec<String>,
    pub framing_differences: Vec<FramingDifference>,
    pub omissions: Vec<Omission>,
}
