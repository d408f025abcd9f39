use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;
use xxhash_rust::xxh3::xxh3_64;

use crate::error::AnalysisError;
use crate::models::{
    Article, Bucket, CoveredItem, FramingDifference, Omission, Significance, SourceCoverage, StoryCluster,
    TriangulationResult,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriangulationParams {
    pub window_days: i64,         // recency window for ad hoc topic searches
    pub per_kind_limit: usize,    // fragments kept per kind per item
    pub max_agreed: usize,
    pub max_omissions: usize,
    pub omission_prefix_chars: usize,
}

impl Default for TriangulationParams {
    fn default() -> Self {
        Self {
            window_days: 3,
            per_kind_limit: 3,
            max_agreed: 10,
            max_omissions: 10,
            omission_prefix_chars: 30,
        }
    }
}

pub const HEADLINE_FRAMING: &str = "headline framing";

// Quote marks pair left to right; length is checked after pairing.
static QUOTE: Lazy<Regex> = Lazy::new(|| re(r#""([^"]*)"|“([^”]*)”"#));
const QUOTE_CHARS: std::ops::RangeInclusive<usize> = 20..=150;
static STAT: Lazy<Regex> = Lazy::new(|| {
    re(r"(?i)\$?\d[\d,]*(?:\.\d+)?\s*(?:%|(?:percent|million|billion|people|dollars)\b)(?:\s+of\s+[a-z]+)?")
});
static ACTION: Lazy<Regex> = Lazy::new(|| {
    re(r"\b[A-Z][a-z]+ [A-Z][a-z]+ (?:said|stated|told|confirmed|announced|argued|noted|warned|denied)\b")
});

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static fact pattern")
}

/// Short checkable fragments from one item, prefixed by kind.
pub fn extract_facts(article: &Article, per_kind_limit: usize) -> Vec<String> {
    let body = article
        .content
        .as_deref()
        .or(article.snippet.as_deref())
        .unwrap_or("");
    let text = format!("{} {}", article.title, body);

    let mut facts = Vec::new();
    facts.extend(
        QUOTE
            .captures_iter(&text)
            .filter_map(|c| c.get(1).or_else(|| c.get(2)))
            .filter(|m| QUOTE_CHARS.contains(&m.as_str().chars().count()))
            .take(per_kind_limit)
            .map(|m| format!("Quote: {}", m.as_str().trim())),
    );
    facts.extend(
        STAT.find_iter(&text)
            .take(per_kind_limit)
            .map(|m| format!("Stat: {}", m.as_str().trim())),
    );
    facts.extend(
        ACTION
            .find_iter(&text)
            .take(per_kind_limit)
            .map(|m| format!("Action: {}", m.as_str())),
    );
    facts
}

fn normalize(fact: &str) -> String {
    fact.nfc().collect::<String>().to_lowercase()
}

/// First original-cased text of every normalized fragment, plus the buckets
/// that mention it, in first-seen order.
struct FactIndex {
    order: Vec<String>,
    display: HashMap<String, String>,
    buckets: HashMap<String, Vec<Bucket>>,
    per_bucket: BTreeMap<Bucket, Vec<String>>,
}

impl FactIndex {
    fn build(items: &[&Article], per_kind_limit: usize) -> Self {
        let mut index = FactIndex {
            order: Vec::new(),
            display: HashMap::new(),
            buckets: HashMap::new(),
            per_bucket: BTreeMap::new(),
        };
        for a in items {
            let bucket = a.lean.bucket();
            for fact in extract_facts(a, per_kind_limit) {
                let key = normalize(&fact);
                if !index.display.contains_key(&key) {
                    index.order.push(key.clone());
                    index.display.insert(key.clone(), fact);
                }
                let owners = index.buckets.entry(key.clone()).or_default();
                if !owners.contains(&bucket) {
                    owners.push(bucket);
                }
                let in_bucket = index.per_bucket.entry(bucket).or_default();
                if !in_bucket.contains(&key) {
                    in_bucket.push(key);
                }
            }
        }
        index
    }
}

pub fn triangulate_cluster(
    cluster: &StoryCluster,
    params: &TriangulationParams,
) -> Result<TriangulationResult, AnalysisError> {
    triangulate(&cluster.topic, &cluster.members, params)
}

/// Compare coverage of one event across the left/center/right buckets.
pub fn triangulate(
    topic: &str,
    items: &[Article],
    params: &TriangulationParams,
) -> Result<TriangulationResult, AnalysisError> {
    if items.len() < 2 {
        warn!("Triangulation skipped - topic={:?}, items={}", topic, items.len());
        return Err(AnalysisError::InsufficientData {
            topic: topic.to_string(),
            found: items.len(),
        });
    }

    let mut by_bucket: BTreeMap<Bucket, Vec<&Article>> = BTreeMap::new();
    for a in items {
        by_bucket.entry(a.lean.bucket()).or_default().push(a);
    }
    let non_empty: Vec<Bucket> = Bucket::ALL
        .into_iter()
        .filter(|b| by_bucket.get(b).is_some_and(|v| !v.is_empty()))
        .collect();

    let all: Vec<&Article> = items.iter().collect();
    let facts = FactIndex::build(&all, params.per_kind_limit);

    let agreed_facts = agreed_facts(&facts, params.max_agreed);
    let framing_differences = framing_differences(&by_bucket);
    let omissions = omissions(&facts, &non_empty, params);

    let event_seed = format!("{}|{}", topic, items.iter().map(|a| a.id.as_str()).join(","));
    let event_id = format!("{:016x}", xxh3_64(event_seed.as_bytes()));

    debug!(
        "Triangulation completed - topic={:?}, items={}, buckets={}, facts={}, agreed={}, omissions={}",
        topic,
        items.len(),
        non_empty.len(),
        facts.order.len(),
        agreed_facts.len(),
        omissions.len()
    );

    Ok(TriangulationResult {
        event_id,
        event: topic.to_string(),
        sources: coverage_by_source(items),
        agreed_facts,
        framing_differences,
        omissions,
    })
}

fn agreed_facts(facts: &FactIndex, limit: usize) -> Vec<String> {
    facts
        .order
        .iter()
        .filter(|k| facts.buckets.get(*k).is_some_and(|b| b.len() >= 2))
        .take(limit)
        .filter_map(|k| facts.display.get(k).cloned())
        .collect()
}

fn framing_differences(by_bucket: &BTreeMap<Bucket, Vec<&Article>>) -> Vec<FramingDifference> {
    let first_headline = |b: Bucket| {
        by_bucket
            .get(&b)
            .and_then(|v| v.first())
            .map(|a| a.title.clone())
    };
    let left = first_headline(Bucket::Left);
    let right = first_headline(Bucket::Right);
    if left.is_none() || right.is_none() {
        return Vec::new();
    }
    vec![FramingDifference {
        aspect: HEADLINE_FRAMING.to_string(),
        left,
        center: first_headline(Bucket::Center),
        right,
    }]
}

// NOTE: the prefix containment test below is a loose heuristic; a fragment
// counts as covered elsewhere if any other bucket's fragment contains its
// first `omission_prefix_chars` characters.
fn omissions(facts: &FactIndex, non_empty: &[Bucket], params: &TriangulationParams) -> Vec<Omission> {
    let mut out = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (&bucket, keys) in &facts.per_bucket {
        let others: Vec<Bucket> = non_empty.iter().copied().filter(|b| *b != bucket).collect();
        if others.is_empty() {
            continue;
        }
        for key in keys {
            if facts.buckets.get(key).map_or(0, Vec::len) != 1 {
                continue;
            }
            let prefix: String = key.chars().take(params.omission_prefix_chars).collect();
            let covered_elsewhere = others.iter().any(|b| {
                facts
                    .per_bucket
                    .get(b)
                    .is_some_and(|frags| frags.iter().any(|f| f.contains(&prefix)))
            });
            if covered_elsewhere {
                continue;
            }
            let Some(text) = facts.display.get(key) else {
                continue;
            };
            if !seen.insert(text.clone()) {
                continue;
            }
            out.push(Omission {
                fact: text.clone(),
                included_by: vec![bucket],
                significance: if others.len() >= 2 {
                    Significance::High
                } else {
                    Significance::Medium
                },
                omitted_by: others.clone(),
            });
            if out.len() >= params.max_omissions {
                return out;
            }
        }
    }
    out
}

fn coverage_by_source(items: &[Article]) -> Vec<SourceCoverage> {
    let mut coverage: Vec<SourceCoverage> = Vec::new();
    for a in items {
        let item = CoveredItem {
            id: a.id.clone(),
            title: a.title.clone(),
            url: a.url.clone(),
            annotations: a.annotations.clone(),
        };
        match coverage.iter_mut().find(|c| c.source == a.source) {
            Some(c) => c.items.push(item),
            None => coverage.push(SourceCoverage {
                source: a.source.clone(),
                lean: a.lean,
                bucket: a.lean.bucket(),
                items: vec![item],
            }),
        }
    }
    coverage
}
