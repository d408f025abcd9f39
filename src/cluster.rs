use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, info};
use xxhash_rust::xxh3::xxh3_64;

use crate::models::{Article, Bucket, PoliticalLean, StoryCluster, TopicBalance};
use crate::similarity::{jaccard, keyword_set, title_keywords};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterParams {
    pub threshold: f64,            // 0.2 Jaccard against the seed
    pub min_sources: usize,        // distinct outlets required to keep a cluster
    pub competing_min_leans: usize, // lean categories needed for "competing narratives"
    pub topic_keywords: usize,     // seed keywords used for the topic label
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            threshold: 0.2,
            min_sources: 2,
            competing_min_leans: 3,
            topic_keywords: 3,
        }
    }
}

/// Greedy single-pass grouping of items that likely cover the same story.
///
/// Each unclustered item in input order seeds a candidate made of every other
/// unclustered item whose title similarity to the seed reaches the threshold.
/// Candidates with fewer than two members or too few distinct sources are
/// dropped and their members stay available to later seeds.
pub fn cluster_articles(articles: &[Article], params: &ClusterParams) -> Vec<StoryCluster> {
    debug!(
        "Clustering started - articles={}, threshold={}, min_sources={}",
        articles.len(),
        params.threshold,
        params.min_sources
    );

    let keywords: Vec<BTreeSet<String>> = articles.par_iter().map(|a| keyword_set(&a.title)).collect();
    let mut assigned = vec![false; articles.len()];
    let mut clusters: Vec<StoryCluster> = Vec::new();
    let mut rejected = 0usize;

    for i in 0..articles.len() {
        if assigned[i] {
            continue;
        }

        let unassigned: Vec<usize> = (0..articles.len())
            .filter(|&j| j != i && !assigned[j])
            .collect();
        let seed_keywords = &keywords[i];
        let similar: Vec<usize> = unassigned
            .par_iter()
            .filter(|&&j| jaccard(seed_keywords, &keywords[j]) >= params.threshold)
            .copied()
            .collect();

        let mut members_idx = Vec::with_capacity(similar.len() + 1);
        members_idx.push(i);
        members_idx.extend(similar);

        let sources: HashSet<&str> = members_idx.iter().map(|&m| articles[m].source.as_str()).collect();
        if members_idx.len() < 2 || sources.len() < params.min_sources {
            if members_idx.len() >= 2 {
                rejected += 1;
                debug!(
                    "Candidate dropped - seed={:?}, members={}, sources={}",
                    articles[i].title,
                    members_idx.len(),
                    sources.len()
                );
            }
            continue;
        }

        for &m in &members_idx {
            assigned[m] = true;
        }
        clusters.push(build_cluster(articles, &members_idx, params));
    }

    // stable: ties keep insertion order
    clusters.sort_by(|a, b| b.distinct_leans().cmp(&a.distinct_leans()));

    info!(
        "Clustering completed - articles={}, clusters={}, rejected_candidates={}, competing={}",
        articles.len(),
        clusters.len(),
        rejected,
        clusters.iter().filter(|c| c.has_competing_narratives).count()
    );

    clusters
}

fn build_cluster(articles: &[Article], members_idx: &[usize], params: &ClusterParams) -> StoryCluster {
    let seed = &articles[members_idx[0]];
    let members: Vec<Article> = members_idx.iter().map(|&m| articles[m].clone()).collect();

    let mut lean_counts: BTreeMap<PoliticalLean, usize> = BTreeMap::new();
    for a in &members {
        *lean_counts.entry(a.lean).or_default() += 1;
    }
    let distinct_leans = lean_counts.values().filter(|&&n| n > 0).count();

    let topic = title_keywords(&seed.title)
        .into_iter()
        .take(params.topic_keywords)
        .join(" ");

    // stable cluster id from seed title + member ids
    let id_seed = format!(
        "{}|{}",
        seed.title,
        members.iter().map(|a| a.id.as_str()).join(",")
    );
    let cluster_id = format!("{:016x}", xxh3_64(id_seed.as_bytes()));

    StoryCluster {
        cluster_id,
        topic,
        balance: topic_balance(&lean_counts),
        has_competing_narratives: distinct_leans >= params.competing_min_leans,
        lean_counts,
        members,
    }
}

/// Wedge when one side of the spectrum dominates coverage, bridge when left
/// and right coverage is roughly even. Center coverage does not count.
pub fn topic_balance(lean_counts: &BTreeMap<PoliticalLean, usize>) -> TopicBalance {
    let (mut left, mut right) = (0usize, 0usize);
    for (lean, n) in lean_counts {
        match lean.bucket() {
            Bucket::Left => left += n,
            Bucket::Right => right += n,
            Bucket::Center => {}
        }
    }
    let hi = left.max(right);
    if hi == 0 {
        return TopicBalance::Mixed;
    }
    let ratio = left.min(right) as f64 / hi as f64;
    if ratio >= 0.67 {
        TopicBalance::Bridge
    } else if ratio <= 0.25 {
        TopicBalance::Wedge
    } else {
        TopicBalance::Mixed
    }
}
