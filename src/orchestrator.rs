use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::classify::{classify, ClassifierInput};
use crate::cluster::{cluster_articles, ClusterParams};
use crate::dictionary::TermDictionary;
use crate::error::AnalysisError;
use crate::models::{Annotations, Article, ContentType, StoryCluster, TriangulationResult};
use crate::narrative::{analyze_narrative, count_sources, is_primary_source};
use crate::similarity::{normalized_tokens, title_keywords};
use crate::store::{BatchFilter, ItemSink, ItemSource};
use crate::triangulate::{triangulate, TriangulationParams};

/// Upper bound on items pulled for an ad hoc topic search.
const TOPIC_SEARCH_LIMIT: usize = 200;

#[derive(Debug, Clone, Default, Serialize)]
pub struct PassSummary {
    pub fetched: usize,
    pub written: usize,
    pub by_content_type: BTreeMap<ContentType, usize>,
    pub primary_sources: usize,
    pub mean_emotional_score: f64,
}

/// All annotation fields for one item. Pure: same inputs, same output.
pub fn annotate(dict: &TermDictionary, article: &Article) -> Annotations {
    let classification = classify(&ClassifierInput {
        source: &article.source,
        url: &article.url,
        title: &article.title,
        content: article.content.as_deref(),
    });
    let narrative = analyze_narrative(dict, &article.title, article.content.as_deref());
    let sources = count_sources(article.content.as_deref());

    debug!(
        "Annotated - id={}, type={}, confidence={}, emotional={:.2}, terms={}, signals={:?}",
        article.id,
        classification.content_type.as_str(),
        classification.confidence,
        narrative.emotional_score,
        narrative.loaded_terms.len(),
        classification.signals
    );

    Annotations {
        content_type: classification.content_type,
        content_type_confidence: classification.confidence,
        emotional_score: narrative.emotional_score,
        loaded_terms: narrative.loaded_terms,
        named_source_count: sources.named,
        anonymous_source_count: sources.anonymous,
        is_primary_source: is_primary_source(article.content.as_deref(), &article.url),
    }
}

/// Annotate up to `limit` unclassified items and write the results back.
pub fn run_classification_pass<S>(store: &mut S, dict: &TermDictionary, limit: usize) -> Result<PassSummary>
where
    S: ItemSource + ItemSink,
{
    let pass_start = std::time::Instant::now();
    let batch = store.fetch_batch(&BatchFilter::Unclassified { limit })?;
    info!("Classification pass started - pending={}, limit={}", batch.len(), limit);

    // items are independent; annotate in parallel, write back in order
    let annotated: Vec<(String, Annotations)> = batch
        .par_iter()
        .map(|a| (a.id.clone(), annotate(dict, a)))
        .collect();

    let mut summary = PassSummary {
        fetched: batch.len(),
        ..Default::default()
    };
    let mut score_sum = 0.0f64;
    let total = annotated.len();
    for (i, (id, ann)) in annotated.iter().enumerate() {
        if i % 100 == 0 && i > 0 {
            let pct = (i as f32 / total as f32 * 100.0) as u32;
            info!("Write-back progress - written={}/{} ({}%)", i, total, pct);
        }
        store.write_annotations(id, ann)?;
        summary.written += 1;
        *summary.by_content_type.entry(ann.content_type).or_default() += 1;
        if ann.is_primary_source {
            summary.primary_sources += 1;
        }
        score_sum += ann.emotional_score;
    }
    if summary.written > 0 {
        summary.mean_emotional_score = score_sum / summary.written as f64;
    }

    info!(
        "Classification pass completed - duration={:.2}s, written={}, primary={}, mean_emotional={:.3}",
        pass_start.elapsed().as_secs_f32(),
        summary.written,
        summary.primary_sources,
        summary.mean_emotional_score
    );
    Ok(summary)
}

/// Cluster everything published at or after `since`.
pub fn run_cluster_pass<S: ItemSource>(
    store: &S,
    params: &ClusterParams,
    since: DateTime<Utc>,
) -> Result<Vec<StoryCluster>> {
    let start = std::time::Instant::now();
    let window = store.fetch_batch(&BatchFilter::Since { since })?;
    if window.is_empty() {
        warn!("No articles in clustering window - since={}", since);
        return Ok(Vec::new());
    }
    let clusters = cluster_articles(&window, params);
    info!(
        "Cluster pass completed - duration={:.2}s, articles={}, clusters={}",
        start.elapsed().as_secs_f32(),
        window.len(),
        clusters.len()
    );
    Ok(clusters)
}

/// Keywords used to search the store for an ad hoc topic.
pub fn topic_search_terms(topic: &str) -> Vec<String> {
    let keywords = title_keywords(topic);
    if !keywords.is_empty() {
        return keywords;
    }
    normalized_tokens(topic)
}

/// Triangulate a topic over items from the last `params.window_days` days.
///
/// The outer `Result` carries store failures; the inner one is the
/// "insufficient data" outcome, which callers should treat as no result.
pub fn run_triangulation<S: ItemSource>(
    store: &S,
    topic: &str,
    now: DateTime<Utc>,
    params: &TriangulationParams,
) -> Result<Result<TriangulationResult, AnalysisError>> {
    let keywords = topic_search_terms(topic);
    let since = now - Duration::days(params.window_days);
    debug!("Topic search - topic={:?}, keywords={:?}, since={}", topic, keywords, since);

    let items = store.fetch_batch(&BatchFilter::Matching {
        keywords,
        since,
        limit: TOPIC_SEARCH_LIMIT,
    })?;
    info!("Topic search completed - topic={:?}, items={}", topic, items.len());
    Ok(triangulate(topic, &items, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PoliticalLean;
    use crate::store::JsonlStore;
    use chrono::TimeZone;

    fn article(id: &str, source: &str, url: &str, title: &str, content: Option<&str>) -> Article {
        let ts = Utc.with_ymd_and_hms(2026, 10, 17, 9, 0, 0).unwrap();
        Article {
            id: id.to_string(),
            url: url.to_string(),
            title: title.to_string(),
            content: content.map(str::to_string),
            snippet: None,
            source: source.to_string(),
            lean: PoliticalLean::Center,
            published_at: ts,
            fetched_at: ts,
            annotations: Annotations::default(),
        }
    }

    #[test]
    fn annotate_combines_classifier_and_narrative() {
        let dict = TermDictionary::builtin().unwrap();
        let a = article(
            "1",
            "Reuters",
            "https://reuters.com/world/x",
            "AI doomers warn of existential risk from superintelligence",
            None,
        );
        let ann = annotate(&dict, &a);
        assert_eq!(ann.content_type, ContentType::Wire);
        assert_eq!(ann.content_type_confidence, 0.9);
        assert_eq!(ann.loaded_terms.len(), 3);
        assert_eq!(ann.named_source_count, 0);
        assert!(!ann.is_primary_source);
        assert_eq!(annotate(&dict, &a), ann);
    }

    #[test]
    fn classification_pass_writes_back_once() {
        let dict = TermDictionary::builtin().unwrap();
        let mut store = JsonlStore::from_articles(vec![
            article("1", "Reuters", "https://reuters.com/a", "Talks resume", None),
            article("2", "Daily", "https://daily.example/opinion/b", "Taxes again", None),
        ]);
        let summary = run_classification_pass(&mut store, &dict, 10).unwrap();
        assert_eq!(summary.written, 2);
        assert_eq!(summary.by_content_type.get(&ContentType::Wire), Some(&1));
        assert_eq!(summary.by_content_type.get(&ContentType::Opinion), Some(&1));

        let second = run_classification_pass(&mut store, &dict, 10).unwrap();
        assert_eq!(second.fetched, 0);
    }

    #[test]
    fn short_topic_does_not_match_inside_words() {
        let store = JsonlStore::from_articles(vec![
            article("1", "Sports Desk", "https://sports.example/a", "Spain wins the final", None),
            article("2", "City Desk", "https://city.example/b", "Mayor said taxes rise again", None),
        ]);
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let outcome = run_triangulation(&store, "AI", now, &TriangulationParams::default()).unwrap();
        assert_eq!(
            outcome.unwrap_err(),
            AnalysisError::InsufficientData {
                topic: "AI".to_string(),
                found: 0
            }
        );
    }

    #[test]
    fn topic_search_terms_fall_back_to_raw_words() {
        assert_eq!(topic_search_terms("Tariff ruling"), vec!["tariff", "ruling"]);
        assert_eq!(topic_search_terms("AI"), vec!["ai"]);
        assert_eq!(topic_search_terms("U.S."), vec!["us"]);
    }
}
