use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::models::{Annotations, Article};
use crate::similarity::normalized_tokens;

/// Which slice of the backlog a pass wants.
#[derive(Debug, Clone)]
pub enum BatchFilter {
    /// Items without a content-type label, most recent first.
    Unclassified { limit: usize },
    /// Items whose title or snippet mentions any keyword, published at or after `since`.
    Matching {
        keywords: Vec<String>,
        since: DateTime<Utc>,
        limit: usize,
    },
    /// Everything published at or after `since`, oldest first.
    Since { since: DateTime<Utc> },
}

pub trait ItemSource {
    fn fetch_batch(&self, filter: &BatchFilter) -> Result<Vec<Article>>;
}

pub trait ItemSink {
    /// Idempotent upsert of the mutable annotation fields; last write wins.
    fn write_annotations(&mut self, id: &str, annotations: &Annotations) -> Result<()>;
}

/// Articles kept one JSON object per line. Loaded fully into memory,
/// written back with `save`.
#[derive(Debug, Default)]
pub struct JsonlStore {
    path: Option<PathBuf>,
    articles: Vec<Article>,
    by_id: HashMap<String, usize>,
    dirty: bool,
}

impl JsonlStore {
    pub fn open(path: &Path) -> Result<Self> {
        let start = std::time::Instant::now();
        let file = std::fs::File::open(path)
            .with_context(|| format!("Opening article store {}", path.display()))?;

        let mut articles = Vec::new();
        for (n, line) in BufReader::new(file).lines().enumerate() {
            let line = line.with_context(|| format!("Reading line {} of {}", n + 1, path.display()))?;
            if line.trim().is_empty() {
                continue;
            }
            let article: Article = serde_json::from_str(&line)
                .with_context(|| format!("Decoding article on line {} of {}", n + 1, path.display()))?;
            articles.push(article);
        }

        let mut store = Self::from_articles(normalize_articles(articles));
        store.path = Some(path.to_path_buf());
        info!(
            "Article store loaded - path={}, articles={}, duration={:.2}s",
            path.display(),
            store.len(),
            start.elapsed().as_secs_f32()
        );
        Ok(store)
    }

    /// In-memory store; later articles with a duplicate id replace earlier ones.
    pub fn from_articles(articles: Vec<Article>) -> Self {
        let mut store = Self::default();
        for a in articles {
            match store.by_id.get(&a.id) {
                Some(&i) => {
                    debug!("Duplicate article id replaced - id={}", a.id);
                    store.articles[i] = a;
                }
                None => {
                    store.by_id.insert(a.id.clone(), store.articles.len());
                    store.articles.push(a);
                }
            }
        }
        store
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn get(&self, id: &str) -> Option<&Article> {
        self.by_id.get(id).map(|&i| &self.articles[i])
    }

    /// Write back to the file the store was opened from. No-op when clean.
    pub fn save(&mut self) -> Result<()> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };
        if !self.dirty {
            debug!("Article store unchanged - skipping save");
            return Ok(());
        }
        self.save_to(&path)?;
        self.dirty = false;
        Ok(())
    }

    /// Atomic write: temp file next to the target, then rename.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let tmp = path.with_extension("jsonl.tmp");
        {
            let file = std::fs::File::create(&tmp)
                .with_context(|| format!("Creating {}", tmp.display()))?;
            let mut w = BufWriter::new(file);
            for a in &self.articles {
                serde_json::to_writer(&mut w, a)?;
                w.write_all(b"\n")?;
            }
            w.flush()?;
        }
        std::fs::rename(&tmp, path)
            .with_context(|| format!("Replacing {} with {}", path.display(), tmp.display()))?;
        info!("Article store saved - path={}, articles={}", path.display(), self.len());
        Ok(())
    }
}

impl ItemSource for JsonlStore {
    fn fetch_batch(&self, filter: &BatchFilter) -> Result<Vec<Article>> {
        let batch: Vec<Article> = match filter {
            BatchFilter::Unclassified { limit } => {
                let mut pending: Vec<&Article> = self
                    .articles
                    .iter()
                    .filter(|a| !a.annotations.is_classified())
                    .collect();
                pending.sort_by(|a, b| b.published_at.cmp(&a.published_at));
                pending.into_iter().take(*limit).cloned().collect()
            }
            BatchFilter::Matching { keywords, since, limit } => {
                let needles: Vec<String> = keywords.iter().flat_map(|k| normalized_tokens(k)).collect();
                let mut hits: Vec<&Article> = self
                    .articles
                    .iter()
                    .filter(|a| a.published_at >= *since && mentions_any(a, &needles))
                    .collect();
                hits.sort_by(|a, b| b.published_at.cmp(&a.published_at));
                hits.into_iter().take(*limit).cloned().collect()
            }
            BatchFilter::Since { since } => {
                let mut recent: Vec<&Article> =
                    self.articles.iter().filter(|a| a.published_at >= *since).collect();
                recent.sort_by(|a, b| a.published_at.cmp(&b.published_at));
                recent.into_iter().cloned().collect()
            }
        };
        debug!("Batch fetched - filter={:?}, articles={}", filter, batch.len());
        Ok(batch)
    }
}

impl ItemSink for JsonlStore {
    fn write_annotations(&mut self, id: &str, annotations: &Annotations) -> Result<()> {
        match self.by_id.get(id) {
            Some(&i) => {
                self.articles[i].annotations = annotations.clone();
                self.dirty = true;
            }
            None => warn!("Annotation for unknown article skipped - id={}", id),
        }
        Ok(())
    }
}

fn mentions_any(article: &Article, needles: &[String]) -> bool {
    if needles.is_empty() {
        return false;
    }
    let mut words: HashSet<String> = normalized_tokens(&article.title).into_iter().collect();
    if let Some(snippet) = &article.snippet {
        words.extend(normalized_tokens(snippet));
    }
    needles.iter().any(|n| words.contains(n))
}

pub fn normalize_articles(mut articles: Vec<Article>) -> Vec<Article> {
    for a in articles.iter_mut() {
        a.title = a.title.trim().to_string();
        a.source = a.source.trim().to_string();
    }
    articles
}
