use anyhow::Result;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use news_lens::config::AppConfig;
use news_lens::error::AnalysisError;
use news_lens::narrative::analyze_narrative;
use news_lens::orchestrator::{run_classification_pass, run_cluster_pass, run_triangulation};
use news_lens::render::{
    render_clusters_text, render_narrative_text, render_pass_summary, render_triangulation_markdown,
};
use news_lens::store::JsonlStore;

/// News Lens - content type, loaded language and cross-lean coverage analysis
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Article store (JSON lines, one article per line)
    #[arg(short, long, global = true, default_value = "articles.jsonl")]
    store: PathBuf,

    /// Path to config file (overrides NEWS_LENS_CONFIG environment variable)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Annotate unclassified articles and write the results back to the store
    Classify {
        /// Maximum articles to annotate (defaults to classify_batch_limit)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Group recent articles into multi-source story clusters
    Cluster {
        /// Look-back window in hours (defaults to cluster_window_hours)
        #[arg(long)]
        hours: Option<i64>,
    },
    /// Compare coverage of a topic across left, center and right outlets
    Triangulate {
        #[arg(short, long)]
        topic: String,
        /// Look-back window in days (defaults to triangulation.window_days)
        #[arg(long)]
        days: Option<i64>,
    },
    /// Score loaded and emotional language in a headline
    Analyze {
        title: String,
        #[arg(long)]
        content: Option<String>,
    },
    /// Rewrite loaded phrases in a headline to neutral wording
    Neutralize { title: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    let args = Args::parse();
    debug!("Arguments parsed - {:?}", args);

    let cfg = AppConfig::resolve(args.config.as_deref())?;
    // refuse to start on a broken dictionary
    let dict = cfg.dictionary()?;
    info!("Starting news_lens - dictionary_version={}, terms={}", dict.version(), dict.len());

    match args.command {
        Command::Classify { limit } => {
            let limit = limit.unwrap_or(cfg.classify_batch_limit);
            let mut store = JsonlStore::open(&args.store)?;
            let summary = run_classification_pass(&mut store, &dict, limit)?;
            store.save()?;
            emit(args.json, &summary, || render_pass_summary(&summary))?;
        }
        Command::Cluster { hours } => {
            let hours = hours.unwrap_or(cfg.cluster_window_hours);
            let store = JsonlStore::open(&args.store)?;
            let since = Utc::now() - Duration::hours(hours);
            let clusters = run_cluster_pass(&store, &cfg.cluster, since)?;
            emit(args.json, &clusters, || render_clusters_text(&clusters))?;
        }
        Command::Triangulate { topic, days } => {
            let mut params = cfg.triangulation.clone();
            if let Some(d) = days {
                params.window_days = d;
            }
            let store = JsonlStore::open(&args.store)?;
            match run_triangulation(&store, &topic, Utc::now(), &params)? {
                Ok(result) => emit(args.json, &result, || render_triangulation_markdown(&result))?,
                Err(e) => {
                    warn!("{}", e);
                    if args.json {
                        println!("{}", serde_json::to_string_pretty(&insufficient_json(&e))?);
                    } else {
                        println!("{}", e);
                    }
                }
            }
        }
        Command::Analyze { title, content } => {
            let analysis = analyze_narrative(&dict, &title, content.as_deref());
            let neutral = dict.neutralize(&title);
            emit(args.json, &analysis, || render_narrative_text(&title, &analysis, &neutral))?;
        }
        Command::Neutralize { title } => {
            println!("{}", dict.neutralize(&title));
        }
    }
    Ok(())
}

fn insufficient_json(e: &AnalysisError) -> serde_json::Value {
    match e {
        AnalysisError::InsufficientData { topic, found } => serde_json::json!({
            "error": e.to_string(),
            "topic": topic,
            "found": found,
        }),
    }
}

fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_as_json() {
        let e = AnalysisError::InsufficientData {
            topic: "AI".to_string(),
            found: 1,
        };
        let v = insufficient_json(&e);
        assert_eq!(v["topic"], "AI");
        assert_eq!(v["found"], 1);
        assert_eq!(v["error"], e.to_string());
    }
}
