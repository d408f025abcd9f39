use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cluster::ClusterParams;
use crate::dictionary::TermDictionary;
use crate::triangulate::TriangulationParams;

pub const CONFIG_ENV: &str = "NEWS_LENS_CONFIG";

/// Runtime settings. Every field falls back to its default when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Term dictionary file; the embedded dictionary is used when unset.
    pub dictionary_path: Option<PathBuf>,
    pub classify_batch_limit: usize,
    pub cluster_window_hours: i64,
    pub cluster: ClusterParams,
    pub triangulation: TriangulationParams,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dictionary_path: None,
            classify_batch_limit: 500,
            cluster_window_hours: 48,
            cluster: ClusterParams::default(),
            triangulation: TriangulationParams::default(),
        }
    }
}

impl AppConfig {
    pub fn from_yaml(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).context("Decoding config YAML")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Reading config file {}", path.display()))?;
        let cfg = Self::from_yaml(&raw).with_context(|| format!("Invalid config {}", path.display()))?;
        debug!("Config loaded - path={}", path.display());
        Ok(cfg)
    }

    /// `--config` flag, then `NEWS_LENS_CONFIG`, then built-in defaults.
    pub fn resolve(cli_path: Option<&Path>) -> Result<Self> {
        if let Some(p) = cli_path {
            debug!("Using config file from --config argument: {}", p.display());
            return Self::load(p);
        }
        if let Ok(p) = std::env::var(CONFIG_ENV) {
            debug!("Using config file from {}: {}", CONFIG_ENV, p);
            return Self::load(Path::new(&p));
        }
        debug!("No config file given - using defaults");
        Ok(Self::default())
    }

    /// Load the configured term dictionary. Any problem here is fatal.
    pub fn dictionary(&self) -> Result<TermDictionary> {
        let dict = match &self.dictionary_path {
            Some(p) => TermDictionary::load(p)?,
            None => TermDictionary::builtin()?,
        };
        Ok(dict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg = AppConfig::from_yaml("cluster:\n  threshold: 0.35\nclassify_batch_limit: 50\n").unwrap();
        assert_eq!(cfg.cluster.threshold, 0.35);
        assert_eq!(cfg.cluster.min_sources, 2);
        assert_eq!(cfg.classify_batch_limit, 50);
        assert_eq!(cfg.triangulation.window_days, 3);
        assert!(cfg.dictionary_path.is_none());
    }

    #[test]
    fn unreadable_dictionary_is_fatal() {
        let cfg = AppConfig {
            dictionary_path: Some(PathBuf::from("/nonexistent/terms.yaml")),
            ..Default::default()
        };
        assert!(cfg.dictionary().is_err());
    }

    #[test]
    fn dictionary_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "version: 7\nterms:\n  - {{ phrase: \"red wave\", neutral: \"Republican gains\", lean: right }}").unwrap();
        let cfg = AppConfig {
            dictionary_path: Some(f.path().to_path_buf()),
            ..Default::default()
        };
        let dict = cfg.dictionary().unwrap();
        assert_eq!(dict.version(), 7);
        assert_eq!(dict.len(), 1);
    }
}
