use aho_corasick::{AhoCorasick, MatchKind};
use regex::{Captures, Regex};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

use crate::error::DictionaryError;
use crate::models::TermLean;

static BUILTIN_TERMS: &str = include_str!("../data/loaded_terms.yaml");

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TermEntry {
    pub phrase: String,
    pub neutral: String,
    pub lean: TermLean,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DictionaryFile {
    version: u32,
    terms: Vec<TermEntry>,
}

/// Loaded phrase -> neutral rephrasing table, read-only after load.
///
/// Entries are kept longest phrase first. Matching runs one overlapping
/// Aho-Corasick pass over the lower-cased text and then applies `\b` rules at
/// both ends of every hit, which reports exactly the entries a per-phrase
/// `(?i)\bphrase\b` regex scan would.
#[derive(Debug, Clone)]
pub struct TermDictionary {
    version: u32,
    entries: Vec<TermEntry>,
    matcher: AhoCorasick,
    rewrite: Regex,
    by_phrase: HashMap<String, usize>,
}

impl TermDictionary {
    /// The dictionary shipped with the crate.
    pub fn builtin() -> Result<Self, DictionaryError> {
        Self::from_yaml(BUILTIN_TERMS)
    }

    pub fn load(path: &Path) -> Result<Self, DictionaryError> {
        let raw = std::fs::read_to_string(path).map_err(|source| DictionaryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let dict = Self::from_yaml(&raw)?;
        info!(
            "Term dictionary loaded - path={}, version={}, terms={}",
            path.display(),
            dict.version,
            dict.len()
        );
        Ok(dict)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, DictionaryError> {
        let file: DictionaryFile = serde_yaml::from_str(raw)?;
        Self::from_entries(file.version, file.terms)
    }

    pub fn from_entries(version: u32, mut entries: Vec<TermEntry>) -> Result<Self, DictionaryError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for (index, e) in entries.iter_mut().enumerate() {
            e.phrase = e.phrase.trim().to_string();
            if e.phrase.is_empty() {
                return Err(DictionaryError::EmptyPhrase { index });
            }
            if !seen.insert(e.phrase.to_lowercase()) {
                return Err(DictionaryError::DuplicatePhrase(e.phrase.clone()));
            }
        }

        // stable: equal-length phrases keep file order
        entries.sort_by(|a, b| b.phrase.chars().count().cmp(&a.phrase.chars().count()));
        let by_phrase: HashMap<String, usize> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.phrase.to_lowercase(), i))
            .collect();

        let patterns: Vec<String> = entries.iter().map(|e| e.phrase.to_lowercase()).collect();
        let matcher = AhoCorasick::builder()
            .match_kind(MatchKind::Standard)
            .build(&patterns)
            .map_err(|e| DictionaryError::Matcher(e.to_string()))?;

        // Alternation is leftmost-first, so listing longer phrases first makes
        // "woke mob" win over "woke" at the same position.
        let alternation = entries
            .iter()
            .map(|e| regex::escape(&e.phrase))
            .collect::<Vec<_>>()
            .join("|");
        let rewrite = Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))?;

        debug!("Term dictionary compiled - version={}, terms={}", version, entries.len());

        Ok(Self {
            version,
            entries,
            matcher,
            rewrite,
            by_phrase,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in matching order (longest phrase first).
    pub fn entries(&self) -> &[TermEntry] {
        &self.entries
    }

    pub fn lookup(&self, phrase: &str) -> Option<&TermEntry> {
        self.by_phrase
            .get(&phrase.to_lowercase())
            .map(|&i| &self.entries[i])
    }

    /// Every entry that occurs at least once in `text` on word boundaries,
    /// in dictionary order.
    pub fn find_terms(&self, text: &str) -> Vec<&TermEntry> {
        let lowered = text.to_lowercase();
        let mut hit = vec![false; self.entries.len()];
        for m in self.matcher.find_overlapping_iter(&lowered) {
            let idx = m.pattern().as_usize();
            if hit[idx] {
                continue;
            }
            if is_boundary(&lowered, m.start()) && is_boundary(&lowered, m.end()) {
                hit[idx] = true;
            }
        }
        self.entries
            .iter()
            .zip(hit)
            .filter_map(|(e, h)| h.then_some(e))
            .collect()
    }

    /// Rewrite loaded phrases in a headline to their neutral forms.
    pub fn neutralize(&self, headline: &str) -> String {
        if self.entries.is_empty() {
            return headline.to_string();
        }
        self.rewrite
            .replace_all(headline, |caps: &Captures| {
                let matched = &caps[0];
                match self.lookup(matched) {
                    Some(entry) => match_leading_case(matched, &entry.neutral),
                    None => matched.to_string(),
                }
            })
            .into_owned()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Same rule as regex `\b`: word-ness differs on either side of `pos`.
fn is_boundary(text: &str, pos: usize) -> bool {
    let before = text[..pos].chars().next_back().is_some_and(is_word_char);
    let after = text[pos..].chars().next().is_some_and(is_word_char);
    before != after
}

fn match_leading_case(original: &str, replacement: &str) -> String {
    let starts_upper = original.chars().next().is_some_and(char::is_uppercase);
    if !starts_upper {
        return replacement.to_string();
    }
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
