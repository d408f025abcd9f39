use itertools::Itertools;
use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashSet};
use unicode_normalization::UnicodeNormalization;

use crate::models::Article;

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "and", "or", "but", "if", "then", "of", "to", "in", "on", "for", "with", "as",
        "by", "is", "are", "was", "were", "be", "been", "being", "that", "this", "these", "those", "it",
        "its", "at", "from", "into", "over", "under", "about", "after", "before", "between", "during",
        "without", "within", "than", "not", "no", "yes", "more", "most", "less", "least", "very", "much",
        "many", "some", "any", "such", "what", "when", "where", "which", "while", "who", "whom", "why",
        "how", "will", "would", "could", "should", "says", "said", "say", "amid", "against", "their",
        "there", "they", "them", "your", "have", "has", "had", "just", "also", "onto",
        "upon", "here", "news", "live", "update", "updates", "breaking", "report", "reports",
    ]
    .into_iter()
    .collect()
});

/// Lower-cased NFC words with punctuation deleted, so "won't" stays "wont".
pub fn normalized_tokens(text: &str) -> Vec<String> {
    let normalized: String = text.nfc().collect::<String>().to_lowercase();
    normalized
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Title keywords in first-seen order: stop words and tokens of 3 chars
/// or fewer dropped.
pub fn title_keywords(title: &str) -> Vec<String> {
    normalized_tokens(title)
        .into_iter()
        .filter(|t| t.chars().count() > 3 && !STOPWORDS.contains(t.as_str()))
        .unique()
        .collect()
}

pub fn keyword_set(title: &str) -> BTreeSet<String> {
    title_keywords(title).into_iter().collect()
}

/// Intersection over union; 0 when either side is empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    inter / union
}

pub fn title_similarity(a: &Article, b: &Article) -> f64 {
    jaccard(&keyword_set(&a.title), &keyword_set(&b.title))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(title: &str) -> BTreeSet<String> {
        keyword_set(title)
    }

    #[test]
    fn keywords_drop_stopwords_and_short_tokens() {
        assert_eq!(
            title_keywords("Senate passes the budget bill, again!"),
            vec!["senate", "passes", "budget", "bill", "again"]
        );
        assert!(title_keywords("A is on to it").is_empty());
    }

    #[test]
    fn keywords_delete_punctuation_inside_tokens() {
        assert_eq!(title_keywords("Biden's plan won't pass"), vec!["bidens", "plan", "wont", "pass"]);
        assert_eq!(title_keywords("U.S.-China trade talks"), vec!["uschina", "trade", "talks"]);
    }

    #[test]
    fn jaccard_of_budget_headlines() {
        let a = set("Senate passes budget bill");
        let b = set("Congress approves spending budget bill");
        // {budget, bill} shared out of 7 distinct keywords
        assert!((jaccard(&a, &b) - 2.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn jaccard_identity_and_empty() {
        let a = set("Local bakery wins award");
        assert_eq!(jaccard(&a, &a), 1.0);
        let empty = set("on it");
        assert_eq!(jaccard(&empty, &empty), 0.0);
        assert_eq!(jaccard(&a, &empty), 0.0);
    }
}
