use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::dictionary::TermDictionary;
use crate::models::{LoadedTermMatch, TermLean};

pub const SENSATIONAL_TERM_WEIGHT: f64 = 0.15;
pub const LEANING_TERM_WEIGHT: f64 = 0.08;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativeAnalysis {
    pub emotional_score: f64,
    pub loaded_terms: Vec<LoadedTermMatch>,
    pub signals: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SourceCounts {
    pub named: u32,
    pub anonymous: u32,
}

struct EmotionalPattern {
    label: &'static str,
    weight: f64,
    re: Regex,
}

static EMOTIONAL_PATTERNS: Lazy<Vec<EmotionalPattern>> = Lazy::new(|| {
    vec![
        EmotionalPattern {
            label: "shock words",
            weight: 0.10,
            re: re(r"\b(?:shocking|shocked|stunning|stunned|bombshell|explosive|jaw-dropping|horrifying|unbelievable)\b"),
        },
        EmotionalPattern {
            label: "outrage words",
            weight: 0.08,
            re: re(r"\b(?:outrage|outraged|outrageous|furious|fury|enraged|livid|disgraceful|scandalous)\b"),
        },
        EmotionalPattern {
            label: "destructive verbs",
            weight: 0.08,
            re: re(r"\b(?:destroys?|destroyed|obliterates?|obliterated|annihilates?|crushes|crushed|eviscerates?|eviscerated|demolishes|demolished|wrecks|wrecked)\b"),
        },
        EmotionalPattern {
            label: "hero/villain nouns",
            weight: 0.06,
            re: re(r"\b(?:heroe?s?|villains?|savio(?:u)?rs?|traitors?|monsters?|patriots?)\b"),
        },
        EmotionalPattern {
            label: "repeated exclamation",
            weight: 0.05,
            re: re(r"!{2,}"),
        },
        EmotionalPattern {
            label: "repeated question marks",
            weight: 0.03,
            re: re(r"\?{2,}"),
        },
    ]
});

const REPORTING_VERBS: &str = "said|stated|told|confirmed|argued|noted";

static NAMED_SPEAKER: Lazy<Regex> =
    Lazy::new(|| re(&format!(r"\b[A-Z][a-z]+ [A-Z][a-z]+ (?:{})\b", REPORTING_VERBS)));
static NAMED_ACCORDING: Lazy<Regex> =
    Lazy::new(|| re(r"\b[Aa]ccording to [A-Z][a-z]+ [A-Z][a-z]+\b"));
static ANONYMOUS: Lazy<Regex> = Lazy::new(|| {
    re(r"(?i)\b(?:a source|sources (?:said|say|told)|(?:an? |senior |administration |two |several )?officials|an official|people familiar with|a person familiar with|spoke on (?:the )?condition of anonymity|not authorized to speak publicly|declined to be named|anonymous sources?)\b")
});

static EXCLUSIVE_LANGUAGE: Lazy<Regex> = Lazy::new(|| {
    re(r"(?i)\b(?:exclusive|investigation|investigative|obtained by|documents obtained|internal documents|leaked (?:memo|documents?|emails?))\b")
});
static INTERVIEW_LANGUAGE: Lazy<Regex> = Lazy::new(|| {
    re(r"(?i)\b(?:told (?:me|us)|in an interview with|(?:I|we) interviewed|speaking to (?:me|us)|said in an interview)\b")
});
static DOCUMENT_LANGUAGE: Lazy<Regex> = Lazy::new(|| {
    re(r"(?i)\b(?:according to (?:a |the )?(?:documents?|filings?|records?|memo|report)|court (?:filings?|records|documents)|documents (?:show|reviewed)|records show|reviewed by)\b")
});
static WIRE_LANGUAGE: Lazy<Regex> = Lazy::new(|| {
    re(r"(?i)(?:\((?:ap|reuters|afp)\)|\b(?:reuters|associated press|agence france-presse|contributed to this report|wire services?)\b)")
});
static INVESTIGATIVE_URL: Lazy<Regex> =
    Lazy::new(|| re(r"(?i)/(?:exclusives?|investigations?)(?:/|-|$)"));

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static narrative pattern")
}

/// Score loaded and emotional language in a title plus optional body text.
pub fn analyze_narrative(dict: &TermDictionary, title: &str, content: Option<&str>) -> NarrativeAnalysis {
    let text = match content {
        Some(c) => format!("{} {}", title, c),
        None => title.to_string(),
    }
    .to_lowercase();

    let mut score = 0.0f64;
    let mut loaded_terms = Vec::new();
    let mut signals = Vec::new();

    for entry in dict.find_terms(&text) {
        score += match entry.lean {
            TermLean::Sensational => SENSATIONAL_TERM_WEIGHT,
            TermLean::Left | TermLean::Right => LEANING_TERM_WEIGHT,
        };
        signals.push(format!("loaded term {:?} ({})", entry.phrase, entry.lean.as_str()));
        loaded_terms.push(LoadedTermMatch {
            term: entry.phrase.clone(),
            neutral: entry.neutral.clone(),
            lean: entry.lean,
        });
    }

    for pattern in EMOTIONAL_PATTERNS.iter() {
        let n = pattern.re.find_iter(&text).count();
        if n > 0 {
            score += pattern.weight * n as f64;
            signals.push(format!("{} x{}", pattern.label, n));
        }
    }

    NarrativeAnalysis {
        emotional_score: score.clamp(0.0, 1.0),
        loaded_terms,
        signals,
    }
}

/// Named vs anonymous attributions in body text. Case matters for named sources.
pub fn count_sources(content: Option<&str>) -> SourceCounts {
    let Some(text) = content else {
        return SourceCounts::default();
    };
    let named = NAMED_SPEAKER.find_iter(text).count() + NAMED_ACCORDING.find_iter(text).count();
    let anonymous = ANONYMOUS.find_iter(text).count();
    SourceCounts {
        named: named as u32,
        anonymous: anonymous as u32,
    }
}

pub fn primary_source_score(content: Option<&str>, url: &str) -> i32 {
    let text = content.unwrap_or("");
    let mut score = 0;
    if EXCLUSIVE_LANGUAGE.is_match(text) || INVESTIGATIVE_URL.is_match(url) {
        score += 2;
    }
    if INTERVIEW_LANGUAGE.is_match(text) {
        score += 1;
    }
    if DOCUMENT_LANGUAGE.is_match(text) {
        score += 1;
    }
    if WIRE_LANGUAGE.is_match(text) {
        score -= 1;
    }
    score
}

pub fn is_primary_source(content: Option<&str>, url: &str) -> bool {
    primary_source_score(content, url) >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict() -> TermDictionary {
        TermDictionary::builtin().unwrap()
    }

    #[test]
    fn doomer_headline_scores_three_terms() {
        let a = analyze_narrative(&dict(), "AI doomers warn of existential risk from superintelligence", None);
        let terms: Vec<&str> = a.loaded_terms.iter().map(|t| t.term.as_str()).collect();
        assert!(terms.contains(&"ai doomers"));
        assert!(terms.contains(&"existential risk"));
        assert!(terms.contains(&"superintelligence"));
        assert_eq!(a.loaded_terms.len(), 3);

        let doomers = a.loaded_terms.iter().find(|t| t.term == "ai doomers").unwrap();
        assert_eq!(doomers.lean, TermLean::Right);
        assert_eq!(doomers.neutral, "AI safety advocates");

        assert!((a.emotional_score - 0.38).abs() < 1e-9, "score was {}", a.emotional_score);
    }

    #[test]
    fn emotional_patterns_are_weighted_by_count() {
        let a = analyze_narrative(&dict(), "Shocking!! Is this stunning??", None);
        // 2 shock words, one "!!" run, one "??" run
        let expected = 0.10 * 2.0 + 0.05 + 0.03;
        assert!((a.emotional_score - expected).abs() < 1e-9, "score was {}", a.emotional_score);
        assert!(a.loaded_terms.is_empty());
    }

    #[test]
    fn score_is_clamped_to_one() {
        let title = "Shocking bombshell!!! Furious villains destroy everything in catastrophic chaos crisis disaster";
        let a = analyze_narrative(&dict(), title, Some(&title.repeat(20)));
        assert_eq!(a.emotional_score, 1.0);
    }

    #[test]
    fn empty_text_scores_zero() {
        let a = analyze_narrative(&dict(), "", None);
        assert_eq!(a.emotional_score, 0.0);
        assert!(a.loaded_terms.is_empty());
        assert!(a.signals.is_empty());
    }

    #[test]
    fn counts_named_and_anonymous_sources() {
        let text = "Maria Lopez said the vote was close. According to John Smith, the bill stalls. \
                    Officials said talks continue, and a source close to the process, who spoke on \
                    condition of anonymity, disagreed.";
        let c = count_sources(Some(text));
        assert_eq!(c.named, 2);
        assert_eq!(c.anonymous, 3);
    }

    #[test]
    fn missing_content_counts_zero_sources() {
        assert_eq!(count_sources(None), SourceCounts::default());
    }

    #[test]
    fn primary_source_scoring() {
        let investigative = "Internal documents obtained by the paper show the plan. According to the documents, \
                             staff were warned.";
        assert!(is_primary_source(Some(investigative), "https://paper.example/news/plan"));

        let wire = "Internal documents show the plan, Reuters reported.";
        // +2 exclusive, +1 documents, -1 wire
        assert_eq!(primary_source_score(Some(wire), "https://paper.example/a"), 2);

        let plain = "The council met on Tuesday and discussed the plan.";
        assert!(!is_primary_source(Some(plain), "https://paper.example/a"));
        assert!(is_primary_source(None, "https://paper.example/investigations/plan"));
    }
}
