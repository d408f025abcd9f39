use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use url::Url;

use crate::models::ContentType;

/// Minimum full-text length before the linguistic heuristics are consulted.
pub const MIN_CONTENT_CHARS: usize = 100;
pub const DEFAULT_CONFIDENCE: f64 = 0.3;

#[derive(Debug, Clone, Copy)]
pub struct ClassifierInput<'a> {
    pub source: &'a str,
    pub url: &'a str,
    pub title: &'a str,
    pub content: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub content_type: ContentType,
    pub confidence: f64,
    pub signals: Vec<String>,
}

/// One step of the decision cascade. `check` yields the label plus a
/// human-readable justification; the rule owns the confidence.
pub struct Rule {
    pub name: &'static str,
    pub confidence: f64,
    pub check: fn(&ClassifierInput<'_>) -> Option<(ContentType, String)>,
}

/// Evaluated top to bottom, first hit wins.
pub static RULES: &[Rule] = &[
    Rule { name: "known_source", confidence: 0.9, check: known_source },
    Rule { name: "wire_domain", confidence: 0.85, check: wire_domain },
    Rule { name: "url_path", confidence: 0.75, check: url_path },
    Rule { name: "title_pattern", confidence: 0.7, check: title_pattern },
    Rule { name: "first_person", confidence: 0.7, check: first_person_content },
    Rule { name: "explanatory", confidence: 0.65, check: explanatory_content },
    Rule { name: "attribution", confidence: 0.6, check: attribution_content },
];

pub fn classify(input: &ClassifierInput<'_>) -> Classification {
    classify_with(RULES, input)
}

pub fn classify_with(rules: &[Rule], input: &ClassifierInput<'_>) -> Classification {
    for rule in rules {
        if let Some((content_type, why)) = (rule.check)(input) {
            return Classification {
                content_type,
                confidence: rule.confidence,
                signals: vec![format!("{}: {}", rule.name, why)],
            };
        }
    }
    Classification {
        content_type: ContentType::Reporting,
        confidence: DEFAULT_CONFIDENCE,
        signals: vec!["default: no rule matched".to_string()],
    }
}

static KNOWN_SOURCES: &[(&str, ContentType)] = &[
    ("Reuters", ContentType::Wire),
    ("Associated Press", ContentType::Wire),
    ("AP", ContentType::Wire),
    ("AP News", ContentType::Wire),
    ("AFP", ContentType::Wire),
    ("Agence France-Presse", ContentType::Wire),
    ("UPI", ContentType::Wire),
    ("Bloomberg", ContentType::Wire),
    ("The Conversation", ContentType::Analysis),
    ("FiveThirtyEight", ContentType::Analysis),
    ("Brookings", ContentType::Analysis),
    ("Lawfare", ContentType::Analysis),
    ("The Dispatch", ContentType::Analysis),
    ("WSJ Opinion", ContentType::Opinion),
    ("NYT Opinion", ContentType::Opinion),
    ("WSJ Editorial Board", ContentType::Editorial),
];

static WIRE_DOMAINS: &[&str] = &["reuters.com", "apnews.com", "afp.com", "upi.com"];

static URL_PATTERNS: Lazy<Vec<(ContentType, Regex)>> = Lazy::new(|| {
    vec![
        (ContentType::Editorial, re(r"(?i)/(?:editorials?|our-view|the-board)(?:/|-|$)")),
        (ContentType::Opinion, re(r"(?i)/(?:opinions?|commentary|op-?eds?|columns?|columnists?|voices)(?:/|-|$)")),
        (ContentType::Analysis, re(r"(?i)/(?:analysis|news-analysis|explainers?|explained|fact-?check)(?:/|-|$)")),
        (ContentType::Reporting, re(r"(?i)/(?:exclusives?|investigations?)(?:/|-|$)")),
    ]
});

static TITLE_PATTERNS: Lazy<Vec<(ContentType, Regex)>> = Lazy::new(|| {
    vec![
        (ContentType::Editorial, re(r"(?i)^\s*(?:editorial|our view|the editorial board)\s*[:|\-]")),
        (ContentType::Opinion, re(r"(?i)^\s*(?:opinion|op-ed|column|commentary|letter)\s*[:|\-]")),
        (ContentType::Analysis, re(r"(?i)^\s*(?:analysis|news analysis|explainer|fact check)\s*[:|\-]")),
        (ContentType::Reporting, re(r"(?i)^\s*(?:exclusive|breaking|investigation)\s*[:|\-]")),
    ]
});

static FIRST_PERSON: Lazy<Regex> =
    Lazy::new(|| re(r"(?i)\bI\s+(?:think|believe|argue|feel|contend)\b"));
static EXPLANATORY: Lazy<Regex> = Lazy::new(|| {
    re(r"(?i)\b(?:this means|here's (?:why|what|how)|here is (?:why|what|how)|the takeaway|what this means|the bottom line)\b")
});
static ATTRIBUTION: Lazy<Regex> = Lazy::new(|| {
    re(r"(?i)\b(?:according to|officials? said|spokes(?:man|woman|person) said|documents show|records show|data show(?:s|ed)?|told reporters)\b")
});

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static classifier pattern")
}

fn known_source(input: &ClassifierInput<'_>) -> Option<(ContentType, String)> {
    let source = input.source.trim();
    KNOWN_SOURCES
        .iter()
        .find(|(name, _)| *name == source)
        .map(|(name, ct)| (*ct, format!("source {:?} is a known {} outlet", name, ct.as_str())))
}

fn wire_domain(input: &ClassifierInput<'_>) -> Option<(ContentType, String)> {
    let host = url_host(input.url)?;
    WIRE_DOMAINS
        .iter()
        .find(|d| host == **d || host.ends_with(&format!(".{}", d)))
        .map(|d| (ContentType::Wire, format!("host {} is wire domain {}", host, d)))
}

fn url_path(input: &ClassifierInput<'_>) -> Option<(ContentType, String)> {
    let path = match Url::parse(input.url) {
        Ok(u) => u.path().to_string(),
        Err(_) => input.url.to_string(),
    };
    first_pattern_hit(&URL_PATTERNS, &path).map(|(ct, m)| (ct, format!("url path segment {:?}", m)))
}

fn title_pattern(input: &ClassifierInput<'_>) -> Option<(ContentType, String)> {
    first_pattern_hit(&TITLE_PATTERNS, input.title)
        .map(|(ct, m)| (ct, format!("title prefix {:?}", m.trim())))
}

fn first_person_content(input: &ClassifierInput<'_>) -> Option<(ContentType, String)> {
    family_threshold(input, &FIRST_PERSON, 2, ContentType::Opinion, "first-person opinion phrases")
}

fn explanatory_content(input: &ClassifierInput<'_>) -> Option<(ContentType, String)> {
    family_threshold(input, &EXPLANATORY, 2, ContentType::Analysis, "explanatory connectives")
}

fn attribution_content(input: &ClassifierInput<'_>) -> Option<(ContentType, String)> {
    family_threshold(input, &ATTRIBUTION, 3, ContentType::Reporting, "attribution phrases")
}

fn family_threshold(
    input: &ClassifierInput<'_>,
    family: &Regex,
    min: usize,
    content_type: ContentType,
    label: &str,
) -> Option<(ContentType, String)> {
    let text = input.content.filter(|c| c.chars().count() >= MIN_CONTENT_CHARS)?;
    let n = family.find_iter(text).count();
    (n >= min).then(|| (content_type, format!("{} {} (>= {})", n, label, min)))
}

fn first_pattern_hit<'t>(patterns: &[(ContentType, Regex)], text: &'t str) -> Option<(ContentType, &'t str)> {
    patterns
        .iter()
        .find_map(|(ct, re)| re.find(text).map(|m| (*ct, m.as_str())))
}

/// Lower-cased host without a leading `www.`.
pub fn url_host(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    let host = parsed.host_str()?;
    Some(host.trim_start_matches("www.").to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(source: &'a str, url: &'a str, title: &'a str, content: Option<&'a str>) -> ClassifierInput<'a> {
        ClassifierInput { source, url, title, content }
    }

    #[test]
    fn known_source_wins_before_domain_check() {
        let c = classify(&input("Reuters", "https://reuters.com/world/us/some-story", "Talks resume", None));
        assert_eq!(c.content_type, ContentType::Wire);
        assert_eq!(c.confidence, 0.9);
        assert!(c.signals[0].starts_with("known_source"));
    }

    #[test]
    fn wire_domain_matches_subdomains() {
        let c = classify(&input("Yahoo News", "https://www.apnews.com/article/abc", "Talks resume", None));
        assert_eq!(c.content_type, ContentType::Wire);
        assert_eq!(c.confidence, 0.85);

        let c = classify(&input("Yahoo News", "https://uk.reuters.com/x", "Talks resume", None));
        assert_eq!(c.content_type, ContentType::Wire);

        let c = classify(&input("Yahoo News", "https://notreuters.com/x", "Talks resume", None));
        assert_ne!(c.confidence, 0.85);
    }

    #[test]
    fn url_path_rules() {
        let c = classify(&input("Daily", "https://daily.example/opinion/2026/10/tax", "Taxes", None));
        assert_eq!((c.content_type, c.confidence), (ContentType::Opinion, 0.75));

        let c = classify(&input("Daily", "https://daily.example/opinion/editorials/tax", "Taxes", None));
        assert_eq!(c.content_type, ContentType::Editorial);

        let c = classify(&input("Daily", "https://daily.example/news/analysis/tax", "Taxes", None));
        assert_eq!(c.content_type, ContentType::Analysis);

        let c = classify(&input("Daily", "https://daily.example/exclusive/leak", "Leak", None));
        assert_eq!(c.content_type, ContentType::Reporting);
        assert_eq!(c.confidence, 0.75);
    }

    #[test]
    fn url_path_ignores_lookalike_words() {
        let c = classify(&input("Daily", "https://daily.example/news/opinionated-cats", "Cats", None));
        assert_eq!(c.content_type, ContentType::Reporting);
        assert_eq!(c.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn title_prefix_rules() {
        let c = classify(&input("Daily", "https://daily.example/a", "Opinion: The tax plan is a mistake", None));
        assert_eq!((c.content_type, c.confidence), (ContentType::Opinion, 0.7));

        let c = classify(&input("Daily", "https://daily.example/a", "Analysis: What the ruling means", None));
        assert_eq!(c.content_type, ContentType::Analysis);

        let c = classify(&input("Daily", "https://daily.example/a", "EXCLUSIVE: Memo reveals plan", None));
        assert_eq!(c.content_type, ContentType::Reporting);
    }

    #[test]
    fn content_heuristics_follow_priority_order() {
        let opinion = "I think the plan fails. I believe voters agree, and here's why: this means trouble. \
                       According to officials, nothing is settled, and this means more delay.";
        let c = classify(&input("Daily", "https://daily.example/a", "The plan", Some(opinion)));
        assert_eq!((c.content_type, c.confidence), (ContentType::Opinion, 0.7));

        let analysis = "This means the budget will shrink. Here's why the committee matters for the next \
                        fiscal year and for the agencies that rely on it.";
        let c = classify(&input("Daily", "https://daily.example/a", "The plan", Some(analysis)));
        assert_eq!((c.content_type, c.confidence), (ContentType::Analysis, 0.65));

        let reporting = "According to the filing, the firm paid $2 million. Officials said the review continues. \
                         Documents show the payments began last year.";
        let c = classify(&input("Daily", "https://daily.example/a", "The plan", Some(reporting)));
        assert_eq!((c.content_type, c.confidence), (ContentType::Reporting, 0.6));
    }

    #[test]
    fn short_content_is_ignored() {
        let c = classify(&input("Daily", "https://daily.example/a", "The plan", Some("I think. I believe.")));
        assert_eq!(c.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn empty_input_falls_through_to_default() {
        let c = classify(&input("", "", "", None));
        assert_eq!(c.content_type, ContentType::Reporting);
        assert_eq!(c.confidence, DEFAULT_CONFIDENCE);
        assert_eq!(c.signals.len(), 1);
    }

    #[test]
    fn rules_can_be_evaluated_in_isolation() {
        let only_title = [Rule { name: "title_pattern", confidence: 0.7, check: title_pattern }];
        let c = classify_with(&only_title, &input("Reuters", "https://reuters.com/x", "Editorial: Fund the parks", None));
        assert_eq!(c.content_type, ContentType::Editorial);
    }
}
