// src/render.rs
use crate::models::{Significance, StoryCluster, TriangulationResult};
use crate::narrative::NarrativeAnalysis;
use crate::orchestrator::PassSummary;

pub fn render_pass_summary(s: &PassSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("Classified {} of {} pending item(s)\n", s.written, s.fetched));
    for (ct, n) in &s.by_content_type {
        out.push_str(&format!("- {}: {}\n", ct.as_str(), n));
    }
    out.push_str(&format!("Primary-sourced: {}\n", s.primary_sources));
    out.push_str(&format!("Mean emotional score: {:.3}\n", s.mean_emotional_score));
    out
}

pub fn render_clusters_text(clusters: &[StoryCluster]) -> String {
    if clusters.is_empty() {
        return "No multi-source story clusters found.\n".to_string();
    }
    let mut out = String::new();
    for c in clusters {
        let flag = if c.has_competing_narratives { " [competing narratives]" } else { "" };
        out.push_str(&format!("## {} ({}){}\n", c.topic, c.cluster_id, flag));

        let spread: Vec<String> = c
            .lean_counts
            .iter()
            .map(|(lean, n)| format!("{}={}", lean.as_str(), n))
            .collect();
        out.push_str(&format!(
            "Coverage: {} | balance: {:?} | sources: {}\n",
            spread.join(", "),
            c.balance,
            c.distinct_sources()
        ));
        for m in c.members.iter().take(8) {
            out.push_str(&format!("- [{}] {} → {}\n", m.lean.as_str(), m.source, m.title));
        }
        if c.members.len() > 8 {
            out.push_str(&format!("- … {} more\n", c.members.len() - 8));
        }
        out.push('\n');
    }
    out
}

pub fn render_triangulation_markdown(r: &TriangulationResult) -> String {
    let mut md = String::new();
    md.push_str(&format!("# {}\n\n", r.event.trim()));
    md.push_str(&format!("Event id: `{}`\n\n", r.event_id));

    md.push_str("## Coverage\n");
    for s in &r.sources {
        md.push_str(&format!("- **{}** ({}, {} bucket)\n", s.source, s.lean.as_str(), s.bucket.as_str()));
        for item in &s.items {
            md.push_str(&format!(
                "  - {} — {} ({:.0}%), emotional {:.2}\n",
                item.title,
                item.annotations.content_type.as_str(),
                item.annotations.content_type_confidence * 100.0,
                item.annotations.emotional_score
            ));
        }
    }
    md.push('\n');

    if !r.agreed_facts.is_empty() {
        md.push_str("## Agreed Facts\n");
        for f in &r.agreed_facts {
            md.push_str(&format!("- {}\n", f));
        }
        md.push('\n');
    }

    if !r.framing_differences.is_empty() {
        md.push_str("## Framing Differences\n");
        for f in &r.framing_differences {
            md.push_str(&format!("### {}\n", f.aspect));
            for (label, headline) in [("Left", &f.left), ("Center", &f.center), ("Right", &f.right)] {
                if let Some(h) = headline {
                    md.push_str(&format!("- **{}**: {}\n", label, h));
                }
            }
        }
        md.push('\n');
    }

    if !r.omissions.is_empty() {
        md.push_str("## Omissions\n");
        for o in &r.omissions {
            let level = match o.significance {
                Significance::High => "high",
                Significance::Medium => "medium",
                Significance::Low => "low",
            };
            let included: Vec<&str> = o.included_by.iter().map(|b| b.as_str()).collect();
            let omitted: Vec<&str> = o.omitted_by.iter().map(|b| b.as_str()).collect();
            md.push_str(&format!(
                "- {} (in: {}; missing from: {}; {})\n",
                o.fact,
                included.join(", "),
                omitted.join(", "),
                level
            ));
        }
        md.push('\n');
    }

    md
}

pub fn render_narrative_text(title: &str, a: &NarrativeAnalysis, neutral: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", title.trim()));
    out.push_str(&format!("Emotional score: {:.2}\n", a.emotional_score));
    if !a.loaded_terms.is_empty() {
        out.push_str("\nLoaded terms:\n");
        for t in &a.loaded_terms {
            out.push_str(&format!("- {} → {} ({})\n", t.term, t.neutral, t.lean.as_str()));
        }
    }
    if !a.signals.is_empty() {
        out.push_str("\nSignals:\n");
        for s in &a.signals {
            out.push_str(&format!("- {}\n", s));
        }
    }
    if neutral != title {
        out.push_str(&format!("\nNeutral rewrite: {}\n", neutral));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bucket, FramingDifference, Omission};

    #[test]
    fn triangulation_markdown_lists_sections() {
        let r = TriangulationResult {
            event_id: "abc".into(),
            event: "budget".into(),
            sources: vec![],
            agreed_facts: vec!["Stat: 40% of voters".into()],
            framing_differences: vec![FramingDifference {
                aspect: "headline framing".into(),
                left: Some("Cuts gut safety net".into()),
                center: None,
                right: Some("Reform trims waste".into()),
            }],
            omissions: vec![Omission {
                fact: "Stat: 3 million".into(),
                included_by: vec![Bucket::Left],
                omitted_by: vec![Bucket::Center, Bucket::Right],
                significance: Significance::High,
            }],
        };
        let md = render_triangulation_markdown(&r);
        assert!(md.starts_with("# budget\n"));
        assert!(md.contains("## Agreed Facts\n- Stat: 40% of voters\n"));
        assert!(md.contains("- **Left**: Cuts gut safety net\n"));
        assert!(!md.contains("**Center**"));
        assert!(md.contains("missing from: center, right; high"));
    }

    #[test]
    fn empty_cluster_list_has_message() {
        assert_eq!(render_clusters_text(&[]), "No multi-source story clusters found.\n");
    }
}
