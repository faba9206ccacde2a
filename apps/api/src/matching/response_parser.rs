//! Best-effort extraction of structured fields from an LLM's freeform reply.
//!
//! This is a heuristic text-mining layer, not a parser with a grammar: every
//! pattern miss degrades to a named default and nothing here ever errors.
//! Semantic correctness of the extracted text is not validated.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Score assumed when the reply carries no recognizable score line.
/// Neutral-positive: the model replied, it just didn't quantify.
pub const DEFAULT_SCORE: f64 = 0.70;

/// Recommendation used when the reply has no recommendation section.
pub const DEFAULT_RECOMMENDATION: &str =
    "Review the full profile before moving this match forward.";

const MAX_LIST_ITEMS: usize = 5;

const STRENGTH_KEYWORDS: &[&str] = &["strength", "excels", "strong match", "well suited"];
const CONCERN_KEYWORDS: &[&str] = &["concern", "risk", "gap", "lacks", "missing"];

// Replies state scores on a 0–100 scale ("Match Score: 82").
static SCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:match\s+score|score)\s*:?\s*(\d+)").expect("score regex")
});

// Windowed capture: everything after the anchor word up to the next blank
// line or capitalized line start (the next section heading).
static INSIGHTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?si)(?:insights?|analysis)\s*:?(.*?)(?:\n[ \t]*\n|\n(?-i:[A-Z])|\z)")
        .expect("insights regex")
});

static RECOMMENDATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?si)(?:recommendations?|suggestions?)\s*:?(.*?)(?:\n[ \t]*\n|\n(?-i:[A-Z])|\z)")
        .expect("recommendation regex")
});

// `- item`, `• item`, `3. item`
static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-•]|\d+\.)\s*(.+)$").expect("bullet regex"));

/// Structured view over one enhancement reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEnhancement {
    /// Extracted score as a fraction in [0,1].
    pub score: f64,
    pub insights: String,
    pub recommendation: String,
    pub strengths: Vec<String>,
    pub concerns: Vec<String>,
}

/// Mines one freeform reply for score, insights, recommendation, and the
/// strength/concern lists. Total: any input yields a fully populated result.
pub fn parse_enhancement(text: &str) -> ParsedEnhancement {
    ParsedEnhancement {
        score: extract_score(text),
        insights: extract_window(text, &INSIGHTS_RE).unwrap_or_else(|| text.trim().to_string()),
        recommendation: extract_window(text, &RECOMMENDATION_RE)
            .unwrap_or_else(|| DEFAULT_RECOMMENDATION.to_string()),
        strengths: extract_list(text, STRENGTH_KEYWORDS, MAX_LIST_ITEMS),
        concerns: extract_list(text, CONCERN_KEYWORDS, MAX_LIST_ITEMS),
    }
}

fn extract_score(text: &str) -> f64 {
    SCORE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        // Stated on a 0–100 scale; clamp keeps a runaway "score: 250"
        // inside the contract.
        .map(|value| (value / 100.0).clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_SCORE)
}

fn extract_window(text: &str, pattern: &Regex) -> Option<String> {
    let captured = pattern.captures(text)?.get(1)?.as_str().trim();
    if captured.is_empty() {
        None
    } else {
        Some(captured.to_string())
    }
}

/// Line-scan list extraction. A line qualifies when it is a bullet or
/// ordinal inside the section under a matching heading, or when it
/// mentions one of the list's topic keywords anywhere in the text.
fn extract_list(text: &str, keywords: &[&str], cap: usize) -> Vec<String> {
    let mut items = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut in_section = false;

    for line in text.lines() {
        if is_section_heading(line, keywords) {
            in_section = true;
            continue;
        }

        let bullet = BULLET_RE
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string());

        let qualifies = match &bullet {
            Some(_) => in_section,
            None => {
                in_section = false;
                let lower = line.to_lowercase();
                keywords.iter().any(|kw| lower.contains(kw))
            }
        };

        if !qualifies {
            continue;
        }

        let item = bullet.unwrap_or_else(|| line.trim().to_string());
        if item.is_empty() {
            continue;
        }
        if seen.insert(item.to_lowercase()) {
            items.push(item);
        }
        if items.len() == cap {
            break;
        }
    }

    items
}

/// A short keyword-bearing line ending in a colon reads as a heading
/// ("Strengths:", "Key concerns:").
fn is_section_heading(line: &str, keywords: &[&str]) -> bool {
    let trimmed = line.trim();
    if !trimmed.ends_with(':') || trimmed.len() > 40 {
        return false;
    }
    let lower = trimmed.to_lowercase();
    keywords.iter().any(|kw| lower.contains(kw))
}
