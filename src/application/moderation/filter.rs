//! Soft content filter feeding the nudge protocol.
//!
//! The verdict is deliberately opaque to the rest of the system: the
//! coordinator only cares whether a comment is clean, suspect (worth
//! nudging the author to reconsider), or severe (withheld outright).
//! Term lists here are a placeholder heuristic, not a moderation
//! policy.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterVerdict {
    Clean,
    /// Soft rejection: give the author one chance to rephrase.
    Suspect { message: String, flags: Vec<String> },
    /// Hard match: the comment is withheld without a nudge.
    Severe { message: String, flags: Vec<String> },
}

const SEVERE_TERMS: &[&str] = &[
    "kill yourself",
    "go die",
    "lynch",
    "genocide",
    "gas them",
];

const TOXIC_TERMS: &[&str] = &[
    "idiot", "moron", "loser", "pathetic", "garbage", "clown", "shut up",
];

const SPAM_TERMS: &[&str] = &[
    "buy now",
    "free money",
    "click here",
    "crypto giveaway",
    "dm me on telegram",
];

fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch.is_alphanumeric() || ch.is_whitespace() {
            out.extend(ch.to_lowercase());
        } else {
            out.push(' ');
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn match_terms(normalized: &str, tokens: &[&str], terms: &[&str], label: &str, flags: &mut Vec<String>) -> u32 {
    let mut hits = 0;
    for term in terms {
        let hit = if term.contains(' ') {
            normalized.contains(term)
        } else {
            tokens.contains(term)
        };
        if hit {
            hits += 1;
            flags.push(format!("{}:{}", label, term));
        }
    }
    hits
}

pub fn assess(body: &str) -> FilterVerdict {
    let normalized = normalize(body);
    let tokens: Vec<&str> = normalized.split_whitespace().collect();

    let mut flags = Vec::new();

    if match_terms(&normalized, &tokens, SEVERE_TERMS, "SEVERE", &mut flags) > 0 {
        return FilterVerdict::Severe {
            message: "This comment violates our community guidelines.".to_string(),
            flags,
        };
    }

    let mut score = 0u32;
    score += 30 * match_terms(&normalized, &tokens, TOXIC_TERMS, "TOXIC", &mut flags);
    score += 40 * match_terms(&normalized, &tokens, SPAM_TERMS, "SPAM", &mut flags);

    if body.contains("http://") || body.contains("https://") {
        score += 25;
        flags.push("SPAM:url".to_string());
    }

    let alpha = body.chars().filter(|c| c.is_alphabetic()).count();
    let upper = body
        .chars()
        .filter(|c| c.is_alphabetic() && c.is_uppercase())
        .count();
    if alpha >= 10 && upper * 5 > alpha * 4 {
        score += 15;
        flags.push("TONE:all_caps".to_string());
    }

    if score >= 30 {
        FilterVerdict::Suspect {
            message: "Looks like this comment may break our community guidelines. \
                      Consider rephrasing before posting again."
                .to_string(),
            flags,
        }
    } else {
        FilterVerdict::Clean
    }
}
