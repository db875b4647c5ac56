//! Lexicon-based polarity scoring for headlines.
//!
//! Small and deterministic on purpose: a word lexicon with integer weights,
//! negation inversion for a negator within the previous three tokens, and a
//! compound score normalized into [-1, 1]. Headline and summary are blended
//! 0.7 / 0.3, and labels use a +-0.10 neutral band.

use once_cell::sync::Lazy;
use std::collections::HashMap;

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

/// Divisor mapping the raw lexicon sum onto [-1, 1]. One strong word (+-3)
/// lands at +-0.75; two moderate words saturate.
const NORM: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    Bull,
    Bear,
    Neutral,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Bull => "bullish",
            Label::Bear => "bearish",
            Label::Neutral => "neutral",
        }
    }
}

/// Raw lexicon sum plus token count. Negation within the previous 1..=3
/// tokens inverts the sign of the matched word.
pub fn score_text(text: &str) -> (i32, usize) {
    let tokens: Vec<String> = tokenize(text).collect();
    let mut score: i32 = 0;

    for i in 0..tokens.len() {
        let base = *LEXICON.get(tokens[i].as_str()).unwrap_or(&0);
        if base == 0 {
            continue;
        }
        let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
        score += if negated { -base } else { base };
    }

    (score, tokens.len())
}

/// Normalized compound score in [-1, 1].
pub fn compound(text: &str) -> f32 {
    let (sum, _) = score_text(text);
    (sum as f32 / NORM).clamp(-1.0, 1.0)
}

/// Blend title and summary; the title dominates.
pub fn blend(title: &str, summary: &str) -> f32 {
    let t = compound(title);
    let s = if summary.trim().is_empty() {
        0.0
    } else {
        compound(summary)
    };
    0.7 * t + 0.3 * s
}

/// Absolute polarity magnitude in [0, 1].
pub fn intensity(title: &str, summary: &str) -> f32 {
    blend(title, summary).abs()
}

pub fn classify(title: &str, summary: &str) -> Label {
    let score = blend(title, summary);
    if score > 0.10 {
        Label::Bull
    } else if score < -0.10 {
        Label::Bear
    } else {
        Label::Neutral
    }
}

/// Alphanumeric tokens, lower-cased.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not" | "no" | "never" | "isn" | "wasn" | "aren" | "won" | "cannot" | "without"
    )
}
