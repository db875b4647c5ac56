//! Per-subject sentiment aggregation for the summary variant.
//!
//! Counts bull/bear/neutral mentions per subject within one run's lookback
//! window (never persisted), then reports only subjects whose dominant side
//! crosses the percentage threshold with enough samples behind it.

use std::collections::BTreeMap;

use crate::sentiment::Label;

pub const DEFAULT_MIN_MENTIONS: usize = 4;
pub const DEFAULT_STRONG_PCT: u8 = 75;

/// Built-in subject alias map; matching is lowercase substring, fast and
/// deliberately simple.
pub const DEFAULT_SUBJECTS: &[(&str, &[&str])] = &[
    ("BTC", &["bitcoin", "btc"]),
    ("ETH", &["ethereum", "eth"]),
    ("SOL", &["solana", "sol"]),
    ("BNB", &["bnb", "binance coin"]),
    ("DOGE", &["dogecoin", "doge"]),
    ("ADA", &["cardano", "ada"]),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubjectAggregate {
    pub bull: usize,
    pub bear: usize,
    pub neutral: usize,
    pub total: usize,
}

/// One reportable strong reading. Only the dominant side is ever reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectSummary {
    pub subject: String,
    pub label: Label,
    pub pct: u8,
    pub mentions: usize,
}

#[derive(Debug, Clone)]
pub struct SubjectBook {
    aliases: Vec<(String, Vec<String>)>,
    counts: BTreeMap<String, SubjectAggregate>,
}

impl SubjectBook {
    pub fn new(subjects: &[(&str, &[&str])]) -> Self {
        let aliases = subjects
            .iter()
            .map(|(sym, al)| {
                (
                    sym.to_string(),
                    al.iter().map(|a| a.to_lowercase()).collect(),
                )
            })
            .collect();
        Self {
            aliases,
            counts: BTreeMap::new(),
        }
    }

    pub fn with_default_subjects() -> Self {
        Self::new(DEFAULT_SUBJECTS)
    }

    /// Subjects mentioned in `text` (deduplicated, book order).
    pub fn detect(&self, text: &str) -> Vec<String> {
        let low = text.to_lowercase();
        self.aliases
            .iter()
            .filter(|(_, al)| al.iter().any(|a| low.contains(a.as_str())))
            .map(|(sym, _)| sym.clone())
            .collect()
    }

    /// Count one classified mention against every subject found in `text`.
    pub fn observe(&mut self, text: &str, label: Label) {
        for sym in self.detect(text) {
            let agg = self.counts.entry(sym).or_default();
            match label {
                Label::Bull => agg.bull += 1,
                Label::Bear => agg.bear += 1,
                Label::Neutral => agg.neutral += 1,
            }
            agg.total += 1;
        }
    }

    pub fn counts(&self, subject: &str) -> Option<SubjectAggregate> {
        self.counts.get(subject).copied()
    }

    /// Strong one-sided readings. A subject below `min_mentions` never
    /// fires regardless of how lopsided it is; at or above, it fires iff
    /// `round(100 * dominant / total) >= strong_pct`.
    pub fn summaries(&self, min_mentions: usize, strong_pct: u8) -> Vec<SubjectSummary> {
        let mut out = Vec::new();
        for (sym, agg) in &self.counts {
            if agg.total < min_mentions {
                continue;
            }
            let bull_pct = pct(agg.bull, agg.total);
            let bear_pct = pct(agg.bear, agg.total);

            if bull_pct >= strong_pct {
                out.push(SubjectSummary {
                    subject: sym.clone(),
                    label: Label::Bull,
                    pct: bull_pct,
                    mentions: agg.total,
                });
            } else if bear_pct >= strong_pct {
                out.push(SubjectSummary {
                    subject: sym.clone(),
                    label: Label::Bear,
                    pct: bear_pct,
                    mentions: agg.total,
                });
            }
        }
        out
    }
}

fn pct(part: usize, total: usize) -> u8 {
    ((100.0 * part as f64) / total as f64).round() as u8
}
