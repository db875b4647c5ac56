//! Concrete scorers for the threshold gate.
//!
//! `UrgencyScorer` is the regulatory/macro impact score (integer signals,
//! clamped to 0..10, default cutoff 9). `HypeScorer` is the 0..1 hype score
//! (phrase boosts + polarity intensity, weighted per source, default cutoff
//! 0.35). Both are pure functions of event text and source metadata.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::event::Event;
use crate::gate::Scorer;
use crate::sentiment;

pub const DEFAULT_IMPACT_CUTOFF: f64 = 9.0;
pub const DEFAULT_HYPE_CUTOFF: f64 = 0.35;

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Keyword/category urgency score for regulator and macro news.
pub struct UrgencyScorer;

impl Scorer for UrgencyScorer {
    fn score(&self, event: &Event) -> Result<(f64, String)> {
        let t = event.text.to_lowercase();
        let src = event.source.to_lowercase();
        let mut s: i32 = 0;

        // Source bump for key US regulators / macro publishers.
        if contains_any(&src, &["sec", "cftc", "federal reserve", "bls"]) {
            s += 4;
        }
        // Macro / policy terms.
        if contains_any(&t, &["cpi", "pce"]) {
            s += 4;
        }
        if contains_any(&t, &["fomc", "powell", "rate", "interest rate", "minutes"]) {
            s += 4;
        }
        if contains_any(&t, &["sec", "cftc", "ftc", "ofac", "treasury"]) {
            s += 3;
        }
        // Market structure / funds.
        if contains_any(&t, &["etf", "outflow", "inflow"]) {
            s += 3;
        }
        // Security incidents.
        if contains_any(&t, &["hack", "exploit", "breach", "security incident"]) {
            s += 5;
        }
        // Market halts / suspensions.
        if contains_any(&t, &["outage", "downtime", "halt", "suspend"]) {
            s += 4;
        }
        // Bankruptcies / liquidations / delistings.
        if contains_any(&t, &["delist", "insolvency", "bankruptcy", "liquidation"]) {
            s += 3;
        }
        // Big names bump.
        if contains_any(
            &t,
            &[
                "binance",
                "coinbase",
                "kraken",
                "tether",
                "usdt",
                "circle",
                "usdc",
                "microstrategy",
                "blackrock",
                "fidelity",
            ],
        ) {
            s += 2;
        }

        // Polarity magnitude adds up to 2 points.
        let magnitude = sentiment::compound(&event.text).abs();
        s += (magnitude * 2.0).round() as i32;

        Ok((f64::from(s.clamp(0, 10)), "urgency".to_string()))
    }

    fn name(&self) -> &'static str {
        "urgency"
    }
}

/// Hype phrases that often precede FOMO moves (both directions).
static HYPE_PATTERNS: Lazy<Vec<(Regex, f32)>> = Lazy::new(|| {
    [
        (r"(?i)\ball[-\s]?time high\b|\bATH\b", 0.35),
        (r"(?i)\bsoars?\b|\bsurges?\b|\bspikes?\b|\bskyrockets?\b", 0.25),
        (r"(?i)\bplunges?\b|\btanks?\b|\bcrash(es)?\b|\bcollaps(es|ing)?\b", 0.25),
        (r"(?i)\betf\b", 0.20),
        (r"(?i)\bbreak(s|ing)?\s+(out|down)\b", 0.18),
        (r"(?i)\bwhales?\b|\bliquidations?\b", 0.12),
        (r"(?i)\bsec\b|\bregulators?\b|\blawsuit\b|\bapproval\b|\breject(ion)?\b", 0.12),
    ]
    .iter()
    .map(|(pat, w)| (Regex::new(pat).expect("valid hype pattern"), *w))
    .collect()
});

const POS_WORDS: &[&str] = &["bullish", "optimistic", "buy", "accumulate", "rally", "breakout"];
const NEG_WORDS: &[&str] = &["bearish", "fear", "sell", "dump", "liquidation", "crackdown"];

fn phrase_boost(text: &str) -> f32 {
    let t = text.to_lowercase();
    let mut boost: f32 = 0.0;
    for (re, w) in HYPE_PATTERNS.iter() {
        if re.is_match(&t) {
            boost += w;
        }
    }
    if contains_any(&t, POS_WORDS) {
        boost += 0.05;
    }
    if contains_any(&t, NEG_WORDS) {
        boost += 0.05;
    }
    boost
}

/// Hype/FOMO score in [0, 1], weighted by the source's configured weight.
/// The label reports the polarity direction, not the magnitude.
pub struct HypeScorer;

impl Scorer for HypeScorer {
    fn score(&self, event: &Event) -> Result<(f64, String)> {
        let vs = sentiment::compound(&event.text);
        let raw = (vs.abs() + phrase_boost(&event.text)).min(1.0);
        let weighted = (raw * event.source_weight).clamp(0.0, 1.0);

        let direction = if vs > 0.0 {
            "bullish"
        } else if vs < 0.0 {
            "bearish"
        } else {
            "neutral"
        };

        Ok((f64::from(weighted), direction.to_string()))
    }

    fn name(&self) -> &'static str {
        "hype"
    }
}
