// src/event.rs
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Category bucket for scheduled releases. Feed headlines default to `Low`;
/// only `High` events qualify for the long-horizon heads-up phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

/// One observed event: a macro calendar release, a news headline, or a
/// regulatory filing. Immutable once produced; lives for one run only.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Release label ("NFP") or headline title.
    pub name: String,
    /// UTC instant of the release / publication. `None` when the feed gave
    /// nothing parseable; recency checks then give the item the benefit of
    /// the doubt and let scoring decide.
    pub timestamp: Option<DateTime<Utc>>,
    /// Source label, e.g. "Rule", "SEC - Press Releases".
    pub source: String,
    pub link: Option<String>,
    /// Normalized free text used as scoring input (title + summary).
    pub text: String,
    pub impact: Impact,
    /// Per-source multiplier for hype scoring; 1.0 is neutral.
    pub source_weight: f32,
}

impl Event {
    /// A rule-computed or scraped calendar release.
    pub fn scheduled(
        name: impl Into<String>,
        timestamp: DateTime<Utc>,
        source: impl Into<String>,
        impact: Impact,
    ) -> Self {
        let name = name.into();
        Self {
            text: name.clone(),
            name,
            timestamp: Some(timestamp),
            source: source.into(),
            link: None,
            impact,
            source_weight: 1.0,
        }
    }

    /// A feed item. `text` should already be normalized.
    pub fn headline(
        name: impl Into<String>,
        timestamp: Option<DateTime<Utc>>,
        source: impl Into<String>,
        link: Option<String>,
        text: impl Into<String>,
        source_weight: f32,
    ) -> Self {
        Self {
            name: name.into(),
            timestamp,
            source: source.into(),
            link,
            text: text.into(),
            impact: Impact::Low,
            source_weight,
        }
    }

    /// Stable identity string fed into the dedupe fingerprint.
    ///
    /// With a timestamp: `name|rfc3339-rounded-to-minute`, so two sources
    /// describing the same release collapse to one identity. Without one:
    /// `source|name|link`.
    pub fn identity(&self) -> String {
        match self.timestamp {
            Some(ts) => {
                let minute = ts
                    .with_second(0)
                    .and_then(|t| t.with_nanosecond(0))
                    .unwrap_or(ts);
                format!("{}|{}", self.name, minute.to_rfc3339())
            }
            None => format!(
                "{}|{}|{}",
                self.source,
                self.name,
                self.link.as_deref().unwrap_or_default()
            ),
        }
    }
}
