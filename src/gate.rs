// src/gate.rs
// Scoring-threshold gate: a pluggable scorer behind a fixed cutoff.

use anyhow::Result;

use crate::event::Event;

/// Outcome of evaluating one event against a gate.
#[derive(Debug, Clone, PartialEq)]
pub struct GateDecision {
    pub fire: bool,
    pub score: f64,
    pub label: String,
}

impl GateDecision {
    /// Unconditional pass, used by phases that gate on time windows only.
    pub fn pass() -> Self {
        Self {
            fire: true,
            score: 0.0,
            label: String::new(),
        }
    }

    pub fn skip() -> Self {
        Self {
            fire: false,
            score: 0.0,
            label: String::new(),
        }
    }
}

/// Pure scoring function over one event. Implementations must be
/// deterministic for identical input and hold no hidden state.
pub trait Scorer: Send + Sync {
    /// Returns (score, qualitative label).
    fn score(&self, event: &Event) -> Result<(f64, String)>;
    fn name(&self) -> &'static str;
}

/// Fires iff `score >= cutoff`. A scorer error is treated as "no signal"
/// for that one event and never aborts processing of its siblings.
pub struct ThresholdGate {
    scorer: Box<dyn Scorer>,
    cutoff: f64,
}

impl ThresholdGate {
    pub fn new(scorer: Box<dyn Scorer>, cutoff: f64) -> Self {
        Self { scorer, cutoff }
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn decide(&self, event: &Event) -> GateDecision {
        match self.scorer.score(event) {
            Ok((score, label)) => GateDecision {
                fire: score >= self.cutoff,
                score,
                label,
            },
            Err(e) => {
                tracing::warn!(error = ?e, scorer = self.scorer.name(), "scorer failed; treating as no signal");
                GateDecision::skip()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, Impact};
    use anyhow::anyhow;

    struct FixedScorer(f64);
    impl Scorer for FixedScorer {
        fn score(&self, _event: &Event) -> Result<(f64, String)> {
            Ok((self.0, "fixed".into()))
        }
        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    struct BrokenScorer;
    impl Scorer for BrokenScorer {
        fn score(&self, _event: &Event) -> Result<(f64, String)> {
            Err(anyhow!("model unavailable"))
        }
        fn name(&self) -> &'static str {
            "broken"
        }
    }

    fn ev() -> Event {
        Event {
            name: "x".into(),
            timestamp: None,
            source: "Test".into(),
            link: None,
            text: "x".into(),
            impact: Impact::Low,
            source_weight: 1.0,
        }
    }

    #[test]
    fn fires_at_cutoff_not_below() {
        let at = ThresholdGate::new(Box::new(FixedScorer(9.0)), 9.0);
        assert!(at.decide(&ev()).fire);

        let below = ThresholdGate::new(Box::new(FixedScorer(8.0)), 9.0);
        assert!(!below.decide(&ev()).fire);
    }

    #[test]
    fn scorer_error_means_no_signal() {
        let gate = ThresholdGate::new(Box::new(BrokenScorer), 0.0);
        let d = gate.decide(&ev());
        assert!(!d.fire);
        assert_eq!(d.score, 0.0);
    }
}
