//! Orchestrator: one run-to-completion pass per invocation.
//!
//! load state -> fetch events -> evaluate phases -> gate -> dedupe ->
//! dispatch -> mark fired -> heartbeat -> GC sweep -> persist. Every
//! failure short of missing credentials is isolated: a bad source, a
//! failing scorer, or an unreachable channel costs at most the item it
//! touched, never the run.

use chrono::{DateTime, Duration, Utc};
use metrics::counter;

use crate::gate::GateDecision;
use crate::ingest::types::SourceProvider;
use crate::ingest::{collect_events, dedupe_events};
use crate::ledger::{dedupe_key, SentLedger};
use crate::notify::{AlertMessage, Notifier};
use crate::phase::Phase;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum dedupe-record retention; raised to the longest phase
    /// horizon at sweep time so a key never expires mid-window.
    pub retention: Duration,
    /// Send a muted heartbeat when a run fires nothing.
    pub heartbeat: bool,
    /// Cap on sends per run; strongest scores go first. `None` = no cap.
    pub max_alerts_per_run: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retention: Duration::hours(12),
            heartbeat: true,
            max_alerts_per_run: None,
        }
    }
}

/// Per-run observability counts, also summarized in the heartbeat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub checked: usize,
    pub source_errors: usize,
    pub out_of_window: usize,
    pub gate_rejected: usize,
    pub deduped: usize,
    pub fired: usize,
}

/// The sweep retention actually used: the configured floor, raised to the
/// longest phase horizon so a record cannot be evicted while its phase
/// window is still open.
pub fn effective_retention(cfg: &EngineConfig, phases: &[Box<dyn Phase>]) -> Duration {
    phases
        .iter()
        .map(|p| p.horizon())
        .fold(cfg.retention, |acc, h| if h > acc { h } else { acc })
}

pub async fn run_once(
    providers: &[Box<dyn SourceProvider>],
    phases: &[Box<dyn Phase>],
    ledger: &mut SentLedger,
    notifier: &dyn Notifier,
    now: DateTime<Utc>,
    cfg: &EngineConfig,
) -> RunStats {
    let (raw, source_errors) = collect_events(providers).await;
    let events = dedupe_events(raw);

    let mut stats = RunStats {
        checked: events.len(),
        source_errors,
        ..Default::default()
    };

    // Decide first, send second, so a per-run cap takes the strongest
    // candidates rather than whatever the iteration order yields.
    struct Candidate<'a> {
        event: &'a crate::event::Event,
        phase: &'a dyn Phase,
        decision: GateDecision,
        key: String,
    }

    let mut candidates: Vec<Candidate<'_>> = Vec::new();
    for event in &events {
        for phase in phases {
            if !phase.applies_to(event) {
                continue;
            }
            if !phase.due(event, now) {
                stats.out_of_window += 1;
                continue;
            }
            let decision = phase.evaluate(event);
            if !decision.fire {
                stats.gate_rejected += 1;
                continue;
            }
            let key = dedupe_key(&event.identity(), phase.name());
            if ledger.already_fired(&key) {
                stats.deduped += 1;
                counter!("watch_deduped_total").increment(1);
                continue;
            }
            candidates.push(Candidate {
                event,
                phase: phase.as_ref(),
                decision,
                key,
            });
        }
    }

    candidates.sort_by(|a, b| {
        b.decision
            .score
            .partial_cmp(&a.decision.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for c in candidates {
        if let Some(max) = cfg.max_alerts_per_run {
            if stats.fired >= max {
                break;
            }
        }
        // Overlapping sources can still produce one key twice in a run.
        if ledger.already_fired(&c.key) {
            stats.deduped += 1;
            continue;
        }

        let message = c.phase.render(c.event, &c.decision);
        if let Err(e) = notifier.send(&message).await {
            // Prefer a missed notification over a duplicate storm: the key
            // is marked fired even when the channel is down.
            tracing::warn!(error = ?e, phase = c.phase.name(), event = %c.event.name, "dispatch failed");
        }
        ledger.mark_fired(&c.key, now);
        stats.fired += 1;
        counter!("watch_alerts_fired_total").increment(1);
    }

    if stats.fired == 0 && cfg.heartbeat {
        let hb = AlertMessage::muted(format!(
            "\u{25EF} Watchtower heartbeat - no alerts.\nChecked: {}, out of window: {}, below gate: {}, deduped: {}, source errors: {}",
            stats.checked, stats.out_of_window, stats.gate_rejected, stats.deduped, stats.source_errors
        ));
        if let Err(e) = notifier.send(&hb).await {
            tracing::warn!(error = ?e, "heartbeat dispatch failed");
        }
    }

    ledger.sweep(now, effective_retention(cfg, phases));
    ledger.save();
    stats
}

/// Parameters for the aggregate-percentage (sentiment summary) pass.
#[derive(Debug, Clone, Copy)]
pub struct SummaryParams {
    pub lookback: Duration,
    pub min_mentions: usize,
    pub strong_pct: u8,
}

impl Default for SummaryParams {
    fn default() -> Self {
        Self {
            lookback: Duration::hours(24),
            min_mentions: crate::aggregate::DEFAULT_MIN_MENTIONS,
            strong_pct: crate::aggregate::DEFAULT_STRONG_PCT,
        }
    }
}

pub const SUMMARY_PHASE: &str = "sentiment-summary";

/// One aggregate pass: classify every in-window mention per subject, then
/// report subjects whose dominant side is strong enough. Each reported
/// (subject, side) is deduped through the same ledger, so an unchanged
/// reading repeats only after its record ages out.
pub async fn run_sentiment_summary(
    providers: &[Box<dyn SourceProvider>],
    params: &SummaryParams,
    ledger: &mut SentLedger,
    notifier: &dyn Notifier,
    now: DateTime<Utc>,
    cfg: &EngineConfig,
) -> RunStats {
    let (events, source_errors) = collect_events(providers).await;

    let mut stats = RunStats {
        checked: events.len(),
        source_errors,
        ..Default::default()
    };

    let mut book = crate::aggregate::SubjectBook::with_default_subjects();
    for ev in &events {
        let in_window = match ev.timestamp {
            None => true,
            Some(ts) => now.signed_duration_since(ts) <= params.lookback,
        };
        if !in_window {
            stats.out_of_window += 1;
            continue;
        }
        let label = crate::sentiment::classify(&ev.name, &ev.text);
        book.observe(&ev.text, label);
    }

    let mut fresh = Vec::new();
    for summary in book.summaries(params.min_mentions, params.strong_pct) {
        let identity = format!("{}|{}", summary.subject, summary.label.as_str());
        let key = dedupe_key(&identity, SUMMARY_PHASE);
        if ledger.already_fired(&key) {
            stats.deduped += 1;
            counter!("watch_deduped_total").increment(1);
        } else {
            fresh.push((summary, key));
        }
    }

    if !fresh.is_empty() {
        let mut lines = vec![format!(
            "\u{1F9E0} <b>Strong News Sentiment (last {}h)</b> - threshold >= {}%",
            params.lookback.num_hours(),
            params.strong_pct
        )];
        for (s, _) in &fresh {
            lines.push(format!(
                "{}: <b>{}% {}</b> ({} mentions)",
                s.subject,
                s.pct,
                s.label.as_str(),
                s.mentions
            ));
        }
        let message = AlertMessage::loud(lines.join("\n"));
        if let Err(e) = notifier.send(&message).await {
            tracing::warn!(error = ?e, "summary dispatch failed");
        }
        for (_, key) in &fresh {
            ledger.mark_fired(key, now);
            stats.fired += 1;
            counter!("watch_alerts_fired_total").increment(1);
        }
    } else if cfg.heartbeat {
        let hb = AlertMessage::muted(format!(
            "\u{1F9E0} Sentiment summary: no subjects >= {}% one-sided this cycle.",
            params.strong_pct
        ));
        if let Err(e) = notifier.send(&hb).await {
            tracing::warn!(error = ?e, "heartbeat dispatch failed");
        }
    }

    ledger.sweep(now, cfg.retention);
    ledger.save();
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::{HeadsUpPhase, PreReleasePhase};

    #[test]
    fn retention_is_raised_to_longest_phase_horizon() {
        let cfg = EngineConfig::default(); // 12h floor
        let phases: Vec<Box<dyn Phase>> =
            vec![Box::new(PreReleasePhase), Box::new(HeadsUpPhase)];
        assert_eq!(effective_retention(&cfg, &phases), Duration::days(4));
    }

    #[test]
    fn retention_floor_wins_over_short_phases() {
        let cfg = EngineConfig::default();
        let phases: Vec<Box<dyn Phase>> = vec![Box::new(PreReleasePhase)];
        assert_eq!(effective_retention(&cfg, &phases), Duration::hours(12));
    }
}
