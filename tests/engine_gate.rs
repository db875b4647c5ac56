//! Threshold-gated phases driven through the full engine: fire at the
//! cutoff, stay quiet below it, dedupe on rerun, and honor the per-run cap.

mod common;

use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};

use common::{quiet_config, StaticProvider};
use watchtower::engine::run_once;
use watchtower::event::Event;
use watchtower::gate::{Scorer, ThresholdGate};
use watchtower::ingest::types::SourceProvider;
use watchtower::ledger::SentLedger;
use watchtower::notify::MemoryNotifier;
use watchtower::phase::{ImpactPhase, Phase};

/// Reads the score straight out of the event text, so each fixture headline
/// carries its own score.
struct TextScorer;

impl Scorer for TextScorer {
    fn score(&self, event: &Event) -> Result<(f64, String)> {
        Ok((event.text.trim().parse()?, String::new()))
    }

    fn name(&self) -> &'static str {
        "text"
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 11, 12, 0, 0).unwrap()
}

fn scored_headline(name: &str, score: &str) -> Event {
    Event::headline(
        name,
        Some(now() - Duration::hours(1)),
        "Feed",
        Some(format!("https://example.com/{name}")),
        score,
        1.0,
    )
}

fn impact_phases(cutoff: f64) -> Vec<Box<dyn Phase>> {
    vec![Box::new(ImpactPhase::new(
        ThresholdGate::new(Box::new(TextScorer), cutoff),
        Duration::hours(24),
        Duration::hours(12),
    ))]
}

#[tokio::test]
async fn fires_at_cutoff_rejects_below_dedupes_on_rerun() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let providers: Vec<Box<dyn SourceProvider>> = vec![Box::new(StaticProvider::new(vec![
        scored_headline("urgent", "9"),
        scored_headline("mild", "8.5"),
    ]))];
    let phases = impact_phases(9.0);

    let notifier = MemoryNotifier::new();
    let mut ledger = SentLedger::load(&path);
    let stats = run_once(&providers, &phases, &mut ledger, &notifier, now(), &quiet_config()).await;

    assert_eq!(stats.fired, 1);
    assert_eq!(stats.gate_rejected, 1);
    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].text.contains("URGENT 9/10"));
    assert!(messages[0].text.contains("urgent"));

    let notifier = MemoryNotifier::new();
    let stats = run_once(
        &providers,
        &phases,
        &mut ledger,
        &notifier,
        now() + Duration::minutes(30),
        &quiet_config(),
    )
    .await;
    assert_eq!(stats.fired, 0);
    assert_eq!(stats.deduped, 1);
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn stale_items_are_out_of_window() {
    let dir = tempfile::tempdir().unwrap();
    let providers: Vec<Box<dyn SourceProvider>> =
        vec![Box::new(StaticProvider::new(vec![Event::headline(
            "old news",
            Some(now() - Duration::hours(25)),
            "Feed",
            Some("https://example.com/old".into()),
            "10",
            1.0,
        )]))];
    let phases = impact_phases(9.0);

    let notifier = MemoryNotifier::new();
    let mut ledger = SentLedger::load(dir.path().join("state.json"));
    let stats = run_once(&providers, &phases, &mut ledger, &notifier, now(), &quiet_config()).await;

    assert_eq!(stats.out_of_window, 1);
    assert_eq!(stats.fired, 0);
}

#[tokio::test]
async fn per_run_cap_takes_the_strongest_first() {
    let dir = tempfile::tempdir().unwrap();
    let providers: Vec<Box<dyn SourceProvider>> = vec![Box::new(StaticProvider::new(vec![
        scored_headline("third", "9.1"),
        scored_headline("first", "9.9"),
        scored_headline("second", "9.5"),
    ]))];
    let phases = impact_phases(9.0);

    let mut cfg = quiet_config();
    cfg.max_alerts_per_run = Some(2);

    let notifier = MemoryNotifier::new();
    let mut ledger = SentLedger::load(dir.path().join("state.json"));
    let stats = run_once(&providers, &phases, &mut ledger, &notifier, now(), &cfg).await;

    assert_eq!(stats.fired, 2);
    let texts: Vec<String> = notifier.messages().iter().map(|m| m.text.clone()).collect();
    assert!(texts.iter().any(|t| t.contains("first")));
    assert!(texts.iter().any(|t| t.contains("second")));
    assert!(!texts.iter().any(|t| t.contains("third")));
}
