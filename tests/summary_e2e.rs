//! Aggregate sentiment summary end to end: per-subject counting, the
//! strong-percentage threshold, and (subject, side) dedupe across runs.

mod common;

use chrono::{DateTime, Duration, TimeZone, Utc};

use common::{quiet_config, StaticProvider};
use watchtower::engine::{run_sentiment_summary, SummaryParams};
use watchtower::event::Event;
use watchtower::ingest::types::SourceProvider;
use watchtower::ledger::SentLedger;
use watchtower::notify::MemoryNotifier;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 11, 12, 0, 0).unwrap()
}

fn headline(title: &str, hours_ago: i64) -> Event {
    Event::headline(
        title,
        Some(now() - Duration::hours(hours_ago)),
        "Feed",
        None,
        title,
        1.0,
    )
}

fn fixture_providers() -> Vec<Box<dyn SourceProvider>> {
    // BTC: 3 bullish + 1 neutral = 75% bullish of 4.
    // ETH: 2 mentions, below the minimum sample.
    vec![Box::new(StaticProvider::new(vec![
        headline("Bitcoin rally accelerates", 1),
        headline("Bitcoin surges past resistance", 2),
        headline("Bitcoin breakout continues", 3),
        headline("Bitcoin holders await inflation print", 4),
        headline("Ethereum rally begins", 1),
        headline("Ethereum network gains momentum", 2),
    ]))]
}

fn params() -> SummaryParams {
    SummaryParams {
        lookback: Duration::hours(24),
        min_mentions: 4,
        strong_pct: 75,
    }
}

#[tokio::test]
async fn strong_subject_reported_small_sample_withheld() {
    let dir = tempfile::tempdir().unwrap();
    let providers = fixture_providers();

    let notifier = MemoryNotifier::new();
    let mut ledger = SentLedger::load(dir.path().join("summary.json"));
    let stats = run_sentiment_summary(
        &providers,
        &params(),
        &mut ledger,
        &notifier,
        now(),
        &quiet_config(),
    )
    .await;

    assert_eq!(stats.fired, 1);
    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].urgent);
    assert!(messages[0].text.contains("BTC"));
    assert!(messages[0].text.contains("75% bullish"));
    assert!(messages[0].text.contains("(4 mentions)"));
    assert!(!messages[0].text.contains("ETH"));
}

#[tokio::test]
async fn unchanged_reading_is_suppressed_on_rerun() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("summary.json");
    let providers = fixture_providers();

    let notifier = MemoryNotifier::new();
    let mut ledger = SentLedger::load(&path);
    run_sentiment_summary(&providers, &params(), &mut ledger, &notifier, now(), &quiet_config())
        .await;

    // Same strong reading an hour later, reloaded from disk.
    let notifier = MemoryNotifier::new();
    let mut reloaded = SentLedger::load(&path);
    let stats = run_sentiment_summary(
        &providers,
        &params(),
        &mut reloaded,
        &notifier,
        now() + Duration::hours(1),
        &quiet_config(),
    )
    .await;

    assert_eq!(stats.fired, 0);
    assert_eq!(stats.deduped, 1);
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn stale_mentions_fall_out_of_the_lookback() {
    let dir = tempfile::tempdir().unwrap();
    // Same fixture shifted two days back: nothing in window, nothing fires.
    let providers: Vec<Box<dyn SourceProvider>> = vec![Box::new(StaticProvider::new(vec![
        headline("Bitcoin rally accelerates", 49),
        headline("Bitcoin surges past resistance", 50),
        headline("Bitcoin breakout continues", 51),
        headline("Bitcoin holders await inflation print", 52),
    ]))];

    let notifier = MemoryNotifier::new();
    let mut ledger = SentLedger::load(dir.path().join("summary.json"));
    let stats = run_sentiment_summary(
        &providers,
        &params(),
        &mut ledger,
        &notifier,
        now(),
        &quiet_config(),
    )
    .await;

    assert_eq!(stats.out_of_window, 4);
    assert_eq!(stats.fired, 0);
    assert!(notifier.messages().is_empty());
}
