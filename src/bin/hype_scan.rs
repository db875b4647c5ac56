//! Hype scanner: scores recent crypto headlines for hype intensity and
//! alerts on the strong ones. Keeps its own ledger file so its dedupe
//! horizon never interferes with the calendar watcher's.

use anyhow::Result;
use chrono::{Duration, Utc};

use watchtower::config::Settings;
use watchtower::engine::{run_once, EngineConfig};
use watchtower::gate::ThresholdGate;
use watchtower::ingest::config::load_sources_default;
use watchtower::ingest::providers::rss::RssProvider;
use watchtower::ingest::types::SourceProvider;
use watchtower::ledger::SentLedger;
use watchtower::notify::telegram::TelegramNotifier;
use watchtower::phase::{HypePhase, Phase};
use watchtower::scoring::HypeScorer;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    watchtower::init_tracing();

    let settings = Settings::from_env()?;
    let notifier = TelegramNotifier::new(&settings.bot_token, &settings.chat_id);
    let mut ledger = SentLedger::load(&settings.hype_state_path);

    let sources = load_sources_default()?;
    if sources.is_empty() {
        tracing::warn!("no feed sources configured; nothing to scan");
        return Ok(());
    }
    let providers: Vec<Box<dyn SourceProvider>> = sources
        .iter()
        .map(|src| Box::new(RssProvider::from_source(src)) as Box<dyn SourceProvider>)
        .collect();

    let phases: Vec<Box<dyn Phase>> = vec![Box::new(HypePhase::new(
        ThresholdGate::new(Box::new(HypeScorer), settings.hype_cutoff),
        Duration::hours(settings.hype_recent_hours),
        Duration::hours(settings.dedupe_hours),
    ))];

    let cfg = EngineConfig {
        retention: Duration::hours(settings.dedupe_hours),
        heartbeat: settings.heartbeat,
        // A feed-wide frenzy should not flood the channel in one pass.
        max_alerts_per_run: Some(settings.max_hype_alerts),
    };

    let stats = run_once(&providers, &phases, &mut ledger, &notifier, Utc::now(), &cfg).await;
    tracing::info!(?stats, "hype scan complete");
    Ok(())
}
