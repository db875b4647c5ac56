//! Sentiment summary: aggregates per-subject bull/bear mentions across
//! the configured feeds and reports subjects with a strong one-sided
//! reading. Deduped per (subject, side) through its own ledger file.

use anyhow::Result;
use chrono::{Duration, Utc};

use watchtower::config::Settings;
use watchtower::engine::{run_sentiment_summary, EngineConfig, SummaryParams};
use watchtower::ingest::config::load_sources_default;
use watchtower::ingest::providers::rss::RssProvider;
use watchtower::ingest::types::SourceProvider;
use watchtower::ledger::SentLedger;
use watchtower::notify::telegram::TelegramNotifier;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    watchtower::init_tracing();

    let settings = Settings::from_env()?;
    let notifier = TelegramNotifier::new(&settings.bot_token, &settings.chat_id);
    let mut ledger = SentLedger::load(&settings.summary_state_path);

    let sources = load_sources_default()?;
    if sources.is_empty() {
        tracing::warn!("no feed sources configured; nothing to summarize");
        return Ok(());
    }
    let providers: Vec<Box<dyn SourceProvider>> = sources
        .iter()
        .map(|src| Box::new(RssProvider::from_source(src)) as Box<dyn SourceProvider>)
        .collect();

    let params = SummaryParams {
        lookback: Duration::hours(settings.recent_hours),
        min_mentions: settings.min_mentions,
        strong_pct: settings.strong_pct,
    };
    let cfg = EngineConfig {
        retention: Duration::hours(settings.dedupe_hours),
        heartbeat: settings.heartbeat,
        max_alerts_per_run: None,
    };

    let stats =
        run_sentiment_summary(&providers, &params, &mut ledger, &notifier, Utc::now(), &cfg).await;
    tracing::info!(?stats, "sentiment summary complete");
    Ok(())
}
