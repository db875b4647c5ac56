//! Watchtower: calendar + impact alert run.
//!
//! One run per invocation, meant to be driven by an external scheduler:
//! builds the rule calendar and configured news feeds, evaluates the
//! heads-up, pre-release, and impact-threshold phases against the durable
//! dedupe ledger, then sweeps and persists state before exiting.

use anyhow::Result;
use chrono::{Duration, Utc};

use watchtower::config::Settings;
use watchtower::engine::{run_once, EngineConfig};
use watchtower::gate::ThresholdGate;
use watchtower::ingest::config::load_sources_default;
use watchtower::ingest::providers::calendar::RuleCalendarProvider;
use watchtower::ingest::providers::rss::RssProvider;
use watchtower::ingest::types::SourceProvider;
use watchtower::ledger::SentLedger;
use watchtower::notify::telegram::TelegramNotifier;
use watchtower::phase::{HeadsUpPhase, ImpactPhase, Phase, PreReleasePhase};
use watchtower::scoring::UrgencyScorer;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op elsewhere.
    let _ = dotenvy::dotenv();
    watchtower::init_tracing();

    // Missing credentials abort here, before any I/O.
    let settings = Settings::from_env()?;
    let notifier = TelegramNotifier::new(&settings.bot_token, &settings.chat_id);
    let mut ledger = SentLedger::load(&settings.state_path);

    let mut providers: Vec<Box<dyn SourceProvider>> =
        vec![Box::new(RuleCalendarProvider::default())];
    match load_sources_default() {
        Ok(sources) => {
            for src in &sources {
                providers.push(Box::new(RssProvider::from_source(src)));
            }
        }
        Err(e) => {
            tracing::warn!(error = ?e, "sources config unreadable; running calendar rules only");
        }
    }

    let phases: Vec<Box<dyn Phase>> = vec![
        Box::new(HeadsUpPhase),
        Box::new(PreReleasePhase),
        Box::new(ImpactPhase::new(
            ThresholdGate::new(Box::new(UrgencyScorer), settings.impact_cutoff),
            Duration::hours(settings.recent_hours),
            Duration::hours(settings.dedupe_hours),
        )),
    ];

    let cfg = EngineConfig {
        retention: Duration::hours(settings.dedupe_hours),
        heartbeat: settings.heartbeat,
        max_alerts_per_run: None,
    };

    let stats = run_once(&providers, &phases, &mut ledger, &notifier, Utc::now(), &cfg).await;
    tracing::info!(?stats, "watch run complete");
    Ok(())
}
