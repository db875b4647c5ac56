// src/lib.rs
// Public library surface for the watcher binaries and integration tests.

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod event;
pub mod gate;
pub mod ingest;
pub mod ledger;
pub mod notify;
pub mod phase;
pub mod scoring;
pub mod sentiment;

// ---- Re-exports for a stable public API ----
pub use crate::config::Settings;
pub use crate::engine::{run_once, run_sentiment_summary, EngineConfig, RunStats, SummaryParams};
pub use crate::event::{Event, Impact};
pub use crate::gate::{GateDecision, Scorer, ThresholdGate};
pub use crate::ledger::{dedupe_key, SentLedger};
pub use crate::notify::{AlertMessage, Notifier};
pub use crate::phase::{HeadsUpPhase, HypePhase, ImpactPhase, Phase, PreReleasePhase};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact tracing to stderr for the watcher binaries. Honors RUST_LOG;
/// defaults to info for this crate, warn elsewhere.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("watchtower=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}
