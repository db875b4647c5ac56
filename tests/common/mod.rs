#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use chrono::Duration;

use watchtower::engine::EngineConfig;
use watchtower::event::Event;
use watchtower::ingest::types::SourceProvider;

/// Serves a fixed event list; stands in for a live feed.
pub struct StaticProvider {
    label: &'static str,
    events: Vec<Event>,
}

impl StaticProvider {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            label: "static",
            events,
        }
    }

    pub fn labeled(label: &'static str, events: Vec<Event>) -> Self {
        Self { label, events }
    }
}

#[async_trait]
impl SourceProvider for StaticProvider {
    async fn fetch_latest(&self) -> Result<Vec<Event>> {
        Ok(self.events.clone())
    }

    fn name(&self) -> &str {
        self.label
    }
}

/// Always fails to fetch; models a dead feed.
pub struct BrokenProvider;

#[async_trait]
impl SourceProvider for BrokenProvider {
    async fn fetch_latest(&self) -> Result<Vec<Event>> {
        Err(anyhow::anyhow!("connection refused"))
    }

    fn name(&self) -> &str {
        "broken"
    }
}

/// Default run config with the heartbeat off, so tests can assert on the
/// exact alert traffic.
pub fn quiet_config() -> EngineConfig {
    EngineConfig {
        retention: Duration::hours(12),
        heartbeat: false,
        max_alerts_per_run: None,
    }
}
