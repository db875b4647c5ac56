// src/ingest/types.rs
use anyhow::Result;

use crate::event::Event;

/// One configured event source. Providers are lazy and fetched once per
/// run; a failing provider is isolated by the collector and never aborts
/// its siblings.
#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Event>>;
    fn name(&self) -> &str;
}
