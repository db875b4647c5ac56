//! Durable dedupe ledger.
//!
//! The only state that crosses process boundaries: a JSON map of dedupe
//! fingerprints to the millisecond instant they fired, plus the last GC
//! time. Loading never fails (missing or corrupt files mean "no history"),
//! saving is best-effort, and the GC sweep keeps the map bounded.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// On-disk shape: `{"sent": {"<hex>": <ms>}, "last_gc": <ms>}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LedgerState {
    #[serde(default)]
    pub sent: HashMap<String, i64>,
    #[serde(default)]
    pub last_gc: i64,
}

#[derive(Debug)]
pub struct SentLedger {
    path: PathBuf,
    state: LedgerState,
}

impl SentLedger {
    /// Load from `path`. Missing, unreadable, or malformed files yield a
    /// fresh empty ledger; state corruption is never fatal.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<LedgerState>(&raw) {
                Ok(st) => st,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        path = %path.display(),
                        "state file unreadable; starting with empty history"
                    );
                    LedgerState::default()
                }
            },
            Err(_) => LedgerState::default(),
        };
        Self { path, state }
    }

    pub fn already_fired(&self, key: &str) -> bool {
        self.state.sent.contains_key(key)
    }

    /// Idempotent: re-marking an existing key refreshes its timestamp.
    pub fn mark_fired(&mut self, key: &str, now: DateTime<Utc>) {
        self.state
            .sent
            .insert(key.to_string(), now.timestamp_millis());
    }

    pub fn fired_at_ms(&self, key: &str) -> Option<i64> {
        self.state.sent.get(key).copied()
    }

    /// Evict every record strictly older than `retention`; a record whose
    /// age equals the retention exactly is kept. Returns the eviction count.
    pub fn sweep(&mut self, now: DateTime<Utc>, retention: Duration) -> usize {
        let now_ms = now.timestamp_millis();
        let retention_ms = retention.num_milliseconds();
        let before = self.state.sent.len();
        self.state
            .sent
            .retain(|_, fired_ms| now_ms - *fired_ms <= retention_ms);
        self.state.last_gc = now_ms;
        let evicted = before - self.state.sent.len();
        counter!("watch_gc_evicted_total").increment(evicted as u64);
        evicted
    }

    /// Best-effort persist: write a temp file, then rename over the target.
    /// Failure is logged and swallowed; at worst the next run re-derives its
    /// decisions and may duplicate a send, which beats crashing here.
    pub fn save(&self) {
        let tmp = self.path.with_extension("tmp");
        let result = serde_json::to_string(&self.state)
            .map_err(anyhow::Error::from)
            .and_then(|raw| fs::write(&tmp, raw).map_err(anyhow::Error::from))
            .and_then(|_| fs::rename(&tmp, &self.path).map_err(anyhow::Error::from));
        if let Err(e) = result {
            tracing::warn!(error = %e, path = %self.path.display(), "failed to persist state");
        }
    }

    pub fn len(&self) -> usize {
        self.state.sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.sent.is_empty()
    }

    pub fn last_gc_ms(&self) -> i64 {
        self.state.last_gc
    }
}

/// Deterministic fingerprint for one (event identity, phase) pair.
/// Same logical pair always hashes identically; distinct phases of the same
/// event always differ.
pub fn dedupe_key(identity: &str, phase: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identity.as_bytes());
    hasher.update(b"|");
    hasher.update(phase.as_bytes());
    format!("{:x}", hasher.finalize())
}
