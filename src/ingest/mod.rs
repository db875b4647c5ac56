// src/ingest/mod.rs
pub mod config;
pub mod providers;
pub mod types;

use std::collections::HashMap;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

use crate::event::Event;
use crate::ingest::types::SourceProvider;

/// One-time metrics registration.
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("watch_events_total", "Total events collected from providers.");
        describe_counter!("watch_provider_errors_total", "Provider fetch/parse errors.");
        describe_counter!("watch_alerts_fired_total", "Alerts dispatched (or attempted).");
        describe_counter!("watch_deduped_total", "Fire decisions suppressed by the ledger.");
        describe_counter!("watch_gc_evicted_total", "Ledger records evicted by GC.");
    });
}

/// Normalize text: decode HTML entities, strip tags, collapse whitespace,
/// trim trailing sentence punctuation, cap the length.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, "").to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("ws regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    while let Some(last) = out.chars().last() {
        if matches!(last, '!' | '?' | '.' | ',') {
            out.pop();
        } else {
            break;
        }
    }

    if out.chars().count() > 1200 {
        out = out.chars().take(1200).collect();
    }

    out
}

/// Fetch from every provider, isolating failures per source. Returns the
/// combined events and the number of failed providers.
pub async fn collect_events(providers: &[Box<dyn SourceProvider>]) -> (Vec<Event>, usize) {
    ensure_metrics_described();

    let mut events = Vec::new();
    let mut errors = 0usize;
    for p in providers {
        match p.fetch_latest().await {
            Ok(mut v) => events.append(&mut v),
            Err(e) => {
                errors += 1;
                tracing::warn!(error = ?e, provider = p.name(), "source fetch failed; skipping");
                counter!("watch_provider_errors_total").increment(1);
            }
        }
    }
    counter!("watch_events_total").increment(events.len() as u64);
    (events, errors)
}

/// Collapse duplicates produced by overlapping sources. Scheduled events
/// dedupe on (name, date) keeping the earliest time; untimestamped items
/// dedupe on their full identity. Output is sorted, timestamped first.
pub fn dedupe_events(events: Vec<Event>) -> Vec<Event> {
    let mut seen: HashMap<String, Event> = HashMap::new();
    for ev in events {
        let key = match ev.timestamp {
            Some(ts) => format!("{}|{}", ev.name, ts.date_naive()),
            None => ev.identity(),
        };
        match seen.get(&key) {
            Some(kept) if kept.timestamp <= ev.timestamp => {}
            _ => {
                seen.insert(key, ev);
            }
        }
    }
    let mut out: Vec<Event> = seen.into_values().collect();
    out.sort_by_key(|e| (e.timestamp.is_none(), e.timestamp, e.name.clone()));
    out
}
