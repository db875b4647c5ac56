//! Alert phases.
//!
//! A phase is a named alert stage with its own eligibility rule and its own
//! dedupe horizon; phases of the same event are fully independent. Calendar
//! phases use a half-open minutes-until window (`low < m <= high`), so an
//! event fires exactly once as it crosses into range and a release whose
//! timestamp has already passed can never fire a future-looking phase.

use chrono::{DateTime, Duration, Utc};
use html_escape::encode_text;

use crate::event::{Event, Impact};
use crate::gate::{GateDecision, ThresholdGate};
use crate::notify::AlertMessage;

/// 4 days, in minutes.
pub const T4D_MINUTES: i64 = 4 * 24 * 60;
pub const T90_MINUTES: i64 = 90;

pub fn minutes_until(ts: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    ts.signed_duration_since(now).num_minutes()
}

/// Half-open eligibility: exclusive low, inclusive high.
pub fn within_window(minutes: i64, low: i64, high: i64) -> bool {
    low < minutes && minutes <= high
}

pub trait Phase: Send + Sync {
    fn name(&self) -> &'static str;

    fn applies_to(&self, _event: &Event) -> bool {
        true
    }

    /// Is this phase currently eligible for the event?
    fn due(&self, event: &Event, now: DateTime<Utc>) -> bool;

    /// Scoring gate; phases that fire purely on time pass everything.
    fn evaluate(&self, _event: &Event) -> GateDecision {
        GateDecision::pass()
    }

    fn render(&self, event: &Event, decision: &GateDecision) -> AlertMessage;

    /// How long a fired key must be retained so this phase cannot re-fire
    /// while its window is still open.
    fn horizon(&self) -> Duration;
}

fn fmt_when(ts: DateTime<Utc>) -> String {
    ts.format("%a %b %d, %H:%M UTC").to_string()
}

fn when_line(event: &Event) -> String {
    match event.timestamp {
        Some(ts) => format!("\nWhen: {}", fmt_when(ts)),
        None => String::new(),
    }
}

fn link_line(event: &Event) -> String {
    match event.link.as_deref() {
        Some(link) => format!("\n<a href=\"{}\">Open</a>", encode_text(link)),
        None => String::new(),
    }
}

/// Long-horizon heads-up, majors only: fires once when the release is at
/// most four days out.
pub struct HeadsUpPhase;

impl Phase for HeadsUpPhase {
    fn name(&self) -> &'static str {
        "t-4d"
    }

    fn applies_to(&self, event: &Event) -> bool {
        event.impact == Impact::High
    }

    fn due(&self, event: &Event, now: DateTime<Utc>) -> bool {
        event
            .timestamp
            .map(|ts| within_window(minutes_until(ts, now), 0, T4D_MINUTES))
            .unwrap_or(false)
    }

    fn render(&self, event: &Event, _decision: &GateDecision) -> AlertMessage {
        AlertMessage::muted(format!(
            "\u{26A0}\u{FE0F} <b>Heads-up (T-4d): {}</b>{}\nSource: {}\nWhy: typically increases volatility across BTC/ETH.\nPlaybook: plan risk; avoid holding fresh positions into the release window.",
            encode_text(&event.name),
            when_line(event),
            encode_text(&event.source),
        ))
    }

    fn horizon(&self) -> Duration {
        Duration::minutes(T4D_MINUTES)
    }
}

/// Short-horizon pre-alert, all categories, 90 minutes before the release.
pub struct PreReleasePhase;

fn guidance(name: &str) -> &'static str {
    let upper = name.to_uppercase();
    if upper.contains("CPI") || upper.contains("PCE") || upper.contains("PPI") {
        "Inflation print: BTC often reacts fast to surprise. Consider standing aside for the first impulse."
    } else if upper.contains("FOMC") {
        "Policy + press conference: whipsaw is common around 2:00-2:45 PM ET."
    } else if upper.contains("NFP") {
        "Labor surprise swings DXY/USTs into crypto; expect sharp moves."
    } else {
        "Expect higher vol; tighten stops; avoid opening new positions right before the print."
    }
}

impl Phase for PreReleasePhase {
    fn name(&self) -> &'static str {
        "t-90m"
    }

    fn due(&self, event: &Event, now: DateTime<Utc>) -> bool {
        event
            .timestamp
            .map(|ts| within_window(minutes_until(ts, now), 0, T90_MINUTES))
            .unwrap_or(false)
    }

    fn render(&self, event: &Event, _decision: &GateDecision) -> AlertMessage {
        AlertMessage::loud(format!(
            "\u{23F3} <b>T-90m: {}</b>{}\n{}",
            encode_text(&event.name),
            when_line(event),
            guidance(&event.name),
        ))
    }

    fn horizon(&self) -> Duration {
        Duration::minutes(T90_MINUTES)
    }
}

/// Recent-news phase gated on the urgency threshold score.
pub struct ImpactPhase {
    gate: ThresholdGate,
    lookback: Duration,
    horizon: Duration,
}

impl ImpactPhase {
    pub fn new(gate: ThresholdGate, lookback: Duration, horizon: Duration) -> Self {
        Self {
            gate,
            lookback,
            horizon,
        }
    }
}

impl Phase for ImpactPhase {
    fn name(&self) -> &'static str {
        "impact-threshold"
    }

    fn due(&self, event: &Event, now: DateTime<Utc>) -> bool {
        match event.timestamp {
            // Unknown publication time: don't throw the item away, let the
            // score decide.
            None => true,
            Some(ts) => now.signed_duration_since(ts) <= self.lookback,
        }
    }

    fn evaluate(&self, event: &Event) -> GateDecision {
        self.gate.decide(event)
    }

    fn render(&self, event: &Event, decision: &GateDecision) -> AlertMessage {
        AlertMessage::loud(format!(
            "\u{1F6A8} <b>URGENT {:.0}/10</b>\n<b>{}</b>\nSource: {}{}{}",
            decision.score,
            encode_text(&event.name),
            encode_text(&event.source),
            when_line(event),
            link_line(event),
        ))
    }

    fn horizon(&self) -> Duration {
        self.horizon
    }
}

/// Recent-news phase gated on the 0..1 hype score.
pub struct HypePhase {
    gate: ThresholdGate,
    lookback: Duration,
    horizon: Duration,
}

impl HypePhase {
    pub fn new(gate: ThresholdGate, lookback: Duration, horizon: Duration) -> Self {
        Self {
            gate,
            lookback,
            horizon,
        }
    }
}

impl Phase for HypePhase {
    fn name(&self) -> &'static str {
        "hype-threshold"
    }

    fn due(&self, event: &Event, now: DateTime<Utc>) -> bool {
        match event.timestamp {
            None => true,
            Some(ts) => now.signed_duration_since(ts) <= self.lookback,
        }
    }

    fn evaluate(&self, event: &Event) -> GateDecision {
        self.gate.decide(event)
    }

    fn render(&self, event: &Event, decision: &GateDecision) -> AlertMessage {
        let pct = (decision.score * 100.0).round() as i64;
        AlertMessage::loud(format!(
            "<b>HYPEWATCH {}%</b> {}\n<b>{}</b>\nSource: {}{}{}",
            pct,
            decision.label,
            encode_text(&event.name),
            encode_text(&event.source),
            when_line(event),
            link_line(event),
        ))
    }

    fn horizon(&self) -> Duration {
        self.horizon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap()
    }

    fn scheduled(name: &str, mins_out: i64, impact: Impact) -> Event {
        Event::scheduled(name, now() + Duration::minutes(mins_out), "Rule", impact)
    }

    #[test]
    fn window_is_exclusive_low_inclusive_high() {
        assert!(!within_window(0, 0, T4D_MINUTES));
        assert!(within_window(1, 0, T4D_MINUTES));
        assert!(within_window(T4D_MINUTES, 0, T4D_MINUTES));
        assert!(!within_window(T4D_MINUTES + 1, 0, T4D_MINUTES));
    }

    #[test]
    fn heads_up_boundaries() {
        let ph = HeadsUpPhase;
        assert!(ph.due(&scheduled("NFP", T4D_MINUTES, Impact::High), now()));
        assert!(!ph.due(&scheduled("NFP", T4D_MINUTES + 1, Impact::High), now()));
        assert!(!ph.due(&scheduled("NFP", 0, Impact::High), now()));
        assert!(!ph.due(&scheduled("NFP", -10, Impact::High), now()));
    }

    #[test]
    fn heads_up_majors_only() {
        let ph = HeadsUpPhase;
        assert!(ph.applies_to(&scheduled("NFP", 100, Impact::High)));
        assert!(!ph.applies_to(&scheduled("Jobless Claims", 100, Impact::Medium)));
    }

    #[test]
    fn pre_release_boundaries() {
        let ph = PreReleasePhase;
        assert!(ph.due(&scheduled("CPI", 90, Impact::High), now()));
        assert!(!ph.due(&scheduled("CPI", 91, Impact::High), now()));
        assert!(ph.due(&scheduled("CPI", 1, Impact::High), now()));
        assert!(!ph.due(&scheduled("CPI", 0, Impact::High), now()));
    }

    #[test]
    fn pre_release_guidance_varies_by_release() {
        assert!(guidance("CPI").contains("Inflation"));
        assert!(guidance("FOMC").contains("press conference"));
        assert!(guidance("NFP").contains("Labor"));
        assert!(guidance("Jobless Claims").contains("higher vol"));
    }

    #[test]
    fn heads_up_message_is_muted_pre_release_is_loud() {
        let ev = scheduled("NFP", 120, Impact::High);
        let muted = HeadsUpPhase.render(&ev, &GateDecision::pass());
        let loud = PreReleasePhase.render(&ev, &GateDecision::pass());
        assert!(!muted.urgent);
        assert!(loud.urgent);
        assert!(muted.text.contains("Heads-up"));
        assert!(loud.text.contains("T-90m"));
    }
}
