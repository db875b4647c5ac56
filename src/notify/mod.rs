pub mod telegram;

use anyhow::Result;

/// A rendered notification. `urgent` maps to the channel's notification
/// priority: urgent sends ping, non-urgent ones are muted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub text: String,
    pub urgent: bool,
}

impl AlertMessage {
    pub fn loud(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            urgent: true,
        }
    }

    pub fn muted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            urgent: false,
        }
    }
}

/// Best-effort delivery sink. A send failure is an `Err` the caller logs
/// and moves past; it must never abort a run.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &AlertMessage) -> Result<()>;
}

// --- Test doubles ---

/// Records every message instead of delivering it.
pub struct MemoryNotifier {
    pub sent: std::sync::Mutex<Vec<AlertMessage>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self {
            sent: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn messages(&self) -> Vec<AlertMessage> {
        self.sent.lock().expect("memory notifier mutex poisoned").clone()
    }
}

impl Default for MemoryNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Notifier for MemoryNotifier {
    async fn send(&self, message: &AlertMessage) -> Result<()> {
        self.sent
            .lock()
            .expect("memory notifier mutex poisoned")
            .push(message.clone());
        Ok(())
    }
}

/// Always fails; models a channel outage.
pub struct FailingNotifier;

#[async_trait::async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _message: &AlertMessage) -> Result<()> {
        Err(anyhow::anyhow!("notification channel unreachable"))
    }
}
