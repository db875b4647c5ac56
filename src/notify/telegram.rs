use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;

use super::{AlertMessage, Notifier};

/// Telegram Bot API sink. HTML parse mode, link previews off, and the
/// notification muted unless the message is urgent. No retries: a failed
/// send is simply retried by the next scheduled invocation.
#[derive(Clone)]
pub struct TelegramNotifier {
    token: String,
    chat_id: String,
    client: Client,
    timeout: Duration,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            chat_id: chat_id.into(),
            client: Client::new(),
            timeout: Duration::from_secs(20),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    fn endpoint(&self) -> String {
        format!("https://api.telegram.org/bot{}/sendMessage", self.token)
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
    disable_notification: bool,
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &AlertMessage) -> Result<()> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text: &message.text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
            disable_notification: !message.urgent,
        };

        let rsp = self
            .client
            .post(self.endpoint())
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .context("telegram sendMessage request failed")?;

        rsp.error_for_status()
            .context("telegram sendMessage HTTP error")?;
        Ok(())
    }
}
