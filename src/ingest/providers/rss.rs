// src/ingest/providers/rss.rs
// Generic RSS feed provider; one instance per configured source.

use anyhow::{Context, Result};
use async_trait::async_trait;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::event::Event;
use crate::ingest::config::FeedSource;
use crate::ingest::normalize_text;
use crate::ingest::types::SourceProvider;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

fn parse_rfc2822_utc(ts: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
}

pub struct RssProvider {
    label: String,
    weight: f32,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        url: String,
        client: reqwest::Client,
    },
}

impl RssProvider {
    pub fn from_fixture(label: impl Into<String>, weight: f32, xml: &str) -> Self {
        Self {
            label: label.into(),
            weight,
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn from_source(src: &FeedSource) -> Self {
        Self {
            label: src.label.clone(),
            weight: src.weight,
            mode: Mode::Http {
                url: src.url.clone(),
                client: reqwest::Client::new(),
            },
        }
    }

    fn parse_items(&self, s: &str) -> Result<Vec<Event>> {
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean)
            .with_context(|| format!("parsing rss xml from {}", self.label))?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let title = normalize_text(it.title.as_deref().unwrap_or_default());
            if title.is_empty() {
                continue;
            }
            let summary = normalize_text(it.description.as_deref().unwrap_or_default());
            let text = if summary.is_empty() {
                title.clone()
            } else {
                format!("{}. {}", title, summary)
            };

            out.push(Event::headline(
                title,
                it.pub_date.as_deref().and_then(parse_rfc2822_utc),
                self.label.clone(),
                it.link,
                text,
                self.weight,
            ));
        }
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for RssProvider {
    async fn fetch_latest(&self) -> Result<Vec<Event>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items(s),
            Mode::Http { url, client } => {
                let body = client
                    .get(url)
                    .timeout(Duration::from_secs(20))
                    .header("User-Agent", "Mozilla/5.0 (Watchtower)")
                    .send()
                    .await
                    .with_context(|| format!("fetching rss from {}", self.label))?
                    .error_for_status()
                    .with_context(|| format!("rss http status from {}", self.label))?
                    .text()
                    .await
                    .with_context(|| format!("reading rss body from {}", self.label))?;
                self.parse_items(&body)
            }
        }
    }

    fn name(&self) -> &str {
        &self.label
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
