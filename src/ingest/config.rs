// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_PATH: &str = "WATCH_SOURCES_PATH";

fn default_weight() -> f32 {
    1.0
}

/// One configured news feed.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FeedSource {
    pub label: String,
    pub url: String,
    #[serde(default = "default_weight")]
    pub weight: f32,
}

/// Load the sources list from an explicit path. Supports TOML or JSON.
pub fn load_sources_from(path: &Path) -> Result<Vec<FeedSource>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_sources(&content, ext.as_str())
}

/// Load the sources list using env var + fallbacks:
/// 1) $WATCH_SOURCES_PATH
/// 2) config/news_sources.toml
/// 3) config/news_sources.json
///
/// No file at all is fine: the calendar rules still run without feeds.
pub fn load_sources_default() -> Result<Vec<FeedSource>> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sources_from(&pb);
        }
        return Err(anyhow!("WATCH_SOURCES_PATH points to a non-existent path"));
    }
    let toml_p = PathBuf::from("config/news_sources.toml");
    if toml_p.exists() {
        return load_sources_from(&toml_p);
    }
    let json_p = PathBuf::from("config/news_sources.json");
    if json_p.exists() {
        return load_sources_from(&json_p);
    }
    Ok(Vec::new())
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<Vec<FeedSource>> {
    let try_toml = hint_ext == "toml" || s.contains("[[sources]]");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported sources format"))
}

fn parse_toml(s: &str) -> Result<Vec<FeedSource>> {
    #[derive(Deserialize)]
    struct TomlSources {
        sources: Vec<FeedSource>,
    }
    let v: TomlSources = toml::from_str(s)?;
    Ok(clean_list(v.sources))
}

fn parse_json(s: &str) -> Result<Vec<FeedSource>> {
    // Accept either a bare array or {"sources": [...]}.
    #[derive(Deserialize)]
    struct JsonSources {
        sources: Vec<FeedSource>,
    }
    if let Ok(v) = serde_json::from_str::<Vec<FeedSource>>(s) {
        return Ok(clean_list(v));
    }
    let v: JsonSources = serde_json::from_str(s)?;
    Ok(clean_list(v.sources))
}

fn clean_list(items: Vec<FeedSource>) -> Vec<FeedSource> {
    let mut out: Vec<FeedSource> = Vec::new();
    for mut it in items {
        it.label = it.label.trim().to_string();
        it.url = it.url.trim().to_string();
        if it.label.is_empty() || it.url.is_empty() {
            continue;
        }
        if !out.iter().any(|o| o.url == it.url) {
            out.push(it);
        }
    }
    out
}
