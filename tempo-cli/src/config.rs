use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tempo_core::{AnalyticsConfig, CachePolicy, MAX_WINDOW_DAYS};

use crate::llm::Provider;
use crate::state::ensure_tempo_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analytics: AnalyticsConfig,
    pub insights: InsightsSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsSection {
    pub provider: Provider,
    /// Overrides the provider's default model.
    pub model: Option<String>,
    pub temperature: f32,
    pub cache_ttl_hours: i64,
}

impl Default for InsightsSection {
    fn default() -> Self {
        Self {
            provider: Provider::Gemini,
            model: None,
            temperature: 0.4,
            cache_ttl_hours: 24,
        }
    }
}

impl InsightsSection {
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(self.provider.default_model())
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            max_age: Duration::hours(self.cache_ttl_hours.clamp(0, MAX_WINDOW_DAYS * 24)),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_tempo_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    let cfg: Config = toml::from_str(&s).with_context(|| format!("parse {}", p.display()))?;
    cfg.analytics
        .validate()
        .with_context(|| format!("invalid [analytics] in {}", p.display()))?;
    Ok(cfg)
}

pub fn save_config_to(cfg: &Config, p: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}
