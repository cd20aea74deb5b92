use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::warn;
use url::Url;
use validator::Validate;

use crate::models::WatchDefinition;
use crate::utils::error::Result;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; StealFinder/1.0)";
pub const DEFAULT_DISCORD_API: &str = "https://discord.com/api/v10";

/// Well-known variable names and the settings they feed.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("DISCORD_TOKEN", "discord.token"),
    ("CHANNEL_ID", "discord.channel_id"),
    ("DISCORD_API_BASE", "discord.api_base"),
    ("POLL_INTERVAL_SEC", "scheduler.poll_interval"),
    ("NOTIFY_PACING_MS", "scheduler.notify_pacing_ms"),
    ("REQUEST_TIMEOUT_SEC", "scraper.request_timeout"),
    ("USER_AGENT", "scraper.user_agent"),
    ("CONFIG_JSON", "paths.watches"),
    ("SEEN_PATH", "paths.seen"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub discord: DiscordConfig,
    pub scraper: ScraperConfig,
    pub scheduler: SchedulerConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub token: String,
    pub channel_id: String,
    pub api_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Seconds before a page fetch is abandoned.
    pub request_timeout: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between cycle starts.
    pub poll_interval: u64,
    /// Pause after each delivered notification.
    pub notify_pacing_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub watches: PathBuf,
    pub seen: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> std::result::Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from defaults, `STEAL_FINDER__SECTION__KEY` variables
    /// and finally the flat well-known names, looked up through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> std::result::Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Config::builder()
            .set_default("discord.token", "")?
            .set_default("discord.channel_id", "")?
            .set_default("discord.api_base", DEFAULT_DISCORD_API)?
            .set_default("scraper.request_timeout", 30)?
            .set_default("scraper.user_agent", DEFAULT_USER_AGENT)?
            .set_default("scheduler.poll_interval", 60)?
            .set_default("scheduler.notify_pacing_ms", 1000)?
            .set_default("paths.watches", "config.json")?
            .set_default("paths.seen", "seen.json")?
            .add_source(Environment::with_prefix("STEAL_FINDER").separator("__"));

        for (var, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(*key, lookup(var).filter(|v| !v.trim().is_empty()))?;
        }

        let config: AppConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.discord.token.trim().is_empty() {
            return Err(ConfigError::Message("DISCORD_TOKEN is required".into()));
        }

        if self.discord.channel_id.trim().is_empty() {
            return Err(ConfigError::Message("CHANNEL_ID is required".into()));
        }

        match Url::parse(&self.discord.api_base) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(ConfigError::Message("Invalid Discord API base URL".into())),
        }

        if self.scheduler.poll_interval == 0 {
            return Err(ConfigError::Message("Poll interval must be greater than 0".into()));
        }

        if self.scraper.request_timeout == 0 {
            return Err(ConfigError::Message("Request timeout must be greater than 0".into()));
        }

        if self.scraper.user_agent.trim().is_empty() {
            return Err(ConfigError::Message("User agent cannot be empty".into()));
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WatchList {
    Bare(Vec<WatchDefinition>),
    Wrapped { watches: Vec<WatchDefinition> },
}

#[derive(Debug, Deserialize)]
struct WatchFile {
    #[serde(default)]
    watches: Vec<WatchDefinition>,
}

/// Read the ordered watch list. `.toml` files use `[[watches]]` tables,
/// anything else is JSON (a bare array or `{"watches": [...]}`).
pub fn load_watches(path: &Path) -> Result<Vec<WatchDefinition>> {
    let text = std::fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let watches = if is_toml {
        toml::from_str::<WatchFile>(&text)?.watches
    } else {
        match serde_json::from_str::<WatchList>(&text)? {
            WatchList::Bare(watches) | WatchList::Wrapped { watches } => watches,
        }
    };

    for watch in &watches {
        watch.validate()?;
    }

    if watches.is_empty() {
        warn!(path = %path.display(), "Watch list is empty, nothing will be polled");
    }

    Ok(watches)
}
