use clap::Parser;
use std::path::PathBuf;

use crate::config::AppConfig;

/// Command-line overrides, applied on top of environment settings.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "steal-finder", version, about = "Polls listing pages and posts underpriced offers to Discord")]
pub struct Cli {
    /// Watch list file (.json or .toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seen-state file
    #[arg(long)]
    pub seen: Option<PathBuf>,

    /// Seconds between cycles
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,
}

impl Cli {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(path) = &self.config {
            config.paths.watches = path.clone();
        }
        if let Some(path) = &self.seen {
            config.paths.seen = path.clone();
        }
        if let Some(interval) = self.interval {
            config.scheduler.poll_interval = interval;
        }
    }
}
